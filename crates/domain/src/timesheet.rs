use chrono::NaiveDate;
use stafflow_core::{AppError, AppResult, RecordId};
use serde::{Deserialize, Serialize};

use crate::access::OwnedRecord;
use crate::role::Role;

/// Minutes in a full work day; timesheet entries may not exceed it.
pub const MAX_TIMESHEET_MINUTES: u32 = 24 * 60;

/// Approval state of one timesheet entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimesheetStatus {
    /// Submitted, awaiting approval.
    Submitted,
    /// Approved by an authorized user.
    Approved,
}

impl TimesheetStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Approved => "approved",
        }
    }

    /// Parses a storage value into a status.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "submitted" => Ok(Self::Submitted),
            "approved" => Ok(Self::Approved),
            _ => Err(AppError::Validation(format!(
                "unknown timesheet status '{value}'"
            ))),
        }
    }
}

/// One timesheet entry: hours booked by one user on one day.
///
/// Durations are stored in minutes and must land on quarter-hour
/// boundaries, matching what the booking UI offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timesheet {
    id: RecordId,
    owner_subject: String,
    owner_role: Option<Role>,
    work_date: NaiveDate,
    project: String,
    minutes: u32,
    note: Option<String>,
    status: TimesheetStatus,
    approved_by: Option<String>,
}

impl Timesheet {
    /// Creates a validated submitted timesheet entry.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: RecordId,
        owner_subject: impl Into<String>,
        owner_role: Option<Role>,
        work_date: NaiveDate,
        project: impl Into<String>,
        minutes: u32,
        note: Option<String>,
    ) -> AppResult<Self> {
        let owner_subject = owner_subject.into();
        if owner_subject.trim().is_empty() {
            return Err(AppError::Validation(
                "timesheet owner must not be empty".to_owned(),
            ));
        }

        let project = project.into().trim().to_owned();
        if project.is_empty() {
            return Err(AppError::Validation(
                "timesheet project must not be empty".to_owned(),
            ));
        }

        validate_minutes(minutes)?;

        Ok(Self {
            id,
            owner_subject,
            owner_role,
            work_date,
            project,
            minutes,
            note: note.and_then(|value| {
                let trimmed = value.trim().to_owned();
                (!trimmed.is_empty()).then_some(trimmed)
            }),
            status: TimesheetStatus::Submitted,
            approved_by: None,
        })
    }

    /// Rehydrates a timesheet from stored state.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: RecordId,
        owner_subject: impl Into<String>,
        owner_role: Option<Role>,
        work_date: NaiveDate,
        project: impl Into<String>,
        minutes: u32,
        note: Option<String>,
        status: TimesheetStatus,
        approved_by: Option<String>,
    ) -> AppResult<Self> {
        let mut entry = Self::new(id, owner_subject, owner_role, work_date, project, minutes, note)?;
        entry.status = status;
        entry.approved_by = approved_by;
        Ok(entry)
    }

    /// Returns the record identifier.
    #[must_use]
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Returns the work day.
    #[must_use]
    pub fn work_date(&self) -> NaiveDate {
        self.work_date
    }

    /// Returns the project label.
    #[must_use]
    pub fn project(&self) -> &str {
        self.project.as_str()
    }

    /// Returns the booked minutes.
    #[must_use]
    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    /// Returns the optional note.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Returns the approval state.
    #[must_use]
    pub fn status(&self) -> TimesheetStatus {
        self.status
    }

    /// Returns the approving subject, once approved.
    #[must_use]
    pub fn approved_by(&self) -> Option<&str> {
        self.approved_by.as_deref()
    }

    /// Replaces the mutable portion of a not-yet-approved entry.
    pub fn update(
        &mut self,
        project: impl Into<String>,
        minutes: u32,
        note: Option<String>,
    ) -> AppResult<()> {
        if self.status == TimesheetStatus::Approved {
            return Err(AppError::Conflict(format!(
                "timesheet '{}' was already approved",
                self.id
            )));
        }

        let project = project.into().trim().to_owned();
        if project.is_empty() {
            return Err(AppError::Validation(
                "timesheet project must not be empty".to_owned(),
            ));
        }

        validate_minutes(minutes)?;

        self.project = project;
        self.minutes = minutes;
        self.note = note.and_then(|value| {
            let trimmed = value.trim().to_owned();
            (!trimmed.is_empty()).then_some(trimmed)
        });
        Ok(())
    }

    /// Approves a submitted entry.
    pub fn approve(&mut self, approved_by: impl Into<String>) -> AppResult<()> {
        if self.status == TimesheetStatus::Approved {
            return Err(AppError::Conflict(format!(
                "timesheet '{}' was already approved",
                self.id
            )));
        }

        self.status = TimesheetStatus::Approved;
        self.approved_by = Some(approved_by.into());
        Ok(())
    }
}

impl OwnedRecord for Timesheet {
    fn owner_subject(&self) -> &str {
        self.owner_subject.as_str()
    }

    fn owner_role(&self) -> Option<Role> {
        self.owner_role
    }
}

fn validate_minutes(minutes: u32) -> AppResult<()> {
    if minutes == 0 || minutes > MAX_TIMESHEET_MINUTES {
        return Err(AppError::Validation(format!(
            "timesheet minutes must be between 1 and {MAX_TIMESHEET_MINUTES}"
        )));
    }

    if minutes % 15 != 0 {
        return Err(AppError::Validation(
            "timesheet minutes must land on a quarter-hour boundary".to_owned(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use stafflow_core::RecordId;

    use super::{Timesheet, TimesheetStatus};
    use crate::role::Role;

    fn entry() -> Timesheet {
        let built = Timesheet::new(
            RecordId::new(),
            "u-emp-1",
            Some(Role::Employee),
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap_or_default(),
            "website-rework",
            480,
            None,
        );
        let Ok(built) = built else {
            panic!("fixture timesheet must build");
        };
        built
    }

    #[test]
    fn off_boundary_minutes_are_rejected()  {
        let result = Timesheet::new(
            RecordId::new(),
            "u-emp-1",
            Some(Role::Employee),
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap_or_default(),
            "website-rework",
            37,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn approved_entry_rejects_further_edits() {
        let mut entry = entry();
        assert!(entry.approve("u-tl-1").is_ok());
        assert_eq!(entry.status(), TimesheetStatus::Approved);
        assert!(entry.update("other-project", 240, None).is_err());
        assert!(entry.approve("u-tl-1").is_err());
    }
}
