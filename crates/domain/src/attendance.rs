use chrono::{NaiveDate, NaiveTime};
use stafflow_core::{AppError, AppResult, RecordId};
use serde::{Deserialize, Serialize};

use crate::access::OwnedRecord;
use crate::role::Role;

/// Daily attendance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Present for the full day.
    Present,
    /// Absent without leave.
    Absent,
    /// On an approved leave.
    OnLeave,
    /// Present for half the day.
    HalfDay,
}

impl AttendanceStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::OnLeave => "on_leave",
            Self::HalfDay => "half_day",
        }
    }

    /// Parses a storage value into a status.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "on_leave" => Ok(Self::OnLeave),
            "half_day" => Ok(Self::HalfDay),
            _ => Err(AppError::Validation(format!(
                "unknown attendance status '{value}'"
            ))),
        }
    }
}

/// One attendance row for one user and work day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    id: RecordId,
    owner_subject: String,
    owner_role: Option<Role>,
    work_date: NaiveDate,
    clock_in: Option<NaiveTime>,
    clock_out: Option<NaiveTime>,
    status: AttendanceStatus,
    note: Option<String>,
}

impl AttendanceRecord {
    /// Creates a validated attendance record.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: RecordId,
        owner_subject: impl Into<String>,
        owner_role: Option<Role>,
        work_date: NaiveDate,
        clock_in: Option<NaiveTime>,
        clock_out: Option<NaiveTime>,
        status: AttendanceStatus,
        note: Option<String>,
    ) -> AppResult<Self> {
        let owner_subject = owner_subject.into();
        if owner_subject.trim().is_empty() {
            return Err(AppError::Validation(
                "attendance owner must not be empty".to_owned(),
            ));
        }

        if let (Some(start), Some(end)) = (clock_in, clock_out)
            && end < start
        {
            return Err(AppError::Validation(
                "clock-out must not precede clock-in".to_owned(),
            ));
        }

        Ok(Self {
            id,
            owner_subject,
            owner_role,
            work_date,
            clock_in,
            clock_out,
            status,
            note: normalize_note(note),
        })
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

    /// Returns the clock-in time, when recorded.
    #[must_use]
    pub fn clock_in(&self) -> Option<NaiveTime> {
        self.clock_in
    }

    /// Returns the clock-out time, when recorded.
    #[must_use]
    pub fn clock_out(&self) -> Option<NaiveTime> {
        self.clock_out
    }

    /// Returns the attendance status.
    #[must_use]
    pub fn status(&self) -> AttendanceStatus {
        self.status
    }

    /// Returns the optional note.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Replaces the mutable portion of the record.
    pub fn update(
        &mut self,
        clock_in: Option<NaiveTime>,
        clock_out: Option<NaiveTime>,
        status: AttendanceStatus,
        note: Option<String>,
    ) -> AppResult<()> {
        if let (Some(start), Some(end)) = (clock_in, clock_out)
            && end < start
        {
            return Err(AppError::Validation(
                "clock-out must not precede clock-in".to_owned(),
            ));
        }

        self.clock_in = clock_in;
        self.clock_out = clock_out;
        self.status = status;
        self.note = normalize_note(note);
        Ok(())
    }
}

impl OwnedRecord for AttendanceRecord {
    fn owner_subject(&self) -> &str {
        self.owner_subject.as_str()
    }

    fn owner_role(&self) -> Option<Role> {
        self.owner_role
    }
}

fn normalize_note(note: Option<String>) -> Option<String> {
    note.and_then(|value| {
        let trimmed = value.trim().to_owned();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use stafflow_core::RecordId;

    use super::{AttendanceRecord, AttendanceStatus};
    use crate::role::Role;

    fn work_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap_or_default()
    }

    #[test]
    fn clock_out_before_clock_in_is_rejected() {
        let record = AttendanceRecord::new(
            RecordId::new(),
            "u-emp-1",
            Some(Role::Employee),
            work_date(),
            NaiveTime::from_hms_opt(17, 0, 0),
            NaiveTime::from_hms_opt(9, 0, 0),
            AttendanceStatus::Present,
            None,
        );
        assert!(record.is_err());
    }

    #[test]
    fn blank_note_is_dropped() {
        let record = AttendanceRecord::new(
            RecordId::new(),
            "u-emp-1",
            Some(Role::Employee),
            work_date(),
            None,
            None,
            AttendanceStatus::Absent,
            Some("   ".to_owned()),
        );
        assert_eq!(record.ok().and_then(|r| r.note().map(str::to_owned)), None);
    }
}
