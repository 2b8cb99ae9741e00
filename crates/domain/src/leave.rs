use chrono::{DateTime, NaiveDate, Utc};
use stafflow_core::{AppError, AppResult, RecordId};
use serde::{Deserialize, Serialize};

use crate::access::OwnedRecord;
use crate::role::Role;

/// Category of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveKind {
    /// Casual leave.
    Casual,
    /// Sick leave.
    Sick,
    /// Earned/privilege leave.
    Earned,
    /// Leave without pay.
    Unpaid,
}

impl LeaveKind {
    /// Returns a stable storage value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Casual => "casual",
            Self::Sick => "sick",
            Self::Earned => "earned",
            Self::Unpaid => "unpaid",
        }
    }

    /// Parses a storage value into a kind.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "casual" => Ok(Self::Casual),
            "sick" => Ok(Self::Sick),
            "earned" => Ok(Self::Earned),
            "unpaid" => Ok(Self::Unpaid),
            _ => Err(AppError::Validation(format!("unknown leave kind '{value}'"))),
        }
    }
}

/// Lifecycle state of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved by an authorized user.
    Approved,
    /// Rejected by an authorized user.
    Rejected,
}

impl LeaveStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a storage value into a status.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(AppError::Validation(format!(
                "unknown leave status '{value}'"
            ))),
        }
    }
}

/// A leave request filed by one user for a date range.
///
/// Decisions are single-shot: once approved or rejected the request can no
/// longer change state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    id: RecordId,
    owner_subject: String,
    owner_role: Option<Role>,
    kind: LeaveKind,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: String,
    status: LeaveStatus,
    decided_by: Option<String>,
    decided_at: Option<DateTime<Utc>>,
}

impl LeaveRequest {
    /// Creates a validated pending leave request.
    pub fn new(
        id: RecordId,
        owner_subject: impl Into<String>,
        owner_role: Option<Role>,
        kind: LeaveKind,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: impl Into<String>,
    ) -> AppResult<Self> {
        let owner_subject = owner_subject.into();
        if owner_subject.trim().is_empty() {
            return Err(AppError::Validation(
                "leave request owner must not be empty".to_owned(),
            ));
        }

        if end_date < start_date {
            return Err(AppError::Validation(
                "leave end date must not precede the start date".to_owned(),
            ));
        }

        let reason = reason.into().trim().to_owned();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "leave reason must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            id,
            owner_subject,
            owner_role,
            kind,
            start_date,
            end_date,
            reason,
            status: LeaveStatus::Pending,
            decided_by: None,
            decided_at: None,
        })
    }

    /// Rehydrates a request from stored state.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: RecordId,
        owner_subject: impl Into<String>,
        owner_role: Option<Role>,
        kind: LeaveKind,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: impl Into<String>,
        status: LeaveStatus,
        decided_by: Option<String>,
        decided_at: Option<DateTime<Utc>>,
    ) -> AppResult<Self> {
        let mut request = Self::new(id, owner_subject, owner_role, kind, start_date, end_date, reason)?;
        request.status = status;
        request.decided_by = decided_by;
        request.decided_at = decided_at;
        Ok(request)
    }

    /// Returns the record identifier.
    #[must_use]
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Returns the leave kind.
    #[must_use]
    pub fn kind(&self) -> LeaveKind {
        self.kind
    }

    /// Returns the first day of leave.
    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Returns the last day of leave.
    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Returns the stated reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        self.reason.as_str()
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn status(&self) -> LeaveStatus {
        self.status
    }

    /// Returns the deciding subject, once decided.
    #[must_use]
    pub fn decided_by(&self) -> Option<&str> {
        self.decided_by.as_deref()
    }

    /// Returns the decision timestamp, once decided.
    #[must_use]
    pub fn decided_at(&self) -> Option<DateTime<Utc>> {
        self.decided_at
    }

    /// Approves a pending request.
    pub fn approve(&mut self, decided_by: impl Into<String>, at: DateTime<Utc>) -> AppResult<()> {
        self.decide(LeaveStatus::Approved, decided_by, at)
    }

    /// Rejects a pending request.
    pub fn reject(&mut self, decided_by: impl Into<String>, at: DateTime<Utc>) -> AppResult<()> {
        self.decide(LeaveStatus::Rejected, decided_by, at)
    }

    fn decide(
        &mut self,
        status: LeaveStatus,
        decided_by: impl Into<String>,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        if self.status != LeaveStatus::Pending {
            return Err(AppError::Conflict(format!(
                "leave request '{}' was already {}",
                self.id,
                self.status.as_str()
            )));
        }

        self.status = status;
        self.decided_by = Some(decided_by.into());
        self.decided_at = Some(at);
        Ok(())
    }
}

impl OwnedRecord for LeaveRequest {
    fn owner_subject(&self) -> &str {
        self.owner_subject.as_str()
    }

    fn owner_role(&self) -> Option<Role> {
        self.owner_role
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use stafflow_core::RecordId;

    use super::{LeaveKind, LeaveRequest, LeaveStatus};
    use crate::role::Role;

    fn request() -> LeaveRequest {
        let built = LeaveRequest::new(
            RecordId::new(),
            "u-emp-1",
            Some(Role::Employee),
            LeaveKind::Casual,
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap_or_default(),
            NaiveDate::from_ymd_opt(2025, 7, 3).unwrap_or_default(),
            "family visit",
        );
        let Ok(built) = built else {
            panic!("fixture leave request must build");
        };
        built
    }

    #[test]
    fn end_before_start_is_rejected() {
        let result = LeaveRequest::new(
            RecordId::new(),
            "u-emp-1",
            Some(Role::Employee),
            LeaveKind::Sick,
            NaiveDate::from_ymd_opt(2025, 7, 3).unwrap_or_default(),
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap_or_default(),
            "backdated",
        );
        assert!(result.is_err());
    }

    #[test]
    fn approve_transitions_from_pending_only_once() {
        let mut request = request();
        assert!(request.approve("u-hr-1", Utc::now()).is_ok());
        assert_eq!(request.status(), LeaveStatus::Approved);
        assert_eq!(request.decided_by(), Some("u-hr-1"));

        // Second decision is rejected.
        assert!(request.reject("u-hr-1", Utc::now()).is_err());
    }
}
