use chrono::NaiveDate;
use stafflow_core::{AppError, AppResult, RecordId};
use serde::{Deserialize, Serialize};

use crate::access::OwnedRecord;
use crate::role::Role;

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Low priority.
    Low,
    /// Medium priority.
    Medium,
    /// High priority.
    High,
}

impl TaskPriority {
    /// Returns a stable storage value for this priority.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parses a storage value into a priority.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(AppError::Validation(format!(
                "unknown task priority '{value}'"
            ))),
        }
    }
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    Open,
    /// Being worked on.
    InProgress,
    /// Finished.
    Done,
}

impl TaskStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }

    /// Parses a storage value into a status.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(AppError::Validation(format!("unknown task status '{value}'"))),
        }
    }
}

/// A work item assigned to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    id: RecordId,
    owner_subject: String,
    owner_role: Option<Role>,
    title: String,
    detail: Option<String>,
    due_date: Option<NaiveDate>,
    priority: TaskPriority,
    status: TaskStatus,
}

impl TaskItem {
    /// Creates a validated task.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: RecordId,
        owner_subject: impl Into<String>,
        owner_role: Option<Role>,
        title: impl Into<String>,
        detail: Option<String>,
        due_date: Option<NaiveDate>,
        priority: TaskPriority,
        status: TaskStatus,
    ) -> AppResult<Self> {
        let owner_subject = owner_subject.into();
        if owner_subject.trim().is_empty() {
            return Err(AppError::Validation(
                "task owner must not be empty".to_owned(),
            ));
        }

        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(AppError::Validation(
                "task title must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            id,
            owner_subject,
            owner_role,
            title,
            detail: detail.and_then(|value| {
                let trimmed = value.trim().to_owned();
                (!trimmed.is_empty()).then_some(trimmed)
            }),
            due_date,
            priority,
            status,
        })
    }

    /// Returns the record identifier.
    #[must_use]
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the optional detail text.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Returns the due date, when set.
    #[must_use]
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the priority.
    #[must_use]
    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Replaces the mutable portion of the task.
    pub fn update(
        &mut self,
        title: impl Into<String>,
        detail: Option<String>,
        due_date: Option<NaiveDate>,
        priority: TaskPriority,
        status: TaskStatus,
    ) -> AppResult<()> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(AppError::Validation(
                "task title must not be empty".to_owned(),
            ));
        }

        self.title = title;
        self.detail = detail.and_then(|value| {
            let trimmed = value.trim().to_owned();
            (!trimmed.is_empty()).then_some(trimmed)
        });
        self.due_date = due_date;
        self.priority = priority;
        self.status = status;
        Ok(())
    }
}

impl OwnedRecord for TaskItem {
    fn owner_subject(&self) -> &str {
        self.owner_subject.as_str()
    }

    fn owner_role(&self) -> Option<Role> {
        self.owner_role
    }
}

#[cfg(test)]
mod tests {
    use stafflow_core::RecordId;

    use super::{TaskItem, TaskPriority, TaskStatus};
    use crate::role::Role;

    #[test]
    fn empty_title_is_rejected() {
        let task = TaskItem::new(
            RecordId::new(),
            "u-emp-1",
            Some(Role::Employee),
            "  ",
            None,
            None,
            TaskPriority::Medium,
            TaskStatus::Open,
        );
        assert!(task.is_err());
    }
}
