//! Client accounts and support tickets of the client/ticket hub.

use stafflow_core::{AppError, AppResult, RecordId};
use serde::{Deserialize, Serialize};

use crate::access::OwnedRecord;
use crate::employee::EmailAddress;
use crate::role::Role;

/// Relationship state of a client account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    /// Active engagement.
    Active,
    /// No current engagement.
    Dormant,
}

impl ClientStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Dormant => "dormant",
        }
    }

    /// Parses a storage value into a status.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "active" => Ok(Self::Active),
            "dormant" => Ok(Self::Dormant),
            _ => Err(AppError::Validation(format!(
                "unknown client status '{value}'"
            ))),
        }
    }
}

/// A client account owned by the business-development user managing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAccount {
    id: RecordId,
    owner_subject: String,
    owner_role: Option<Role>,
    company_name: String,
    contact_name: String,
    contact_email: EmailAddress,
    status: ClientStatus,
}

impl ClientAccount {
    /// Creates a validated client account.
    pub fn new(
        id: RecordId,
        owner_subject: impl Into<String>,
        owner_role: Option<Role>,
        company_name: impl Into<String>,
        contact_name: impl Into<String>,
        contact_email: EmailAddress,
        status: ClientStatus,
    ) -> AppResult<Self> {
        let owner_subject = owner_subject.into();
        if owner_subject.trim().is_empty() {
            return Err(AppError::Validation(
                "client owner must not be empty".to_owned(),
            ));
        }

        let company_name = company_name.into().trim().to_owned();
        if company_name.is_empty() {
            return Err(AppError::Validation(
                "company name must not be empty".to_owned(),
            ));
        }

        let contact_name = contact_name.into().trim().to_owned();
        if contact_name.is_empty() {
            return Err(AppError::Validation(
                "contact name must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            id,
            owner_subject,
            owner_role,
            company_name,
            contact_name,
            contact_email,
            status,
        })
    }

    /// Returns the record identifier.
    #[must_use]
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Returns the company name.
    #[must_use]
    pub fn company_name(&self) -> &str {
        self.company_name.as_str()
    }

    /// Returns the contact person name.
    #[must_use]
    pub fn contact_name(&self) -> &str {
        self.contact_name.as_str()
    }

    /// Returns the contact email.
    #[must_use]
    pub fn contact_email(&self) -> &EmailAddress {
        &self.contact_email
    }

    /// Returns the relationship state.
    #[must_use]
    pub fn status(&self) -> ClientStatus {
        self.status
    }

    /// Replaces the mutable portion of the account.
    pub fn update(
        &mut self,
        contact_name: impl Into<String>,
        contact_email: EmailAddress,
        status: ClientStatus,
    ) -> AppResult<()> {
        let contact_name = contact_name.into().trim().to_owned();
        if contact_name.is_empty() {
            return Err(AppError::Validation(
                "contact name must not be empty".to_owned(),
            ));
        }

        self.contact_name = contact_name;
        self.contact_email = contact_email;
        self.status = status;
        Ok(())
    }
}

impl OwnedRecord for ClientAccount {
    fn owner_subject(&self) -> &str {
        self.owner_subject.as_str()
    }

    fn owner_role(&self) -> Option<Role> {
        self.owner_role
    }
}

/// Severity of a support ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketSeverity {
    /// Cosmetic or question.
    Low,
    /// Default severity.
    Normal,
    /// Degraded service.
    High,
    /// Service down.
    Critical,
}

impl TicketSeverity {
    /// Returns a stable storage value for this severity.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Parses a storage value into a severity.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(AppError::Validation(format!(
                "unknown ticket severity '{value}'"
            ))),
        }
    }
}

/// Lifecycle state of a support ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Awaiting triage.
    Open,
    /// Being worked on.
    InProgress,
    /// Fixed, awaiting confirmation.
    Resolved,
    /// Closed out.
    Closed,
}

impl TicketStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    /// Parses a storage value into a status.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(AppError::Validation(format!(
                "unknown ticket status '{value}'"
            ))),
        }
    }
}

/// A support ticket filed against a client account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportTicket {
    id: RecordId,
    owner_subject: String,
    owner_role: Option<Role>,
    client_id: RecordId,
    subject_line: String,
    body: String,
    severity: TicketSeverity,
    status: TicketStatus,
}

impl SupportTicket {
    /// Creates a validated support ticket.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: RecordId,
        owner_subject: impl Into<String>,
        owner_role: Option<Role>,
        client_id: RecordId,
        subject_line: impl Into<String>,
        body: impl Into<String>,
        severity: TicketSeverity,
        status: TicketStatus,
    ) -> AppResult<Self> {
        let owner_subject = owner_subject.into();
        if owner_subject.trim().is_empty() {
            return Err(AppError::Validation(
                "ticket owner must not be empty".to_owned(),
            ));
        }

        let subject_line = subject_line.into().trim().to_owned();
        if subject_line.is_empty() {
            return Err(AppError::Validation(
                "ticket subject must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            id,
            owner_subject,
            owner_role,
            client_id,
            subject_line,
            body: body.into(),
            severity,
            status,
        })
    }

    /// Returns the record identifier.
    #[must_use]
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Returns the client the ticket belongs to.
    #[must_use]
    pub fn client_id(&self) -> RecordId {
        self.client_id
    }

    /// Returns the subject line.
    #[must_use]
    pub fn subject_line(&self) -> &str {
        self.subject_line.as_str()
    }

    /// Returns the ticket body.
    #[must_use]
    pub fn body(&self) -> &str {
        self.body.as_str()
    }

    /// Returns the severity.
    #[must_use]
    pub fn severity(&self) -> TicketSeverity {
        self.severity
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn status(&self) -> TicketStatus {
        self.status
    }

    /// Replaces the mutable portion of the ticket.
    pub fn update(&mut self, severity: TicketSeverity, status: TicketStatus, body: impl Into<String>) {
        self.severity = severity;
        self.status = status;
        self.body = body.into();
    }
}

impl OwnedRecord for SupportTicket {
    fn owner_subject(&self) -> &str {
        self.owner_subject.as_str()
    }

    fn owner_role(&self) -> Option<Role> {
        self.owner_role
    }
}
