use stafflow_core::{AppError, AppResult, RecordId};
use serde::{Deserialize, Serialize};

use crate::access::OwnedRecord;
use crate::employee::EmailAddress;
use crate::role::Role;

/// Pipeline stage of a hiring lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStage {
    /// Freshly captured.
    New,
    /// First contact made.
    Contacted,
    /// In the interview loop.
    Interviewing,
    /// Offer extended.
    Offered,
    /// Offer accepted.
    Hired,
    /// Out of the pipeline.
    Dropped,
}

impl LeadStage {
    /// Returns a stable storage value for this stage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Interviewing => "interviewing",
            Self::Offered => "offered",
            Self::Hired => "hired",
            Self::Dropped => "dropped",
        }
    }

    /// Parses a storage value into a stage.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "new" => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "interviewing" => Ok(Self::Interviewing),
            "offered" => Ok(Self::Offered),
            "hired" => Ok(Self::Hired),
            "dropped" => Ok(Self::Dropped),
            _ => Err(AppError::Validation(format!("unknown lead stage '{value}'"))),
        }
    }
}

/// A hiring lead owned by the business-development user who captured it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiringLead {
    id: RecordId,
    owner_subject: String,
    owner_role: Option<Role>,
    candidate_name: String,
    contact_email: EmailAddress,
    source: Option<String>,
    stage: LeadStage,
}

impl HiringLead {
    /// Creates a validated hiring lead.
    pub fn new(
        id: RecordId,
        owner_subject: impl Into<String>,
        owner_role: Option<Role>,
        candidate_name: impl Into<String>,
        contact_email: EmailAddress,
        source: Option<String>,
        stage: LeadStage,
    ) -> AppResult<Self> {
        let owner_subject = owner_subject.into();
        if owner_subject.trim().is_empty() {
            return Err(AppError::Validation(
                "lead owner must not be empty".to_owned(),
            ));
        }

        let candidate_name = candidate_name.into().trim().to_owned();
        if candidate_name.is_empty() {
            return Err(AppError::Validation(
                "candidate name must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            id,
            owner_subject,
            owner_role,
            candidate_name,
            contact_email,
            source: source.and_then(|value| {
                let trimmed = value.trim().to_owned();
                (!trimmed.is_empty()).then_some(trimmed)
            }),
            stage,
        })
    }

    /// Returns the record identifier.
    #[must_use]
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Returns the candidate name.
    #[must_use]
    pub fn candidate_name(&self) -> &str {
        self.candidate_name.as_str()
    }

    /// Returns the candidate contact email.
    #[must_use]
    pub fn contact_email(&self) -> &EmailAddress {
        &self.contact_email
    }

    /// Returns where the lead came from, when recorded.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Returns the pipeline stage.
    #[must_use]
    pub fn stage(&self) -> LeadStage {
        self.stage
    }

    /// Moves the lead to another pipeline stage.
    pub fn move_to_stage(&mut self, stage: LeadStage) {
        self.stage = stage;
    }
}

impl OwnedRecord for HiringLead {
    fn owner_subject(&self) -> &str {
        self.owner_subject.as_str()
    }

    fn owner_role(&self) -> Option<Role> {
        self.owner_role
    }
}
