use std::sync::Arc;

use async_trait::async_trait;
use stafflow_core::{AppError, AppResult, RecordId, UserIdentity};
use stafflow_domain::{
    EmailAddress, HiringLead, LeadStage, OwnedRecord, Permission, RecordClass,
};

use crate::access_service::AccessService;

/// Input payload for capturing a hiring lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLeadInput {
    /// Candidate name.
    pub candidate_name: String,
    /// Candidate contact email.
    pub contact_email: String,
    /// Where the lead came from.
    pub source: Option<String>,
}

/// Input payload for editing a hiring lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateLeadInput {
    /// Pipeline stage.
    pub stage: LeadStage,
}

/// Repository port for hiring leads.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Persists a new lead.
    async fn insert(&self, lead: &HiringLead) -> AppResult<()>;

    /// Persists changes to an existing lead.
    async fn update(&self, lead: &HiringLead) -> AppResult<()>;

    /// Finds a lead by id.
    async fn find(&self, id: RecordId) -> AppResult<Option<HiringLead>>;

    /// Lists every lead.
    async fn list_all(&self) -> AppResult<Vec<HiringLead>>;
}

/// Application service for the hiring lead pipeline.
#[derive(Clone)]
pub struct LeadService {
    repository: Arc<dyn LeadRepository>,
    access: AccessService,
}

impl LeadService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(repository: Arc<dyn LeadRepository>, access: AccessService) -> Self {
        Self { repository, access }
    }

    /// Lists the leads visible to the caller.
    pub async fn list(&self, identity: &UserIdentity) -> AppResult<Vec<HiringLead>> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::LeadView)?;

        let leads = self.repository.list_all().await?;
        Ok(context.visible(RecordClass::Lead, leads))
    }

    /// Captures a lead owned by the caller.
    pub async fn create(
        &self,
        identity: &UserIdentity,
        input: CreateLeadInput,
    ) -> AppResult<HiringLead> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::LeadManage)?;

        let lead = HiringLead::new(
            RecordId::new(),
            context.subject(),
            context.role(),
            input.candidate_name,
            EmailAddress::new(input.contact_email)?,
            input.source,
            LeadStage::New,
        )?;

        self.repository.insert(&lead).await?;
        Ok(lead)
    }

    /// Moves a lead to another pipeline stage.
    pub async fn update(
        &self,
        identity: &UserIdentity,
        id: RecordId,
        input: UpdateLeadInput,
    ) -> AppResult<HiringLead> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::LeadManage)?;

        let mut lead = self
            .repository
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("lead '{id}' does not exist")))?;

        self.access.require_record_mutation(
            &context,
            RecordClass::Lead,
            lead.owner_subject(),
            lead.owner_role(),
            Permission::LeadManage,
        )?;

        lead.move_to_stage(input.stage);
        self.repository.update(&lead).await?;
        Ok(lead)
    }
}
