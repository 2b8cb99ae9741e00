//! Client/ticket hub services.

use std::sync::Arc;

use async_trait::async_trait;
use stafflow_core::{AppError, AppResult, RecordId, UserIdentity};
use stafflow_domain::{
    ClientAccount, ClientStatus, EmailAddress, OwnedRecord, Permission, RecordClass,
    SupportTicket, TicketSeverity, TicketStatus,
};

use crate::access_service::AccessService;

/// Input payload for creating a client account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateClientInput {
    /// Company name.
    pub company_name: String,
    /// Contact person name.
    pub contact_name: String,
    /// Contact email.
    pub contact_email: String,
}

/// Input payload for editing a client account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateClientInput {
    /// Contact person name.
    pub contact_name: String,
    /// Contact email.
    pub contact_email: String,
    /// Relationship state.
    pub status: ClientStatus,
}

/// Input payload for filing a support ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTicketInput {
    /// Client the ticket belongs to.
    pub client_id: RecordId,
    /// Subject line.
    pub subject_line: String,
    /// Ticket body.
    pub body: String,
    /// Severity.
    pub severity: TicketSeverity,
}

/// Input payload for editing a support ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTicketInput {
    /// Severity.
    pub severity: TicketSeverity,
    /// Lifecycle state.
    pub status: TicketStatus,
    /// Ticket body.
    pub body: String,
}

/// Repository port for the client/ticket hub.
#[async_trait]
pub trait CrmRepository: Send + Sync {
    /// Persists a new client account.
    async fn insert_client(&self, client: &ClientAccount) -> AppResult<()>;

    /// Persists changes to an existing client account.
    async fn update_client(&self, client: &ClientAccount) -> AppResult<()>;

    /// Finds a client account by id.
    async fn find_client(&self, id: RecordId) -> AppResult<Option<ClientAccount>>;

    /// Lists every client account.
    async fn list_clients(&self) -> AppResult<Vec<ClientAccount>>;

    /// Persists a new support ticket.
    async fn insert_ticket(&self, ticket: &SupportTicket) -> AppResult<()>;

    /// Persists changes to an existing support ticket.
    async fn update_ticket(&self, ticket: &SupportTicket) -> AppResult<()>;

    /// Finds a support ticket by id.
    async fn find_ticket(&self, id: RecordId) -> AppResult<Option<SupportTicket>>;

    /// Lists every support ticket.
    async fn list_tickets(&self) -> AppResult<Vec<SupportTicket>>;
}

/// Application service for client accounts and their support tickets.
#[derive(Clone)]
pub struct ClientService {
    repository: Arc<dyn CrmRepository>,
    access: AccessService,
}

impl ClientService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(repository: Arc<dyn CrmRepository>, access: AccessService) -> Self {
        Self { repository, access }
    }

    /// Lists the client accounts visible to the caller.
    pub async fn list_clients(&self, identity: &UserIdentity) -> AppResult<Vec<ClientAccount>> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::ClientView)?;

        let clients = self.repository.list_clients().await?;
        Ok(context.visible(RecordClass::Client, clients))
    }

    /// Creates a client account owned by the caller.
    pub async fn create_client(
        &self,
        identity: &UserIdentity,
        input: CreateClientInput,
    ) -> AppResult<ClientAccount> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::ClientManage)?;

        let client = ClientAccount::new(
            RecordId::new(),
            context.subject(),
            context.role(),
            input.company_name,
            input.contact_name,
            EmailAddress::new(input.contact_email)?,
            ClientStatus::Active,
        )?;

        self.repository.insert_client(&client).await?;
        Ok(client)
    }

    /// Edits a client account.
    pub async fn update_client(
        &self,
        identity: &UserIdentity,
        id: RecordId,
        input: UpdateClientInput,
    ) -> AppResult<ClientAccount> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::ClientManage)?;

        let mut client = self
            .repository
            .find_client(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("client '{id}' does not exist")))?;

        self.access.require_record_mutation(
            &context,
            RecordClass::Client,
            client.owner_subject(),
            client.owner_role(),
            Permission::ClientManage,
        )?;

        client.update(
            input.contact_name,
            EmailAddress::new(input.contact_email)?,
            input.status,
        )?;
        self.repository.update_client(&client).await?;
        Ok(client)
    }

    /// Lists the support tickets visible to the caller.
    pub async fn list_tickets(&self, identity: &UserIdentity) -> AppResult<Vec<SupportTicket>> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::TicketView)?;

        let tickets = self.repository.list_tickets().await?;
        Ok(context.visible(RecordClass::Ticket, tickets))
    }

    /// Files a support ticket against an existing client.
    pub async fn create_ticket(
        &self,
        identity: &UserIdentity,
        input: CreateTicketInput,
    ) -> AppResult<SupportTicket> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::TicketManage)?;

        // The ticket must reference a client the caller may see.
        let client = self
            .repository
            .find_client(input.client_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("client '{}' does not exist", input.client_id))
            })?;
        if context
            .visible(RecordClass::Client, vec![client])
            .is_empty()
        {
            return Err(AppError::Forbidden(format!(
                "subject '{}' is not allowed to perform this action",
                context.subject()
            )));
        }

        let ticket = SupportTicket::new(
            RecordId::new(),
            context.subject(),
            context.role(),
            input.client_id,
            input.subject_line,
            input.body,
            input.severity,
            TicketStatus::Open,
        )?;

        self.repository.insert_ticket(&ticket).await?;
        Ok(ticket)
    }

    /// Edits a support ticket.
    pub async fn update_ticket(
        &self,
        identity: &UserIdentity,
        id: RecordId,
        input: UpdateTicketInput,
    ) -> AppResult<SupportTicket> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::TicketManage)?;

        let mut ticket = self
            .repository
            .find_ticket(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("ticket '{id}' does not exist")))?;

        self.access.require_record_mutation(
            &context,
            RecordClass::Ticket,
            ticket.owner_subject(),
            ticket.owner_role(),
            Permission::TicketManage,
        )?;

        ticket.update(input.severity, input.status, input.body);
        self.repository.update_ticket(&ticket).await?;
        Ok(ticket)
    }
}
