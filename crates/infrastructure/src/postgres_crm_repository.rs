use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use stafflow_application::CrmRepository;
use stafflow_core::{AppError, AppResult, RecordId};
use stafflow_domain::{
    ClientAccount, ClientStatus, EmailAddress, OwnedRecord, Role, SupportTicket, TicketSeverity,
    TicketStatus,
};

/// PostgreSQL-backed repository for the client/ticket hub.
#[derive(Clone)]
pub struct PostgresCrmRepository {
    pool: PgPool,
}

impl PostgresCrmRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ClientRow {
    id: Uuid,
    subject: String,
    owner_role: Option<String>,
    company_name: String,
    contact_name: String,
    contact_email: String,
    status: String,
}

impl ClientRow {
    fn into_domain(self) -> AppResult<ClientAccount> {
        let status = ClientStatus::parse(self.status.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode stored client status '{}': {error}",
                self.status
            ))
        })?;

        ClientAccount::new(
            RecordId::from_uuid(self.id),
            self.subject,
            self.owner_role
                .and_then(|value| Role::from_str(value.as_str()).ok()),
            self.company_name,
            self.contact_name,
            EmailAddress::new(self.contact_email)?,
            status,
        )
    }
}

#[derive(Debug, FromRow)]
struct TicketRow {
    id: Uuid,
    subject: String,
    owner_role: Option<String>,
    client_id: Uuid,
    subject_line: String,
    body: String,
    severity: String,
    status: String,
}

impl TicketRow {
    fn into_domain(self) -> AppResult<SupportTicket> {
        let severity = TicketSeverity::parse(self.severity.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode stored ticket severity '{}': {error}",
                self.severity
            ))
        })?;
        let status = TicketStatus::parse(self.status.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode stored ticket status '{}': {error}",
                self.status
            ))
        })?;

        SupportTicket::new(
            RecordId::from_uuid(self.id),
            self.subject,
            self.owner_role
                .and_then(|value| Role::from_str(value.as_str()).ok()),
            RecordId::from_uuid(self.client_id),
            self.subject_line,
            self.body,
            severity,
            status,
        )
    }
}

const CLIENT_COLUMNS: &str = r#"
    SELECT clients.id, clients.subject, profiles.role AS owner_role,
           clients.company_name, clients.contact_name, clients.contact_email, clients.status
    FROM client_accounts AS clients
    LEFT JOIN employee_profiles AS profiles ON profiles.subject = clients.subject
"#;

const TICKET_COLUMNS: &str = r#"
    SELECT tickets.id, tickets.subject, profiles.role AS owner_role,
           tickets.client_id, tickets.subject_line, tickets.body,
           tickets.severity, tickets.status
    FROM support_tickets AS tickets
    LEFT JOIN employee_profiles AS profiles ON profiles.subject = tickets.subject
"#;

#[async_trait]
impl CrmRepository for PostgresCrmRepository {
    async fn insert_client(&self, client: &ClientAccount) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO client_accounts
                (id, subject, company_name, contact_name, contact_email, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(client.id().as_uuid())
        .bind(client.owner_subject())
        .bind(client.company_name())
        .bind(client.contact_name())
        .bind(client.contact_email().as_str())
        .bind(client.status().as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert client: {error}")))?;

        Ok(())
    }

    async fn update_client(&self, client: &ClientAccount) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE client_accounts
            SET contact_name = $2, contact_email = $3, status = $4
            WHERE id = $1
            "#,
        )
        .bind(client.id().as_uuid())
        .bind(client.contact_name())
        .bind(client.contact_email().as_str())
        .bind(client.status().as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update client: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "client '{}' does not exist",
                client.id()
            )));
        }

        Ok(())
    }

    async fn find_client(&self, id: RecordId) -> AppResult<Option<ClientAccount>> {
        let row = sqlx::query_as::<_, ClientRow>(&format!("{CLIENT_COLUMNS} WHERE clients.id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to load client: {error}")))?;

        row.map(ClientRow::into_domain).transpose()
    }

    async fn list_clients(&self) -> AppResult<Vec<ClientAccount>> {
        let rows = sqlx::query_as::<_, ClientRow>(&format!(
            "{CLIENT_COLUMNS} ORDER BY clients.company_name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list clients: {error}")))?;

        rows.into_iter().map(ClientRow::into_domain).collect()
    }

    async fn insert_ticket(&self, ticket: &SupportTicket) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO support_tickets
                (id, subject, client_id, subject_line, body, severity, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(ticket.id().as_uuid())
        .bind(ticket.owner_subject())
        .bind(ticket.client_id().as_uuid())
        .bind(ticket.subject_line())
        .bind(ticket.body())
        .bind(ticket.severity().as_str())
        .bind(ticket.status().as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert ticket: {error}")))?;

        Ok(())
    }

    async fn update_ticket(&self, ticket: &SupportTicket) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE support_tickets
            SET body = $2, severity = $3, status = $4
            WHERE id = $1
            "#,
        )
        .bind(ticket.id().as_uuid())
        .bind(ticket.body())
        .bind(ticket.severity().as_str())
        .bind(ticket.status().as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update ticket: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "ticket '{}' does not exist",
                ticket.id()
            )));
        }

        Ok(())
    }

    async fn find_ticket(&self, id: RecordId) -> AppResult<Option<SupportTicket>> {
        let row = sqlx::query_as::<_, TicketRow>(&format!("{TICKET_COLUMNS} WHERE tickets.id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to load ticket: {error}")))?;

        row.map(TicketRow::into_domain).transpose()
    }

    async fn list_tickets(&self) -> AppResult<Vec<SupportTicket>> {
        let rows = sqlx::query_as::<_, TicketRow>(&format!(
            "{TICKET_COLUMNS} ORDER BY tickets.status, tickets.severity"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list tickets: {error}")))?;

        rows.into_iter().map(TicketRow::into_domain).collect()
    }
}
