use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use stafflow_application::LeadRepository;
use stafflow_core::{AppError, AppResult, RecordId};
use stafflow_domain::{EmailAddress, HiringLead, LeadStage, OwnedRecord, Role};

/// PostgreSQL-backed repository for hiring leads.
#[derive(Clone)]
pub struct PostgresLeadRepository {
    pool: PgPool,
}

impl PostgresLeadRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct LeadRow {
    id: Uuid,
    subject: String,
    owner_role: Option<String>,
    candidate_name: String,
    contact_email: String,
    source: Option<String>,
    stage: String,
}

impl LeadRow {
    fn into_domain(self) -> AppResult<HiringLead> {
        let stage = LeadStage::parse(self.stage.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode stored lead stage '{}': {error}",
                self.stage
            ))
        })?;

        HiringLead::new(
            RecordId::from_uuid(self.id),
            self.subject,
            self.owner_role
                .and_then(|value| Role::from_str(value.as_str()).ok()),
            self.candidate_name,
            EmailAddress::new(self.contact_email)?,
            self.source,
            stage,
        )
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT leads.id, leads.subject, profiles.role AS owner_role,
           leads.candidate_name, leads.contact_email, leads.source, leads.stage
    FROM hiring_leads AS leads
    LEFT JOIN employee_profiles AS profiles ON profiles.subject = leads.subject
"#;

#[async_trait]
impl LeadRepository for PostgresLeadRepository {
    async fn insert(&self, lead: &HiringLead) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO hiring_leads (id, subject, candidate_name, contact_email, source, stage)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(lead.id().as_uuid())
        .bind(lead.owner_subject())
        .bind(lead.candidate_name())
        .bind(lead.contact_email().as_str())
        .bind(lead.source())
        .bind(lead.stage().as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert lead: {error}")))?;

        Ok(())
    }

    async fn update(&self, lead: &HiringLead) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE hiring_leads
            SET candidate_name = $2, contact_email = $3, source = $4, stage = $5
            WHERE id = $1
            "#,
        )
        .bind(lead.id().as_uuid())
        .bind(lead.candidate_name())
        .bind(lead.contact_email().as_str())
        .bind(lead.source())
        .bind(lead.stage().as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update lead: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "lead '{}' does not exist",
                lead.id()
            )));
        }

        Ok(())
    }

    async fn find(&self, id: RecordId) -> AppResult<Option<HiringLead>> {
        let row = sqlx::query_as::<_, LeadRow>(&format!("{SELECT_COLUMNS} WHERE leads.id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to load lead: {error}")))?;

        row.map(LeadRow::into_domain).transpose()
    }

    async fn list_all(&self) -> AppResult<Vec<HiringLead>> {
        let rows = sqlx::query_as::<_, LeadRow>(&format!(
            "{SELECT_COLUMNS} ORDER BY leads.candidate_name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list leads: {error}")))?;

        rows.into_iter().map(LeadRow::into_domain).collect()
    }
}
