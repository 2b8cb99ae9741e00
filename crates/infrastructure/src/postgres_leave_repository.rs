use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use stafflow_application::LeaveRepository;
use stafflow_core::{AppError, AppResult, RecordId};
use stafflow_domain::{LeaveKind, LeaveRequest, LeaveStatus, OwnedRecord, Role};

/// PostgreSQL-backed repository for leave requests.
#[derive(Clone)]
pub struct PostgresLeaveRepository {
    pool: PgPool,
}

impl PostgresLeaveRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct LeaveRow {
    id: Uuid,
    subject: String,
    owner_role: Option<String>,
    kind: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: String,
    status: String,
    decided_by: Option<String>,
    decided_at: Option<DateTime<Utc>>,
}

impl LeaveRow {
    fn into_domain(self) -> AppResult<LeaveRequest> {
        let kind = LeaveKind::parse(self.kind.as_str()).map_err(|error| {
            AppError::Internal(format!("failed to decode stored leave kind '{}': {error}", self.kind))
        })?;
        let status = LeaveStatus::parse(self.status.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode stored leave status '{}': {error}",
                self.status
            ))
        })?;

        LeaveRequest::restore(
            RecordId::from_uuid(self.id),
            self.subject,
            self.owner_role
                .and_then(|value| Role::from_str(value.as_str()).ok()),
            kind,
            self.start_date,
            self.end_date,
            self.reason,
            status,
            self.decided_by,
            self.decided_at,
        )
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT requests.id, requests.subject, profiles.role AS owner_role,
           requests.kind, requests.start_date, requests.end_date,
           requests.reason, requests.status, requests.decided_by, requests.decided_at
    FROM leave_requests AS requests
    LEFT JOIN employee_profiles AS profiles ON profiles.subject = requests.subject
"#;

#[async_trait]
impl LeaveRepository for PostgresLeaveRepository {
    async fn insert(&self, request: &LeaveRequest) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO leave_requests
                (id, subject, kind, start_date, end_date, reason, status, decided_by, decided_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(request.id().as_uuid())
        .bind(request.owner_subject())
        .bind(request.kind().as_str())
        .bind(request.start_date())
        .bind(request.end_date())
        .bind(request.reason())
        .bind(request.status().as_str())
        .bind(request.decided_by())
        .bind(request.decided_at())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert leave request: {error}")))?;

        Ok(())
    }

    async fn update(&self, request: &LeaveRequest) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET kind = $2, start_date = $3, end_date = $4, reason = $5,
                status = $6, decided_by = $7, decided_at = $8
            WHERE id = $1
            "#,
        )
        .bind(request.id().as_uuid())
        .bind(request.kind().as_str())
        .bind(request.start_date())
        .bind(request.end_date())
        .bind(request.reason())
        .bind(request.status().as_str())
        .bind(request.decided_by())
        .bind(request.decided_at())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update leave request: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "leave request '{}' does not exist",
                request.id()
            )));
        }

        Ok(())
    }

    async fn find(&self, id: RecordId) -> AppResult<Option<LeaveRequest>> {
        let row = sqlx::query_as::<_, LeaveRow>(&format!(
            "{SELECT_COLUMNS} WHERE requests.id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load leave request: {error}")))?;

        row.map(LeaveRow::into_domain).transpose()
    }

    async fn list_all(&self) -> AppResult<Vec<LeaveRequest>> {
        let rows = sqlx::query_as::<_, LeaveRow>(&format!(
            "{SELECT_COLUMNS} ORDER BY requests.start_date DESC, requests.subject"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list leave requests: {error}")))?;

        rows.into_iter().map(LeaveRow::into_domain).collect()
    }
}
