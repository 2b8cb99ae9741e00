use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use stafflow_application::TimesheetRepository;
use stafflow_core::{AppError, AppResult, RecordId};
use stafflow_domain::{OwnedRecord, Role, Timesheet, TimesheetStatus};

/// PostgreSQL-backed repository for timesheet entries.
#[derive(Clone)]
pub struct PostgresTimesheetRepository {
    pool: PgPool,
}

impl PostgresTimesheetRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TimesheetRow {
    id: Uuid,
    subject: String,
    owner_role: Option<String>,
    work_date: NaiveDate,
    project: String,
    minutes: i32,
    note: Option<String>,
    status: String,
    approved_by: Option<String>,
}

impl TimesheetRow {
    fn into_domain(self) -> AppResult<Timesheet> {
        let status = TimesheetStatus::parse(self.status.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode stored timesheet status '{}': {error}",
                self.status
            ))
        })?;

        Timesheet::restore(
            RecordId::from_uuid(self.id),
            self.subject,
            self.owner_role
                .and_then(|value| Role::from_str(value.as_str()).ok()),
            self.work_date,
            self.project,
            u32::try_from(self.minutes).map_err(|error| {
                AppError::Internal(format!("stored timesheet minutes out of range: {error}"))
            })?,
            self.note,
            status,
            self.approved_by,
        )
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT sheets.id, sheets.subject, profiles.role AS owner_role,
           sheets.work_date, sheets.project, sheets.minutes, sheets.note,
           sheets.status, sheets.approved_by
    FROM timesheets AS sheets
    LEFT JOIN employee_profiles AS profiles ON profiles.subject = sheets.subject
"#;

#[async_trait]
impl TimesheetRepository for PostgresTimesheetRepository {
    async fn insert(&self, entry: &Timesheet) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO timesheets
                (id, subject, work_date, project, minutes, note, status, approved_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id().as_uuid())
        .bind(entry.owner_subject())
        .bind(entry.work_date())
        .bind(entry.project())
        .bind(i32::try_from(entry.minutes()).unwrap_or_default())
        .bind(entry.note())
        .bind(entry.status().as_str())
        .bind(entry.approved_by())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert timesheet: {error}")))?;

        Ok(())
    }

    async fn update(&self, entry: &Timesheet) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE timesheets
            SET project = $2, minutes = $3, note = $4, status = $5, approved_by = $6
            WHERE id = $1
            "#,
        )
        .bind(entry.id().as_uuid())
        .bind(entry.project())
        .bind(i32::try_from(entry.minutes()).unwrap_or_default())
        .bind(entry.note())
        .bind(entry.status().as_str())
        .bind(entry.approved_by())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update timesheet: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "timesheet '{}' does not exist",
                entry.id()
            )));
        }

        Ok(())
    }

    async fn find(&self, id: RecordId) -> AppResult<Option<Timesheet>> {
        let row = sqlx::query_as::<_, TimesheetRow>(&format!(
            "{SELECT_COLUMNS} WHERE sheets.id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load timesheet: {error}")))?;

        row.map(TimesheetRow::into_domain).transpose()
    }

    async fn list_all(&self) -> AppResult<Vec<Timesheet>> {
        let rows = sqlx::query_as::<_, TimesheetRow>(&format!(
            "{SELECT_COLUMNS} ORDER BY sheets.work_date DESC, sheets.subject"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list timesheets: {error}")))?;

        rows.into_iter().map(TimesheetRow::into_domain).collect()
    }
}
