use std::str::FromStr;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use stafflow_application::AttendanceRepository;
use stafflow_core::{AppError, AppResult, RecordId};
use stafflow_domain::{AttendanceRecord, AttendanceStatus, OwnedRecord, Role};

/// PostgreSQL-backed repository for attendance rows.
#[derive(Clone)]
pub struct PostgresAttendanceRepository {
    pool: PgPool,
}

impl PostgresAttendanceRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AttendanceRow {
    id: Uuid,
    subject: String,
    owner_role: Option<String>,
    work_date: NaiveDate,
    clock_in: Option<NaiveTime>,
    clock_out: Option<NaiveTime>,
    status: String,
    note: Option<String>,
}

impl AttendanceRow {
    fn into_domain(self) -> AppResult<AttendanceRecord> {
        let status = AttendanceStatus::parse(self.status.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode stored attendance status '{}': {error}",
                self.status
            ))
        })?;

        AttendanceRecord::new(
            RecordId::from_uuid(self.id),
            self.subject,
            // An unknown stored role degrades to untagged rather than
            // failing the whole listing.
            self.owner_role
                .and_then(|value| Role::from_str(value.as_str()).ok()),
            self.work_date,
            self.clock_in,
            self.clock_out,
            status,
            self.note,
        )
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT records.id, records.subject, profiles.role AS owner_role,
           records.work_date, records.clock_in, records.clock_out,
           records.status, records.note
    FROM attendance_records AS records
    LEFT JOIN employee_profiles AS profiles ON profiles.subject = records.subject
"#;

#[async_trait]
impl AttendanceRepository for PostgresAttendanceRepository {
    async fn insert(&self, record: &AttendanceRecord) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance_records
                (id, subject, work_date, clock_in, clock_out, status, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(record.id().as_uuid())
        .bind(record.owner_subject())
        .bind(record.work_date())
        .bind(record.clock_in())
        .bind(record.clock_out())
        .bind(record.status().as_str())
        .bind(record.note())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert attendance: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "attendance for '{}' on {} already exists",
                record.owner_subject(),
                record.work_date()
            )));
        }

        Ok(())
    }

    async fn update(&self, record: &AttendanceRecord) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE attendance_records
            SET clock_in = $2, clock_out = $3, status = $4, note = $5
            WHERE id = $1
            "#,
        )
        .bind(record.id().as_uuid())
        .bind(record.clock_in())
        .bind(record.clock_out())
        .bind(record.status().as_str())
        .bind(record.note())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update attendance: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "attendance record '{}' does not exist",
                record.id()
            )));
        }

        Ok(())
    }

    async fn delete(&self, id: RecordId) -> AppResult<()> {
        sqlx::query("DELETE FROM attendance_records WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete attendance: {error}")))?;

        Ok(())
    }

    async fn find(&self, id: RecordId) -> AppResult<Option<AttendanceRecord>> {
        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            "{SELECT_COLUMNS} WHERE records.id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load attendance: {error}")))?;

        row.map(AttendanceRow::into_domain).transpose()
    }

    async fn list_all(&self) -> AppResult<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            "{SELECT_COLUMNS} ORDER BY records.work_date DESC, records.subject"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list attendance: {error}")))?;

        rows.into_iter().map(AttendanceRow::into_domain).collect()
    }

    async fn owner_role(&self, subject: &str) -> AppResult<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT role FROM employee_profiles WHERE subject = $1")
                .bind(subject)
                .fetch_optional(&self.pool)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to load owner role: {error}"))
                })?;

        Ok(row.map(|(role,)| role))
    }
}
