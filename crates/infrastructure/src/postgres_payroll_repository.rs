use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use stafflow_application::PayrollRepository;
use stafflow_core::{AppError, AppResult, RecordId};
use stafflow_domain::{OwnedRecord, PaymentStatus, PayrollEntry, Role};

/// PostgreSQL-backed repository for payroll entries.
#[derive(Clone)]
pub struct PostgresPayrollRepository {
    pool: PgPool,
}

impl PostgresPayrollRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PayrollRow {
    id: Uuid,
    subject: String,
    owner_role: Option<String>,
    year: i32,
    month: i32,
    base_pay_minor: i64,
    allowances_minor: i64,
    deductions_minor: i64,
    status: String,
}

impl PayrollRow {
    fn into_domain(self) -> AppResult<PayrollEntry> {
        let status = PaymentStatus::parse(self.status.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode stored payment status '{}': {error}",
                self.status
            ))
        })?;

        PayrollEntry::new(
            RecordId::from_uuid(self.id),
            self.subject,
            self.owner_role
                .and_then(|value| Role::from_str(value.as_str()).ok()),
            self.year,
            u32::try_from(self.month).map_err(|error| {
                AppError::Internal(format!("stored payroll month out of range: {error}"))
            })?,
            self.base_pay_minor,
            self.allowances_minor,
            self.deductions_minor,
            status,
        )
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT entries.id, entries.subject, profiles.role AS owner_role,
           entries.year, entries.month, entries.base_pay_minor,
           entries.allowances_minor, entries.deductions_minor, entries.status
    FROM payroll_entries AS entries
    LEFT JOIN employee_profiles AS profiles ON profiles.subject = entries.subject
"#;

#[async_trait]
impl PayrollRepository for PostgresPayrollRepository {
    async fn insert(&self, entry: &PayrollEntry) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO payroll_entries
                (id, subject, year, month, base_pay_minor, allowances_minor, deductions_minor, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(entry.id().as_uuid())
        .bind(entry.owner_subject())
        .bind(entry.year())
        .bind(i32::try_from(entry.month()).unwrap_or_default())
        .bind(entry.base_pay_minor())
        .bind(entry.allowances_minor())
        .bind(entry.deductions_minor())
        .bind(entry.status().as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert payroll entry: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "payroll for '{}' in {}-{:02} already exists",
                entry.owner_subject(),
                entry.year(),
                entry.month()
            )));
        }

        Ok(())
    }

    async fn update(&self, entry: &PayrollEntry) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE payroll_entries
            SET base_pay_minor = $2, allowances_minor = $3, deductions_minor = $4, status = $5
            WHERE id = $1
            "#,
        )
        .bind(entry.id().as_uuid())
        .bind(entry.base_pay_minor())
        .bind(entry.allowances_minor())
        .bind(entry.deductions_minor())
        .bind(entry.status().as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update payroll entry: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "payroll entry '{}' does not exist",
                entry.id()
            )));
        }

        Ok(())
    }

    async fn find(&self, id: RecordId) -> AppResult<Option<PayrollEntry>> {
        let row = sqlx::query_as::<_, PayrollRow>(&format!(
            "{SELECT_COLUMNS} WHERE entries.id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load payroll entry: {error}")))?;

        row.map(PayrollRow::into_domain).transpose()
    }

    async fn list_all(&self) -> AppResult<Vec<PayrollEntry>> {
        let rows = sqlx::query_as::<_, PayrollRow>(&format!(
            "{SELECT_COLUMNS} ORDER BY entries.year DESC, entries.month DESC, entries.subject"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list payroll entries: {error}")))?;

        rows.into_iter().map(PayrollRow::into_domain).collect()
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
