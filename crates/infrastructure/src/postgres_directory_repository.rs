use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use stafflow_application::{CredentialRecord, DirectoryRepository, PrincipalRecord, PrincipalRepository};
use stafflow_core::{AppError, AppResult};
use stafflow_domain::{EmailAddress, EmployeeProfile, Role};

/// PostgreSQL-backed repository for employee profiles and credentials.
#[derive(Clone)]
pub struct PostgresDirectoryRepository {
    pool: PgPool,
}

impl PostgresDirectoryRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    subject: String,
    display_name: String,
    email: String,
    role: String,
    team_id: Option<String>,
    active: bool,
}

impl ProfileRow {
    fn into_domain(self) -> AppResult<EmployeeProfile> {
        let role: Role = self.role.parse().map_err(|error| {
            AppError::Internal(format!(
                "failed to decode stored role '{}' for '{}': {error}",
                self.role, self.subject
            ))
        })?;

        EmployeeProfile::new(
            self.subject,
            self.display_name,
            EmailAddress::new(self.email)?,
            role,
            self.team_id,
            self.active,
        )
    }
}

#[derive(Debug, FromRow)]
struct CredentialRow {
    subject: String,
    display_name: String,
    email: String,
    password_hash: Option<String>,
    active: bool,
}

#[derive(Debug, FromRow)]
struct PrincipalRow {
    subject: String,
    display_name: String,
    role: String,
    team_id: Option<String>,
    active: bool,
}

#[async_trait]
impl PrincipalRepository for PostgresDirectoryRepository {
    async fn find_principal(&self, subject: &str) -> AppResult<Option<PrincipalRecord>> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT subject, display_name, role, team_id, active
            FROM employee_profiles
            WHERE subject = $1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load principal: {error}")))?;

        Ok(row.map(|row| PrincipalRecord {
            subject: row.subject,
            display_name: row.display_name,
            role: row.role,
            team_id: row.team_id,
            active: row.active,
        }))
    }
}

#[async_trait]
impl DirectoryRepository for PostgresDirectoryRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<CredentialRecord>> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT subject, display_name, email, password_hash, active
            FROM employee_profiles
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load credentials: {error}")))?;

        Ok(row.map(|row| CredentialRecord {
            subject: row.subject,
            display_name: row.display_name,
            email: row.email,
            password_hash: row.password_hash,
            active: row.active,
        }))
    }

    async fn find_profile(&self, subject: &str) -> AppResult<Option<EmployeeProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT subject, display_name, email, role, team_id, active
            FROM employee_profiles
            WHERE subject = $1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load profile: {error}")))?;

        row.map(ProfileRow::into_domain).transpose()
    }

    async fn list_profiles(&self) -> AppResult<Vec<EmployeeProfile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT subject, display_name, email, role, team_id, active
            FROM employee_profiles
            ORDER BY display_name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list profiles: {error}")))?;

        rows.into_iter().map(ProfileRow::into_domain).collect()
    }

    async fn insert_profile(
        &self,
        profile: &EmployeeProfile,
        password_hash: &str,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO employee_profiles
                (subject, display_name, email, password_hash, role, team_id, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(profile.subject())
        .bind(profile.display_name())
        .bind(profile.email().as_str())
        .bind(password_hash)
        .bind(profile.role().as_str())
        .bind(profile.team_id())
        .bind(profile.is_active())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert profile: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "a profile with subject '{}' or email '{}' already exists",
                profile.subject(),
                profile.email().as_str()
            )));
        }

        Ok(())
    }

    async fn update_role(&self, subject: &str, role: Role) -> AppResult<()> {
        self.update_field(
            subject,
            sqlx::query("UPDATE employee_profiles SET role = $2 WHERE subject = $1")
                .bind(subject)
                .bind(role.as_str()),
        )
        .await
    }

    async fn update_team(&self, subject: &str, team_id: Option<&str>) -> AppResult<()> {
        self.update_field(
            subject,
            sqlx::query("UPDATE employee_profiles SET team_id = $2 WHERE subject = $1")
                .bind(subject)
                .bind(team_id),
        )
        .await
    }

    async fn set_active(&self, subject: &str, active: bool) -> AppResult<()> {
        self.update_field(
            subject,
            sqlx::query("UPDATE employee_profiles SET active = $2 WHERE subject = $1")
                .bind(subject)
                .bind(active),
        )
        .await
    }

    async fn count_profiles(&self) -> AppResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM employee_profiles")
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to count profiles: {error}")))?;

        Ok(count.0)
    }
}

impl PostgresDirectoryRepository {
    async fn update_field(
        &self,
        subject: &str,
        query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> AppResult<()> {
        let result = query
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to update profile: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "profile '{subject}' does not exist"
            )));
        }

        Ok(())
    }
}
