use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use stafflow_application::AccessRepository;
use stafflow_core::{AppError, AppResult};
use stafflow_domain::{Permission, PermissionOverride, TeamMembership, TeamRole};

/// PostgreSQL-backed repository for authorization inputs.
#[derive(Clone)]
pub struct PostgresAccessRepository {
    pool: PgPool,
}

impl PostgresAccessRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct OverrideRow {
    subject: String,
    permission: String,
    has_permission: bool,
    written_at: DateTime<Utc>,
}

impl OverrideRow {
    fn into_domain(self) -> AppResult<PermissionOverride> {
        let permission = Permission::from_str(self.permission.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode stored permission '{}': {error}",
                self.permission
            ))
        })?;

        Ok(PermissionOverride {
            subject: self.subject,
            permission,
            grant: self.has_permission,
            written_at: self.written_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct MembershipRow {
    team_id: String,
    subject: String,
    team_role: String,
}

impl MembershipRow {
    fn into_domain(self) -> AppResult<TeamMembership> {
        let role = TeamRole::from_str(self.team_role.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode stored team role '{}': {error}",
                self.team_role
            ))
        })?;

        Ok(TeamMembership {
            team_id: self.team_id,
            subject: self.subject,
            role,
        })
    }
}

#[async_trait]
impl AccessRepository for PostgresAccessRepository {
    async fn list_overrides_for_subject(
        &self,
        subject: &str,
    ) -> AppResult<Vec<PermissionOverride>> {
        let rows = sqlx::query_as::<_, OverrideRow>(
            r#"
            SELECT subject, permission, has_permission, written_at
            FROM permission_overrides
            WHERE subject = $1
            ORDER BY written_at
            "#,
        )
        .bind(subject)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load overrides: {error}")))?;

        rows.into_iter().map(OverrideRow::into_domain).collect()
    }

    async fn list_team_memberships(&self) -> AppResult<Vec<TeamMembership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT team_id, subject, team_role
            FROM team_memberships
            ORDER BY team_id, subject
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load team memberships: {error}")))?;

        rows.into_iter().map(MembershipRow::into_domain).collect()
    }
}
