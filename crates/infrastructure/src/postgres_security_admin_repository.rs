use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use stafflow_application::SecurityAdminRepository;
use stafflow_core::{AppError, AppResult};
use stafflow_domain::{Permission, PermissionOverride, TeamMembership, TeamRole};

/// PostgreSQL-backed repository for override and team administration.
#[derive(Clone)]
pub struct PostgresSecurityAdminRepository {
    pool: PgPool,
}

impl PostgresSecurityAdminRepository {
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

#[async_trait]
impl SecurityAdminRepository for PostgresSecurityAdminRepository {
    async fn list_overrides(&self) -> AppResult<Vec<PermissionOverride>> {
        let rows = sqlx::query_as::<_, OverrideRow>(
            r#"
            SELECT subject, permission, has_permission, written_at
            FROM permission_overrides
            ORDER BY subject, permission
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list overrides: {error}")))?;

        rows.into_iter().map(OverrideRow::into_domain).collect()
    }

    async fn upsert_override(
        &self,
        subject: &str,
        permission: Permission,
        grant: bool,
    ) -> AppResult<PermissionOverride> {
        let row = sqlx::query_as::<_, OverrideRow>(
            r#"
            INSERT INTO permission_overrides (subject, permission, has_permission, written_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (subject, permission)
                DO UPDATE SET has_permission = EXCLUDED.has_permission,
                              written_at = EXCLUDED.written_at
            RETURNING subject, permission, has_permission, written_at
            "#,
        )
        .bind(subject)
        .bind(permission.as_str())
        .bind(grant)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to write override: {error}")))?;

        row.into_domain()
    }

    async fn remove_override(&self, subject: &str, permission: Permission) -> AppResult<()> {
        let result = sqlx::query(
            "DELETE FROM permission_overrides WHERE subject = $1 AND permission = $2",
        )
        .bind(subject)
        .bind(permission.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove override: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "no override '{}' for subject '{subject}'",
                permission.as_str()
            )));
        }

        Ok(())
    }

    async fn list_memberships(&self) -> AppResult<Vec<TeamMembership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT team_id, subject, team_role
            FROM team_memberships
            ORDER BY team_id, subject
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list memberships: {error}")))?;

        rows.into_iter()
            .map(|row| {
                let role = TeamRole::from_str(row.team_role.as_str()).map_err(|error| {
                    AppError::Internal(format!(
                        "failed to decode stored team role '{}': {error}",
                        row.team_role
                    ))
                })?;
                Ok(TeamMembership {
                    team_id: row.team_id,
                    subject: row.subject,
                    role,
                })
            })
            .collect()
    }

    async fn upsert_membership(&self, membership: &TeamMembership) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO team_memberships (team_id, subject, team_role)
            VALUES ($1, $2, $3)
            ON CONFLICT (team_id, subject)
                DO UPDATE SET team_role = EXCLUDED.team_role
            "#,
        )
        .bind(membership.team_id.as_str())
        .bind(membership.subject.as_str())
        .bind(membership.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to write membership: {error}")))?;

        Ok(())
    }

    async fn remove_membership(&self, team_id: &str, subject: &str) -> AppResult<()> {
        let result =
            sqlx::query("DELETE FROM team_memberships WHERE team_id = $1 AND subject = $2")
                .bind(team_id)
                .bind(subject)
                .execute(&self.pool)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to remove membership: {error}"))
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "'{subject}' is not a member of team '{team_id}'"
            )));
        }

        Ok(())
    }
}
