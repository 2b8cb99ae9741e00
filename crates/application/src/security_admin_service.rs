use std::sync::Arc;

use async_trait::async_trait;
use stafflow_core::{AppResult, UserIdentity};
use stafflow_domain::{AuditAction, Permission, PermissionOverride, TeamMembership};

use crate::access_service::AccessService;
use crate::audit::{AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository};

/// Input payload for granting or revoking a permission override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOverrideInput {
    /// Subject the exception applies to.
    pub subject: String,
    /// Permission being granted or revoked.
    pub permission: Permission,
    /// `true` adds the permission, `false` removes it.
    pub grant: bool,
}

/// Repository port for override and team administration.
#[async_trait]
pub trait SecurityAdminRepository: Send + Sync {
    /// Lists every permission override row.
    async fn list_overrides(&self) -> AppResult<Vec<PermissionOverride>>;

    /// Writes an override row, replacing any row for the same subject and
    /// permission.
    async fn upsert_override(
        &self,
        subject: &str,
        permission: Permission,
        grant: bool,
    ) -> AppResult<PermissionOverride>;

    /// Removes an override row.
    async fn remove_override(&self, subject: &str, permission: Permission) -> AppResult<()>;

    /// Lists every team membership row.
    async fn list_memberships(&self) -> AppResult<Vec<TeamMembership>>;

    /// Writes a membership row, replacing any row for the same team and
    /// subject.
    async fn upsert_membership(&self, membership: &TeamMembership) -> AppResult<()>;

    /// Removes a membership row.
    async fn remove_membership(&self, team_id: &str, subject: &str) -> AppResult<()>;
}

/// Application service for security administration workflows.
#[derive(Clone)]
pub struct SecurityAdminService {
    access: AccessService,
    repository: Arc<dyn SecurityAdminRepository>,
    audit_log_repository: Arc<dyn AuditLogRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl SecurityAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        access: AccessService,
        repository: Arc<dyn SecurityAdminRepository>,
        audit_log_repository: Arc<dyn AuditLogRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            access,
            repository,
            audit_log_repository,
            audit_repository,
        }
    }

    /// Returns every permission override row.
    pub async fn list_overrides(
        &self,
        identity: &UserIdentity,
    ) -> AppResult<Vec<PermissionOverride>> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::SecurityOverrideManage)?;

        self.repository.list_overrides().await
    }

    /// Grants or revokes a permission for one user and emits an audit event.
    pub async fn upsert_override(
        &self,
        identity: &UserIdentity,
        input: UpsertOverrideInput,
    ) -> AppResult<PermissionOverride> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::SecurityOverrideManage)?;

        let row = self
            .repository
            .upsert_override(input.subject.as_str(), input.permission, input.grant)
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: context.subject().to_owned(),
                action: AuditAction::SecurityOverrideWritten,
                resource_type: "permission_override".to_owned(),
                resource_id: format!("{}:{}", row.subject, row.permission.as_str()),
                detail: Some(format!(
                    "{} '{}' for '{}'",
                    if row.grant { "granted" } else { "revoked" },
                    row.permission.as_str(),
                    row.subject
                )),
            })
            .await?;

        Ok(row)
    }

    /// Deletes an override row and emits an audit event.
    pub async fn remove_override(
        &self,
        identity: &UserIdentity,
        subject: &str,
        permission: Permission,
    ) -> AppResult<()> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::SecurityOverrideManage)?;

        self.repository.remove_override(subject, permission).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: context.subject().to_owned(),
                action: AuditAction::SecurityOverrideRemoved,
                resource_type: "permission_override".to_owned(),
                resource_id: format!("{subject}:{}", permission.as_str()),
                detail: Some(format!(
                    "removed override '{}' from '{subject}'",
                    permission.as_str()
                )),
            })
            .await
    }

    /// Returns every team membership row.
    pub async fn list_memberships(
        &self,
        identity: &UserIdentity,
    ) -> AppResult<Vec<TeamMembership>> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::SecurityTeamManage)?;

        self.repository.list_memberships().await
    }

    /// Writes a team membership row and emits an audit event.
    pub async fn upsert_membership(
        &self,
        identity: &UserIdentity,
        membership: TeamMembership,
    ) -> AppResult<()> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::SecurityTeamManage)?;

        self.repository.upsert_membership(&membership).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: context.subject().to_owned(),
                action: AuditAction::SecurityTeamMembershipWritten,
                resource_type: "team_membership".to_owned(),
                resource_id: format!("{}:{}", membership.team_id, membership.subject),
                detail: Some(format!(
                    "set '{}' as {} of team '{}'",
                    membership.subject,
                    membership.role.as_str(),
                    membership.team_id
                )),
            })
            .await
    }

    /// Removes a team membership row and emits an audit event.
    pub async fn remove_membership(
        &self,
        identity: &UserIdentity,
        team_id: &str,
        subject: &str,
    ) -> AppResult<()> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::SecurityTeamManage)?;

        self.repository.remove_membership(team_id, subject).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: context.subject().to_owned(),
                action: AuditAction::SecurityTeamMembershipRemoved,
                resource_type: "team_membership".to_owned(),
                resource_id: format!("{team_id}:{subject}"),
                detail: Some(format!("removed '{subject}' from team '{team_id}'")),
            })
            .await
    }

    /// Returns recent audit entries.
    pub async fn list_audit_log(
        &self,
        identity: &UserIdentity,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::SecurityAuditRead)?;

        self.audit_log_repository.list_recent_entries(query).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Utc;
    use stafflow_core::{AppError, AppResult, UserIdentity};
    use stafflow_domain::{Permission, PermissionOverride, Role, TeamMembership};
    use tokio::sync::Mutex;

    use crate::access_service::{
        AccessRepository, AccessService, PrincipalRecord, PrincipalRepository,
    };
    use crate::audit::{AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository};

    use super::{SecurityAdminRepository, SecurityAdminService, UpsertOverrideInput};

    struct FakePrincipalRepository {
        records: HashMap<String, PrincipalRecord>,
    }

    #[async_trait]
    impl PrincipalRepository for FakePrincipalRepository {
        async fn find_principal(&self, subject: &str) -> AppResult<Option<PrincipalRecord>> {
            Ok(self.records.get(subject).cloned())
        }
    }

    struct FakeAccessRepository;

    #[async_trait]
    impl AccessRepository for FakeAccessRepository {
        async fn list_overrides_for_subject(
            &self,
            _subject: &str,
        ) -> AppResult<Vec<PermissionOverride>> {
            Ok(Vec::new())
        }

        async fn list_team_memberships(&self) -> AppResult<Vec<TeamMembership>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct FakeSecurityAdminRepository {
        overrides: Mutex<Vec<PermissionOverride>>,
        memberships: Mutex<Vec<TeamMembership>>,
    }

    #[async_trait]
    impl SecurityAdminRepository for FakeSecurityAdminRepository {
        async fn list_overrides(&self) -> AppResult<Vec<PermissionOverride>> {
            Ok(self.overrides.lock().await.clone())
        }

        async fn upsert_override(
            &self,
            subject: &str,
            permission: Permission,
            grant: bool,
        ) -> AppResult<PermissionOverride> {
            let row = PermissionOverride {
                subject: subject.to_owned(),
                permission,
                grant,
                written_at: Utc::now(),
            };
            let mut overrides = self.overrides.lock().await;
            overrides.retain(|stored| {
                !(stored.subject == subject && stored.permission == permission)
            });
            overrides.push(row.clone());
            Ok(row)
        }

        async fn remove_override(&self, subject: &str, permission: Permission) -> AppResult<()> {
            self.overrides.lock().await.retain(|stored| {
                !(stored.subject == subject && stored.permission == permission)
            });
            Ok(())
        }

        async fn list_memberships(&self) -> AppResult<Vec<TeamMembership>> {
            Ok(self.memberships.lock().await.clone())
        }

        async fn upsert_membership(&self, membership: &TeamMembership) -> AppResult<()> {
            let mut memberships = self.memberships.lock().await;
            memberships.retain(|stored| {
                !(stored.team_id == membership.team_id && stored.subject == membership.subject)
            });
            memberships.push(membership.clone());
            Ok(())
        }

        async fn remove_membership(&self, team_id: &str, subject: &str) -> AppResult<()> {
            self.memberships
                .lock()
                .await
                .retain(|stored| !(stored.team_id == team_id && stored.subject == subject));
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeAuditLogRepository;

    #[async_trait]
    impl AuditLogRepository for FakeAuditLogRepository {
        async fn list_recent_entries(
            &self,
            _query: AuditLogQuery,
        ) -> AppResult<Vec<AuditLogEntry>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct FakeAuditRepository {
        events: Mutex<Vec<AuditEvent>>,
    }

    #[async_trait]
    impl AuditRepository for FakeAuditRepository {
        async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
            self.events.lock().await.push(event);
            Ok(())
        }
    }

    fn service(role: Role) -> (SecurityAdminService, Arc<FakeAuditRepository>) {
        let principals = FakePrincipalRepository {
            records: HashMap::from([(
                "actor".to_owned(),
                PrincipalRecord {
                    subject: "actor".to_owned(),
                    display_name: "actor".to_owned(),
                    role: role.as_str().to_owned(),
                    team_id: None,
                    active: true,
                },
            )]),
        };
        let access = AccessService::new(Arc::new(principals), Arc::new(FakeAccessRepository));
        let audit_repository = Arc::new(FakeAuditRepository::default());
        let service = SecurityAdminService::new(
            access,
            Arc::new(FakeSecurityAdminRepository::default()),
            Arc::new(FakeAuditLogRepository),
            audit_repository.clone(),
        );
        (service, audit_repository)
    }

    fn identity() -> UserIdentity {
        UserIdentity::new("actor", "actor", None)
    }

    #[tokio::test]
    async fn override_write_requires_admin() {
        let (service, _) = service(Role::SubAdmin);

        let denied = service
            .upsert_override(
                &identity(),
                UpsertOverrideInput {
                    subject: "emp-1".to_owned(),
                    permission: Permission::SecurityAuditRead,
                    grant: true,
                },
            )
            .await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn override_write_emits_audit_event() {
        let (service, audit_repository) = service(Role::Admin);

        let written = service
            .upsert_override(
                &identity(),
                UpsertOverrideInput {
                    subject: "emp-1".to_owned(),
                    permission: Permission::SecurityAuditRead,
                    grant: true,
                },
            )
            .await;
        assert!(written.is_ok());
        assert_eq!(audit_repository.events.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn membership_admin_round_trip() {
        let (service, _) = service(Role::Admin);

        let written = service
            .upsert_membership(
                &identity(),
                TeamMembership::new("t1", "emp-1", stafflow_domain::TeamRole::Member),
            )
            .await;
        assert!(written.is_ok());

        let listed = service.list_memberships(&identity()).await;
        let Ok(listed) = listed else {
            panic!("listing must succeed");
        };
        assert_eq!(listed.len(), 1);

        let removed = service.remove_membership(&identity(), "t1", "emp-1").await;
        assert!(removed.is_ok());
    }

    #[tokio::test]
    async fn audit_log_requires_audit_permission() {
        let (service, _) = service(Role::Employee);

        let denied = service
            .list_audit_log(
                &identity(),
                AuditLogQuery {
                    limit: 20,
                    offset: 0,
                    action: None,
                    subject: None,
                },
            )
            .await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
    }
}
