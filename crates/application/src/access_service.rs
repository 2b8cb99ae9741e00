//! Request-scoped access context assembly and permission checks.
//!
//! This is the one place authorization I/O happens: override and team
//! membership rows are fetched once per request, folded into an
//! [`AccessContext`], and every later check within the request is a pure
//! computation over that context.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use stafflow_core::{AppError, AppResult, UserIdentity};
use stafflow_domain::{
    OwnedRecord, Permission, PermissionOverride, Principal, RecordClass, Role, TeamMembership,
    can_mutate, effective_permissions, visible_records,
};
use tracing::warn;

/// Raw stored principal state, before role validation.
///
/// The role is carried as its storage string so that an unknown value (for
/// example a role added to the database ahead of a deploy) degrades to a
/// fail-closed empty context instead of a hard error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalRecord {
    /// Stable subject identifier.
    pub subject: String,
    /// Display name.
    pub display_name: String,
    /// Stored role string.
    pub role: String,
    /// Primary team, when assigned.
    pub team_id: Option<String>,
    /// Whether the profile may act at all.
    pub active: bool,
}

/// Repository port for principal lookups.
#[async_trait]
pub trait PrincipalRepository: Send + Sync {
    /// Finds the stored principal state for a subject.
    async fn find_principal(&self, subject: &str) -> AppResult<Option<PrincipalRecord>>;
}

/// Repository port for authorization inputs.
#[async_trait]
pub trait AccessRepository: Send + Sync {
    /// Lists permission overrides applying to one subject.
    async fn list_overrides_for_subject(
        &self,
        subject: &str,
    ) -> AppResult<Vec<PermissionOverride>>;

    /// Lists every team membership row.
    async fn list_team_memberships(&self) -> AppResult<Vec<TeamMembership>>;
}

/// Resolved authorization state for one request.
///
/// A denied context (malformed principal, unknown role, missing or
/// deactivated profile) carries no principal, an empty permission set, and
/// filters every record list to nothing.
#[derive(Debug, Clone)]
pub struct AccessContext {
    subject: String,
    principal: Option<Principal>,
    permissions: BTreeSet<Permission>,
    memberships: Vec<TeamMembership>,
}

impl AccessContext {
    fn resolved(
        principal: Principal,
        permissions: BTreeSet<Permission>,
        memberships: Vec<TeamMembership>,
    ) -> Self {
        Self {
            subject: principal.subject().to_owned(),
            principal: Some(principal),
            permissions,
            memberships,
        }
    }

    /// Creates a context that denies everything for the given subject.
    #[must_use]
    pub fn denied(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            principal: None,
            permissions: BTreeSet::new(),
            memberships: Vec::new(),
        }
    }

    /// Returns the acting subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the resolved principal, when resolution succeeded.
    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Returns the acting principal's role, when resolved.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.principal.as_ref().map(Principal::role)
    }

    /// Returns the effective permission set.
    #[must_use]
    pub fn permissions(&self) -> &BTreeSet<Permission> {
        &self.permissions
    }

    /// Returns whether the context holds the given permission.
    #[must_use]
    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Returns whether the context holds any of the given permissions.
    #[must_use]
    pub fn has_any(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|permission| self.has(*permission))
    }

    /// Filters a record list down to what the caller may see.
    #[must_use]
    pub fn visible<R: OwnedRecord>(&self, class: RecordClass, records: Vec<R>) -> Vec<R> {
        match &self.principal {
            Some(principal) => visible_records(principal, class, records, &self.memberships),
            None => Vec::new(),
        }
    }

    /// Returns whether the caller may mutate the given record.
    #[must_use]
    pub fn may_mutate(
        &self,
        class: RecordClass,
        owner_subject: &str,
        owner_role: Option<Role>,
    ) -> bool {
        match &self.principal {
            Some(principal) => can_mutate(
                principal,
                class,
                owner_subject,
                owner_role,
                &self.memberships,
            ),
            None => false,
        }
    }
}

/// Application service assembling access contexts and enforcing checks.
#[derive(Clone)]
pub struct AccessService {
    principals: Arc<dyn PrincipalRepository>,
    repository: Arc<dyn AccessRepository>,
}

impl AccessService {
    /// Creates a new access service from repository implementations.
    #[must_use]
    pub fn new(
        principals: Arc<dyn PrincipalRepository>,
        repository: Arc<dyn AccessRepository>,
    ) -> Self {
        Self {
            principals,
            repository,
        }
    }

    /// Builds the access context for an authenticated identity.
    ///
    /// Any defect in the stored principal state (missing profile,
    /// deactivated profile, unknown role, blank subject) yields a denied
    /// context rather than an error: denying access safely always beats
    /// failing a page.
    pub async fn context_for(&self, identity: &UserIdentity) -> AppResult<AccessContext> {
        let subject = identity.subject();

        let Some(record) = self.principals.find_principal(subject).await? else {
            warn!(subject, "denying access: no stored profile for subject");
            return Ok(AccessContext::denied(subject));
        };

        if !record.active {
            warn!(subject, "denying access: profile is deactivated");
            return Ok(AccessContext::denied(subject));
        }

        let Ok(role) = Role::from_str(record.role.as_str()) else {
            warn!(subject, role = %record.role, "denying access: unknown role value");
            return Ok(AccessContext::denied(subject));
        };

        let principal = Principal::new(
            record.subject,
            record.display_name,
            role,
            record.team_id,
        );

        if !principal.is_well_formed() {
            warn!("denying access: malformed principal");
            return Ok(AccessContext::denied(subject));
        }

        let overrides = self
            .repository
            .list_overrides_for_subject(principal.subject())
            .await?;
        let memberships = self.repository.list_team_memberships().await?;
        let permissions = effective_permissions(&principal, &overrides);

        Ok(AccessContext::resolved(principal, permissions, memberships))
    }

    /// Ensures the context holds the required permission.
    ///
    /// The error message deliberately does not name the missing permission.
    pub fn require_permission(
        &self,
        context: &AccessContext,
        permission: Permission,
    ) -> AppResult<()> {
        if context.has(permission) {
            return Ok(());
        }

        Err(Self::forbidden(context))
    }

    /// Ensures the context holds any of the required permissions.
    pub fn require_any_permission(
        &self,
        context: &AccessContext,
        permissions: &[Permission],
    ) -> AppResult<()> {
        if context.has_any(permissions) {
            return Ok(());
        }

        Err(Self::forbidden(context))
    }

    /// Ensures the context may mutate a record of the given class.
    ///
    /// Ownership scope comes from the visibility invariant; mutating
    /// another user's record additionally requires the class's manage
    /// permission.
    pub fn require_record_mutation(
        &self,
        context: &AccessContext,
        class: RecordClass,
        owner_subject: &str,
        owner_role: Option<Role>,
        manage_permission: Permission,
    ) -> AppResult<()> {
        if !context.may_mutate(class, owner_subject, owner_role) {
            return Err(Self::forbidden(context));
        }

        if owner_subject != context.subject() {
            self.require_permission(context, manage_permission)?;
        }

        Ok(())
    }

    fn forbidden(context: &AccessContext) -> AppError {
        AppError::Forbidden(format!(
            "subject '{}' is not allowed to perform this action",
            context.subject()
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use stafflow_core::{AppResult, UserIdentity};
    use stafflow_domain::{Permission, PermissionOverride, TeamMembership};

    use super::{
        AccessContext, AccessRepository, AccessService, PrincipalRecord, PrincipalRepository,
    };

    #[derive(Default)]
    struct FakePrincipalRepository {
        records: HashMap<String, PrincipalRecord>,
    }

    #[async_trait]
    impl PrincipalRepository for FakePrincipalRepository {
        async fn find_principal(&self, subject: &str) -> AppResult<Option<PrincipalRecord>> {
            Ok(self.records.get(subject).cloned())
        }
    }

    #[derive(Default)]
    struct FakeAccessRepository {
        overrides: Vec<PermissionOverride>,
        memberships: Vec<TeamMembership>,
    }

    #[async_trait]
    impl AccessRepository for FakeAccessRepository {
        async fn list_overrides_for_subject(
            &self,
            subject: &str,
        ) -> AppResult<Vec<PermissionOverride>> {
            Ok(self
                .overrides
                .iter()
                .filter(|row| row.subject == subject)
                .cloned()
                .collect())
        }

        async fn list_team_memberships(&self) -> AppResult<Vec<TeamMembership>> {
            Ok(self.memberships.clone())
        }
    }

    fn record(subject: &str, role: &str, active: bool) -> PrincipalRecord {
        PrincipalRecord {
            subject: subject.to_owned(),
            display_name: subject.to_owned(),
            role: role.to_owned(),
            team_id: None,
            active,
        }
    }

    fn service_with(records: Vec<PrincipalRecord>) -> AccessService {
        let principals = FakePrincipalRepository {
            records: records
                .into_iter()
                .map(|row| (row.subject.clone(), row))
                .collect(),
        };
        AccessService::new(
            Arc::new(principals),
            Arc::new(FakeAccessRepository::default()),
        )
    }

    #[tokio::test]
    async fn context_carries_role_defaults() {
        let service = service_with(vec![record("alice", "hr", true)]);
        let identity = UserIdentity::new("alice", "Alice", None);

        let context = service.context_for(&identity).await;
        let Ok(context) = context else {
            panic!("context resolution must succeed");
        };
        assert!(context.has(Permission::PayrollView));
        assert!(!context.has(Permission::SecurityOverrideManage));
    }

    #[tokio::test]
    async fn missing_profile_yields_denied_context() {
        let service = service_with(Vec::new());
        let identity = UserIdentity::new("ghost", "Ghost", None);

        let context = service.context_for(&identity).await;
        let Ok(context) = context else {
            panic!("context resolution must succeed");
        };
        assert!(context.principal().is_none());
        assert!(context.permissions().is_empty());
    }

    #[tokio::test]
    async fn unknown_role_yields_denied_context() {
        let service = service_with(vec![record("bob", "superuser", true)]);
        let identity = UserIdentity::new("bob", "Bob", None);

        let context = service.context_for(&identity).await;
        let Ok(context) = context else {
            panic!("context resolution must succeed");
        };
        assert!(context.permissions().is_empty());
        for permission in Permission::all() {
            assert!(!context.has(*permission));
        }
    }

    #[tokio::test]
    async fn deactivated_profile_yields_denied_context() {
        let service = service_with(vec![record("carol", "admin", false)]);
        let identity = UserIdentity::new("carol", "Carol", None);

        let context = service.context_for(&identity).await;
        let Ok(context) = context else {
            panic!("context resolution must succeed");
        };
        assert!(context.permissions().is_empty());
    }

    #[tokio::test]
    async fn require_permission_is_generic_about_the_denial() {
        let service = service_with(vec![record("dave", "employee", true)]);
        let identity = UserIdentity::new("dave", "Dave", None);

        let context = service.context_for(&identity).await;
        let Ok(context) = context else {
            panic!("context resolution must succeed");
        };
        let denial = service.require_permission(&context, Permission::PayrollManage);
        let Err(error) = denial else {
            panic!("employee must not hold payroll manage");
        };
        assert!(!error.to_string().contains("payroll"));
    }

    #[test]
    fn denied_context_filters_everything() {
        let context = AccessContext::denied("nobody");
        assert!(!context.has_any(Permission::all()));
    }
}
