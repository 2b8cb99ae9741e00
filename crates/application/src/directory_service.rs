use std::sync::Arc;

use async_trait::async_trait;
use stafflow_core::{AppError, AppResult, UserIdentity};
use stafflow_domain::{AuditAction, EmailAddress, EmployeeProfile, Permission, Role};
use uuid::Uuid;

use crate::access_service::AccessService;
use crate::audit::{AuditEvent, AuditRepository};

/// Stored login credential state for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Stable subject identifier.
    pub subject: String,
    /// Display name.
    pub display_name: String,
    /// Login email.
    pub email: String,
    /// Argon2 password hash, when a password is set.
    pub password_hash: Option<String>,
    /// Whether the profile may authenticate.
    pub active: bool,
}

/// Input payload for creating an employee profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProfileInput {
    /// Display name.
    pub display_name: String,
    /// Login email.
    pub email: String,
    /// Assigned role.
    pub role: Role,
    /// Primary team, when assigned.
    pub team_id: Option<String>,
    /// Initial plaintext password.
    pub password: String,
}

/// Password hashing port.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Repository port for employee profiles and credentials.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Finds credential state by login email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<CredentialRecord>>;

    /// Finds a profile by subject.
    async fn find_profile(&self, subject: &str) -> AppResult<Option<EmployeeProfile>>;

    /// Lists every profile.
    async fn list_profiles(&self) -> AppResult<Vec<EmployeeProfile>>;

    /// Persists a new profile with its password hash.
    async fn insert_profile(
        &self,
        profile: &EmployeeProfile,
        password_hash: &str,
    ) -> AppResult<()>;

    /// Replaces a profile's role.
    async fn update_role(&self, subject: &str, role: Role) -> AppResult<()>;

    /// Replaces a profile's team assignment.
    async fn update_team(&self, subject: &str, team_id: Option<&str>) -> AppResult<()>;

    /// Activates or deactivates a profile.
    async fn set_active(&self, subject: &str, active: bool) -> AppResult<()>;

    /// Counts stored profiles.
    async fn count_profiles(&self) -> AppResult<i64>;
}

/// Application service for the employee directory and authentication.
#[derive(Clone)]
pub struct DirectoryService {
    repository: Arc<dyn DirectoryRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    access: AccessService,
    audit_repository: Arc<dyn AuditRepository>,
}

impl DirectoryService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn DirectoryRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        access: AccessService,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            repository,
            password_hasher,
            access,
            audit_repository,
        }
    }

    /// Authenticates a user with email and password.
    ///
    /// Returns `None` with a uniform timing profile for any failure
    /// (unknown email, wrong password, deactivated profile) to prevent
    /// account enumeration.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Option<UserIdentity>> {
        let record = self.repository.find_by_email(email).await?;

        let Some(record) = record else {
            // Always hash to keep timing uniform when the user is unknown.
            let _ = self.password_hasher.hash_password(password);
            return Ok(None);
        };

        if !record.active {
            let _ = self.password_hasher.hash_password(password);
            return Ok(None);
        }

        let Some(ref stored_hash) = record.password_hash else {
            let _ = self.password_hasher.hash_password(password);
            return Ok(None);
        };

        if !self.password_hasher.verify_password(password, stored_hash)? {
            return Ok(None);
        }

        Ok(Some(UserIdentity::new(
            record.subject,
            record.display_name,
            Some(record.email),
        )))
    }

    /// Lists the employee directory.
    pub async fn list(&self, identity: &UserIdentity) -> AppResult<Vec<EmployeeProfile>> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::DirectoryView)?;

        self.repository.list_profiles().await
    }

    /// Creates an employee profile.
    pub async fn create(
        &self,
        identity: &UserIdentity,
        input: CreateProfileInput,
    ) -> AppResult<EmployeeProfile> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::DirectoryManage)?;
        self.ensure_may_assign_role(&context.role(), input.role, context.subject())?;

        let subject = format!("u-{}", Uuid::new_v4());
        let profile = EmployeeProfile::new(
            subject,
            input.display_name,
            EmailAddress::new(input.email)?,
            input.role,
            input.team_id,
            true,
        )?;

        let password_hash = self.password_hasher.hash_password(input.password.as_str())?;
        self.repository
            .insert_profile(&profile, password_hash.as_str())
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: context.subject().to_owned(),
                action: AuditAction::DirectoryProfileCreated,
                resource_type: "employee_profile".to_owned(),
                resource_id: profile.subject().to_owned(),
                detail: Some(format!(
                    "created profile '{}' with role '{}'",
                    profile.subject(),
                    profile.role().as_str()
                )),
            })
            .await?;

        Ok(profile)
    }

    /// Changes an employee's role.
    pub async fn change_role(
        &self,
        identity: &UserIdentity,
        subject: &str,
        role: Role,
    ) -> AppResult<()> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::DirectoryManage)?;
        self.ensure_may_assign_role(&context.role(), role, context.subject())?;

        self.find_required(subject).await?;
        self.repository.update_role(subject, role).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: context.subject().to_owned(),
                action: AuditAction::DirectoryRoleChanged,
                resource_type: "employee_profile".to_owned(),
                resource_id: subject.to_owned(),
                detail: Some(format!("changed role of '{subject}' to '{}'", role.as_str())),
            })
            .await
    }

    /// Changes an employee's team assignment.
    pub async fn change_team(
        &self,
        identity: &UserIdentity,
        subject: &str,
        team_id: Option<String>,
    ) -> AppResult<()> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::DirectoryManage)?;

        self.find_required(subject).await?;
        self.repository
            .update_team(subject, team_id.as_deref())
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: context.subject().to_owned(),
                action: AuditAction::DirectoryTeamChanged,
                resource_type: "employee_profile".to_owned(),
                resource_id: subject.to_owned(),
                detail: Some(match team_id {
                    Some(team_id) => format!("assigned '{subject}' to team '{team_id}'"),
                    None => format!("cleared team assignment of '{subject}'"),
                }),
            })
            .await
    }

    /// Deactivates an employee profile.
    pub async fn deactivate(&self, identity: &UserIdentity, subject: &str) -> AppResult<()> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::DirectoryManage)?;

        if subject == context.subject() {
            return Err(AppError::Validation(
                "a profile cannot deactivate itself".to_owned(),
            ));
        }

        self.find_required(subject).await?;
        self.repository.set_active(subject, false).await
    }

    /// Creates the first Admin profile on an empty directory.
    ///
    /// Used by the bootstrap endpoint; refuses to run once any profile
    /// exists.
    pub async fn bootstrap_admin(
        &self,
        display_name: &str,
        email: &str,
        password: &str,
    ) -> AppResult<UserIdentity> {
        if self.repository.count_profiles().await? > 0 {
            return Err(AppError::Conflict(
                "directory is already bootstrapped".to_owned(),
            ));
        }

        let subject = format!("u-{}", Uuid::new_v4());
        let profile = EmployeeProfile::new(
            subject,
            display_name,
            EmailAddress::new(email)?,
            Role::Admin,
            None,
            true,
        )?;

        let password_hash = self.password_hasher.hash_password(password)?;
        self.repository
            .insert_profile(&profile, password_hash.as_str())
            .await?;

        Ok(UserIdentity::new(
            profile.subject(),
            profile.display_name(),
            Some(profile.email().as_str().to_owned()),
        ))
    }

    /// Only Admins may hand out the Admin or Sub-Admin roles.
    fn ensure_may_assign_role(
        &self,
        actor_role: &Option<Role>,
        assigned: Role,
        actor_subject: &str,
    ) -> AppResult<()> {
        let is_privileged = matches!(assigned, Role::Admin | Role::SubAdmin);
        if is_privileged && *actor_role != Some(Role::Admin) {
            return Err(AppError::Forbidden(format!(
                "subject '{actor_subject}' is not allowed to perform this action"
            )));
        }

        Ok(())
    }

    async fn find_required(&self, subject: &str) -> AppResult<EmployeeProfile> {
        self.repository
            .find_profile(subject)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile '{subject}' does not exist")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use stafflow_core::{AppError, AppResult, UserIdentity};
    use stafflow_domain::{
        EmployeeProfile, PermissionOverride, Role, TeamMembership,
    };
    use tokio::sync::Mutex;

    use crate::access_service::{
        AccessRepository, AccessService, PrincipalRecord, PrincipalRepository,
    };
    use crate::audit::{AuditEvent, AuditRepository};

    use super::{
        CreateProfileInput, CredentialRecord, DirectoryRepository, DirectoryService,
        PasswordHasher,
    };

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
    struct FakeDirectoryRepository {
        credentials: Mutex<Vec<CredentialRecord>>,
        profiles: Mutex<Vec<EmployeeProfile>>,
    }

    #[async_trait]
    impl DirectoryRepository for FakeDirectoryRepository {
        async fn find_by_email(&self, email: &str) -> AppResult<Option<CredentialRecord>> {
            Ok(self
                .credentials
                .lock()
                .await
                .iter()
                .find(|row| row.email == email)
                .cloned())
        }

        async fn find_profile(&self, subject: &str) -> AppResult<Option<EmployeeProfile>> {
            Ok(self
                .profiles
                .lock()
                .await
                .iter()
                .find(|row| row.subject() == subject)
                .cloned())
        }

        async fn list_profiles(&self) -> AppResult<Vec<EmployeeProfile>> {
            Ok(self.profiles.lock().await.clone())
        }

        async fn insert_profile(
            &self,
            profile: &EmployeeProfile,
            password_hash: &str,
        ) -> AppResult<()> {
            self.profiles.lock().await.push(profile.clone());
            self.credentials.lock().await.push(CredentialRecord {
                subject: profile.subject().to_owned(),
                display_name: profile.display_name().to_owned(),
                email: profile.email().as_str().to_owned(),
                password_hash: Some(password_hash.to_owned()),
                active: true,
            });
            Ok(())
        }

        async fn update_role(&self, subject: &str, role: Role) -> AppResult<()> {
            let mut profiles = self.profiles.lock().await;
            if let Some(profile) = profiles.iter_mut().find(|row| row.subject() == subject) {
                profile.change_role(role);
            }
            Ok(())
        }

        async fn update_team(&self, subject: &str, team_id: Option<&str>) -> AppResult<()> {
            let mut profiles = self.profiles.lock().await;
            if let Some(profile) = profiles.iter_mut().find(|row| row.subject() == subject) {
                profile.change_team(team_id.map(str::to_owned));
            }
            Ok(())
        }

        async fn set_active(&self, subject: &str, active: bool) -> AppResult<()> {
            if !active {
                let mut profiles = self.profiles.lock().await;
                if let Some(profile) = profiles.iter_mut().find(|row| row.subject() == subject) {
                    profile.deactivate();
                }
            }
            Ok(())
        }

        async fn count_profiles(&self) -> AppResult<i64> {
            Ok(self.profiles.lock().await.len() as i64)
        }
    }

    /// Reversible stand-in so tests stay fast; real hashing is covered by
    /// the infrastructure crate.
    struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash_password(&self, password: &str) -> AppResult<String> {
            Ok(format!("hashed:{password}"))
        }

        fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
            Ok(hash == format!("hashed:{password}"))
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

    fn service(actor_role: Role) -> (DirectoryService, Arc<FakeDirectoryRepository>) {
        let principals = FakePrincipalRepository {
            records: HashMap::from([(
                "actor".to_owned(),
                PrincipalRecord {
                    subject: "actor".to_owned(),
                    display_name: "actor".to_owned(),
                    role: actor_role.as_str().to_owned(),
                    team_id: None,
                    active: true,
                },
            )]),
        };
        let access = AccessService::new(Arc::new(principals), Arc::new(FakeAccessRepository));
        let repository = Arc::new(FakeDirectoryRepository::default());
        let service = DirectoryService::new(
            repository.clone(),
            Arc::new(PlainHasher),
            access,
            Arc::new(FakeAuditRepository::default()),
        );
        (service, repository)
    }

    fn identity() -> UserIdentity {
        UserIdentity::new("actor", "actor", None)
    }

    fn profile_input(role: Role) -> CreateProfileInput {
        CreateProfileInput {
            display_name: "New Person".to_owned(),
            email: "new@stafflow.test".to_owned(),
            role,
            team_id: None,
            password: "a-long-enough-password".to_owned(),
        }
    }

    #[tokio::test]
    async fn login_round_trip() {
        let (service, _) = service(Role::Admin);

        let created = service.create(&identity(), profile_input(Role::Employee)).await;
        assert!(created.is_ok());

        let authenticated = service
            .login("new@stafflow.test", "a-long-enough-password")
            .await;
        let Ok(authenticated) = authenticated else {
            panic!("login must not error");
        };
        assert!(authenticated.is_some());

        let failed = service.login("new@stafflow.test", "wrong-password").await;
        assert!(matches!(failed, Ok(None)));
    }

    #[tokio::test]
    async fn unknown_email_fails_generically() {
        let (service, _) = service(Role::Admin);
        let outcome = service.login("nobody@stafflow.test", "whatever").await;
        assert!(matches!(outcome, Ok(None)));
    }

    #[tokio::test]
    async fn hr_cannot_mint_admins() {
        let (service, _) = service(Role::Hr);

        let denied = service.create(&identity(), profile_input(Role::Admin)).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));

        // Regular roles remain assignable.
        let created = service.create(&identity(), profile_input(Role::Employee)).await;
        assert!(created.is_ok());
    }

    #[tokio::test]
    async fn bootstrap_runs_only_on_empty_directory() {
        let (service, _) = service(Role::Admin);

        let first = service
            .bootstrap_admin("Root Admin", "root@stafflow.test", "bootstrap-password")
            .await;
        assert!(first.is_ok());

        let second = service
            .bootstrap_admin("Root Admin", "root@stafflow.test", "bootstrap-password")
            .await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn self_deactivation_is_rejected() {
        let (service, _) = service(Role::Admin);
        let denied = service.deactivate(&identity(), "actor").await;
        assert!(matches!(denied, Err(AppError::Validation(_))));
    }
}
