use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use stafflow_application::{
    CredentialRecord, DirectoryRepository, PrincipalRecord, PrincipalRepository,
};
use stafflow_core::{AppError, AppResult};
use stafflow_domain::{EmployeeProfile, Role};

/// In-memory directory repository for tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryDirectoryRepository {
    profiles: RwLock<HashMap<String, StoredProfile>>,
}

#[derive(Debug, Clone)]
struct StoredProfile {
    profile: EmployeeProfile,
    password_hash: String,
}

impl InMemoryDirectoryRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl PrincipalRepository for InMemoryDirectoryRepository {
    async fn find_principal(&self, subject: &str) -> AppResult<Option<PrincipalRecord>> {
        let profiles = self.profiles.read().await;

        Ok(profiles.get(subject).map(|stored| PrincipalRecord {
            subject: stored.profile.subject().to_owned(),
            display_name: stored.profile.display_name().to_owned(),
            role: stored.profile.role().as_str().to_owned(),
            team_id: stored.profile.team_id().map(str::to_owned),
            active: stored.profile.is_active(),
        }))
    }
}

#[async_trait]
impl DirectoryRepository for InMemoryDirectoryRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<CredentialRecord>> {
        let profiles = self.profiles.read().await;

        Ok(profiles
            .values()
            .find(|stored| stored.profile.email().as_str() == email)
            .map(|stored| CredentialRecord {
                subject: stored.profile.subject().to_owned(),
                display_name: stored.profile.display_name().to_owned(),
                email: stored.profile.email().as_str().to_owned(),
                password_hash: Some(stored.password_hash.clone()),
                active: stored.profile.is_active(),
            }))
    }

    async fn find_profile(&self, subject: &str) -> AppResult<Option<EmployeeProfile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(subject).map(|stored| stored.profile.clone()))
    }

    async fn list_profiles(&self) -> AppResult<Vec<EmployeeProfile>> {
        let profiles = self.profiles.read().await;

        let mut values: Vec<EmployeeProfile> = profiles
            .values()
            .map(|stored| stored.profile.clone())
            .collect();
        values.sort_by(|left, right| left.display_name().cmp(right.display_name()));
        Ok(values)
    }

    async fn insert_profile(
        &self,
        profile: &EmployeeProfile,
        password_hash: &str,
    ) -> AppResult<()> {
        let mut profiles = self.profiles.write().await;

        if profiles.contains_key(profile.subject()) {
            return Err(AppError::Conflict(format!(
                "a profile with subject '{}' already exists",
                profile.subject()
            )));
        }

        if profiles
            .values()
            .any(|stored| stored.profile.email() == profile.email())
        {
            return Err(AppError::Conflict(format!(
                "a profile with email '{}' already exists",
                profile.email().as_str()
            )));
        }

        profiles.insert(
            profile.subject().to_owned(),
            StoredProfile {
                profile: profile.clone(),
                password_hash: password_hash.to_owned(),
            },
        );
        Ok(())
    }

    async fn update_role(&self, subject: &str, role: Role) -> AppResult<()> {
        let mut profiles = self.profiles.write().await;

        let stored = profiles
            .get_mut(subject)
            .ok_or_else(|| AppError::NotFound(format!("profile '{subject}' does not exist")))?;
        stored.profile.change_role(role);
        Ok(())
    }

    async fn update_team(&self, subject: &str, team_id: Option<&str>) -> AppResult<()> {
        let mut profiles = self.profiles.write().await;

        let stored = profiles
            .get_mut(subject)
            .ok_or_else(|| AppError::NotFound(format!("profile '{subject}' does not exist")))?;
        stored.profile.change_team(team_id.map(str::to_owned));
        Ok(())
    }

    async fn set_active(&self, subject: &str, active: bool) -> AppResult<()> {
        let mut profiles = self.profiles.write().await;

        let stored = profiles
            .get_mut(subject)
            .ok_or_else(|| AppError::NotFound(format!("profile '{subject}' does not exist")))?;
        if !active {
            stored.profile.deactivate();
        }
        Ok(())
    }

    async fn count_profiles(&self) -> AppResult<i64> {
        let profiles = self.profiles.read().await;
        Ok(profiles.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use stafflow_application::{DirectoryRepository, PrincipalRepository};
    use stafflow_domain::{EmailAddress, EmployeeProfile, Role};

    use super::InMemoryDirectoryRepository;

    fn profile(subject: &str, email: &str) -> EmployeeProfile {
        let email = EmailAddress::new(email);
        let Ok(email) = email else {
            panic!("fixture email must parse");
        };
        let profile = EmployeeProfile::new(subject, subject, email, Role::Employee, None, true);
        let Ok(profile) = profile else {
            panic!("fixture profile must build");
        };
        profile
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repository = InMemoryDirectoryRepository::new();

        let first = repository
            .insert_profile(&profile("u-1", "same@stafflow.test"), "hash")
            .await;
        assert!(first.is_ok());

        let second = repository
            .insert_profile(&profile("u-2", "same@stafflow.test"), "hash")
            .await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn principal_projection_reflects_role_change() {
        let repository = InMemoryDirectoryRepository::new();
        let inserted = repository
            .insert_profile(&profile("u-1", "one@stafflow.test"), "hash")
            .await;
        assert!(inserted.is_ok());

        let changed = repository.update_role("u-1", Role::TeamLead).await;
        assert!(changed.is_ok());

        let principal = repository.find_principal("u-1").await;
        let Ok(Some(principal)) = principal else {
            panic!("principal must exist");
        };
        assert_eq!(principal.role, "team_lead");
    }
}
