use stafflow_core::{AppResult, UserIdentity};
use stafflow_domain::{NavEntry, visible_navigation};

use crate::access_service::AccessService;

/// Application service resolving the navigation tree for one caller.
#[derive(Clone)]
pub struct NavigationService {
    access: AccessService,
}

impl NavigationService {
    /// Creates a new service from the access service.
    #[must_use]
    pub fn new(access: AccessService) -> Self {
        Self { access }
    }

    /// Returns the navigation entries the caller may see, in render order.
    ///
    /// A denied context yields an empty tree; entries the caller is not
    /// entitled to are omitted, never rendered disabled.
    pub async fn entries(&self, identity: &UserIdentity) -> AppResult<Vec<&'static NavEntry>> {
        let context = self.access.context_for(identity).await?;
        Ok(visible_navigation(context.permissions()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use stafflow_core::{AppResult, UserIdentity};
    use stafflow_domain::{PermissionOverride, Role, TeamMembership};

    use crate::access_service::{
        AccessRepository, AccessService, PrincipalRecord, PrincipalRepository,
    };

    use super::NavigationService;

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

    fn service(profiles: Vec<(&str, Role)>) -> NavigationService {
        let principals = FakePrincipalRepository {
            records: profiles
                .into_iter()
                .map(|(subject, role)| {
                    (
                        subject.to_owned(),
                        PrincipalRecord {
                            subject: subject.to_owned(),
                            display_name: subject.to_owned(),
                            role: role.as_str().to_owned(),
                            team_id: None,
                            active: true,
                        },
                    )
                })
                .collect(),
        };
        NavigationService::new(AccessService::new(
            Arc::new(principals),
            Arc::new(FakeAccessRepository),
        ))
    }

    #[tokio::test]
    async fn unknown_subject_gets_empty_navigation() {
        let service = service(Vec::new());
        let entries = service
            .entries(&UserIdentity::new("ghost", "ghost", None))
            .await;
        assert!(matches!(entries.as_deref(), Ok([])));
    }

    #[tokio::test]
    async fn employee_navigation_is_trimmed() {
        let service = service(vec![("emp-1", Role::Employee)]);
        let entries = service
            .entries(&UserIdentity::new("emp-1", "emp-1", None))
            .await;
        let Ok(entries) = entries else {
            panic!("navigation must resolve");
        };
        let keys: Vec<&str> = entries.iter().map(|entry| entry.key()).collect();
        assert!(keys.contains(&"dashboard"));
        assert!(!keys.contains(&"security"));
    }
}
