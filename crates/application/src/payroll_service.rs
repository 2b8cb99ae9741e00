use std::sync::Arc;

use async_trait::async_trait;
use stafflow_core::{AppError, AppResult, RecordId, UserIdentity};
use stafflow_domain::{
    AuditAction, OwnedRecord, PaymentStatus, PayrollEntry, Permission, RecordClass,
};

use crate::access_service::AccessService;
use crate::audit::{AuditEvent, AuditRepository};

/// Input payload for creating a payroll entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePayrollInput {
    /// Owner subject.
    pub owner_subject: String,
    /// Payroll year.
    pub year: i32,
    /// Payroll month (1-12).
    pub month: u32,
    /// Base pay in minor units.
    pub base_pay_minor: i64,
    /// Allowances in minor units.
    pub allowances_minor: i64,
    /// Deductions in minor units.
    pub deductions_minor: i64,
}

/// Input payload for editing a payroll entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePayrollInput {
    /// Base pay in minor units.
    pub base_pay_minor: i64,
    /// Allowances in minor units.
    pub allowances_minor: i64,
    /// Deductions in minor units.
    pub deductions_minor: i64,
    /// Payment status.
    pub status: PaymentStatus,
}

/// Repository port for payroll entries.
#[async_trait]
pub trait PayrollRepository: Send + Sync {
    /// Persists a new payroll entry.
    async fn insert(&self, entry: &PayrollEntry) -> AppResult<()>;

    /// Persists changes to an existing payroll entry.
    async fn update(&self, entry: &PayrollEntry) -> AppResult<()>;

    /// Finds a payroll entry by id.
    async fn find(&self, id: RecordId) -> AppResult<Option<PayrollEntry>>;

    /// Lists every payroll entry.
    async fn list_all(&self) -> AppResult<Vec<PayrollEntry>>;

    /// Looks up the stored role of a subject, for owner tagging.
    async fn owner_role(&self, subject: &str) -> AppResult<Option<String>>;
}

/// Application service for payroll rows.
///
/// Amount semantics are deliberately opaque here; this service only
/// persists what an authorized user entered.
#[derive(Clone)]
pub struct PayrollService {
    repository: Arc<dyn PayrollRepository>,
    access: AccessService,
    audit_repository: Arc<dyn AuditRepository>,
}

impl PayrollService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn PayrollRepository>,
        access: AccessService,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            repository,
            access,
            audit_repository,
        }
    }

    /// Lists the payroll entries visible to the caller.
    pub async fn list(&self, identity: &UserIdentity) -> AppResult<Vec<PayrollEntry>> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::PayrollView)?;

        let entries = self.repository.list_all().await?;
        Ok(context.visible(RecordClass::Payroll, entries))
    }

    /// Creates a payroll entry.
    pub async fn create(
        &self,
        identity: &UserIdentity,
        input: CreatePayrollInput,
    ) -> AppResult<PayrollEntry> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::PayrollManage)?;

        let owner_role = self
            .repository
            .owner_role(input.owner_subject.as_str())
            .await?
            .and_then(|value| value.parse().ok());

        self.access.require_record_mutation(
            &context,
            RecordClass::Payroll,
            input.owner_subject.as_str(),
            owner_role,
            Permission::PayrollManage,
        )?;

        let entry = PayrollEntry::new(
            RecordId::new(),
            input.owner_subject,
            owner_role,
            input.year,
            input.month,
            input.base_pay_minor,
            input.allowances_minor,
            input.deductions_minor,
            PaymentStatus::Pending,
        )?;

        self.repository.insert(&entry).await?;
        self.append_written_event(context.subject(), &entry)
            .await?;
        Ok(entry)
    }

    /// Edits a payroll entry.
    pub async fn update(
        &self,
        identity: &UserIdentity,
        id: RecordId,
        input: UpdatePayrollInput,
    ) -> AppResult<PayrollEntry> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::PayrollManage)?;

        let mut entry = self
            .repository
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("payroll entry '{id}' does not exist")))?;

        self.access.require_record_mutation(
            &context,
            RecordClass::Payroll,
            entry.owner_subject(),
            entry.owner_role(),
            Permission::PayrollManage,
        )?;

        entry.update(
            input.base_pay_minor,
            input.allowances_minor,
            input.deductions_minor,
            input.status,
        )?;

        self.repository.update(&entry).await?;
        self.append_written_event(context.subject(), &entry)
            .await?;
        Ok(entry)
    }

    async fn append_written_event(&self, actor: &str, entry: &PayrollEntry) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.to_owned(),
                action: AuditAction::PayrollWritten,
                resource_type: "payroll_entry".to_owned(),
                resource_id: entry.id().to_string(),
                detail: Some(format!(
                    "wrote payroll entry of '{}' for {}-{:02}",
                    entry.owner_subject(),
                    entry.year(),
                    entry.month()
                )),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use stafflow_core::{AppError, AppResult, RecordId, UserIdentity};
    use stafflow_domain::{
        OwnedRecord, PaymentStatus, PayrollEntry, PermissionOverride, Role, TeamMembership,
    };
    use tokio::sync::Mutex;

    use crate::access_service::{
        AccessRepository, AccessService, PrincipalRecord, PrincipalRepository,
    };
    use crate::audit::{AuditEvent, AuditRepository};

    use super::{CreatePayrollInput, PayrollRepository, PayrollService};

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
    struct FakePayrollRepository {
        rows: Mutex<Vec<PayrollEntry>>,
        roles: HashMap<String, String>,
    }

    #[async_trait]
    impl PayrollRepository for FakePayrollRepository {
        async fn insert(&self, entry: &PayrollEntry) -> AppResult<()> {
            self.rows.lock().await.push(entry.clone());
            Ok(())
        }

        async fn update(&self, entry: &PayrollEntry) -> AppResult<()> {
            let mut rows = self.rows.lock().await;
            if let Some(stored) = rows.iter_mut().find(|row| row.id() == entry.id()) {
                *stored = entry.clone();
            }
            Ok(())
        }

        async fn find(&self, id: RecordId) -> AppResult<Option<PayrollEntry>> {
            Ok(self
                .rows
                .lock()
                .await
                .iter()
                .find(|row| row.id() == id)
                .cloned())
        }

        async fn list_all(&self) -> AppResult<Vec<PayrollEntry>> {
            Ok(self.rows.lock().await.clone())
        }

        async fn owner_role(&self, subject: &str) -> AppResult<Option<String>> {
            Ok(self.roles.get(subject).cloned())
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

    fn service(
        profiles: Vec<(&str, Role)>,
        owner_roles: Vec<(&str, Role)>,
    ) -> (PayrollService, Arc<FakePayrollRepository>) {
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
        let access = AccessService::new(Arc::new(principals), Arc::new(FakeAccessRepository));
        let repository = Arc::new(FakePayrollRepository {
            rows: Mutex::new(Vec::new()),
            roles: owner_roles
                .into_iter()
                .map(|(subject, role)| (subject.to_owned(), role.as_str().to_owned()))
                .collect(),
        });
        let service = PayrollService::new(
            repository.clone(),
            access,
            Arc::new(FakeAuditRepository::default()),
        );
        (service, repository)
    }

    async fn seed_entry(repository: &FakePayrollRepository, owner: &str, owner_role: Role) {
        let entry = PayrollEntry::new(
            RecordId::new(),
            owner,
            Some(owner_role),
            2025,
            6,
            500_000,
            0,
            0,
            PaymentStatus::Pending,
        );
        let Ok(entry) = entry else {
            panic!("fixture entry must build");
        };
        let inserted = repository.insert(&entry).await;
        assert!(inserted.is_ok());
    }

    #[tokio::test]
    async fn sub_admin_list_excludes_admin_owned_entries() {
        let (service, repository) = service(vec![("sub-1", Role::SubAdmin)], Vec::new());
        seed_entry(&repository, "admin-1", Role::Admin).await;
        seed_entry(&repository, "emp-1", Role::Employee).await;

        let listed = service.list(&UserIdentity::new("sub-1", "sub-1", None)).await;
        let Ok(listed) = listed else {
            panic!("listing must succeed");
        };
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].owner_subject(), "emp-1");
    }

    #[tokio::test]
    async fn sub_admin_cannot_write_admin_payroll() {
        let (service, _) = service(
            vec![("sub-1", Role::SubAdmin)],
            vec![("admin-1", Role::Admin)],
        );

        let denied = service
            .create(
                &UserIdentity::new("sub-1", "sub-1", None),
                CreatePayrollInput {
                    owner_subject: "admin-1".to_owned(),
                    year: 2025,
                    month: 6,
                    base_pay_minor: 1_000_000,
                    allowances_minor: 0,
                    deductions_minor: 0,
                },
            )
            .await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn employee_cannot_list_payroll_at_all() {
        let (service, repository) = service(vec![("emp-1", Role::Employee)], Vec::new());
        seed_entry(&repository, "emp-1", Role::Employee).await;

        let denied = service.list(&UserIdentity::new("emp-1", "emp-1", None)).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
    }
}
