use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use stafflow_core::{AppError, AppResult, RecordId, UserIdentity};
use stafflow_domain::{
    AuditAction, LeaveKind, LeaveRequest, OwnedRecord, Permission, RecordClass,
};

use crate::access_service::AccessService;
use crate::audit::{AuditEvent, AuditRepository};

/// Input payload for submitting a leave request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitLeaveInput {
    /// Leave category.
    pub kind: LeaveKind,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Stated reason.
    pub reason: String,
}

/// Input payload for editing a pending leave request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateLeaveInput {
    /// Leave category.
    pub kind: LeaveKind,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Stated reason.
    pub reason: String,
}

/// Repository port for leave requests.
#[async_trait]
pub trait LeaveRepository: Send + Sync {
    /// Persists a new leave request.
    async fn insert(&self, request: &LeaveRequest) -> AppResult<()>;

    /// Persists changes to an existing leave request.
    async fn update(&self, request: &LeaveRequest) -> AppResult<()>;

    /// Finds a leave request by id.
    async fn find(&self, id: RecordId) -> AppResult<Option<LeaveRequest>>;

    /// Lists every leave request.
    async fn list_all(&self) -> AppResult<Vec<LeaveRequest>>;
}

/// Application service for the leave request workflow.
#[derive(Clone)]
pub struct LeaveService {
    repository: Arc<dyn LeaveRepository>,
    access: AccessService,
    audit_repository: Arc<dyn AuditRepository>,
}

impl LeaveService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn LeaveRepository>,
        access: AccessService,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            repository,
            access,
            audit_repository,
        }
    }

    /// Lists the leave requests visible to the caller.
    pub async fn list(&self, identity: &UserIdentity) -> AppResult<Vec<LeaveRequest>> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::LeaveView)?;

        let records = self.repository.list_all().await?;
        Ok(context.visible(RecordClass::Leave, records))
    }

    /// Submits a leave request for the caller.
    pub async fn submit(
        &self,
        identity: &UserIdentity,
        input: SubmitLeaveInput,
    ) -> AppResult<LeaveRequest> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::LeaveView)?;

        let request = LeaveRequest::new(
            RecordId::new(),
            context.subject(),
            context.role(),
            input.kind,
            input.start_date,
            input.end_date,
            input.reason,
        )?;

        self.repository.insert(&request).await?;
        Ok(request)
    }

    /// Edits a pending leave request.
    pub async fn update(
        &self,
        identity: &UserIdentity,
        id: RecordId,
        input: UpdateLeaveInput,
    ) -> AppResult<LeaveRequest> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::LeaveView)?;

        let existing = self.find_required(id).await?;
        self.access.require_record_mutation(
            &context,
            RecordClass::Leave,
            existing.owner_subject(),
            existing.owner_role(),
            Permission::LeaveManage,
        )?;

        let updated = LeaveRequest::restore(
            existing.id(),
            existing.owner_subject(),
            existing.owner_role(),
            input.kind,
            input.start_date,
            input.end_date,
            input.reason,
            existing.status(),
            existing.decided_by().map(str::to_owned),
            existing.decided_at(),
        )?;

        self.repository.update(&updated).await?;
        Ok(updated)
    }

    /// Approves a pending leave request.
    pub async fn approve(&self, identity: &UserIdentity, id: RecordId) -> AppResult<LeaveRequest> {
        self.decide(identity, id, true).await
    }

    /// Rejects a pending leave request.
    pub async fn reject(&self, identity: &UserIdentity, id: RecordId) -> AppResult<LeaveRequest> {
        self.decide(identity, id, false).await
    }

    async fn decide(
        &self,
        identity: &UserIdentity,
        id: RecordId,
        approve: bool,
    ) -> AppResult<LeaveRequest> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::LeaveApprove)?;

        let mut request = self.find_required(id).await?;
        self.access.require_record_mutation(
            &context,
            RecordClass::Leave,
            request.owner_subject(),
            request.owner_role(),
            Permission::LeaveApprove,
        )?;

        let now = Utc::now();
        if approve {
            request.approve(context.subject(), now)?;
        } else {
            request.reject(context.subject(), now)?;
        }

        self.repository.update(&request).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: context.subject().to_owned(),
                action: if approve {
                    AuditAction::LeaveApproved
                } else {
                    AuditAction::LeaveRejected
                },
                resource_type: "leave_request".to_owned(),
                resource_id: request.id().to_string(),
                detail: Some(format!(
                    "{} leave request of '{}'",
                    if approve { "approved" } else { "rejected" },
                    request.owner_subject()
                )),
            })
            .await?;

        Ok(request)
    }

    async fn find_required(&self, id: RecordId) -> AppResult<LeaveRequest> {
        self.repository
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("leave request '{id}' does not exist")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use stafflow_core::{AppError, AppResult, RecordId, UserIdentity};
    use stafflow_domain::{
        LeaveKind, LeaveRequest, LeaveStatus, OwnedRecord, PermissionOverride, Role,
        TeamMembership, TeamRole,
    };
    use tokio::sync::Mutex;

    use crate::access_service::{
        AccessRepository, AccessService, PrincipalRecord, PrincipalRepository,
    };
    use crate::audit::{AuditEvent, AuditRepository};

    use super::{LeaveRepository, LeaveService, SubmitLeaveInput};

    struct FakePrincipalRepository {
        records: HashMap<String, PrincipalRecord>,
    }

    #[async_trait]
    impl PrincipalRepository for FakePrincipalRepository {
        async fn find_principal(&self, subject: &str) -> AppResult<Option<PrincipalRecord>> {
            Ok(self.records.get(subject).cloned())
        }
    }

    struct FakeAccessRepository {
        memberships: Vec<TeamMembership>,
    }

    #[async_trait]
    impl AccessRepository for FakeAccessRepository {
        async fn list_overrides_for_subject(
            &self,
            _subject: &str,
        ) -> AppResult<Vec<PermissionOverride>> {
            Ok(Vec::new())
        }

        async fn list_team_memberships(&self) -> AppResult<Vec<TeamMembership>> {
            Ok(self.memberships.clone())
        }
    }

    #[derive(Default)]
    struct FakeLeaveRepository {
        rows: Mutex<Vec<LeaveRequest>>,
    }

    #[async_trait]
    impl LeaveRepository for FakeLeaveRepository {
        async fn insert(&self, request: &LeaveRequest) -> AppResult<()> {
            self.rows.lock().await.push(request.clone());
            Ok(())
        }

        async fn update(&self, request: &LeaveRequest) -> AppResult<()> {
            let mut rows = self.rows.lock().await;
            if let Some(stored) = rows.iter_mut().find(|row| row.id() == request.id()) {
                *stored = request.clone();
            }
            Ok(())
        }

        async fn find(&self, id: RecordId) -> AppResult<Option<LeaveRequest>> {
            Ok(self
                .rows
                .lock()
                .await
                .iter()
                .find(|row| row.id() == id)
                .cloned())
        }

        async fn list_all(&self) -> AppResult<Vec<LeaveRequest>> {
            Ok(self.rows.lock().await.clone())
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

    fn principal_record(subject: &str, role: Role) -> PrincipalRecord {
        PrincipalRecord {
            subject: subject.to_owned(),
            display_name: subject.to_owned(),
            role: role.as_str().to_owned(),
            team_id: None,
            active: true,
        }
    }

    struct Fixture {
        service: LeaveService,
        repository: Arc<FakeLeaveRepository>,
        audit_repository: Arc<FakeAuditRepository>,
    }

    fn fixture(profiles: Vec<(&str, Role)>, memberships: Vec<TeamMembership>) -> Fixture {
        let principals = FakePrincipalRepository {
            records: profiles
                .into_iter()
                .map(|(subject, role)| (subject.to_owned(), principal_record(subject, role)))
                .collect(),
        };
        let access = AccessService::new(
            Arc::new(principals),
            Arc::new(FakeAccessRepository { memberships }),
        );
        let repository = Arc::new(FakeLeaveRepository::default());
        let audit_repository = Arc::new(FakeAuditRepository::default());
        let service = LeaveService::new(repository.clone(), access, audit_repository.clone());
        Fixture {
            service,
            repository,
            audit_repository,
        }
    }

    fn submit_input() -> SubmitLeaveInput {
        SubmitLeaveInput {
            kind: LeaveKind::Casual,
            start_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2025, 7, 2).unwrap_or_default(),
            reason: "family visit".to_owned(),
        }
    }

    async fn seed_request(fixture: &Fixture, owner: &str, owner_role: Role) -> RecordId {
        let request = LeaveRequest::new(
            RecordId::new(),
            owner,
            Some(owner_role),
            LeaveKind::Sick,
            NaiveDate::from_ymd_opt(2025, 7, 7).unwrap_or_default(),
            NaiveDate::from_ymd_opt(2025, 7, 8).unwrap_or_default(),
            "flu",
        );
        let Ok(request) = request else {
            panic!("fixture request must build");
        };
        let id = request.id();
        let insert = fixture.repository.insert(&request).await;
        assert!(insert.is_ok());
        id
    }

    fn identity(subject: &str) -> UserIdentity {
        UserIdentity::new(subject, subject, None)
    }

    #[tokio::test]
    async fn employee_sees_only_own_requests() {
        let fixture = fixture(
            vec![("emp-1", Role::Employee), ("emp-2", Role::Employee)],
            Vec::new(),
        );
        seed_request(&fixture, "emp-1", Role::Employee).await;
        seed_request(&fixture, "emp-2", Role::Employee).await;

        let listed = fixture.service.list(&identity("emp-1")).await;
        let Ok(listed) = listed else {
            panic!("listing must succeed");
        };
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].owner_subject(), "emp-1");
    }

    #[tokio::test]
    async fn team_lead_approval_is_scoped_to_led_team() {
        let fixture = fixture(
            vec![("lead-1", Role::TeamLead)],
            vec![
                TeamMembership::new("t1", "lead-1", TeamRole::Lead),
                TeamMembership::new("t1", "emp-1", TeamRole::Member),
            ],
        );
        let in_team = seed_request(&fixture, "emp-1", Role::Employee).await;
        let outside = seed_request(&fixture, "emp-9", Role::Employee).await;

        let approved = fixture.service.approve(&identity("lead-1"), in_team).await;
        assert!(approved.is_ok());

        let denied = fixture.service.approve(&identity("lead-1"), outside).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn sub_admin_cannot_approve_hr_request() {
        let fixture = fixture(vec![("sub-1", Role::SubAdmin)], Vec::new());
        let hr_request = seed_request(&fixture, "hr-1", Role::Hr).await;
        let employee_request = seed_request(&fixture, "emp-1", Role::Employee).await;

        let denied = fixture.service.approve(&identity("sub-1"), hr_request).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));

        let approved = fixture
            .service
            .approve(&identity("sub-1"), employee_request)
            .await;
        assert!(approved.is_ok());
    }

    #[tokio::test]
    async fn employee_cannot_approve_own_request() {
        let fixture = fixture(vec![("emp-1", Role::Employee)], Vec::new());
        let own = seed_request(&fixture, "emp-1", Role::Employee).await;

        let denied = fixture.service.approve(&identity("emp-1"), own).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn approval_writes_audit_event_and_settles_status() {
        let fixture = fixture(vec![("hr-1", Role::Hr)], Vec::new());
        let id = seed_request(&fixture, "emp-1", Role::Employee).await;

        let approved = fixture.service.approve(&identity("hr-1"), id).await;
        let Ok(approved) = approved else {
            panic!("approval must succeed");
        };
        assert_eq!(approved.status(), LeaveStatus::Approved);
        assert_eq!(approved.decided_by(), Some("hr-1"));
        assert_eq!(fixture.audit_repository.events.lock().await.len(), 1);

        // A second decision conflicts.
        let again = fixture.service.reject(&identity("hr-1"), id).await;
        assert!(matches!(again, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn submit_records_the_caller_as_owner() {
        let fixture = fixture(vec![("emp-1", Role::Employee)], Vec::new());

        let submitted = fixture
            .service
            .submit(&identity("emp-1"), submit_input())
            .await;
        let Ok(submitted) = submitted else {
            panic!("submission must succeed");
        };
        assert_eq!(submitted.owner_subject(), "emp-1");
        assert_eq!(submitted.status(), LeaveStatus::Pending);
    }
}
