use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use stafflow_core::{AppError, AppResult, RecordId, UserIdentity};
use stafflow_domain::{AuditAction, OwnedRecord, Permission, RecordClass, Timesheet};

use crate::access_service::AccessService;
use crate::audit::{AuditEvent, AuditRepository};

/// Input payload for submitting a timesheet entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTimesheetInput {
    /// Work day.
    pub work_date: NaiveDate,
    /// Project label.
    pub project: String,
    /// Booked minutes, quarter-hour granularity.
    pub minutes: u32,
    /// Optional note.
    pub note: Option<String>,
}

/// Input payload for editing a not-yet-approved timesheet entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTimesheetInput {
    /// Project label.
    pub project: String,
    /// Booked minutes, quarter-hour granularity.
    pub minutes: u32,
    /// Optional note.
    pub note: Option<String>,
}

/// Repository port for timesheet entries.
#[async_trait]
pub trait TimesheetRepository: Send + Sync {
    /// Persists a new timesheet entry.
    async fn insert(&self, entry: &Timesheet) -> AppResult<()>;

    /// Persists changes to an existing timesheet entry.
    async fn update(&self, entry: &Timesheet) -> AppResult<()>;

    /// Finds a timesheet entry by id.
    async fn find(&self, id: RecordId) -> AppResult<Option<Timesheet>>;

    /// Lists every timesheet entry.
    async fn list_all(&self) -> AppResult<Vec<Timesheet>>;
}

/// Application service for timesheet booking and approval.
#[derive(Clone)]
pub struct TimesheetService {
    repository: Arc<dyn TimesheetRepository>,
    access: AccessService,
    audit_repository: Arc<dyn AuditRepository>,
}

impl TimesheetService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn TimesheetRepository>,
        access: AccessService,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            repository,
            access,
            audit_repository,
        }
    }

    /// Lists the timesheet entries visible to the caller.
    pub async fn list(&self, identity: &UserIdentity) -> AppResult<Vec<Timesheet>> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::TimesheetView)?;

        let entries = self.repository.list_all().await?;
        Ok(context.visible(RecordClass::Timesheet, entries))
    }

    /// Submits a timesheet entry for the caller.
    pub async fn submit(
        &self,
        identity: &UserIdentity,
        input: SubmitTimesheetInput,
    ) -> AppResult<Timesheet> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::TimesheetView)?;

        let entry = Timesheet::new(
            RecordId::new(),
            context.subject(),
            context.role(),
            input.work_date,
            input.project,
            input.minutes,
            input.note,
        )?;

        self.repository.insert(&entry).await?;
        Ok(entry)
    }

    /// Edits a not-yet-approved timesheet entry.
    pub async fn update(
        &self,
        identity: &UserIdentity,
        id: RecordId,
        input: UpdateTimesheetInput,
    ) -> AppResult<Timesheet> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::TimesheetView)?;

        let mut entry = self.find_required(id).await?;
        self.access.require_record_mutation(
            &context,
            RecordClass::Timesheet,
            entry.owner_subject(),
            entry.owner_role(),
            Permission::TimesheetManage,
        )?;

        entry.update(input.project, input.minutes, input.note)?;
        self.repository.update(&entry).await?;
        Ok(entry)
    }

    /// Approves a submitted timesheet entry.
    pub async fn approve(&self, identity: &UserIdentity, id: RecordId) -> AppResult<Timesheet> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::TimesheetApprove)?;

        let mut entry = self.find_required(id).await?;
        self.access.require_record_mutation(
            &context,
            RecordClass::Timesheet,
            entry.owner_subject(),
            entry.owner_role(),
            Permission::TimesheetApprove,
        )?;

        entry.approve(context.subject())?;
        self.repository.update(&entry).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: context.subject().to_owned(),
                action: AuditAction::TimesheetApproved,
                resource_type: "timesheet".to_owned(),
                resource_id: entry.id().to_string(),
                detail: Some(format!(
                    "approved timesheet of '{}' on {}",
                    entry.owner_subject(),
                    entry.work_date()
                )),
            })
            .await?;

        Ok(entry)
    }

    async fn find_required(&self, id: RecordId) -> AppResult<Timesheet> {
        self.repository
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("timesheet '{id}' does not exist")))
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
        OwnedRecord, PermissionOverride, Role, TeamMembership, TeamRole, Timesheet,
        TimesheetStatus,
    };
    use tokio::sync::Mutex;

    use crate::access_service::{
        AccessRepository, AccessService, PrincipalRecord, PrincipalRepository,
    };
    use crate::audit::{AuditEvent, AuditRepository};

    use super::{TimesheetRepository, TimesheetService};

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
    struct FakeTimesheetRepository {
        rows: Mutex<Vec<Timesheet>>,
    }

    #[async_trait]
    impl TimesheetRepository for FakeTimesheetRepository {
        async fn insert(&self, entry: &Timesheet) -> AppResult<()> {
            self.rows.lock().await.push(entry.clone());
            Ok(())
        }

        async fn update(&self, entry: &Timesheet) -> AppResult<()> {
            let mut rows = self.rows.lock().await;
            if let Some(stored) = rows.iter_mut().find(|row| row.id() == entry.id()) {
                *stored = entry.clone();
            }
            Ok(())
        }

        async fn find(&self, id: RecordId) -> AppResult<Option<Timesheet>> {
            Ok(self
                .rows
                .lock()
                .await
                .iter()
                .find(|row| row.id() == id)
                .cloned())
        }

        async fn list_all(&self) -> AppResult<Vec<Timesheet>> {
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

    fn service(
        profiles: Vec<(&str, Role)>,
        memberships: Vec<TeamMembership>,
    ) -> (TimesheetService, Arc<FakeTimesheetRepository>) {
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
        let access = AccessService::new(
            Arc::new(principals),
            Arc::new(FakeAccessRepository { memberships }),
        );
        let repository = Arc::new(FakeTimesheetRepository::default());
        let service = TimesheetService::new(
            repository.clone(),
            access,
            Arc::new(FakeAuditRepository::default()),
        );
        (service, repository)
    }

    async fn seed(repository: &FakeTimesheetRepository, owner: &str, owner_role: Role) -> RecordId {
        let entry = Timesheet::new(
            RecordId::new(),
            owner,
            Some(owner_role),
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap_or_default(),
            "internal-tools",
            480,
            None,
        );
        let Ok(entry) = entry else {
            panic!("fixture timesheet must build");
        };
        let id = entry.id();
        let inserted = repository.insert(&entry).await;
        assert!(inserted.is_ok());
        id
    }

    #[tokio::test]
    async fn team_lead_approves_member_entry() {
        let (service, repository) = service(
            vec![("lead-1", Role::TeamLead)],
            vec![
                TeamMembership::new("t1", "lead-1", TeamRole::Lead),
                TeamMembership::new("t1", "emp-1", TeamRole::Member),
            ],
        );
        let id = seed(&repository, "emp-1", Role::Employee).await;

        let approved = service
            .approve(&UserIdentity::new("lead-1", "lead-1", None), id)
            .await;
        let Ok(approved) = approved else {
            panic!("approval must succeed");
        };
        assert_eq!(approved.status(), TimesheetStatus::Approved);
        assert_eq!(approved.approved_by(), Some("lead-1"));
    }

    #[tokio::test]
    async fn team_lead_cannot_approve_outside_team() {
        let (service, repository) = service(
            vec![("lead-1", Role::TeamLead)],
            vec![TeamMembership::new("t1", "lead-1", TeamRole::Lead)],
        );
        let id = seed(&repository, "emp-9", Role::Employee).await;

        let denied = service
            .approve(&UserIdentity::new("lead-1", "lead-1", None), id)
            .await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn owner_edits_are_blocked_after_approval() {
        let (service, repository) = service(vec![("hr-1", Role::Hr)], Vec::new());
        let id = seed(&repository, "hr-1", Role::Hr).await;

        let identity = UserIdentity::new("hr-1", "hr-1", None);
        let approved = service.approve(&identity, id).await;
        assert!(approved.is_ok());

        let edit = service
            .update(
                &identity,
                id,
                super::UpdateTimesheetInput {
                    project: "late-edit".to_owned(),
                    minutes: 240,
                    note: None,
                },
            )
            .await;
        assert!(matches!(edit, Err(AppError::Conflict(_))));
    }
}
