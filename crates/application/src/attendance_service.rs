use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use stafflow_core::{AppError, AppResult, RecordId, UserIdentity};
use stafflow_domain::{
    AttendanceRecord, AttendanceStatus, OwnedRecord, Permission, RecordClass,
};

use crate::access_service::AccessService;

/// Input payload for recording one attendance row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordAttendanceInput {
    /// Owner subject; `None` records for the caller.
    pub owner_subject: Option<String>,
    /// Work day.
    pub work_date: NaiveDate,
    /// Clock-in time.
    pub clock_in: Option<NaiveTime>,
    /// Clock-out time.
    pub clock_out: Option<NaiveTime>,
    /// Attendance status.
    pub status: AttendanceStatus,
    /// Optional note.
    pub note: Option<String>,
}

/// Input payload for editing an attendance row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateAttendanceInput {
    /// Clock-in time.
    pub clock_in: Option<NaiveTime>,
    /// Clock-out time.
    pub clock_out: Option<NaiveTime>,
    /// Attendance status.
    pub status: AttendanceStatus,
    /// Optional note.
    pub note: Option<String>,
}

/// Repository port for attendance rows.
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Persists a new attendance row.
    async fn insert(&self, record: &AttendanceRecord) -> AppResult<()>;

    /// Persists changes to an existing attendance row.
    async fn update(&self, record: &AttendanceRecord) -> AppResult<()>;

    /// Removes an attendance row.
    async fn delete(&self, id: RecordId) -> AppResult<()>;

    /// Finds an attendance row by id.
    async fn find(&self, id: RecordId) -> AppResult<Option<AttendanceRecord>>;

    /// Lists every attendance row.
    async fn list_all(&self) -> AppResult<Vec<AttendanceRecord>>;

    /// Looks up the stored role of a subject, for owner tagging.
    async fn owner_role(&self, subject: &str) -> AppResult<Option<String>>;
}

/// Application service for attendance tracking.
#[derive(Clone)]
pub struct AttendanceService {
    repository: Arc<dyn AttendanceRepository>,
    access: AccessService,
}

impl AttendanceService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(repository: Arc<dyn AttendanceRepository>, access: AccessService) -> Self {
        Self { repository, access }
    }

    /// Lists the attendance rows visible to the caller.
    pub async fn list(&self, identity: &UserIdentity) -> AppResult<Vec<AttendanceRecord>> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::AttendanceView)?;

        let records = self.repository.list_all().await?;
        Ok(context.visible(RecordClass::Attendance, records))
    }

    /// Records one attendance row, for the caller or for another user.
    pub async fn record(
        &self,
        identity: &UserIdentity,
        input: RecordAttendanceInput,
    ) -> AppResult<AttendanceRecord> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::AttendanceView)?;

        let (owner_subject, owner_role) = match input.owner_subject {
            Some(owner) if owner != context.subject() => {
                let role = self
                    .repository
                    .owner_role(owner.as_str())
                    .await?
                    .and_then(|value| value.parse().ok());
                self.access.require_record_mutation(
                    &context,
                    RecordClass::Attendance,
                    owner.as_str(),
                    role,
                    Permission::AttendanceManage,
                )?;
                (owner, role)
            }
            _ => (context.subject().to_owned(), context.role()),
        };

        let record = AttendanceRecord::new(
            RecordId::new(),
            owner_subject,
            owner_role,
            input.work_date,
            input.clock_in,
            input.clock_out,
            input.status,
            input.note,
        )?;

        self.repository.insert(&record).await?;
        Ok(record)
    }

    /// Edits an attendance row.
    pub async fn update(
        &self,
        identity: &UserIdentity,
        id: RecordId,
        input: UpdateAttendanceInput,
    ) -> AppResult<AttendanceRecord> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::AttendanceView)?;

        let mut record = self.find_required(id).await?;
        self.access.require_record_mutation(
            &context,
            RecordClass::Attendance,
            record.owner_subject(),
            record.owner_role(),
            Permission::AttendanceManage,
        )?;

        record.update(input.clock_in, input.clock_out, input.status, input.note)?;
        self.repository.update(&record).await?;
        Ok(record)
    }

    /// Removes an attendance row.
    pub async fn delete(&self, identity: &UserIdentity, id: RecordId) -> AppResult<()> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::AttendanceManage)?;

        let record = self.find_required(id).await?;
        self.access.require_record_mutation(
            &context,
            RecordClass::Attendance,
            record.owner_subject(),
            record.owner_role(),
            Permission::AttendanceManage,
        )?;

        self.repository.delete(id).await
    }

    async fn find_required(&self, id: RecordId) -> AppResult<AttendanceRecord> {
        self.repository
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("attendance record '{id}' does not exist")))
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
        AttendanceRecord, AttendanceStatus, OwnedRecord, PermissionOverride, Role, TeamMembership,
    };
    use tokio::sync::Mutex;

    use crate::access_service::{
        AccessRepository, AccessService, PrincipalRecord, PrincipalRepository,
    };

    use super::{AttendanceRepository, AttendanceService, RecordAttendanceInput};

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
    struct FakeAttendanceRepository {
        rows: Mutex<Vec<AttendanceRecord>>,
        roles: HashMap<String, String>,
    }

    #[async_trait]
    impl AttendanceRepository for FakeAttendanceRepository {
        async fn insert(&self, record: &AttendanceRecord) -> AppResult<()> {
            self.rows.lock().await.push(record.clone());
            Ok(())
        }

        async fn update(&self, record: &AttendanceRecord) -> AppResult<()> {
            let mut rows = self.rows.lock().await;
            if let Some(stored) = rows.iter_mut().find(|row| row.id() == record.id()) {
                *stored = record.clone();
            }
            Ok(())
        }

        async fn delete(&self, id: RecordId) -> AppResult<()> {
            self.rows.lock().await.retain(|row| row.id() != id);
            Ok(())
        }

        async fn find(&self, id: RecordId) -> AppResult<Option<AttendanceRecord>> {
            Ok(self
                .rows
                .lock()
                .await
                .iter()
                .find(|row| row.id() == id)
                .cloned())
        }

        async fn list_all(&self) -> AppResult<Vec<AttendanceRecord>> {
            Ok(self.rows.lock().await.clone())
        }

        async fn owner_role(&self, subject: &str) -> AppResult<Option<String>> {
            Ok(self.roles.get(subject).cloned())
        }
    }

    fn service(profiles: Vec<(&str, Role)>) -> (AttendanceService, Arc<FakeAttendanceRepository>) {
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
        let repository = Arc::new(FakeAttendanceRepository::default());
        (
            AttendanceService::new(repository.clone(), access),
            repository,
        )
    }

    fn input_for(owner: Option<&str>) -> RecordAttendanceInput {
        RecordAttendanceInput {
            owner_subject: owner.map(str::to_owned),
            work_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap_or_default(),
            clock_in: None,
            clock_out: None,
            status: AttendanceStatus::Present,
            note: None,
        }
    }

    #[tokio::test]
    async fn employee_records_own_attendance() {
        let (service, _) = service(vec![("emp-1", Role::Employee)]);
        let identity = UserIdentity::new("emp-1", "emp-1", None);

        let recorded = service.record(&identity, input_for(None)).await;
        let Ok(recorded) = recorded else {
            panic!("recording must succeed");
        };
        assert_eq!(recorded.owner_subject(), "emp-1");
    }

    #[tokio::test]
    async fn employee_cannot_record_for_someone_else() {
        let (service, _) = service(vec![("emp-1", Role::Employee)]);
        let identity = UserIdentity::new("emp-1", "emp-1", None);

        let denied = service.record(&identity, input_for(Some("emp-2"))).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn hr_records_for_employees() {
        let (service, _) = service(vec![("hr-1", Role::Hr)]);
        let identity = UserIdentity::new("hr-1", "hr-1", None);

        let recorded = service.record(&identity, input_for(Some("emp-2"))).await;
        assert!(recorded.is_ok());
    }

    #[tokio::test]
    async fn delete_requires_manage_permission() {
        let (service, repository) = service(vec![("emp-1", Role::Employee)]);
        let identity = UserIdentity::new("emp-1", "emp-1", None);

        let recorded = service.record(&identity, input_for(None)).await;
        let Ok(recorded) = recorded else {
            panic!("recording must succeed");
        };

        let denied = service.delete(&identity, recorded.id()).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
        assert_eq!(repository.rows.lock().await.len(), 1);
    }
}
