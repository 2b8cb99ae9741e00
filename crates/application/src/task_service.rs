use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use stafflow_core::{AppError, AppResult, RecordId, UserIdentity};
use stafflow_domain::{
    OwnedRecord, Permission, RecordClass, TaskItem, TaskPriority, TaskStatus,
};

use crate::access_service::AccessService;

/// Input payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskInput {
    /// Assignee subject; `None` assigns to the caller.
    pub owner_subject: Option<String>,
    /// Task title.
    pub title: String,
    /// Optional detail text.
    pub detail: Option<String>,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Priority.
    pub priority: TaskPriority,
}

/// Input payload for editing a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskInput {
    /// Task title.
    pub title: String,
    /// Optional detail text.
    pub detail: Option<String>,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Priority.
    pub priority: TaskPriority,
    /// Lifecycle state.
    pub status: TaskStatus,
}

/// Repository port for tasks.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persists a new task.
    async fn insert(&self, task: &TaskItem) -> AppResult<()>;

    /// Persists changes to an existing task.
    async fn update(&self, task: &TaskItem) -> AppResult<()>;

    /// Removes a task.
    async fn delete(&self, id: RecordId) -> AppResult<()>;

    /// Finds a task by id.
    async fn find(&self, id: RecordId) -> AppResult<Option<TaskItem>>;

    /// Lists every task.
    async fn list_all(&self) -> AppResult<Vec<TaskItem>>;

    /// Looks up the stored role of a subject, for owner tagging.
    async fn owner_role(&self, subject: &str) -> AppResult<Option<String>>;
}

/// Application service for task assignment and tracking.
#[derive(Clone)]
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
    access: AccessService,
}

impl TaskService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(repository: Arc<dyn TaskRepository>, access: AccessService) -> Self {
        Self { repository, access }
    }

    /// Lists the tasks visible to the caller.
    pub async fn list(&self, identity: &UserIdentity) -> AppResult<Vec<TaskItem>> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::TaskView)?;

        let tasks = self.repository.list_all().await?;
        Ok(context.visible(RecordClass::Task, tasks))
    }

    /// Creates a task for the caller or another user.
    pub async fn create(
        &self,
        identity: &UserIdentity,
        input: CreateTaskInput,
    ) -> AppResult<TaskItem> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::TaskView)?;

        let (owner_subject, owner_role) = match input.owner_subject {
            Some(owner) if owner != context.subject() => {
                let role = self
                    .repository
                    .owner_role(owner.as_str())
                    .await?
                    .and_then(|value| value.parse().ok());
                self.access.require_record_mutation(
                    &context,
                    RecordClass::Task,
                    owner.as_str(),
                    role,
                    Permission::TaskManage,
                )?;
                (owner, role)
            }
            _ => (context.subject().to_owned(), context.role()),
        };

        let task = TaskItem::new(
            RecordId::new(),
            owner_subject,
            owner_role,
            input.title,
            input.detail,
            input.due_date,
            input.priority,
            TaskStatus::Open,
        )?;

        self.repository.insert(&task).await?;
        Ok(task)
    }

    /// Edits a task.
    pub async fn update(
        &self,
        identity: &UserIdentity,
        id: RecordId,
        input: UpdateTaskInput,
    ) -> AppResult<TaskItem> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::TaskView)?;

        let mut task = self.find_required(id).await?;
        self.access.require_record_mutation(
            &context,
            RecordClass::Task,
            task.owner_subject(),
            task.owner_role(),
            Permission::TaskManage,
        )?;

        task.update(
            input.title,
            input.detail,
            input.due_date,
            input.priority,
            input.status,
        )?;
        self.repository.update(&task).await?;
        Ok(task)
    }

    /// Removes a task.
    pub async fn delete(&self, identity: &UserIdentity, id: RecordId) -> AppResult<()> {
        let context = self.access.context_for(identity).await?;
        self.access
            .require_permission(&context, Permission::TaskManage)?;

        let task = self.find_required(id).await?;
        self.access.require_record_mutation(
            &context,
            RecordClass::Task,
            task.owner_subject(),
            task.owner_role(),
            Permission::TaskManage,
        )?;

        self.repository.delete(id).await
    }

    async fn find_required(&self, id: RecordId) -> AppResult<TaskItem> {
        self.repository
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("task '{id}' does not exist")))
    }
}
