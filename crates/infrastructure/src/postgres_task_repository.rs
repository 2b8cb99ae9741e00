use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use stafflow_application::TaskRepository;
use stafflow_core::{AppError, AppResult, RecordId};
use stafflow_domain::{OwnedRecord, Role, TaskItem, TaskPriority, TaskStatus};

/// PostgreSQL-backed repository for tasks.
#[derive(Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TaskRow {
    id: Uuid,
    subject: String,
    owner_role: Option<String>,
    title: String,
    detail: Option<String>,
    due_date: Option<NaiveDate>,
    priority: String,
    status: String,
}

impl TaskRow {
    fn into_domain(self) -> AppResult<TaskItem> {
        let priority = TaskPriority::parse(self.priority.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode stored task priority '{}': {error}",
                self.priority
            ))
        })?;
        let status = TaskStatus::parse(self.status.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode stored task status '{}': {error}",
                self.status
            ))
        })?;

        TaskItem::new(
            RecordId::from_uuid(self.id),
            self.subject,
            self.owner_role
                .and_then(|value| Role::from_str(value.as_str()).ok()),
            self.title,
            self.detail,
            self.due_date,
            priority,
            status,
        )
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT tasks.id, tasks.subject, profiles.role AS owner_role,
           tasks.title, tasks.detail, tasks.due_date, tasks.priority, tasks.status
    FROM tasks
    LEFT JOIN employee_profiles AS profiles ON profiles.subject = tasks.subject
"#;

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn insert(&self, task: &TaskItem) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tasks (id, subject, title, detail, due_date, priority, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(task.id().as_uuid())
        .bind(task.owner_subject())
        .bind(task.title())
        .bind(task.detail())
        .bind(task.due_date())
        .bind(task.priority().as_str())
        .bind(task.status().as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert task: {error}")))?;

        Ok(())
    }

    async fn update(&self, task: &TaskItem) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = $2, detail = $3, due_date = $4, priority = $5, status = $6
            WHERE id = $1
            "#,
        )
        .bind(task.id().as_uuid())
        .bind(task.title())
        .bind(task.detail())
        .bind(task.due_date())
        .bind(task.priority().as_str())
        .bind(task.status().as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update task: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "task '{}' does not exist",
                task.id()
            )));
        }

        Ok(())
    }

    async fn delete(&self, id: RecordId) -> AppResult<()> {
        sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete task: {error}")))?;

        Ok(())
    }

    async fn find(&self, id: RecordId) -> AppResult<Option<TaskItem>> {
        let row = sqlx::query_as::<_, TaskRow>(&format!("{SELECT_COLUMNS} WHERE tasks.id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to load task: {error}")))?;

        row.map(TaskRow::into_domain).transpose()
    }

    async fn list_all(&self) -> AppResult<Vec<TaskItem>> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "{SELECT_COLUMNS} ORDER BY tasks.due_date NULLS LAST, tasks.title"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list tasks: {error}")))?;

        rows.into_iter().map(TaskRow::into_domain).collect()
    }

    async fn owner_role(&self, subject: &str) -> AppResult<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT role FROM employee_profiles WHERE subject = $1")
                .bind(subject)
                .fetch_optional(&self.pool)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to load owner role: {error}"))
                })?;

        Ok(row.map(|(role,)| role))
    }
}
