use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use stafflow_application::{CreateTaskInput, UpdateTaskInput};
use stafflow_core::UserIdentity;
use stafflow_domain::{TaskPriority, TaskStatus};

use crate::dto::{CreateTaskRequest, TaskResponse, UpdateTaskRequest};
use crate::error::ApiResult;
use crate::state::AppState;

use super::{parse_date, parse_record_id};

pub async fn list_tasks_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = state
        .task_service
        .list(&identity)
        .await?
        .into_iter()
        .map(TaskResponse::from)
        .collect();

    Ok(Json(tasks))
}

pub async fn create_task_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let input = CreateTaskInput {
        owner_subject: payload.owner_subject,
        title: payload.title,
        detail: payload.detail,
        due_date: payload
            .due_date
            .as_deref()
            .map(parse_date)
            .transpose()?,
        priority: TaskPriority::parse(payload.priority.as_str())?,
    };

    let task = state.task_service.create(&identity, input).await?;
    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

pub async fn update_task_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let input = UpdateTaskInput {
        title: payload.title,
        detail: payload.detail,
        due_date: payload
            .due_date
            .as_deref()
            .map(parse_date)
            .transpose()?,
        priority: TaskPriority::parse(payload.priority.as_str())?,
        status: TaskStatus::parse(payload.status.as_str())?,
    };

    let task = state
        .task_service
        .update(&identity, parse_record_id(id.as_str())?, input)
        .await?;
    Ok(Json(TaskResponse::from(task)))
}

pub async fn delete_task_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .task_service
        .delete(&identity, parse_record_id(id.as_str())?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
