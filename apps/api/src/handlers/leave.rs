use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use stafflow_application::{SubmitLeaveInput, UpdateLeaveInput};
use stafflow_core::UserIdentity;
use stafflow_domain::LeaveKind;

use crate::dto::{LeaveResponse, SubmitLeaveRequest, UpdateLeaveRequest};
use crate::error::ApiResult;
use crate::state::AppState;

use super::{parse_date, parse_record_id};

pub async fn list_leave_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<LeaveResponse>>> {
    let requests = state
        .leave_service
        .list(&identity)
        .await?
        .into_iter()
        .map(LeaveResponse::from)
        .collect();

    Ok(Json(requests))
}

pub async fn submit_leave_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<SubmitLeaveRequest>,
) -> ApiResult<(StatusCode, Json<LeaveResponse>)> {
    let input = SubmitLeaveInput {
        kind: LeaveKind::parse(payload.kind.as_str())?,
        start_date: parse_date(payload.start_date.as_str())?,
        end_date: parse_date(payload.end_date.as_str())?,
        reason: payload.reason,
    };

    let request = state.leave_service.submit(&identity, input).await?;
    Ok((StatusCode::CREATED, Json(LeaveResponse::from(request))))
}

pub async fn update_leave_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateLeaveRequest>,
) -> ApiResult<Json<LeaveResponse>> {
    let input = UpdateLeaveInput {
        kind: LeaveKind::parse(payload.kind.as_str())?,
        start_date: parse_date(payload.start_date.as_str())?,
        end_date: parse_date(payload.end_date.as_str())?,
        reason: payload.reason,
    };

    let request = state
        .leave_service
        .update(&identity, parse_record_id(id.as_str())?, input)
        .await?;
    Ok(Json(LeaveResponse::from(request)))
}

pub async fn approve_leave_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<String>,
) -> ApiResult<Json<LeaveResponse>> {
    let request = state
        .leave_service
        .approve(&identity, parse_record_id(id.as_str())?)
        .await?;
    Ok(Json(LeaveResponse::from(request)))
}

pub async fn reject_leave_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<String>,
) -> ApiResult<Json<LeaveResponse>> {
    let request = state
        .leave_service
        .reject(&identity, parse_record_id(id.as_str())?)
        .await?;
    Ok(Json(LeaveResponse::from(request)))
}
