use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use stafflow_application::{SubmitTimesheetInput, UpdateTimesheetInput};
use stafflow_core::UserIdentity;

use crate::dto::{SubmitTimesheetRequest, TimesheetResponse, UpdateTimesheetRequest};
use crate::error::ApiResult;
use crate::state::AppState;

use super::{parse_date, parse_record_id};

pub async fn list_timesheets_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<TimesheetResponse>>> {
    let entries = state
        .timesheet_service
        .list(&identity)
        .await?
        .into_iter()
        .map(TimesheetResponse::from)
        .collect();

    Ok(Json(entries))
}

pub async fn submit_timesheet_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<SubmitTimesheetRequest>,
) -> ApiResult<(StatusCode, Json<TimesheetResponse>)> {
    let input = SubmitTimesheetInput {
        work_date: parse_date(payload.work_date.as_str())?,
        project: payload.project,
        minutes: payload.minutes,
        note: payload.note,
    };

    let entry = state.timesheet_service.submit(&identity, input).await?;
    Ok((StatusCode::CREATED, Json(TimesheetResponse::from(entry))))
}

pub async fn update_timesheet_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTimesheetRequest>,
) -> ApiResult<Json<TimesheetResponse>> {
    let input = UpdateTimesheetInput {
        project: payload.project,
        minutes: payload.minutes,
        note: payload.note,
    };

    let entry = state
        .timesheet_service
        .update(&identity, parse_record_id(id.as_str())?, input)
        .await?;
    Ok(Json(TimesheetResponse::from(entry)))
}

pub async fn approve_timesheet_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<String>,
) -> ApiResult<Json<TimesheetResponse>> {
    let entry = state
        .timesheet_service
        .approve(&identity, parse_record_id(id.as_str())?)
        .await?;
    Ok(Json(TimesheetResponse::from(entry)))
}
