use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use stafflow_core::UserIdentity;
use stafflow_domain::AttendanceStatus;

use stafflow_application::{RecordAttendanceInput, UpdateAttendanceInput};

use crate::dto::{AttendanceResponse, RecordAttendanceRequest, UpdateAttendanceRequest};
use crate::error::ApiResult;
use crate::state::AppState;

use super::{parse_date, parse_record_id, parse_time};

pub async fn list_attendance_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<AttendanceResponse>>> {
    let records = state
        .attendance_service
        .list(&identity)
        .await?
        .into_iter()
        .map(AttendanceResponse::from)
        .collect();

    Ok(Json(records))
}

pub async fn record_attendance_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<RecordAttendanceRequest>,
) -> ApiResult<(StatusCode, Json<AttendanceResponse>)> {
    let input = RecordAttendanceInput {
        owner_subject: payload.owner_subject,
        work_date: parse_date(payload.work_date.as_str())?,
        clock_in: parse_time(payload.clock_in.as_deref())?,
        clock_out: parse_time(payload.clock_out.as_deref())?,
        status: AttendanceStatus::parse(payload.status.as_str())?,
        note: payload.note,
    };

    let record = state.attendance_service.record(&identity, input).await?;
    Ok((StatusCode::CREATED, Json(AttendanceResponse::from(record))))
}

pub async fn update_attendance_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateAttendanceRequest>,
) -> ApiResult<Json<AttendanceResponse>> {
    let input = UpdateAttendanceInput {
        clock_in: parse_time(payload.clock_in.as_deref())?,
        clock_out: parse_time(payload.clock_out.as_deref())?,
        status: AttendanceStatus::parse(payload.status.as_str())?,
        note: payload.note,
    };

    let record = state
        .attendance_service
        .update(&identity, parse_record_id(id.as_str())?, input)
        .await?;
    Ok(Json(AttendanceResponse::from(record)))
}

pub async fn delete_attendance_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .attendance_service
        .delete(&identity, parse_record_id(id.as_str())?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
