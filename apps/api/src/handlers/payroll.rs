use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use stafflow_application::{CreatePayrollInput, UpdatePayrollInput};
use stafflow_core::UserIdentity;
use stafflow_domain::PaymentStatus;

use crate::dto::{CreatePayrollRequest, PayrollResponse, UpdatePayrollRequest};
use crate::error::ApiResult;
use crate::state::AppState;

use super::parse_record_id;

pub async fn list_payroll_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<PayrollResponse>>> {
    let entries = state
        .payroll_service
        .list(&identity)
        .await?
        .into_iter()
        .map(PayrollResponse::from)
        .collect();

    Ok(Json(entries))
}

pub async fn create_payroll_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<CreatePayrollRequest>,
) -> ApiResult<(StatusCode, Json<PayrollResponse>)> {
    let input = CreatePayrollInput {
        owner_subject: payload.owner_subject,
        year: payload.year,
        month: payload.month,
        base_pay_minor: payload.base_pay_minor,
        allowances_minor: payload.allowances_minor,
        deductions_minor: payload.deductions_minor,
    };

    let entry = state.payroll_service.create(&identity, input).await?;
    Ok((StatusCode::CREATED, Json(PayrollResponse::from(entry))))
}

pub async fn update_payroll_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePayrollRequest>,
) -> ApiResult<Json<PayrollResponse>> {
    let input = UpdatePayrollInput {
        base_pay_minor: payload.base_pay_minor,
        allowances_minor: payload.allowances_minor,
        deductions_minor: payload.deductions_minor,
        status: PaymentStatus::parse(payload.status.as_str())?,
    };

    let entry = state
        .payroll_service
        .update(&identity, parse_record_id(id.as_str())?, input)
        .await?;
    Ok(Json(PayrollResponse::from(entry)))
}
