use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use stafflow_application::{CreateLeadInput, UpdateLeadInput};
use stafflow_core::UserIdentity;
use stafflow_domain::LeadStage;

use crate::dto::{CreateLeadRequest, LeadResponse, UpdateLeadRequest};
use crate::error::ApiResult;
use crate::state::AppState;

use super::parse_record_id;

pub async fn list_leads_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<LeadResponse>>> {
    let leads = state
        .lead_service
        .list(&identity)
        .await?
        .into_iter()
        .map(LeadResponse::from)
        .collect();

    Ok(Json(leads))
}

pub async fn create_lead_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<CreateLeadRequest>,
) -> ApiResult<(StatusCode, Json<LeadResponse>)> {
    let input = CreateLeadInput {
        candidate_name: payload.candidate_name,
        contact_email: payload.contact_email,
        source: payload.source,
    };

    let lead = state.lead_service.create(&identity, input).await?;
    Ok((StatusCode::CREATED, Json(LeadResponse::from(lead))))
}

pub async fn update_lead_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateLeadRequest>,
) -> ApiResult<Json<LeadResponse>> {
    let input = UpdateLeadInput {
        stage: LeadStage::parse(payload.stage.as_str())?,
    };

    let lead = state
        .lead_service
        .update(&identity, parse_record_id(id.as_str())?, input)
        .await?;
    Ok(Json(LeadResponse::from(lead)))
}
