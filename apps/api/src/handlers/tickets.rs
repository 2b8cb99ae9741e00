use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use stafflow_application::{CreateTicketInput, UpdateTicketInput};
use stafflow_core::UserIdentity;
use stafflow_domain::{TicketSeverity, TicketStatus};

use crate::dto::{CreateTicketRequest, TicketResponse, UpdateTicketRequest};
use crate::error::ApiResult;
use crate::state::AppState;

use super::parse_record_id;

pub async fn list_tickets_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<TicketResponse>>> {
    let tickets = state
        .client_service
        .list_tickets(&identity)
        .await?
        .into_iter()
        .map(TicketResponse::from)
        .collect();

    Ok(Json(tickets))
}

pub async fn create_ticket_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<CreateTicketRequest>,
) -> ApiResult<(StatusCode, Json<TicketResponse>)> {
    let input = CreateTicketInput {
        client_id: parse_record_id(payload.client_id.as_str())?,
        subject_line: payload.subject_line,
        body: payload.body,
        severity: TicketSeverity::parse(payload.severity.as_str())?,
    };

    let ticket = state.client_service.create_ticket(&identity, input).await?;
    Ok((StatusCode::CREATED, Json(TicketResponse::from(ticket))))
}

pub async fn update_ticket_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTicketRequest>,
) -> ApiResult<Json<TicketResponse>> {
    let input = UpdateTicketInput {
        severity: TicketSeverity::parse(payload.severity.as_str())?,
        status: TicketStatus::parse(payload.status.as_str())?,
        body: payload.body,
    };

    let ticket = state
        .client_service
        .update_ticket(&identity, parse_record_id(id.as_str())?, input)
        .await?;
    Ok(Json(TicketResponse::from(ticket)))
}
