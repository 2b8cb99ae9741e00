use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use stafflow_application::{CreateClientInput, UpdateClientInput};
use stafflow_core::UserIdentity;
use stafflow_domain::ClientStatus;

use crate::dto::{ClientResponse, CreateClientRequest, UpdateClientRequest};
use crate::error::ApiResult;
use crate::state::AppState;

use super::parse_record_id;

pub async fn list_clients_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<ClientResponse>>> {
    let clients = state
        .client_service
        .list_clients(&identity)
        .await?
        .into_iter()
        .map(ClientResponse::from)
        .collect();

    Ok(Json(clients))
}

pub async fn create_client_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<CreateClientRequest>,
) -> ApiResult<(StatusCode, Json<ClientResponse>)> {
    let input = CreateClientInput {
        company_name: payload.company_name,
        contact_name: payload.contact_name,
        contact_email: payload.contact_email,
    };

    let client = state.client_service.create_client(&identity, input).await?;
    Ok((StatusCode::CREATED, Json(ClientResponse::from(client))))
}

pub async fn update_client_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateClientRequest>,
) -> ApiResult<Json<ClientResponse>> {
    let input = UpdateClientInput {
        contact_name: payload.contact_name,
        contact_email: payload.contact_email,
        status: ClientStatus::parse(payload.status.as_str())?,
    };

    let client = state
        .client_service
        .update_client(&identity, parse_record_id(id.as_str())?, input)
        .await?;
    Ok(Json(ClientResponse::from(client)))
}
