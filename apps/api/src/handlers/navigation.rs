use axum::Json;
use axum::extract::{Extension, State};
use stafflow_core::UserIdentity;

use crate::dto::NavEntryResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn navigation_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<NavEntryResponse>>> {
    let entries = state
        .navigation_service
        .entries(&identity)
        .await?
        .into_iter()
        .map(NavEntryResponse::from)
        .collect();

    Ok(Json(entries))
}
