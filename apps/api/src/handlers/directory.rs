use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use stafflow_application::CreateProfileInput;
use stafflow_core::UserIdentity;
use stafflow_domain::Role;

use crate::dto::{ChangeRoleRequest, ChangeTeamRequest, CreateProfileRequest, ProfileResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_directory_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<ProfileResponse>>> {
    let profiles = state
        .directory_service
        .list(&identity)
        .await?
        .into_iter()
        .map(ProfileResponse::from)
        .collect();

    Ok(Json(profiles))
}

pub async fn create_profile_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<CreateProfileRequest>,
) -> ApiResult<(StatusCode, Json<ProfileResponse>)> {
    let input = CreateProfileInput {
        display_name: payload.display_name,
        email: payload.email,
        role: Role::from_str(payload.role.as_str())?,
        team_id: payload.team_id,
        password: payload.password,
    };

    let profile = state.directory_service.create(&identity, input).await?;
    Ok((StatusCode::CREATED, Json(ProfileResponse::from(profile))))
}

pub async fn change_role_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(subject): Path<String>,
    Json(payload): Json<ChangeRoleRequest>,
) -> ApiResult<StatusCode> {
    state
        .directory_service
        .change_role(
            &identity,
            subject.as_str(),
            Role::from_str(payload.role.as_str())?,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_team_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(subject): Path<String>,
    Json(payload): Json<ChangeTeamRequest>,
) -> ApiResult<StatusCode> {
    state
        .directory_service
        .change_team(&identity, subject.as_str(), payload.team_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn deactivate_profile_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(subject): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .directory_service
        .deactivate(&identity, subject.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
