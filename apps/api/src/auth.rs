use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use stafflow_core::{AppError, UserIdentity};
use tower_sessions::Session;

use crate::dto::{BootstrapRequest, LoginRequest, UserIdentityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub const SESSION_USER_KEY: &str = "user_identity";

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<UserIdentityResponse>> {
    let identity = state
        .directory_service
        .login(payload.email.as_str(), payload.password.as_str())
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid email or password".to_owned()))?;

    establish_session(&session, &identity).await?;

    Ok(Json(UserIdentityResponse::from(identity)))
}

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .flush()
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<UserIdentityResponse>> {
    Ok(Json(UserIdentityResponse::from(identity)))
}

/// Creates the first Admin account, guarded by the bootstrap token.
pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<(StatusCode, Json<UserIdentityResponse>)> {
    if payload.token != state.bootstrap_token {
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let identity = state
        .directory_service
        .bootstrap_admin(
            payload.display_name.as_str(),
            payload.email.as_str(),
            payload.password.as_str(),
        )
        .await?;

    establish_session(&session, &identity).await?;

    Ok((StatusCode::CREATED, Json(UserIdentityResponse::from(identity))))
}

/// Rotates the session id and stores the identity (OWASP session fixation
/// defense).
async fn establish_session(session: &Session, identity: &UserIdentity) -> ApiResult<()> {
    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    Ok(())
}
