use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use stafflow_application::{AuditLogQuery, UpsertOverrideInput};
use stafflow_core::UserIdentity;
use stafflow_domain::{Permission, TeamMembership, TeamRole};

use crate::dto::{
    AuditLogEntryResponse, MembershipResponse, OverrideResponse, RemoveMembershipRequest,
    RemoveOverrideRequest, UpsertMembershipRequest, UpsertOverrideRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_overrides_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<OverrideResponse>>> {
    let overrides = state
        .security_admin_service
        .list_overrides(&identity)
        .await?
        .into_iter()
        .map(OverrideResponse::from)
        .collect();

    Ok(Json(overrides))
}

pub async fn upsert_override_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<UpsertOverrideRequest>,
) -> ApiResult<Json<OverrideResponse>> {
    let input = UpsertOverrideInput {
        subject: payload.subject,
        permission: Permission::from_transport(payload.permission.as_str())?,
        grant: payload.has_permission,
    };

    let row = state
        .security_admin_service
        .upsert_override(&identity, input)
        .await?;
    Ok(Json(OverrideResponse::from(row)))
}

pub async fn remove_override_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<RemoveOverrideRequest>,
) -> ApiResult<StatusCode> {
    state
        .security_admin_service
        .remove_override(
            &identity,
            payload.subject.as_str(),
            Permission::from_transport(payload.permission.as_str())?,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_memberships_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<MembershipResponse>>> {
    let memberships = state
        .security_admin_service
        .list_memberships(&identity)
        .await?
        .into_iter()
        .map(MembershipResponse::from)
        .collect();

    Ok(Json(memberships))
}

pub async fn upsert_membership_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<UpsertMembershipRequest>,
) -> ApiResult<StatusCode> {
    let membership = TeamMembership::new(
        payload.team_id,
        payload.subject,
        TeamRole::from_str(payload.team_role.as_str())?,
    );

    state
        .security_admin_service
        .upsert_membership(&identity, membership)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_membership_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<RemoveMembershipRequest>,
) -> ApiResult<StatusCode> {
    state
        .security_admin_service
        .remove_membership(&identity, payload.team_id.as_str(), payload.subject.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct AuditLogParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub action: Option<String>,
    pub subject: Option<String>,
}

pub async fn list_audit_log_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Query(params): Query<AuditLogParams>,
) -> ApiResult<Json<Vec<AuditLogEntryResponse>>> {
    let query = AuditLogQuery {
        limit: params.limit.unwrap_or(50).min(500),
        offset: params.offset.unwrap_or(0),
        action: params.action,
        subject: params.subject,
    };

    let entries = state
        .security_admin_service
        .list_audit_log(&identity, query)
        .await?
        .into_iter()
        .map(AuditLogEntryResponse::from)
        .collect();

    Ok(Json(entries))
}
