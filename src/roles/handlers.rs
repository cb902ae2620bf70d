use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{AssignRoleRequest, RoleDto};
use super::services;
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppJson},
    response::Message,
    state::AppState,
    validation::Validate,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/roles", get(list_roles))
        .route("/roles/user/:user_id", get(user_roles))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/roles/assign", post(assign_role))
        .route("/roles/unassign", delete(unassign_role))
}

#[instrument(skip(state, _auth))]
pub async fn list_roles(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<RoleDto>>, AppError> {
    Ok(Json(services::list_roles(state.store.as_ref()).await?))
}

#[instrument(skip(state, caller))]
pub async fn user_roles(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<RoleDto>>, AppError> {
    caller.require_owner_or_admin(user_id)?;
    Ok(Json(services::roles_of_user(state.store.as_ref(), user_id).await?))
}

#[instrument(skip(state, admin, payload))]
pub async fn assign_role(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    AppJson(payload): AppJson<AssignRoleRequest>,
) -> Result<Json<Message>, AppError> {
    admin.require_admin()?;
    payload.validate()?;
    services::assign(
        state.store.as_ref(),
        payload.user_id,
        payload.role_id,
        admin.user_id,
    )
    .await?;
    Ok(Json(Message {
        message: "Role assigned successfully",
    }))
}

#[instrument(skip(state, admin, payload))]
pub async fn unassign_role(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    AppJson(payload): AppJson<AssignRoleRequest>,
) -> Result<Json<Message>, AppError> {
    admin.require_admin()?;
    payload.validate()?;
    services::unassign(state.store.as_ref(), payload.user_id, payload.role_id).await?;
    Ok(Json(Message {
        message: "Role unassigned successfully",
    }))
}
