use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{CreateUserRequest, ListUsersQuery, UpdateUserRequest, UserDetail, UserListItem};
use super::services::{self, NewAccount};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppJson},
    response::ApiResponse,
    state::AppState,
    validation::Validate,
};

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:id", put(update_user).delete(delete_user))
}

// --- handlers ---

#[instrument(skip(state, _auth))]
pub async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ApiResponse<Vec<UserListItem>>>, AppError> {
    let (items, meta) = services::list_users(state.store.as_ref(), query.into()).await?;
    Ok(Json(ApiResponse::with_meta(items, meta)))
}

#[instrument(skip(state, _auth))]
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<UserDetail>>, AppError> {
    let detail = services::get_user(state.store.as_ref(), id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

#[instrument(skip(state, admin, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, HeaderMap, Json<ApiResponse<i64>>), AppError> {
    admin.require_admin()?;
    payload.validate()?;

    let account = NewAccount {
        username: payload.username,
        full_name: payload.full_name,
        email: payload.email,
        password: payload.password,
        hobbies: payload.hobbies,
        role_ids: payload.role_ids,
    };
    let user = services::create_account(state.store.as_ref(), account, Some(admin.user_id)).await?;
    info!(admin_id = admin.user_id, user_id = user.id, "admin created user");

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/users/{}", user.id).parse() {
        headers.insert(header::LOCATION, location);
    }
    Ok((
        StatusCode::CREATED,
        headers,
        Json(ApiResponse::success(user.id)),
    ))
}

#[instrument(skip(state, caller, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    caller.require_owner_or_admin(id)?;
    payload.validate()?;
    services::update_user(state.store.as_ref(), id, payload).await?;
    Ok(Json(ApiResponse::success(true)))
}

#[instrument(skip(state, admin))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    admin.require_admin()?;
    services::delete_user(state.store.as_ref(), id).await?;
    info!(admin_id = admin.user_id, user_id = id, "admin deleted user");
    Ok(Json(ApiResponse::success(true)))
}
