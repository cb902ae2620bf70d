use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info, instrument, warn};

use super::{
    claims::Principal,
    cookies::{with_session, without_session},
    dto::{LoginRequest, LoginResponse, MeResponse, MeUser, RegisterRequest, RegisterResponse},
    extractors::{AuthUser, MaybeUser},
    jwt::{generate_refresh_token, JwtKeys},
    password::verify_password,
};
use crate::{
    error::{AppError, AppJson},
    response::Message,
    state::AppState,
    store::models::User,
    users::services::{create_account, role_names, NewAccount},
    validation::Validate,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

fn principal_for(user: &User, roles: Vec<String>) -> Principal {
    Principal {
        user_id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        roles,
    }
}

/// Issues a fresh access/refresh pair as cookies; returns the access token too.
fn start_session(
    state: &AppState,
    jar: CookieJar,
    principal: &Principal,
) -> Result<(CookieJar, String), AppError> {
    let access = JwtKeys::from_ref(state).sign_access(principal)?;
    let jar = with_session(
        jar,
        &state.config.cookies,
        access.clone(),
        generate_refresh_token(),
    );
    Ok((jar, access))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    payload.validate()?;
    let store = state.store.as_ref();

    let Some(user) = store.find_user_by_username(payload.username.trim()).await? else {
        warn!(username = %payload.username, "login for unknown user");
        return Err(AppError::unauthorized("Invalid username or password"));
    };
    let matches = verify_password(&payload.password, &user.password_hash)
        .await
        .unwrap_or_else(|e| {
            error!(error = ?e, user_id = user.id, "password check failed");
            false
        });
    if !matches {
        warn!(user_id = user.id, "login with wrong password");
        return Err(AppError::unauthorized("Invalid username or password"));
    }

    let roles = role_names(store, user.id).await?;
    let principal = principal_for(&user, roles);
    let (jar, _) = start_session(&state, jar, &principal)?;
    info!(user_id = user.id, "user logged in");

    Ok((
        jar,
        Json(LoginResponse {
            message: "Login successful",
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            roles: principal.roles,
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<RegisterResponse>), AppError> {
    payload.validate()?;
    let store = state.store.as_ref();

    let account = NewAccount {
        username: payload.username,
        full_name: payload.full_name,
        email: payload.email,
        password: payload.password,
        hobbies: payload.hobbies,
        role_ids: Vec::new(),
    };
    let user = create_account(store, account, None).await?;
    let roles = role_names(store, user.id).await?;
    let principal = principal_for(&user, roles);
    let (jar, token) = start_session(&state, jar, &principal)?;
    info!(user_id = user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        jar,
        Json(RegisterResponse {
            token,
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            roles: principal.roles,
        }),
    ))
}

#[instrument(skip(user, jar))]
pub async fn logout(MaybeUser(user): MaybeUser, jar: CookieJar) -> (CookieJar, Json<Message>) {
    info!(user_id = ?user.map(|u| u.user_id), "user logged out");
    (
        without_session(jar),
        Json(Message {
            message: "Logout successful",
        }),
    )
}

#[instrument(skip(user))]
pub async fn me(AuthUser(user): AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: MeUser {
            id: user.user_id,
            username: user.username,
            email: user.email,
            roles: user.roles,
        },
    })
}
