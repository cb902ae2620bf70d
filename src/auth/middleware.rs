//! Cookie authentication with silent refresh.
//!
//! Every request passes through [`authenticate`]. A valid access cookie puts a
//! [`Principal`] into the request extensions. An access token that has expired,
//! or will within [`REFRESH_THRESHOLD`], is re-issued from its own claims as
//! long as a well-formed refresh cookie is present. Anything else clears the
//! session cookies and the request continues anonymously.

use axum::{
    extract::{FromRef, Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use time::{Duration, OffsetDateTime};
use tracing::{debug, error, info, warn};

use super::{
    claims::{Claims, Principal},
    cookies::{access_token, refresh_token, with_session, without_session},
    jwt::{generate_refresh_token, is_well_formed_refresh_token, JwtKeys, TokenError},
};
use crate::state::AppState;

pub const REFRESH_THRESHOLD: Duration = Duration::minutes(5);

pub async fn authenticate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = access_token(&jar) else {
        return next.run(req).await;
    };

    let keys = JwtKeys::from_ref(&state);
    let now = OffsetDateTime::now_utc();
    let outcome = match keys.verify_at(&token, now) {
        Ok(claims) if !claims.expires_within(now, REFRESH_THRESHOLD) => match claims.principal() {
            Some(principal) => {
                req.extensions_mut().insert(principal);
                return next.run(req).await;
            }
            None => {
                warn!("token is missing identity claims");
                None
            }
        },
        Ok(claims) => {
            debug!(user_id = ?claims.user_id, "token close to expiry; refreshing");
            refresh(&state, &keys, jar.clone(), &claims, now)
        }
        Err(TokenError::Expired(claims)) => {
            debug!(user_id = ?claims.user_id, "token expired; refreshing");
            refresh(&state, &keys, jar.clone(), &claims, now)
        }
        Err(TokenError::Invalid(e)) => {
            warn!(error = %e, "rejecting invalid token");
            None
        }
    };

    let jar = match outcome {
        Some((jar, principal)) => {
            req.extensions_mut().insert(principal);
            jar
        }
        None => without_session(jar),
    };

    let res = next.run(req).await;
    // Cookies set by the handler itself (login, logout) take precedence.
    if res.headers().contains_key(SET_COOKIE) {
        return res;
    }
    (jar, res).into_response()
}

/// Mints a new access/refresh pair from the claims of the outgoing token.
fn refresh(
    state: &AppState,
    keys: &JwtKeys,
    jar: CookieJar,
    claims: &Claims,
    now: OffsetDateTime,
) -> Option<(CookieJar, Principal)> {
    let Some(presented) = refresh_token(&jar) else {
        info!("no refresh token; ending session");
        return None;
    };
    if !is_well_formed_refresh_token(&presented) {
        warn!("malformed refresh token; ending session");
        return None;
    }
    let Some(principal) = claims.principal() else {
        warn!("token is missing identity claims; ending session");
        return None;
    };

    let access = match keys.sign_access_at(&principal, now) {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "failed to re-sign access token");
            return None;
        }
    };
    let jar = with_session(jar, &state.config.cookies, access, generate_refresh_token());
    info!(user_id = principal.user_id, "session refreshed");
    Some((jar, principal))
}
