use axum::extract::FromRef;
use base64ct::{Base64, Encoding};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::claims::{Claims, Principal};
use crate::{config::JwtConfig, state::AppState};

const REFRESH_TOKEN_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum TokenError {
    /// Signature, issuer and audience check out but the lifetime is over.
    #[error("token expired")]
    Expired(Box<Claims>),
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: Duration::minutes(cfg.ttl_minutes),
        }
    }

    pub fn sign_access(&self, principal: &Principal) -> anyhow::Result<String> {
        self.sign_access_at(principal, OffsetDateTime::now_utc())
    }

    pub fn sign_access_at(
        &self,
        principal: &Principal,
        issued_at: OffsetDateTime,
    ) -> anyhow::Result<String> {
        let claims = Claims {
            sub: Some(principal.username.clone()),
            email: Some(principal.email.clone()),
            jti: Some(Uuid::new_v4().to_string()),
            user_id: Some(principal.user_id),
            roles: principal.roles.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.unix_timestamp(),
            exp: (issued_at + self.access_ttl).unix_timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(user_id = principal.user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    /// Checks signature, issuer and audience, then the lifetime against `now`
    /// with no clock skew. An expired token keeps its claims so the caller can
    /// re-issue it.
    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)?.claims;
        if claims.is_expired(now) {
            debug!(user_id = ?claims.user_id, "jwt expired");
            return Err(TokenError::Expired(Box::new(claims)));
        }
        Ok(claims)
    }
}

/// 32 random bytes, standard padded base64. Not persisted anywhere.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    Base64::encode_string(&bytes)
}

/// Refresh tokens are only checked for being non-empty base64.
// TODO: bind refresh tokens to a server-side session so they can be revoked.
pub fn is_well_formed_refresh_token(token: &str) -> bool {
    !token.is_empty() && Base64::decode_vec(token).is_ok()
}
