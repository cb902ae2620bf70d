use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::error::AppError;
use crate::store::models::ADMIN_ROLE;

/// JWT payload. Identity fields are optional so that a token with missing
/// claims still decodes and can be rejected at the point of use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>, // username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(rename = "role", default)]
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// The identity carried by the token, if every identity claim is present.
    pub fn principal(&self) -> Option<Principal> {
        Some(Principal {
            user_id: self.user_id?,
            username: self.sub.clone()?,
            email: self.email.clone()?,
            roles: self.roles.clone(),
        })
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.exp <= now.unix_timestamp()
    }

    pub fn expires_within(&self, now: OffsetDateTime, window: Duration) -> bool {
        self.exp - now.unix_timestamp() < window.whole_seconds()
    }
}

/// The authenticated caller attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ADMIN_ROLE)
    }

    pub fn is_owner(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden("Admin role required"))
        }
    }

    pub fn require_owner_or_admin(&self, user_id: i64) -> Result<(), AppError> {
        if self.is_owner(user_id) || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "You can only access your own data unless you are an admin",
            ))
        }
    }
}
