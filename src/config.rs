use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Lifetimes and transport flags for the session cookies.
#[derive(Debug, Clone, Deserialize)]
pub struct CookieConfig {
    pub secure: bool,
    pub access_days: i64,
    pub refresh_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub cookies: CookieConfig,
    pub is_production: bool,
    pub seed_demo_users: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let is_production = std::env::var("APP_ENV")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "production" | "prod"))
            .unwrap_or(false);

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "hobbyhub".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "hobbyhub-users".into()),
            ttl_minutes: env_or("JWT_TTL_MINUTES", 60),
        };
        let cookies = CookieConfig {
            secure: is_production,
            access_days: env_or("AUTH_COOKIE_DAYS", 7),
            refresh_days: env_or("REFRESH_COOKIE_DAYS", 30),
        };
        let seed_demo_users = std::env::var("SEED_DEMO_USERS")
            .map(|v| !matches!(v.as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        Ok(Self {
            database_url,
            jwt,
            cookies,
            is_production,
            seed_demo_users,
        })
    }
}

fn env_or(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}
