//! argon2 password hashing. Both operations are CPU-bound, so the async entry
//! points hand the work to tokio's blocking pool.

use anyhow::Context;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tokio::task::spawn_blocking;

fn hash_blocking(plain: &[u8]) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain, &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("hash password: {e}"))
}

fn verify_blocking(plain: &[u8], stored: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(stored).map_err(|e| anyhow::anyhow!("parse stored hash: {e}"))?;
    Ok(Argon2::default().verify_password(plain, &parsed).is_ok())
}

pub async fn hash_password(plain: &str) -> anyhow::Result<String> {
    let plain = plain.to_owned();
    spawn_blocking(move || hash_blocking(plain.as_bytes()))
        .await
        .context("password hashing task")?
}

/// `Ok(false)` on a wrong password; `Err` only when the stored hash is unreadable.
pub async fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let plain = plain.to_owned();
    let stored = stored.to_owned();
    spawn_blocking(move || verify_blocking(plain.as_bytes(), &stored))
        .await
        .context("password verification task")?
}
