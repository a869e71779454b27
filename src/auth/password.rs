use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tokio::task::spawn_blocking;
use tracing::{error, instrument};

/// Argon2id digest of `plain`, computed off the async workers.
#[instrument(skip_all)]
pub async fn hash_password(plain: String) -> anyhow::Result<String> {
    spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                error!(error = %e, "password hashing failed");
                anyhow::anyhow!("hash password: {e}")
            })
    })
    .await
    .context("password hashing task")?
}

/// Checks `plain` against a stored digest. A wrong password is `Ok(false)`;
/// only an unreadable stored digest is an error.
#[instrument(skip_all)]
pub async fn verify_password(plain: String, stored: String) -> anyhow::Result<bool> {
    spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored).map_err(|e| {
            error!(error = %e, "stored password hash is unreadable");
            anyhow::anyhow!("parse stored hash: {e}")
        })?;
        Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .context("password verification task")?
}
