use anyhow::{Context, Result};

const BCRYPT_COST: u32 = 10;

/// Hashes a secret (password or OTP) on the blocking pool.
pub async fn hash_secret(secret: &str) -> Result<String> {
    let secret = secret.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(secret, BCRYPT_COST))
        .await
        .context("bcrypt task panicked")?
        .context("Failed to hash secret")
}

/// Compares a secret with a stored bcrypt hash on the blocking pool.
pub async fn verify_secret(secret: &str, hash: &str) -> Result<bool> {
    let secret = secret.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(secret, &hash))
        .await
        .context("bcrypt task panicked")?
        .context("Failed to verify secret")
}
