use argon2::{self, Config, Variant};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::{database::CustomerRepository, models::normalize_email, Result, StoreError};

const SALT_LENGTH: usize = 16;

#[cfg(not(test))]
fn config() -> Config<'static> {
    Config {
        variant: Variant::Argon2id,
        mem_cost: 19456,
        time_cost: 2,
        lanes: 1,
        ..Config::default()
    }
}

#[cfg(test)]
fn config() -> Config<'static> {
    Config {
        variant: Variant::Argon2id,
        mem_cost: 64,
        time_cost: 1,
        lanes: 1,
        ..Config::default()
    }
}

/// Hashes the password with a fresh random salt, off the async executor
pub async fn hash_password(password: String) -> Result<String> {
    let hash = tokio::task::spawn_blocking(move || {
        let salt: [u8; SALT_LENGTH] = rand::random();
        argon2::hash_encoded(password.as_bytes(), &salt, &config())
    })
    .await??;
    Ok(hash)
}

pub async fn verify_password(password: String, password_hash: String) -> Result<bool> {
    let matches = tokio::task::spawn_blocking(move || {
        argon2::verify_encoded(&password_hash, password.as_bytes())
    })
    .await??;
    Ok(matches)
}

/// Checks the credentials and returns the customer's id.
///
/// Unknown emails and wrong passwords produce the same error.
#[tracing::instrument(skip(email, password, pool))]
pub async fn verify_password_and_fetch_details<C: CustomerRepository>(
    email: &str,
    password: String,
    pool: &PgPool,
) -> Result<Uuid> {
    let customer = C::find_auth_by_email(&normalize_email(email), pool)
        .await?
        .ok_or(StoreError::IncorrectCredentials)?;

    if !verify_password(password, customer.password_hash).await? {
        warn!(id = %customer.id, "password did not match");
        return Err(StoreError::IncorrectCredentials);
    }
    Ok(customer.id)
}
