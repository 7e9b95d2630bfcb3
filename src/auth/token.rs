use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{decode_token, encode_token},
    configuration::AuthSettings,
    database::SessionTokenRepository,
    models::{TokenPair, TokenType},
    Result, StoreError,
};

/// Manages the creation of a brand new set of JWT tokens (Access & Refresh).
///
/// The refresh token is persisted as the customer's only session, so every
/// refresh token issued to them before stops working.
#[tracing::instrument(skip(settings, pool))]
pub async fn generate_new_tokens<S: SessionTokenRepository>(
    customer_id: Uuid,
    settings: &AuthSettings,
    pool: &PgPool,
) -> Result<TokenPair> {
    let (access_token, _) = encode_token(customer_id, TokenType::Access, settings)?;
    let (refresh_token, refresh_token_expires_at) =
        encode_token(customer_id, TokenType::Refresh, settings)?;

    S::replace_for_customer(customer_id, &refresh_token, refresh_token_expires_at, pool).await?;

    Ok(TokenPair {
        access_token,
        access_token_expires_in: settings.access_token_duration_seconds,
        refresh_token,
        refresh_token_expires_in: settings.refresh_token_duration_seconds,
    })
}

/// Mints a new access token from a stored, unexpired refresh token.
///
/// The refresh token itself is left as it is.
#[tracing::instrument(skip(refresh_token, settings, pool))]
pub async fn refresh_access_token<S: SessionTokenRepository>(
    refresh_token: &str,
    settings: &AuthSettings,
    pool: &PgPool,
) -> Result<String> {
    let verified = decode_token(refresh_token, TokenType::Refresh, settings)
        .map_err(|_| StoreError::Unauthorized("Invalid refresh token".to_owned()))?;

    if !S::is_active(verified.customer_id, refresh_token, pool).await? {
        info!(id = %verified.customer_id, "refresh token has been revoked");
        return Err(StoreError::Unauthorized("Invalid refresh token".to_owned()));
    }

    let (access_token, _) = encode_token(verified.customer_id, TokenType::Access, settings)?;
    Ok(access_token)
}

/// Best-effort removal of the stored refresh token, failures are only logged
#[tracing::instrument(skip(refresh_token, pool))]
pub async fn revoke_refresh_token<S: SessionTokenRepository>(
    refresh_token: Option<&str>,
    pool: &PgPool,
) {
    if let Some(token) = refresh_token {
        if let Err(e) = S::delete(token, pool).await {
            warn!(err = ?e, "failed to delete refresh token during logout");
        }
    }
}
