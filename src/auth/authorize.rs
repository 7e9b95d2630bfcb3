use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    configuration::AuthSettings,
    models::{Claims, TokenType, VerifiedToken},
    StoreError,
};

fn secret(token_type: TokenType, settings: &AuthSettings) -> &[u8] {
    match token_type {
        TokenType::Access => settings.access_token_secret.as_bytes(),
        TokenType::Refresh => settings.refresh_token_secret.as_bytes(),
    }
}

/// Signs a new token for the customer, returning it with its absolute expiry
#[tracing::instrument(skip(settings))]
pub fn encode_token(
    customer_id: Uuid,
    token_type: TokenType,
    settings: &AuthSettings,
) -> Result<(String, DateTime<Utc>), StoreError> {
    let iat = Utc::now();
    let exp = match token_type {
        TokenType::Access => iat + settings.access_token_duration(),
        TokenType::Refresh => iat + settings.refresh_token_duration(),
    };
    let claims = Claims {
        sub: customer_id,
        jti: Uuid::new_v4(),
        exp: exp.timestamp() as usize,
        iat: iat.timestamp() as usize,
        token_type,
    };
    let token = encode_jwt(&claims, settings)?;
    Ok((token, exp))
}

pub(crate) fn encode_jwt(claims: &Claims, settings: &AuthSettings) -> Result<String, StoreError> {
    let key = EncodingKey::from_secret(secret(claims.token_type, settings));
    encode(&Header::new(Algorithm::HS256), claims, &key).map_err(|e| {
        error!(err = ?e, "failed to encode json web token");
        StoreError::UnexpectedError
    })
}

/// Verifies the signature and expiry of `token`.
///
/// An expired access token gets its own error so the client knows a refresh
/// is worth attempting.
#[tracing::instrument(skip(token, settings))]
pub fn decode_token(
    token: &str,
    token_type: TokenType,
    settings: &AuthSettings,
) -> Result<VerifiedToken, StoreError> {
    let key = DecodingKey::from_secret(secret(token_type, settings));
    let validation = Validation::new(Algorithm::HS256);

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature if token_type == TokenType::Access => {
            info!("access token has expired");
            StoreError::AccessTokenExpired
        }
        _ => {
            info!(err = ?e, "failed to decode json web token");
            StoreError::InvalidToken(e.to_string())
        }
    })?;

    if data.claims.token_type != token_type {
        return Err(StoreError::InvalidToken(format!(
            "expected a {} token",
            token_type.as_str()
        )));
    }
    Ok(VerifiedToken::from(data))
}
