use jsonwebtoken::TokenData;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A token whose signature and expiry have already been checked.
///
/// It's only constructable from decoded `TokenData`, so holding one means the
/// token went through `decode_token`.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct VerifiedToken {
    pub customer_id: Uuid,
    pub iat: usize,
    pub exp: usize,
    pub token_type: TokenType,
    _private: (),
}

impl From<TokenData<Claims>> for VerifiedToken {
    fn from(t: TokenData<Claims>) -> Self {
        let claims = t.claims;
        Self {
            customer_id: claims.sub,
            iat: claims.iat,
            exp: claims.exp,
            token_type: claims.token_type,
            _private: (),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    /// Name of the cookie the token travels in
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "accessToken",
            TokenType::Refresh => "refreshToken",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Claims {
    pub sub: Uuid,
    /// Unique per issuance so two logins in the same second never share a token
    pub jti: Uuid,
    pub exp: usize,
    pub iat: usize,
    pub token_type: TokenType,
}
