use serde::Serialize;

/// A freshly issued access/refresh pair
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,

    /// Time until expiry (in seconds)
    pub access_token_expires_in: i64,

    pub refresh_token: String,

    /// Time until expiry (in seconds)
    pub refresh_token_expires_in: i64,
}
