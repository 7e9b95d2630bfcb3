use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    HttpRequest,
};

use crate::{configuration::Environment, models::TokenType};

/// The raw auth cookies sent on a request, not yet verified
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AuthCookies {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl AuthCookies {
    /// Pulls the Access Token & Refresh Token from the cookies sent on the request
    pub fn from_request(req: &HttpRequest) -> Self {
        let read = |token_type: TokenType| {
            req.cookie(token_type.as_str())
                .map(|c| c.value().to_owned())
                .filter(|value| !value.is_empty())
        };
        Self {
            access: read(TokenType::Access),
            refresh: read(TokenType::Refresh),
        }
    }
}

/// Builds the http-only, same-site-strict cookie a token is stored in.
///
/// `Secure` is only set in production, otherwise the cookies are never sent
/// back over plain http during local runs and tests.
pub fn auth_cookie(
    token: &str,
    token_type: TokenType,
    max_age_seconds: i64,
    env: Environment,
) -> Cookie<'static> {
    Cookie::build(token_type.as_str(), token.to_owned())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(env.secure_cookies())
        .max_age(CookieDuration::seconds(max_age_seconds))
        .finish()
}

/// An expired, empty cookie that makes the client drop the stored one
pub fn removal_cookie(token_type: TokenType, env: Environment) -> Cookie<'static> {
    auth_cookie("", token_type, 0, env)
}
