use actix_web::{web, HttpRequest, HttpResponse, HttpResponseBuilder};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::{
        generate_new_tokens, refresh_access_token, revoke_refresh_token,
        verify_password_and_fetch_details, AuthenticatedCustomer,
    },
    configuration::{Environment, Settings},
    database::{CustomerDatabase, SessionTokenDatabase},
    models::{
        auth_cookie, removal_cookie, AuthCookies, Customer, LoginInput, Role, SignupInput,
        TokenPair, TokenType,
    },
    StoreError,
};

/// What signup and login hand back, never the password hash
#[derive(Debug, Serialize)]
struct UserResponse<'a> {
    #[serde(rename = "_id")]
    id: Uuid,
    name: &'a str,
    email: &'a str,
    role: Role,
}

impl<'a> From<&'a Customer> for UserResponse<'a> {
    fn from(customer: &'a Customer) -> Self {
        Self {
            id: customer.id,
            name: &customer.name,
            email: &customer.email,
            role: customer.role,
        }
    }
}

fn set_token_cookies(response: &mut HttpResponseBuilder, tokens: &TokenPair, env: Environment) {
    response
        .cookie(auth_cookie(
            &tokens.access_token,
            TokenType::Access,
            tokens.access_token_expires_in,
            env,
        ))
        .cookie(auth_cookie(
            &tokens.refresh_token,
            TokenType::Refresh,
            tokens.refresh_token_expires_in,
            env,
        ));
}

#[tracing::instrument(skip(body, pool, settings))]
pub async fn sign_up(
    body: web::Json<SignupInput>,
    pool: web::Data<PgPool>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, StoreError> {
    let customer = Customer::new::<CustomerDatabase>(body.into_inner(), &pool).await?;
    let tokens =
        generate_new_tokens::<SessionTokenDatabase>(customer.id, &settings.auth, &pool).await?;

    let mut response = HttpResponse::Created();
    set_token_cookies(&mut response, &tokens, settings.env);
    Ok(response.json(UserResponse::from(&customer)))
}

#[tracing::instrument(skip(body, pool, settings))]
pub async fn log_in(
    body: web::Json<LoginInput>,
    pool: web::Data<PgPool>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, StoreError> {
    let LoginInput { email, password } = body.into_inner();
    let id = verify_password_and_fetch_details::<CustomerDatabase>(&email, password, &pool).await?;
    let customer = Customer::find_by_id::<CustomerDatabase>(id, &pool).await?;
    let tokens = generate_new_tokens::<SessionTokenDatabase>(id, &settings.auth, &pool).await?;

    let mut response = HttpResponse::Ok();
    set_token_cookies(&mut response, &tokens, settings.env);
    Ok(response.json(UserResponse::from(&customer)))
}

/// Always succeeds, whatever state the refresh token is in
#[tracing::instrument(skip(req, pool, settings))]
pub async fn log_out(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    settings: web::Data<Settings>,
) -> HttpResponse {
    let cookies = AuthCookies::from_request(&req);
    revoke_refresh_token::<SessionTokenDatabase>(cookies.refresh.as_deref(), &pool).await;

    HttpResponse::Ok()
        .cookie(removal_cookie(TokenType::Access, settings.env))
        .cookie(removal_cookie(TokenType::Refresh, settings.env))
        .json(json!({ "message": "Logged out successfully" }))
}

#[tracing::instrument(skip(req, pool, settings))]
pub async fn refresh(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, StoreError> {
    let refresh_token = AuthCookies::from_request(&req)
        .refresh
        .ok_or_else(|| StoreError::Unauthorized("No refresh token provided".to_owned()))?;

    let access_token =
        refresh_access_token::<SessionTokenDatabase>(&refresh_token, &settings.auth, &pool)
            .await?;

    Ok(HttpResponse::Ok()
        .cookie(auth_cookie(
            &access_token,
            TokenType::Access,
            settings.auth.access_token_duration_seconds,
            settings.env,
        ))
        .json(json!({ "message": "Token refreshed successfully" })))
}

pub async fn profile(customer: AuthenticatedCustomer) -> HttpResponse {
    HttpResponse::Ok().json(customer.0)
}
