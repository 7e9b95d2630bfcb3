//! Request extractors for protected routes.
//!
//! Adding `AuthenticatedCustomer` or `AdminCustomer` to a handler's arguments
//! is what makes the route protected.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use sqlx::PgPool;
use tracing::error;

use crate::{
    auth::decode_token,
    configuration::Settings,
    database::{CustomerDatabase, CustomerRepository},
    models::{AuthCookies, Customer, TokenType},
    Result, StoreError,
};

/// The customer behind the request's access token
#[derive(Debug, Clone)]
pub struct AuthenticatedCustomer(pub Customer);

/// An authenticated customer holding the admin role
#[derive(Debug, Clone)]
pub struct AdminCustomer(pub Customer);

impl FromRequest for AuthenticatedCustomer {
    type Error = StoreError;
    type Future = LocalBoxFuture<'static, std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { authenticate_request::<CustomerDatabase>(&req).await.map(Self) })
    }
}

impl FromRequest for AdminCustomer {
    type Error = StoreError;
    type Future = LocalBoxFuture<'static, std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let customer = authenticate_request::<CustomerDatabase>(&req).await?;
            require_admin(customer).map(Self)
        })
    }
}

/// Resolves the access token cookie to a stored customer
#[tracing::instrument(skip(req))]
pub async fn authenticate_request<C: CustomerRepository>(req: &HttpRequest) -> Result<Customer> {
    let token = AuthCookies::from_request(req)
        .access
        .ok_or_else(|| StoreError::Unauthorized("No access token provided".to_owned()))?;

    let settings = req.app_data::<web::Data<Settings>>().ok_or_else(|| {
        error!("settings are not registered as app data");
        StoreError::UnexpectedError
    })?;
    let verified = decode_token(&token, TokenType::Access, &settings.auth)?;

    let pool = req.app_data::<web::Data<PgPool>>().ok_or_else(|| {
        error!("database pool is not registered as app data");
        StoreError::UnexpectedError
    })?;
    C::find_by_id(verified.customer_id, pool)
        .await?
        .ok_or_else(|| StoreError::Unauthorized("User not found".to_owned()))
}

pub fn require_admin(customer: Customer) -> Result<Customer> {
    if customer.role.is_admin() {
        Ok(customer)
    } else {
        Err(StoreError::Forbidden)
    }
}
