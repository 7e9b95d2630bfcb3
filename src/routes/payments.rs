use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::AuthenticatedCustomer,
    configuration::Settings,
    database::{CouponDatabase, CustomerDatabase, OrderDatabase},
    models::{
        checkout::{self, CheckoutRequest},
        Confirmation, Order,
    },
    payments::{is_valid_session_id, PaymentGateway},
    StoreError,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSuccessRequest {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutSuccessResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_id: Option<Uuid>,
}

impl From<Confirmation> for CheckoutSuccessResponse {
    fn from(confirmation: Confirmation) -> Self {
        match confirmation {
            Confirmation::NotPaid { payment_status } => Self {
                success: false,
                message: format!("Payment not completed, status: {}", payment_status),
                order_id: None,
            },
            Confirmation::Created(order) => Self {
                success: true,
                message: "Payment successful, order created".to_owned(),
                order_id: Some(order.id),
            },
            Confirmation::AlreadyExists(order) => Self {
                success: true,
                message: "Order already exists for this session".to_owned(),
                order_id: Some(order.id),
            },
        }
    }
}

#[tracing::instrument(skip(customer, body, gateway, settings, pool), fields(id = %customer.0.id))]
pub async fn create_checkout_session(
    customer: AuthenticatedCustomer,
    body: web::Json<CheckoutRequest>,
    gateway: web::Data<dyn PaymentGateway>,
    settings: web::Data<Settings>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, StoreError> {
    let outcome = checkout::initialize::<CouponDatabase>(
        customer.0.id,
        body.into_inner(),
        gateway.get_ref(),
        &settings,
        &pool,
    )
    .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[tracing::instrument(skip(_customer, body, gateway, pool))]
pub async fn checkout_success(
    _customer: AuthenticatedCustomer,
    body: web::Json<CheckoutSuccessRequest>,
    gateway: web::Data<dyn PaymentGateway>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, StoreError> {
    let session_id = body
        .into_inner()
        .session_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| StoreError::BadRequest("Session ID is required".to_owned()))?;
    if !is_valid_session_id(&session_id) {
        return Err(StoreError::BadRequest("Invalid session ID".to_owned()));
    }

    let confirmation = Order::confirm_payment::<OrderDatabase, CouponDatabase, CustomerDatabase>(
        &session_id,
        gateway.get_ref(),
        &pool,
    )
    .await?;

    Ok(HttpResponse::Ok().json(CheckoutSuccessResponse::from(confirmation)))
}
