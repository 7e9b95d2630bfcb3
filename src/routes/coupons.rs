use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::{auth::AuthenticatedCustomer, database::CouponDatabase, models::Coupon, StoreError};

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub code: String,
}

/// The caller's coupon, or `null` when they have none
#[tracing::instrument(skip(customer, pool), fields(id = %customer.0.id))]
pub async fn get_coupon(
    customer: AuthenticatedCustomer,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, StoreError> {
    let coupon = Coupon::find_for_customer::<CouponDatabase>(customer.0.id, &pool).await?;
    Ok(HttpResponse::Ok().json(coupon))
}

#[tracing::instrument(skip(customer, body, pool), fields(id = %customer.0.id))]
pub async fn validate_coupon(
    customer: AuthenticatedCustomer,
    body: web::Json<ValidateRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, StoreError> {
    let code = body.code.trim();
    let coupon =
        Coupon::validate::<CouponDatabase>(code, customer.0.id, Utc::now(), &pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Coupon is valid",
        "code": coupon.code,
        "discountPercentage": coupon.discount_percentage,
    })))
}
