use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::AuthenticatedCustomer,
    database::{CustomerDatabase, ProductDatabase},
    StoreError,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRequest {
    pub product_id: Uuid,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RemoveRequest {
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i32,
}

#[tracing::instrument(skip(customer, pool), fields(id = %customer.0.id))]
pub async fn get_cart(
    customer: AuthenticatedCustomer,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, StoreError> {
    let products = customer.0.cart_products::<ProductDatabase>(&pool).await?;
    Ok(HttpResponse::Ok().json(products))
}

#[tracing::instrument(skip(customer, pool), fields(id = %customer.0.id))]
pub async fn add_to_cart(
    customer: AuthenticatedCustomer,
    body: web::Json<CartRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, StoreError> {
    let AuthenticatedCustomer(mut customer) = customer;
    let items = customer
        .add_to_cart::<CustomerDatabase, ProductDatabase>(body.product_id, &pool)
        .await?;
    Ok(HttpResponse::Ok().json(items))
}

/// An empty body or one without `productId` means the whole cart, anything
/// else has to parse
fn removal_target(body: &[u8]) -> Result<Option<Uuid>, StoreError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice::<RemoveRequest>(body)
        .map(|request| request.product_id)
        .map_err(|e| StoreError::BadRequest(e.to_string()))
}

/// Removes the given product, or everything when the body names none
#[tracing::instrument(skip(customer, body, pool), fields(id = %customer.0.id))]
pub async fn remove_from_cart(
    customer: AuthenticatedCustomer,
    body: web::Bytes,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, StoreError> {
    let product_id = removal_target(&body)?;
    let AuthenticatedCustomer(mut customer) = customer;
    let items = customer
        .remove_from_cart::<CustomerDatabase>(product_id, &pool)
        .await?;
    Ok(HttpResponse::Ok().json(items))
}

#[tracing::instrument(skip(customer, pool), fields(id = %customer.0.id))]
pub async fn update_quantity(
    customer: AuthenticatedCustomer,
    product_id: web::Path<Uuid>,
    body: web::Json<QuantityRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, StoreError> {
    let AuthenticatedCustomer(mut customer) = customer;
    let items = customer
        .update_cart_quantity::<CustomerDatabase>(product_id.into_inner(), body.quantity, &pool)
        .await?;
    Ok(HttpResponse::Ok().json(items))
}
