use actix_web::{web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::AdminCustomer,
    database::ProductDatabase,
    models::{Product, ProductInput},
    StoreError,
};

#[tracing::instrument(skip(_admin, pool))]
pub async fn get_all_products(
    _admin: AdminCustomer,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, StoreError> {
    let products = Product::find_all::<ProductDatabase>(&pool).await?;
    Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

#[tracing::instrument(skip(pool))]
pub async fn get_featured_products(pool: web::Data<PgPool>) -> Result<HttpResponse, StoreError> {
    let products = Product::find_featured::<ProductDatabase>(&pool).await?;
    Ok(HttpResponse::Ok().json(products))
}

#[tracing::instrument(skip(pool))]
pub async fn get_recommended_products(
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, StoreError> {
    let products = Product::find_recommended::<ProductDatabase>(&pool).await?;
    Ok(HttpResponse::Ok().json(products))
}

#[tracing::instrument(skip(pool))]
pub async fn get_products_by_category(
    category: web::Path<String>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, StoreError> {
    let products = Product::find_by_category::<ProductDatabase>(&category, &pool).await?;
    Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

#[tracing::instrument(skip(pool))]
pub async fn get_product(
    id: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, StoreError> {
    let product = Product::find_by_id::<ProductDatabase>(id.into_inner(), &pool).await?;
    Ok(HttpResponse::Ok().json(product))
}

#[tracing::instrument(skip(admin, body, pool), fields(admin = %admin.0.id))]
pub async fn create_product(
    admin: AdminCustomer,
    body: web::Json<ProductInput>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, StoreError> {
    let product = Product::create::<ProductDatabase>(body.into_inner(), &pool).await?;
    Ok(HttpResponse::Created().json(product))
}

#[tracing::instrument(skip(admin, body, pool), fields(admin = %admin.0.id))]
pub async fn update_product(
    admin: AdminCustomer,
    id: web::Path<Uuid>,
    body: web::Json<ProductInput>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, StoreError> {
    let product =
        Product::update::<ProductDatabase>(id.into_inner(), body.into_inner(), &pool).await?;
    Ok(HttpResponse::Ok().json(product))
}

#[tracing::instrument(skip(admin, pool), fields(admin = %admin.0.id))]
pub async fn toggle_featured_product(
    admin: AdminCustomer,
    id: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, StoreError> {
    let product = Product::toggle_featured::<ProductDatabase>(id.into_inner(), &pool).await?;
    Ok(HttpResponse::Ok().json(product))
}

#[tracing::instrument(skip(admin, pool), fields(admin = %admin.0.id))]
pub async fn delete_product(
    admin: AdminCustomer,
    id: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, StoreError> {
    Product::delete::<ProductDatabase>(id.into_inner(), &pool).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted successfully" })))
}
