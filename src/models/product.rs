use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{database::ProductRepository, Result, StoreError};

const RECOMMENDATION_COUNT: i64 = 4;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Specification {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub images: Vec<String>,
    /// Kept for clients that still read a single image
    pub image: Option<String>,
    pub category: String,
    pub is_featured: bool,
    pub specifications: Vec<Specification>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin input for creating or replacing a product
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
    pub image: Option<String>,
    pub category: String,
    #[serde(default)]
    pub specifications: Vec<Specification>,
}

/// A validated product ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub images: Vec<String>,
    pub image: String,
    pub category: String,
    pub specifications: Vec<Specification>,
}

impl TryFrom<ProductInput> for NewProduct {
    type Error = StoreError;

    fn try_from(input: ProductInput) -> std::result::Result<Self, Self::Error> {
        if input.name.trim().is_empty() || input.category.trim().is_empty() {
            return Err(StoreError::BadRequest(
                "Name and category are required".to_owned(),
            ));
        }
        if !input.price.is_finite() || input.price < 0.0 {
            return Err(StoreError::BadRequest(
                "Price must be a non-negative number".to_owned(),
            ));
        }

        let mut images: Vec<String> = input
            .images
            .into_iter()
            .filter(|image| !image.trim().is_empty())
            .collect();
        if images.is_empty() {
            if let Some(image) = input.image.filter(|image| !image.trim().is_empty()) {
                images.push(image);
            }
        }
        let image = images
            .first()
            .cloned()
            .ok_or_else(|| StoreError::BadRequest("At least one image is required".to_owned()))?;

        Ok(Self {
            name: input.name,
            description: input.description,
            price: input.price,
            images,
            image,
            category: input.category,
            specifications: input.specifications,
        })
    }
}

impl Product {
    #[tracing::instrument(skip(pool), fields(model = "Product"))]
    pub async fn find_all<DB: ProductRepository>(pool: &PgPool) -> Result<Vec<Self>> {
        DB::find_all(pool).await
    }

    #[tracing::instrument(skip(pool), fields(model = "Product"))]
    pub async fn find_featured<DB: ProductRepository>(pool: &PgPool) -> Result<Vec<Self>> {
        DB::find_featured(pool).await
    }

    #[tracing::instrument(skip(pool), fields(model = "Product"))]
    pub async fn find_by_id<DB: ProductRepository>(id: Uuid, pool: &PgPool) -> Result<Self> {
        DB::find_by_id(id, pool)
            .await?
            .ok_or_else(|| StoreError::NotFound("Product not found".to_owned()))
    }

    #[tracing::instrument(skip(pool), fields(model = "Product"))]
    pub async fn find_by_category<DB: ProductRepository>(
        category: &str,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        DB::find_by_category(category, pool).await
    }

    #[tracing::instrument(skip(pool), fields(model = "Product"))]
    pub async fn find_recommended<DB: ProductRepository>(pool: &PgPool) -> Result<Vec<Self>> {
        DB::find_random(RECOMMENDATION_COUNT, pool).await
    }

    #[tracing::instrument(skip(pool, input), fields(model = "Product"))]
    pub async fn create<DB: ProductRepository>(input: ProductInput, pool: &PgPool) -> Result<Self> {
        let product = NewProduct::try_from(input)?;
        DB::create(Uuid::new_v4(), product, pool).await
    }

    #[tracing::instrument(skip(pool, input), fields(model = "Product"))]
    pub async fn update<DB: ProductRepository>(
        id: Uuid,
        input: ProductInput,
        pool: &PgPool,
    ) -> Result<Self> {
        let product = NewProduct::try_from(input)?;
        DB::update(id, product, pool)
            .await?
            .ok_or_else(|| StoreError::NotFound("Product not found".to_owned()))
    }

    #[tracing::instrument(skip(pool), fields(model = "Product"))]
    pub async fn toggle_featured<DB: ProductRepository>(id: Uuid, pool: &PgPool) -> Result<Self> {
        DB::toggle_featured(id, pool)
            .await?
            .ok_or_else(|| StoreError::NotFound("Product not found".to_owned()))
    }

    #[tracing::instrument(skip(pool), fields(model = "Product"))]
    pub async fn delete<DB: ProductRepository>(id: Uuid, pool: &PgPool) -> Result<()> {
        if DB::delete(id, pool).await? {
            return Ok(());
        }
        Err(StoreError::NotFound("Product not found".to_owned()))
    }
}
