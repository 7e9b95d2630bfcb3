use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as, types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::{
    models::{NewProduct, Product, Specification},
    Result,
};

#[async_trait]
pub trait ProductRepository {
    async fn find_all(pool: &PgPool) -> Result<Vec<Product>>;
    async fn find_featured(pool: &PgPool) -> Result<Vec<Product>>;
    async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Product>>;
    async fn find_many(ids: &[Uuid], pool: &PgPool) -> Result<Vec<Product>>;
    async fn find_by_category(category: &str, pool: &PgPool) -> Result<Vec<Product>>;
    async fn find_random(limit: i64, pool: &PgPool) -> Result<Vec<Product>>;
    async fn create(id: Uuid, product: NewProduct, pool: &PgPool) -> Result<Product>;
    async fn update(id: Uuid, product: NewProduct, pool: &PgPool) -> Result<Option<Product>>;
    async fn toggle_featured(id: Uuid, pool: &PgPool) -> Result<Option<Product>>;
    async fn delete(id: Uuid, pool: &PgPool) -> Result<bool>;
}

pub struct ProductDatabase;

#[derive(FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    price: f64,
    images: Vec<String>,
    image: Option<String>,
    category: String,
    is_featured: bool,
    specifications: Json<Vec<Specification>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            images: row.images,
            image: row.image,
            category: row.category,
            is_featured: row.is_featured,
            specifications: row.specifications.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, images, image, category, \
                               is_featured, specifications, created_at, updated_at";

fn into_products(rows: Vec<ProductRow>) -> Vec<Product> {
    rows.into_iter().map(Product::from).collect()
}

#[async_trait]
impl ProductRepository for ProductDatabase {
    #[tracing::instrument(skip(pool), fields(repository = "product"))]
    async fn find_all(pool: &PgPool) -> Result<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products ORDER BY created_at DESC",
            PRODUCT_COLUMNS
        );
        let rows = query_as::<_, ProductRow>(&sql).fetch_all(pool).await?;
        Ok(into_products(rows))
    }

    #[tracing::instrument(skip(pool), fields(repository = "product"))]
    async fn find_featured(pool: &PgPool) -> Result<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE is_featured ORDER BY created_at DESC",
            PRODUCT_COLUMNS
        );
        let rows = query_as::<_, ProductRow>(&sql).fetch_all(pool).await?;
        Ok(into_products(rows))
    }

    #[tracing::instrument(skip(pool), fields(repository = "product"))]
    async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        let row = query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Product::from))
    }

    #[tracing::instrument(skip(pool), fields(repository = "product"))]
    async fn find_many(ids: &[Uuid], pool: &PgPool) -> Result<Vec<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ANY ($1)", PRODUCT_COLUMNS);
        let rows = query_as::<_, ProductRow>(&sql)
            .bind(ids)
            .fetch_all(pool)
            .await?;
        Ok(into_products(rows))
    }

    #[tracing::instrument(skip(pool), fields(repository = "product"))]
    async fn find_by_category(category: &str, pool: &PgPool) -> Result<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE category = $1 ORDER BY created_at DESC",
            PRODUCT_COLUMNS
        );
        let rows = query_as::<_, ProductRow>(&sql)
            .bind(category)
            .fetch_all(pool)
            .await?;
        Ok(into_products(rows))
    }

    #[tracing::instrument(skip(pool), fields(repository = "product"))]
    async fn find_random(limit: i64, pool: &PgPool) -> Result<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products ORDER BY random() LIMIT $1",
            PRODUCT_COLUMNS
        );
        let rows = query_as::<_, ProductRow>(&sql)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        Ok(into_products(rows))
    }

    #[tracing::instrument(skip(product, pool), fields(repository = "product"))]
    async fn create(id: Uuid, product: NewProduct, pool: &PgPool) -> Result<Product> {
        let sql = format!(
            r#"
            INSERT INTO products (id, name, description, price, images, image, category, specifications)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );
        let row = query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(&product.images)
            .bind(&product.image)
            .bind(&product.category)
            .bind(Json(&product.specifications))
            .fetch_one(pool)
            .await?;
        Ok(row.into())
    }

    #[tracing::instrument(skip(product, pool), fields(repository = "product"))]
    async fn update(id: Uuid, product: NewProduct, pool: &PgPool) -> Result<Option<Product>> {
        let sql = format!(
            r#"
            UPDATE products
            SET name = $2, description = $3, price = $4, images = $5, image = $6,
                category = $7, specifications = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );
        let row = query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(&product.images)
            .bind(&product.image)
            .bind(&product.category)
            .bind(Json(&product.specifications))
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Product::from))
    }

    #[tracing::instrument(skip(pool), fields(repository = "product"))]
    async fn toggle_featured(id: Uuid, pool: &PgPool) -> Result<Option<Product>> {
        let sql = format!(
            r#"
            UPDATE products
            SET is_featured = NOT is_featured, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );
        let row = query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Product::from))
    }

    #[tracing::instrument(skip(pool), fields(repository = "product"))]
    async fn delete(id: Uuid, pool: &PgPool) -> Result<bool> {
        let result = query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
