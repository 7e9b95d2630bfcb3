use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query_as, types::Json, FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

use crate::{
    models::{NewOrder, Order, OrderLine},
    Result,
};

#[async_trait]
pub trait OrderRepository {
    async fn find_by_session_id(session_id: &str, pool: &PgPool) -> Result<Option<Order>>;
    /// Inserts the order, returning `None` when one already exists for the
    /// same checkout session
    async fn create(order: NewOrder, pool: &PgPool) -> Result<Option<Order>>;
}

pub struct OrderDatabase;

#[derive(FromRow)]
struct OrderRow {
    id: Uuid,
    customer_id: Uuid,
    products: Json<Vec<OrderLine>>,
    total_amount: f64,
    stripe_session_id: String,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            customer_id: row.customer_id,
            products: row.products.0,
            total_amount: row.total_amount,
            stripe_session_id: row.stripe_session_id,
            created_at: row.created_at,
        }
    }
}

const ORDER_COLUMNS: &str =
    "id, customer_id, products, total_amount, stripe_session_id, created_at";

#[async_trait]
impl OrderRepository for OrderDatabase {
    #[tracing::instrument(skip(pool), fields(repository = "order"))]
    async fn find_by_session_id(session_id: &str, pool: &PgPool) -> Result<Option<Order>> {
        let sql = format!(
            "SELECT {} FROM orders WHERE stripe_session_id = $1",
            ORDER_COLUMNS
        );
        let row = query_as::<_, OrderRow>(&sql)
            .bind(session_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Order::from))
    }

    #[tracing::instrument(skip(order, pool), fields(repository = "order", id = %order.id))]
    async fn create(order: NewOrder, pool: &PgPool) -> Result<Option<Order>> {
        let sql = format!(
            r#"
            INSERT INTO orders (id, customer_id, products, total_amount, stripe_session_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );
        let result = query_as::<_, OrderRow>(&sql)
            .bind(order.id)
            .bind(order.customer_id)
            .bind(Json(&order.products))
            .bind(order.total_amount)
            .bind(&order.stripe_session_id)
            .fetch_one(pool)
            .await;

        match result {
            Ok(row) => Ok(Some(row.into())),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                warn!(session_id = %order.stripe_session_id, "duplicate order insert rejected");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
