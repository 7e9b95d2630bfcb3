use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as, FromRow, PgPool};
use uuid::Uuid;

use crate::{
    models::{Coupon, NewCoupon},
    Result,
};

#[async_trait]
pub trait CouponRepository {
    async fn find_by_customer(customer_id: Uuid, pool: &PgPool) -> Result<Option<Coupon>>;
    /// An active coupon with this code owned by the customer, expired or not
    async fn find_active(code: &str, customer_id: Uuid, pool: &PgPool) -> Result<Option<Coupon>>;
    async fn deactivate(code: &str, customer_id: Uuid, pool: &PgPool) -> Result<()>;
    /// Deletes the customer's current coupon, if any, and stores `coupon`
    async fn replace_for_customer(coupon: NewCoupon, pool: &PgPool) -> Result<Coupon>;
}

pub struct CouponDatabase;

#[derive(FromRow)]
struct CouponRow {
    id: Uuid,
    code: String,
    discount_percentage: i32,
    expiration_date: DateTime<Utc>,
    is_active: bool,
    customer_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<CouponRow> for Coupon {
    fn from(row: CouponRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            discount_percentage: row.discount_percentage,
            expiration_date: row.expiration_date,
            is_active: row.is_active,
            customer_id: row.customer_id,
            created_at: row.created_at,
        }
    }
}

const COUPON_COLUMNS: &str =
    "id, code, discount_percentage, expiration_date, is_active, customer_id, created_at";

#[async_trait]
impl CouponRepository for CouponDatabase {
    #[tracing::instrument(skip(pool), fields(repository = "coupon"))]
    async fn find_by_customer(customer_id: Uuid, pool: &PgPool) -> Result<Option<Coupon>> {
        let sql = format!("SELECT {} FROM coupons WHERE customer_id = $1", COUPON_COLUMNS);
        let row = query_as::<_, CouponRow>(&sql)
            .bind(customer_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Coupon::from))
    }

    #[tracing::instrument(skip(pool), fields(repository = "coupon"))]
    async fn find_active(code: &str, customer_id: Uuid, pool: &PgPool) -> Result<Option<Coupon>> {
        let sql = format!(
            "SELECT {} FROM coupons WHERE code = $1 AND customer_id = $2 AND is_active",
            COUPON_COLUMNS
        );
        let row = query_as::<_, CouponRow>(&sql)
            .bind(code)
            .bind(customer_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Coupon::from))
    }

    #[tracing::instrument(skip(pool), fields(repository = "coupon"))]
    async fn deactivate(code: &str, customer_id: Uuid, pool: &PgPool) -> Result<()> {
        query("UPDATE coupons SET is_active = FALSE WHERE code = $1 AND customer_id = $2")
            .bind(code)
            .bind(customer_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(coupon, pool), fields(repository = "coupon", customer_id = %coupon.customer_id))]
    async fn replace_for_customer(coupon: NewCoupon, pool: &PgPool) -> Result<Coupon> {
        let mut tx = pool.begin().await?;

        query("DELETE FROM coupons WHERE customer_id = $1")
            .bind(coupon.customer_id)
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            r#"
            INSERT INTO coupons (id, code, discount_percentage, expiration_date, customer_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            COUPON_COLUMNS
        );
        let row = query_as::<_, CouponRow>(&sql)
            .bind(coupon.id)
            .bind(&coupon.code)
            .bind(coupon.discount_percentage)
            .bind(coupon.expiration_date)
            .bind(coupon.customer_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.into())
    }
}
