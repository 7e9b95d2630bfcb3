use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{configuration::PaymentSettings, database::CouponRepository, Result, StoreError};

const GIFT_CODE_PREFIX: &str = "GIFT";
const GIFT_CODE_SUFFIX_LENGTH: usize = 6;

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub code: String,
    pub discount_percentage: i32,
    pub expiration_date: DateTime<Utc>,
    pub is_active: bool,
    #[serde(rename = "userId")]
    pub customer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCoupon {
    pub id: Uuid,
    pub code: String,
    pub discount_percentage: i32,
    pub expiration_date: DateTime<Utc>,
    pub customer_id: Uuid,
}

impl Coupon {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date < now
    }

    /// The customer's coupon whether active or not, expiry isn't checked here
    #[tracing::instrument(skip(pool), fields(model = "Coupon"))]
    pub async fn find_for_customer<DB: CouponRepository>(
        customer_id: Uuid,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        DB::find_by_customer(customer_id, pool).await
    }

    /// Checks that `code` names an active, unexpired coupon owned by the
    /// customer. An expired coupon is deactivated as a side effect.
    #[tracing::instrument(skip(pool), fields(model = "Coupon"))]
    pub async fn validate<DB: CouponRepository>(
        code: &str,
        customer_id: Uuid,
        now: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Self> {
        let coupon = DB::find_active(code, customer_id, pool)
            .await?
            .ok_or_else(|| StoreError::NotFound("Coupon not found".to_owned()))?;

        if coupon.is_expired_at(now) {
            info!(code = %coupon.code, "deactivating expired coupon");
            DB::deactivate(&coupon.code, customer_id, pool).await?;
            return Err(StoreError::CouponExpired);
        }

        Ok(coupon)
    }

    /// Replaces whatever coupon the customer holds with a freshly minted gift
    #[tracing::instrument(skip(pool, settings), fields(model = "Coupon"))]
    pub async fn issue_gift<DB: CouponRepository>(
        customer_id: Uuid,
        settings: &PaymentSettings,
        pool: &PgPool,
    ) -> Result<Self> {
        let coupon = NewCoupon {
            id: Uuid::new_v4(),
            code: generate_gift_code(),
            discount_percentage: settings.gift_coupon_percentage,
            expiration_date: Utc::now() + Duration::days(settings.gift_coupon_valid_days),
            customer_id,
        };
        let coupon = DB::replace_for_customer(coupon, pool).await?;
        info!(code = %coupon.code, "issued gift coupon");
        Ok(coupon)
    }
}

/// `GIFT` followed by six random uppercase alphanumerics
pub fn generate_gift_code() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GIFT_CODE_SUFFIX_LENGTH)
        .map(|c| char::from(c).to_ascii_uppercase())
        .collect();
    format!("{}{}", GIFT_CODE_PREFIX, suffix)
}
