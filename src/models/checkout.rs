//! Turning a client cart into a hosted checkout session.
//!
//! All money math here happens in integer minor units (kopiykas) so that
//! summing many lines never drifts. Prices arrive from the client in major
//! units and are rounded to minor units once, per line.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    configuration::Settings,
    database::CouponRepository,
    models::Coupon,
    payments::{CheckoutSessionRequest, LineItem, PaymentGateway},
    Result, StoreError,
};

pub const METADATA_USER_ID: &str = "userId";
pub const METADATA_COUPON_CODE: &str = "couponCode";
pub const METADATA_PRODUCTS: &str = "products";

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CheckoutProduct {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    /// Unit price in major currency units
    pub price: f64,
    pub image: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub products: Option<Vec<CheckoutProduct>>,
    pub coupon_code: Option<String>,
}

/// The cart snapshot carried through the provider's session metadata, so the
/// order can be rebuilt after the redirect without trusting the client again
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PurchasedProduct {
    pub id: Uuid,
    pub quantity: i64,
    pub price: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOutcome {
    #[serde(rename = "id")]
    pub session_id: String,
    /// Discounted total in major units
    pub total_amount: f64,
    #[serde(skip)]
    pub total_minor_units: i64,
    #[serde(skip)]
    pub gift_coupon_issued: bool,
}

pub fn to_minor_units(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

fn amount_too_large() -> StoreError {
    StoreError::BadRequest("Order total is too large".to_owned())
}

/// Price of a single line in minor units, `None` once it leaves the i64 range
fn line_total(product: &CheckoutProduct) -> Option<i64> {
    let unit = (product.price * 100.0).round();
    if unit >= i64::MAX as f64 {
        return None;
    }
    (unit as i64).checked_mul(product.quantity)
}

/// Sum of `round(price * 100) * quantity` over every line
pub fn pre_discount_total(products: &[CheckoutProduct]) -> Result<i64> {
    products.iter().try_fold(0i64, |total, product| {
        line_total(product)
            .and_then(|line| total.checked_add(line))
            .ok_or_else(amount_too_large)
    })
}

/// Takes `round(total * percentage / 100)` off the total, rounding half up
pub fn apply_discount(total: i64, discount_percentage: i32) -> Result<i64> {
    let discount = total
        .checked_mul(i64::from(discount_percentage))
        .and_then(|scaled| scaled.checked_add(50))
        .ok_or_else(amount_too_large)?
        .div_euclid(100);
    Ok(total - discount)
}

fn validate_products(products: Option<Vec<CheckoutProduct>>) -> Result<Vec<CheckoutProduct>> {
    let products = products
        .filter(|products| !products.is_empty())
        .ok_or_else(|| StoreError::BadRequest("Invalid or empty products array".to_owned()))?;

    if products
        .iter()
        .any(|p| p.quantity < 1 || !p.price.is_finite() || p.price < 0.0)
    {
        return Err(StoreError::BadRequest(
            "Every product needs a positive quantity and a non-negative price".to_owned(),
        ));
    }
    Ok(products)
}

fn build_metadata(
    customer_id: Uuid,
    coupon_code: Option<&str>,
    products: &[CheckoutProduct],
) -> Result<HashMap<String, String>> {
    let snapshot: Vec<PurchasedProduct> = products
        .iter()
        .map(|p| PurchasedProduct {
            id: p.id,
            quantity: p.quantity,
            price: p.price,
        })
        .collect();

    let mut metadata = HashMap::new();
    metadata.insert(METADATA_USER_ID.to_owned(), customer_id.to_string());
    metadata.insert(
        METADATA_COUPON_CODE.to_owned(),
        coupon_code.unwrap_or_default().to_owned(),
    );
    metadata.insert(
        METADATA_PRODUCTS.to_owned(),
        serde_json::to_string(&snapshot)?,
    );
    Ok(metadata)
}

/// Prices the cart, applies the customer's coupon, opens a provider session
/// and, when the charged total crosses the gift threshold, mints a new coupon
#[tracing::instrument(skip(request, gateway, settings, pool), fields(model = "Checkout"))]
pub async fn initialize<C: CouponRepository>(
    customer_id: Uuid,
    request: CheckoutRequest,
    gateway: &dyn PaymentGateway,
    settings: &Settings,
    pool: &PgPool,
) -> Result<CheckoutOutcome> {
    let products = validate_products(request.products)?;
    let coupon_code = request
        .coupon_code
        .map(|code| code.trim().to_owned())
        .filter(|code| !code.is_empty());

    let mut total = pre_discount_total(&products)?;
    let mut discounts = vec![];

    if let Some(code) = &coupon_code {
        match C::find_active(code, customer_id, pool).await? {
            Some(coupon) if !coupon.is_expired_at(Utc::now()) => {
                total = apply_discount(total, coupon.discount_percentage)?;
                let provider_coupon = gateway
                    .create_percent_off_coupon(coupon.discount_percentage)
                    .await?;
                discounts.push(provider_coupon);
            }
            Some(_) => warn!(code = %code, "ignoring expired coupon at checkout"),
            None => warn!(code = %code, "coupon not found for customer"),
        }
    }

    let line_items = products
        .iter()
        .map(|product| LineItem {
            name: product.name.clone(),
            image: product.image.clone(),
            unit_amount: to_minor_units(product.price),
            quantity: product.quantity,
        })
        .collect();

    let client_url = settings.application.client_url.trim_end_matches('/');
    let session_request = CheckoutSessionRequest {
        currency: settings.payments.currency.clone(),
        line_items,
        success_url: format!(
            "{}/purchase-success?session_id={{CHECKOUT_SESSION_ID}}",
            client_url
        ),
        cancel_url: format!("{}/purchase-cancel", client_url),
        discounts,
        metadata: build_metadata(customer_id, coupon_code.as_deref(), &products)?,
    };

    let session = gateway.create_checkout_session(&session_request).await?;

    let gift_coupon_issued = total >= settings.payments.gift_coupon_threshold;
    if gift_coupon_issued {
        Coupon::issue_gift::<C>(customer_id, &settings.payments, pool).await?;
    }

    info!(session_id = %session.id, total, "checkout session created");
    Ok(CheckoutOutcome {
        session_id: session.id,
        total_amount: total as f64 / 100.0,
        total_minor_units: total,
        gift_coupon_issued,
    })
}
