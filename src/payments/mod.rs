//! Hosted checkout collaborator.
//!
//! The storefront never touches card data: it asks the provider for a
//! checkout session, redirects the customer there, and later reads the
//! session back to learn whether it was paid.

mod stripe;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub use stripe::StripeGateway;

pub const PAYMENT_STATUS_PAID: &str = "paid";

#[derive(Debug, Error, PartialEq)]
pub enum PaymentError {
    #[error("payment provider rejected the request: {code}: {message}")]
    Provider { code: String, message: String },

    #[error("failed to reach the payment provider: {0}")]
    Transport(String),

    #[error("payment provider returned an unexpected body: {0}")]
    MalformedResponse(String),
}

/// One priced line on the hosted checkout page
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub name: String,
    pub image: Option<String>,
    /// Price of a single unit in minor currency units
    pub unit_amount: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSessionRequest {
    pub currency: String,
    pub line_items: Vec<LineItem>,
    pub success_url: String,
    pub cancel_url: String,
    /// Provider-side coupon ids to apply to the session
    pub discounts: Vec<String>,
    pub metadata: HashMap<String, String>,
}

/// The provider's record of a checkout session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub payment_status: String,
    /// Charged total in minor currency units, absent until the session is priced
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Provider session ids are plain `[A-Za-z0-9_]` tokens and end up in a URL path
pub fn is_valid_session_id(session_id: &str) -> bool {
    !session_id.is_empty()
        && session_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

impl CheckoutSession {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PAYMENT_STATUS_PAID
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a single-use percent-off coupon and returns its provider id
    async fn create_percent_off_coupon(&self, percent_off: i32) -> Result<String, PaymentError>;

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, PaymentError>;
}
