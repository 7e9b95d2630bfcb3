use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    database::{CouponRepository, CustomerRepository, OrderRepository},
    models::checkout::{PurchasedProduct, METADATA_COUPON_CODE, METADATA_PRODUCTS, METADATA_USER_ID},
    payments::{CheckoutSession, PaymentGateway},
    Result, StoreError,
};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OrderLine {
    pub product: Uuid,
    pub quantity: i64,
    pub price: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "user")]
    pub customer_id: Uuid,
    pub products: Vec<OrderLine>,
    pub total_amount: f64,
    pub stripe_session_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub products: Vec<OrderLine>,
    pub total_amount: f64,
    pub stripe_session_id: String,
}

/// What confirming a checkout session came to
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    /// The provider hasn't marked the session as paid yet, nothing was written
    NotPaid { payment_status: String },
    Created(Order),
    /// An order already exists for the session, it's returned untouched
    AlreadyExists(Order),
}

impl Confirmation {
    pub fn order(&self) -> Option<&Order> {
        match self {
            Confirmation::NotPaid { .. } => None,
            Confirmation::Created(order) | Confirmation::AlreadyExists(order) => Some(order),
        }
    }
}

impl Order {
    /// Finalizes a paid checkout session into exactly one order.
    ///
    /// Everything written is derived from the provider's copy of the session,
    /// the request only names which session to look at.
    #[tracing::instrument(skip(gateway, pool), fields(model = "Order"))]
    pub async fn confirm_payment<O, C, U>(
        session_id: &str,
        gateway: &dyn PaymentGateway,
        pool: &PgPool,
    ) -> Result<Confirmation>
    where
        O: OrderRepository,
        C: CouponRepository,
        U: CustomerRepository,
    {
        let session = gateway.retrieve_checkout_session(session_id).await?;
        if !session.is_paid() {
            info!(payment_status = %session.payment_status, "session is not paid yet");
            return Ok(Confirmation::NotPaid {
                payment_status: session.payment_status,
            });
        }

        if let Some(order) = O::find_by_session_id(&session.id, pool).await? {
            return Ok(Confirmation::AlreadyExists(order));
        }

        let customer_id = customer_from_metadata(&session)?;
        if !U::exists(customer_id, pool).await? {
            return Err(StoreError::BadRequest("User not found".to_owned()));
        }

        if let Some(code) = session
            .metadata
            .get(METADATA_COUPON_CODE)
            .filter(|code| !code.is_empty())
        {
            C::deactivate(code, customer_id, pool).await?;
        }

        let new_order = NewOrder {
            id: Uuid::new_v4(),
            customer_id,
            products: lines_from_metadata(&session)?,
            total_amount: session.amount_total.unwrap_or_default() as f64 / 100.0,
            stripe_session_id: session.id.clone(),
        };

        match O::create(new_order, pool).await? {
            Some(order) => {
                info!(order_id = %order.id, "order created");
                Ok(Confirmation::Created(order))
            }
            None => {
                // a concurrent confirmation won the insert
                warn!("order for session was created concurrently");
                O::find_by_session_id(&session.id, pool)
                    .await?
                    .map(Confirmation::AlreadyExists)
                    .ok_or(StoreError::UnexpectedError)
            }
        }
    }

    #[tracing::instrument(skip(pool), fields(model = "Order"))]
    pub async fn find_by_session_id<DB: OrderRepository>(
        session_id: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        DB::find_by_session_id(session_id, pool).await
    }
}

fn customer_from_metadata(session: &CheckoutSession) -> Result<Uuid> {
    session
        .metadata
        .get(METADATA_USER_ID)
        .and_then(|id| Uuid::parse_str(id).ok())
        .ok_or_else(|| {
            warn!(session_id = %session.id, "session metadata carries no valid user id");
            StoreError::MalformedData
        })
}

fn lines_from_metadata(session: &CheckoutSession) -> Result<Vec<OrderLine>> {
    let raw = session
        .metadata
        .get(METADATA_PRODUCTS)
        .ok_or(StoreError::MalformedData)?;
    let purchased: Vec<PurchasedProduct> = serde_json::from_str(raw)?;
    Ok(purchased
        .into_iter()
        .map(|p| OrderLine {
            product: p.id,
            quantity: p.quantity,
            price: p.price,
        })
        .collect())
}
