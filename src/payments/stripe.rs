use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::{
    configuration::PaymentSettings,
    payments::{
        is_valid_session_id, CheckoutSession, CheckoutSessionRequest, PaymentError,
        PaymentGateway,
    },
};

/// Stripe client speaking the form-encoded REST API
#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
    api_base_url: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct StripeCoupon {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl StripeGateway {
    pub fn new(settings: &PaymentSettings) -> Result<Self, PaymentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PaymentError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_owned(),
            secret_key: settings.stripe_secret_key.clone(),
        })
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, PaymentError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;
        debug!(status = %status, "stripe responded");

        if status.is_success() {
            return serde_json::from_str(&body)
                .map_err(|e| PaymentError::MalformedResponse(e.to_string()));
        }

        let (code, message) = match serde_json::from_str::<StripeErrorBody>(&body) {
            Ok(StripeErrorBody { error }) => (
                error
                    .code
                    .or(error.kind)
                    .unwrap_or_else(|| status.as_u16().to_string()),
                error.message.unwrap_or_else(|| body.clone()),
            ),
            Err(_) => (status.as_u16().to_string(), body),
        };
        error!(code = %code, message = %message, "stripe request failed");
        Err(PaymentError::Provider { code, message })
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[tracing::instrument(skip(self))]
    async fn create_percent_off_coupon(&self, percent_off: i32) -> Result<String, PaymentError> {
        let form = [
            ("percent_off".to_owned(), percent_off.to_string()),
            ("duration".to_owned(), "once".to_owned()),
        ];
        let response = self
            .client
            .post(format!("{}/coupons", self.api_base_url))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;
        let coupon: StripeCoupon = Self::parse(response).await?;
        info!(coupon_id = %coupon.id, "created stripe coupon");
        Ok(coupon.id)
    }

    #[tracing::instrument(skip(self, request), fields(lines = request.line_items.len()))]
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.api_base_url))
            .bearer_auth(&self.secret_key)
            .form(&encode_checkout_session(request))
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;
        let session: CheckoutSession = Self::parse(response).await?;
        info!(session_id = %session.id, "created stripe checkout session");
        Ok(session)
    }

    #[tracing::instrument(skip(self))]
    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        if !is_valid_session_id(session_id) {
            return Err(PaymentError::Provider {
                code: "invalid_session_id".to_owned(),
                message: format!("Invalid checkout session id: {:?}", session_id),
            });
        }
        let response = self
            .client
            .get(format!(
                "{}/checkout/sessions/{}",
                self.api_base_url, session_id
            ))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;
        Self::parse(response).await
    }
}

/// Flattens a session request into Stripe's bracketed form keys
fn encode_checkout_session(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_owned(), "payment".to_owned()),
        ("payment_method_types[0]".to_owned(), "card".to_owned()),
        ("success_url".to_owned(), request.success_url.clone()),
        ("cancel_url".to_owned(), request.cancel_url.clone()),
    ];

    for (i, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{}]", i);
        form.push((
            format!("{}[price_data][currency]", prefix),
            request.currency.clone(),
        ));
        form.push((
            format!("{}[price_data][product_data][name]", prefix),
            item.name.clone(),
        ));
        if let Some(image) = &item.image {
            form.push((
                format!("{}[price_data][product_data][images][0]", prefix),
                image.clone(),
            ));
        }
        form.push((
            format!("{}[price_data][unit_amount]", prefix),
            item.unit_amount.to_string(),
        ));
        form.push((format!("{}[quantity]", prefix), item.quantity.to_string()));
    }

    for (i, coupon) in request.discounts.iter().enumerate() {
        form.push((format!("discounts[{}][coupon]", i), coupon.clone()));
    }

    let mut metadata: Vec<_> = request.metadata.iter().collect();
    metadata.sort();
    for (key, value) in metadata {
        form.push((format!("metadata[{}]", key), value.clone()));
    }

    form
}
