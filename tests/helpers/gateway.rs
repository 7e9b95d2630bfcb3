use async_trait::async_trait;
use std::{collections::HashMap, sync::Mutex};
use uuid::Uuid;

use storefront::payments::{
    CheckoutSession, CheckoutSessionRequest, PaymentError, PaymentGateway,
};

/// Payment provider double that keeps sessions in memory
#[derive(Default)]
pub struct TestGateway {
    sessions: Mutex<HashMap<String, CheckoutSession>>,
    coupons: Mutex<Vec<i32>>,
}

impl TestGateway {
    /// Marks a session paid with the given charged total in minor units
    pub fn mark_paid(&self, session_id: &str, amount_total: i64) {
        if let Some(session) = self.sessions.lock().unwrap().get_mut(session_id) {
            session.payment_status = "paid".to_owned();
            session.amount_total = Some(amount_total);
        }
    }

    pub fn session(&self, session_id: &str) -> Option<CheckoutSession> {
        self.sessions.lock().unwrap().get(session_id).cloned()
    }

    pub fn coupons(&self) -> Vec<i32> {
        self.coupons.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for TestGateway {
    async fn create_percent_off_coupon(&self, percent_off: i32) -> Result<String, PaymentError> {
        self.coupons.lock().unwrap().push(percent_off);
        Ok(format!("coupon_{}", Uuid::new_v4().simple()))
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let session = CheckoutSession {
            id: format!("cs_test_{}", Uuid::new_v4().simple()),
            payment_status: "unpaid".to_owned(),
            amount_total: None,
            metadata: request.metadata.clone(),
        };
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        self.session(session_id).ok_or_else(|| PaymentError::Provider {
            code: "resource_missing".to_owned(),
            message: format!("No such checkout.session: '{}'", session_id),
        })
    }
}
