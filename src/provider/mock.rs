//! Mock payment provider for testing without network calls.

use super::{CheckoutRequest, CheckoutSession, PaymentProvider, ProviderError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Mock provider that mints predictable sessions and records every request.
#[derive(Debug, Default)]
pub struct MockPaymentProvider {
    counter: AtomicU64,
    requests: Mutex<Vec<CheckoutRequest>>,
    fail: bool,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every session creation fail with a network error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Requests seen so far, in order.
    pub fn requests(&self) -> Vec<CheckoutRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, ProviderError> {
        if self.fail {
            return Err(ProviderError::NetworkError("mock failure".to_string()));
        }

        self.requests.lock().unwrap().push(request.clone());
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let session_id = format!("cs_test_{}", n);
        Ok(CheckoutSession {
            redirect_url: format!("https://checkout.test/{}", session_id),
            session_id,
        })
    }
}
