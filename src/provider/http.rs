//! HTTP payment-provider client.

use super::{CheckoutRequest, CheckoutSession, PaymentProvider, ProviderError};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Payment provider reached over its REST API.
#[derive(Debug, Clone)]
pub struct HttpPaymentProvider {
    client: Client,
    base_url: String,
}

impl HttpPaymentProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    async fn post_session(
        &self,
        payload: serde_json::Value,
        idempotency_key: &str,
    ) -> Result<serde_json::Value, ProviderError> {
        let url = format!("{}/v1/checkout/sessions", self.base_url);
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .post(&url)
                .header("Idempotency-Key", idempotency_key)
                .json(&payload)
                .send()
                .await
                .map_err(|e| {
                    backoff::Error::transient(ProviderError::NetworkError(e.to_string()))
                })?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(ProviderError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(ProviderError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(ProviderError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(ProviderError::ParseError(e.to_string())))
        })
        .await
    }
}

#[async_trait]
impl PaymentProvider for HttpPaymentProvider {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, ProviderError> {
        debug!(
            booking = %request.booking_id,
            client = %request.client_uid,
            amount_cents = request.amount_cents,
            "creating checkout session"
        );

        let payload = serde_json::json!({
            "bookingId": request.booking_id.as_str(),
            "clientUid": request.client_uid.as_str(),
            "amountCents": request.amount_cents,
            "currency": request.currency,
            "successUrl": request.success_url,
            "cancelUrl": request.cancel_url,
        });

        let response = self
            .post_session(payload, &request.idempotency_key)
            .await?;

        let session_id = response
            .get("sessionId")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProviderError::ParseError("missing sessionId".to_string()))?
            .to_string();
        let redirect_url = response
            .get("redirectUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProviderError::ParseError("missing redirectUrl".to_string()))?
            .to_string();

        Ok(CheckoutSession {
            session_id,
            redirect_url,
        })
    }
}
