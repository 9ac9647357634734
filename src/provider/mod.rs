//! Payment-provider abstraction for creating hosted checkout sessions.
//!
//! The provider owns the actual card flow and webhook callbacks; this crate
//! only asks it for a session and stores the returned id.

use crate::domain::{BookingId, UserId};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::fmt;

pub mod http;
pub mod mock;

pub use http::HttpPaymentProvider;
pub use mock::MockPaymentProvider;

/// Inputs for one hosted checkout session, amounts in integer minor units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub booking_id: BookingId,
    pub client_uid: UserId,
    pub amount_cents: i64,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    /// Stable per (booking, client); retries reuse the same session.
    pub idempotency_key: String,
}

/// A created checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub session_id: String,
    pub redirect_url: String,
}

/// Creates hosted checkout sessions.
#[async_trait]
pub trait PaymentProvider: Send + Sync + fmt::Debug {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, ProviderError>;
}

/// Error type for payment-provider operations.
#[derive(Debug, Clone)]
pub enum ProviderError {
    /// Network error (connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error from the provider
    HttpError { status: u16, message: String },
    /// Malformed provider response
    ParseError(String),
    /// Rate limit exceeded
    RateLimited,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            ProviderError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            ProviderError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ProviderError::RateLimited => write!(f, "Rate limited"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Derive the idempotency key for a (booking, client) checkout.
pub fn idempotency_key(booking_id: &BookingId, client_uid: &UserId) -> String {
    let mut hasher = Sha256::new();
    hasher.update(booking_id.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(client_uid.as_str().as_bytes());
    hex::encode(hasher.finalize())
}
