//! Payment link and QR code generation for new stakes

pub mod cryptapi;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub use cryptapi::CryptApiClient;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment provider rejected the request: {0}")]
    Provider(String),

    #[error("Invalid payment value: {0}")]
    InvalidValue(String),
}

/// Produces a payment address/QR bundle for a stake of `value`
#[async_trait]
pub trait PaymentLinkGenerator: Send + Sync {
    async fn generate_payment_link(&self, value: &str) -> Result<Map<String, Value>, PaymentError>;
}
