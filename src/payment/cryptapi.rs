use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::{PaymentError, PaymentLinkGenerator};
use crate::config::Config;

const QR_SIZE: &str = "300";

/// CryptAPI client: creates a forwarding deposit address, then renders a QR
/// code for the requested amount
pub struct CryptApiClient {
    http_client: reqwest::Client,
    base_url: String,
    coin: String,
    callback_url: String,
    payout_address: String,
}

impl CryptApiClient {
    pub fn new(config: &Config) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.rpc_timeout())
            .build()?;

        info!(
            "Initializing CryptAPI client for coin: {}, base URL: {}",
            config.cryptapi_coin, config.cryptapi_base_url
        );

        Ok(Self {
            http_client,
            base_url: config.cryptapi_base_url.trim_end_matches('/').to_string(),
            coin: config.cryptapi_coin.clone(),
            callback_url: config.callback_url.clone(),
            payout_address: config.payout_address.clone(),
        })
    }

    async fn get_json(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Map<String, Value>, PaymentError> {
        let url = format!("{}/{}/{}/", self.base_url, self.coin, endpoint);
        let body: Map<String, Value> = self
            .http_client
            .get(&url)
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match body.get("status").and_then(Value::as_str) {
            Some("success") => Ok(body),
            _ => {
                let reason = body
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("unexpected response")
                    .to_string();
                Err(PaymentError::Provider(reason))
            }
        }
    }
}

#[async_trait]
impl PaymentLinkGenerator for CryptApiClient {
    async fn generate_payment_link(&self, value: &str) -> Result<Map<String, Value>, PaymentError> {
        let value = value.trim();
        if value.is_empty() || value.parse::<f64>().map_or(true, |v| !v.is_finite() || v <= 0.0) {
            return Err(PaymentError::InvalidValue(value.to_string()));
        }

        let created = self
            .get_json(
                "create",
                &[("callback", self.callback_url.as_str()), ("address", self.payout_address.as_str())],
            )
            .await?;

        let address_in = created
            .get("address_in")
            .and_then(Value::as_str)
            .ok_or_else(|| PaymentError::Provider("missing address_in".to_string()))?
            .to_string();
        debug!("Created payment address: {}", address_in);

        let qr = self
            .get_json(
                "qrcode",
                &[("address", address_in.as_str()), ("value", value), ("size", QR_SIZE)],
            )
            .await?;

        let mut link = created;
        link.extend(qr);
        link.insert("value".to_string(), Value::String(value.to_string()));
        Ok(link)
    }
}
