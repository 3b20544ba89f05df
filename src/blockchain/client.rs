use crate::blockchain::abi::{
    self, AbiError, USER_STAKE_HISTORY_SELECTOR, USER_TOTAL_SELECTOR,
};
use crate::blockchain::ledger::LedgerQuery;
use crate::config::Config;
use crate::models::PaymentRecord;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::Deserialize;
use serde_json::json;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// JSON-RPC code nodes use for "limit exceeded"
const RPC_LIMIT_EXCEEDED: i64 = -32005;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Malformed response: {0}")]
    Decode(#[from] AbiError),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Upstream call timed out after {0:?}")]
    Timeout(Duration),
}

impl LedgerError {
    /// Whether trying the same call again could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            LedgerError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error() || s.as_u16() == 429)
            }
            LedgerError::Rpc { code, .. } => *code == RPC_LIMIT_EXCEEDED,
            _ => false,
        }
    }
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Read-only client for the staking contract over JSON-RPC `eth_call`
pub struct EvmRpcClient {
    http_client: reqwest::Client,
    rpc_url: String,
    contract: Address,
    limiter: Option<DefaultDirectRateLimiter>,
    max_retries: usize,
}

impl EvmRpcClient {
    pub fn new(config: &Config) -> Result<Self, LedgerError> {
        let contract = Address::from_str(config.contract_address.trim())
            .map_err(|_| LedgerError::InvalidAddress(config.contract_address.clone()))?;

        let http_client = reqwest::Client::builder()
            .timeout(config.rpc_timeout())
            .build()?;

        let limiter = config
            .rpc_rate_limit
            .and_then(NonZeroU32::new)
            .map(|rate| RateLimiter::direct(Quota::per_second(rate)));

        info!(
            "Initializing EVM client with RPC endpoint: {}, contract: {}, rate limit: {:?}",
            config.rpc_url, contract, config.rpc_rate_limit
        );

        Ok(Self {
            http_client,
            rpc_url: config.rpc_url.clone(),
            contract,
            limiter,
            max_retries: config.rpc_max_retries,
        })
    }

    /// Single `eth_call` attempt against the latest block
    async fn call_once(&self, data: &str) -> Result<Vec<u8>, LedgerError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let request = json!({
            "jsonrpc": "2.0",
            "method": "eth_call",
            "params": [
                { "to": self.contract.to_string(), "data": data },
                "latest"
            ],
            "id": 1
        });

        let response: RpcResponse = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(LedgerError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = response.result.unwrap_or_default();
        Ok(abi::decode_hex(&result)?)
    }

    /// `eth_call` with exponential backoff on transient failures
    async fn eth_call(&self, data: String) -> Result<Vec<u8>, LedgerError> {
        let attempt = || async { self.call_once(&data).await };

        attempt
            .retry(ExponentialBuilder::default().with_max_times(self.max_retries))
            .when(LedgerError::is_transient)
            .notify(|err: &LedgerError, dur: Duration| {
                warn!("eth_call failed, retrying in {:?}: {}", dur, err);
            })
            .await
    }
}

#[async_trait]
impl LedgerQuery for EvmRpcClient {
    async fn fetch_history(&self, address: Address) -> Result<Vec<PaymentRecord>, LedgerError> {
        let data = abi::encode_address_call(USER_STAKE_HISTORY_SELECTOR, &address);
        let raw = self.eth_call(data).await?;
        let payments = abi::decode_payments(&raw)?;
        debug!("Fetched {} stake payments for {}", payments.len(), address);
        Ok(payments)
    }

    async fn fetch_total(&self, address: Address) -> Result<U256, LedgerError> {
        let data = abi::encode_address_call(USER_TOTAL_SELECTOR, &address);
        let raw = self.eth_call(data).await?;
        Ok(abi::decode_uint(&raw)?)
    }
}
