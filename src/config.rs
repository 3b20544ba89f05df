// Configuration for:
// - Server listening address/port
// - Upstream node RPC endpoint and staking contract
// - Upstream timeout, rate limit and retries
// - Cache settings (size, TTL, sweep interval)
// - Payment link provider

use dotenv::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// How long a fetched stake history is served from memory
pub const DEFAULT_CACHE_TTL_SECS: u64 = 6 * 60;

pub const MIN_SWEEP_INTERVAL_SECS: u64 = 1;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub rpc_url: String,
    pub contract_address: String,
    pub rpc_timeout_secs: u64,
    pub rpc_rate_limit: Option<u32>,
    pub rpc_max_retries: usize,
    pub cache_ttl: Duration,
    pub cache_max_capacity: u64,
    pub cache_sweep_interval: Duration,
    pub cors_origin: Option<String>,
    pub cryptapi_base_url: String,
    pub cryptapi_coin: String,
    pub callback_url: String,
    pub payout_address: String,
}

fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let server_port = parse_or("SERVER_PORT", 8080);
        let rpc_url = env::var("RPC_URL")
            .unwrap_or_else(|_| "https://polygon-rpc.com".to_string());
        let contract_address = env::var("CONTRACT_ADDRESS").unwrap_or_default();
        let rpc_timeout_secs = parse_or("RPC_TIMEOUT_SECS", 30);
        let rpc_rate_limit = env::var("RPC_RATE_LIMIT")
            .map(|v| v.parse().ok())
            .unwrap_or(None);
        let rpc_max_retries = parse_or("RPC_MAX_RETRIES", 3);
        let cache_ttl = Duration::from_secs(parse_or("CACHE_TTL", DEFAULT_CACHE_TTL_SECS));
        let cache_max_capacity = parse_or("CACHE_MAX_CAPACITY", 10_000);
        // A zero period would make the sweeper's ticker panic
        let cache_sweep_interval = Duration::from_secs(
            parse_or("CACHE_SWEEP_INTERVAL_SECS", 60).max(MIN_SWEEP_INTERVAL_SECS),
        );
        let cors_origin = non_empty("CORS_ORIGIN");
        let cryptapi_base_url = env::var("CRYPTAPI_BASE_URL")
            .unwrap_or_else(|_| "https://api.cryptapi.io".to_string());
        let cryptapi_coin = env::var("CRYPTAPI_COIN").unwrap_or_else(|_| "polygon/matic".to_string());
        let callback_url = env::var("CALLBACK_URL").unwrap_or_default();
        let payout_address = non_empty("PAYOUT_ADDRESS").unwrap_or_else(|| contract_address.clone());

        Self {
            server_host,
            server_port,
            rpc_url,
            contract_address,
            rpc_timeout_secs,
            rpc_rate_limit,
            rpc_max_retries,
            cache_ttl,
            cache_max_capacity,
            cache_sweep_interval,
            cors_origin,
            cryptapi_base_url,
            cryptapi_coin,
            callback_url,
            payout_address,
        }
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    /// Listen address in `host:port` form
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
