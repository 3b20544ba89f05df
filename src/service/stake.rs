//! Read-through access to stake histories

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::pagination::{paginate, sort_by_time_desc, PageOutcome};
use crate::blockchain::{LedgerError, LedgerQuery};
use crate::cache::{CacheKey, HistoryCache};
use crate::config::Config;
use crate::models::PaymentRecord;

#[derive(Error, Debug)]
pub enum StakeError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Upstream ledger query failed: {0}")]
    Upstream(Arc<LedgerError>),
}

impl From<LedgerError> for StakeError {
    fn from(err: LedgerError) -> Self {
        StakeError::Upstream(Arc::new(err))
    }
}

impl From<Arc<LedgerError>> for StakeError {
    fn from(err: Arc<LedgerError>) -> Self {
        StakeError::Upstream(err)
    }
}

/// Serves stake histories from the cache, filling it from the ledger on a miss.
///
/// Only this type writes history entries into the cache.
#[derive(Clone)]
pub struct StakeService {
    ledger: Arc<dyn LedgerQuery>,
    cache: HistoryCache,
    ttl: Duration,
    upstream_timeout: Duration,
}

impl StakeService {
    pub fn new(
        ledger: Arc<dyn LedgerQuery>,
        cache: HistoryCache,
        ttl: Duration,
        upstream_timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            cache,
            ttl,
            upstream_timeout,
        }
    }

    pub fn from_config(ledger: Arc<dyn LedgerQuery>, cache: HistoryCache, config: &Config) -> Self {
        Self::new(ledger, cache, config.cache_ttl, config.rpc_timeout())
    }

    pub fn cache(&self) -> &HistoryCache {
        &self.cache
    }

    /// One page of `address`'s stakes, most recent first
    pub async fn get_page(
        &self,
        address: &Address,
        page: usize,
        page_size: usize,
    ) -> Result<PageOutcome, StakeError> {
        if page < 1 {
            return Err(StakeError::InvalidParameter("Invalid page number".to_string()));
        }
        if page_size < 1 {
            return Err(StakeError::InvalidParameter("Invalid page size".to_string()));
        }

        let history = self.get_history(address).await?;
        let outcome = paginate(&history, page, page_size);
        debug!(
            "Page {} (size {}) for {}: {} records total",
            page,
            page_size,
            address,
            history.len()
        );
        Ok(outcome)
    }

    /// The full sorted history, fetched at most once per key while cached.
    /// Concurrent misses for one address share a single upstream call.
    pub async fn get_history(&self, address: &Address) -> Result<Arc<Vec<PaymentRecord>>, StakeError> {
        let key = CacheKey::stake_history(&address.to_string()).to_string();

        let history = self
            .cache
            .get_or_try_insert_with(&key, self.ttl, self.load_history(*address))
            .await
            .map_err(|err| {
                warn!("Failed to fetch stake history for {}: {}", address, err);
                StakeError::from(err)
            })?;

        Ok(history)
    }

    async fn load_history(&self, address: Address) -> Result<Arc<Vec<PaymentRecord>>, LedgerError> {
        info!("Cache miss for {}, querying ledger", address);

        let mut records = tokio::time::timeout(self.upstream_timeout, self.ledger.fetch_history(address))
            .await
            .map_err(|_| LedgerError::Timeout(self.upstream_timeout))??;
        sort_by_time_desc(&mut records);

        info!("Cached {} stake records for {} with TTL: {:?}", records.len(), address, self.ttl);
        Ok(Arc::new(records))
    }

    /// Total staked by `address`. Always read from the ledger.
    pub async fn get_total(&self, address: &Address) -> Result<U256, StakeError> {
        let total = tokio::time::timeout(self.upstream_timeout, self.ledger.fetch_total(*address))
            .await
            .map_err(|_| LedgerError::Timeout(self.upstream_timeout))??;
        Ok(total)
    }

    /// Drop the cached history of `address`
    pub async fn invalidate(&self, address: &Address) {
        let key = CacheKey::stake_history(&address.to_string()).to_string();
        self.cache.delete(&key).await;
        info!("Invalidated cached stake history for {}", address);
    }
}
