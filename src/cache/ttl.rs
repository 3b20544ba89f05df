//! Generic expiring cache built on Moka

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache;
use moka::ops::compute::Op;
use moka::Expiry;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};

/// A stored value together with its absolute expiry
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn new(value: V, now: Instant, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: now + ttl,
            ttl,
        }
    }

    /// An entry is dead from the instant its TTL has fully elapsed
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Lets Moka evict each entry after its own TTL instead of a cache-wide one
struct EntryExpiry;

impl<V> Expiry<String, CacheEntry<V>> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Concurrency-safe key/value cache where every entry carries its own TTL.
///
/// Expiry is decided against the injected [`Clock`] on every read, so an
/// entry past its deadline is never returned even if Moka has not evicted it
/// yet. Cloning is cheap and clones share storage.
#[derive(Clone)]
pub struct TtlCache<V> {
    inner: Cache<String, CacheEntry<V>>,
    clock: Arc<dyn Clock>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache holding at most `capacity` entries
    pub fn new(capacity: u64) -> Self {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    pub fn with_clock(capacity: u64, clock: Arc<dyn Clock>) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .expire_after(EntryExpiry)
            .support_invalidation_closures()
            .build();

        Self { inner, clock }
    }

    /// Store `value` under `key` for `ttl`, replacing any previous entry
    pub async fn set(&self, key: &str, value: V, ttl: Duration) {
        let entry = CacheEntry::new(value, self.clock.now(), ttl);
        self.inner.insert(key.to_string(), entry).await;
        debug!("Cached value for key: {} with TTL: {:?}", key, ttl);
    }

    /// Get a live value. Expired entries read as absent and are dropped.
    pub async fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let entry = self.inner.get(key).await?;

        if !entry.is_expired_at(now) {
            return Some(entry.value);
        }

        // Only drop the entry we saw; a concurrent `set` may have replaced it.
        self.inner
            .entry_by_ref(key)
            .and_compute_with(|current| {
                let op = match current {
                    Some(current) if current.value().is_expired_at(now) => Op::Remove,
                    _ => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;

        debug!("Expired entry for key: {}", key);
        None
    }

    /// Remove `key` if present
    pub async fn delete(&self, key: &str) {
        self.inner.invalidate(key).await;
        debug!("Invalidated key: {}", key);
    }

    /// Return the live value for `key`, or run `init` and cache its output.
    ///
    /// Concurrent callers missing on the same key share one `init` future.
    /// If it fails every waiter gets the same error and nothing is stored.
    pub async fn get_or_try_insert_with<F, E>(
        &self,
        key: &str,
        ttl: Duration,
        init: F,
    ) -> Result<V, Arc<E>>
    where
        F: Future<Output = Result<V, E>>,
        E: Send + Sync + 'static,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let clock = self.clock.clone();
        let entry = self
            .inner
            .try_get_with(key.to_string(), async move {
                let value = init.await?;
                Ok(CacheEntry::new(value, clock.now(), ttl))
            })
            .await?;

        Ok(entry.value)
    }

    /// Drop every entry whose TTL has elapsed
    pub async fn purge_expired(&self) {
        let now = self.clock.now();
        if let Err(e) = self
            .inner
            .invalidate_entries_if(move |_, entry| entry.is_expired_at(now))
        {
            warn!("Failed to schedule expired entry purge: {}", e);
            return;
        }
        self.inner.run_pending_tasks().await;
    }

    /// Approximate number of stored entries, expired ones included
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Periodically purge expired entries until `shutdown` is cancelled
pub fn spawn_sweeper<V>(
    cache: TtlCache<V>,
    every: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    let every = if every.is_zero() {
        warn!("Cache sweep interval is zero, using {:?}", MIN_SWEEP_INTERVAL);
        MIN_SWEEP_INTERVAL
    } else {
        every
    };

    tokio::spawn(async move {
        info!("Starting cache sweeper with interval: {:?}", every);
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    cache.purge_expired().await;
                    debug!("Cache sweep finished, {} entries remain", cache.entry_count());
                }
                _ = shutdown.cancelled() => {
                    info!("Shutting down cache sweeper");
                    break;
                }
            }
        }
    })
}
