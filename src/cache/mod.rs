pub mod clock;
pub mod keys;
pub mod ttl;

use std::sync::Arc;

use crate::{config::Config, models::PaymentRecord};

pub use clock::{Clock, ManualClock, SystemClock};
pub use keys::CacheKey;
pub use ttl::{spawn_sweeper, CacheEntry, TtlCache};

/// Sorted stake history of a single wallet, shared between readers
pub type HistoryCache = TtlCache<Arc<Vec<PaymentRecord>>>;

pub fn init_cache(config: &Config) -> HistoryCache {
    TtlCache::new(config.cache_max_capacity)
}
