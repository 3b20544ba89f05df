pub mod api;
pub mod blockchain;
pub mod cache;
pub mod config;
pub mod models;
pub mod payment;
pub mod service;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience if desired
pub use api::error::ApiError;
pub use api::response::ApiResponse;
pub use api::route::{create_router, HistoryQuery, PaymentQuery};
pub use blockchain::{EvmRpcClient, LedgerError, LedgerQuery};
pub use cache::{CacheKey, HistoryCache, TtlCache};
pub use models::PaymentRecord;
pub use service::{PageOutcome, StakeError, StakeService};
pub use validation::{parse_page, parse_page_size, validate_evm_address};
