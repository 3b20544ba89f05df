pub mod abi;
pub mod client;
pub mod ledger;

// Re-exports for convenience
pub use client::{EvmRpcClient, LedgerError};
pub use ledger::LedgerQuery;
