//! Upstream ledger capability consumed by the stake service

use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use crate::blockchain::client::LedgerError;
use crate::models::PaymentRecord;

/// Read access to stake data held on chain.
///
/// `fetch_history` makes no promise about the order of the returned records.
#[async_trait]
pub trait LedgerQuery: Send + Sync {
    async fn fetch_history(&self, address: Address) -> Result<Vec<PaymentRecord>, LedgerError>;

    async fn fetch_total(&self, address: Address) -> Result<U256, LedgerError>;
}
