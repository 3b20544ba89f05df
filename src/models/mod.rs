use std::fmt::Display;

use alloy_primitives::{Address, U256};
use serde::{Serialize, Serializer};

/// One stake payment made to the staking contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRecord {
    #[serde(serialize_with = "as_display")]
    pub sender: Address,
    #[serde(serialize_with = "as_display")]
    pub amount: U256,
    /// Block time reported by the contract
    #[serde(serialize_with = "as_display")]
    pub time: U256,
}

impl PaymentRecord {
    pub fn new(sender: Address, amount: U256, time: U256) -> Self {
        Self { sender, amount, time }
    }
}

/// Big integers go out as decimal strings so JSON clients keep full precision.
/// Addresses use their checksummed form.
fn as_display<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

// API response models
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakePage {
    pub status: &'static str,
    pub page: Vec<PaymentRecord>,
    pub page_number: usize,
    pub page_size: usize,
    pub total_records: usize,
}

#[derive(Debug, Serialize)]
pub struct StakeTotal {
    #[serde(serialize_with = "as_display")]
    pub address: Address,
    #[serde(serialize_with = "as_display")]
    pub total: U256,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
}
