pub mod service_tests;

use crate::{
    blockchain::{LedgerError, LedgerQuery},
    models::PaymentRecord,
    payment::{PaymentError, PaymentLinkGenerator},
};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const WALLET: &str = "0x52908400098527886e0f7030069857d2e4169ee7";
pub const EMPTY_WALLET: &str = "0xde709f2102306220921060314715629080e2fb77";

pub fn wallet() -> Address {
    WALLET.parse().unwrap()
}

pub fn empty_wallet() -> Address {
    EMPTY_WALLET.parse().unwrap()
}

/// Payment from a sender made of `tag` bytes, at `time`
pub fn record(tag: u8, time: u64) -> PaymentRecord {
    PaymentRecord::new(Address::repeat_byte(tag), U256::from(100u64 * tag as u64), U256::from(time))
}

/// `count` payments with distinct senders, oldest first
pub fn ascending_records(count: usize) -> Vec<PaymentRecord> {
    (0..count).map(|i| record(i as u8 + 1, 1_000 + i as u64)).collect()
}

/// In-memory ledger that counts upstream calls
#[derive(Default)]
pub struct FakeLedger {
    histories: Mutex<HashMap<Address, Vec<PaymentRecord>>>,
    totals: Mutex<HashMap<Address, U256>>,
    failing: AtomicBool,
    delay: Mutex<Duration>,
    history_calls: AtomicUsize,
    total_calls: AtomicUsize,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(self, address: Address, records: Vec<PaymentRecord>) -> Self {
        self.histories.lock().unwrap().insert(address, records);
        self
    }

    pub fn with_total(self, address: Address, total: u64) -> Self {
        self.totals.lock().unwrap().insert(address, U256::from(total));
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = delay;
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) -> Result<(), LedgerError> {
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(LedgerError::Rpc {
                code: -32000,
                message: "execution reverted".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerQuery for FakeLedger {
    async fn fetch_history(&self, address: Address) -> Result<Vec<PaymentRecord>, LedgerError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await?;
        Ok(self
            .histories
            .lock()
            .unwrap()
            .get(&address)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_total(&self, address: Address) -> Result<U256, LedgerError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await?;
        Ok(self
            .totals
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .unwrap_or(U256::ZERO))
    }
}

/// Payment provider stand-in; the value "fail" makes it error
pub struct FakePayments;

#[async_trait]
impl PaymentLinkGenerator for FakePayments {
    async fn generate_payment_link(&self, value: &str) -> Result<Map<String, Value>, PaymentError> {
        if value == "fail" {
            return Err(PaymentError::Provider("provider unavailable".to_string()));
        }
        let mut link = Map::new();
        link.insert("address_in".to_string(), Value::String("0xdeposit".to_string()));
        link.insert("value".to_string(), Value::String(value.to_string()));
        Ok(link)
    }
}
