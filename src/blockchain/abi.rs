//! Calldata encoding and return-data decoding for the staking contract

use alloy_primitives::{Address, U256};
use thiserror::Error;

use crate::models::PaymentRecord;

/// `userStakeHistory(address) returns ((address,uint256,uint256)[])`
pub const USER_STAKE_HISTORY_SELECTOR: [u8; 4] = [0x5a, 0x48, 0xa1, 0xd9];

/// `userTotal(address) returns (uint256)`
pub const USER_TOTAL_SELECTOR: [u8; 4] = [0xe6, 0x01, 0xcf, 0x44];

const WORD: usize = 32;
const PAYMENT_WORDS: usize = 3;

#[derive(Error, Debug)]
pub enum AbiError {
    #[error("Invalid hex in return data: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Return data too short: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },

    #[error("Offset or length does not fit in memory: {0}")]
    Overflow(String),
}

/// Build `0x`-prefixed calldata for a method taking a single address
pub fn encode_address_call(selector: [u8; 4], address: &Address) -> String {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&selector);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(address.as_slice());
    format!("0x{}", hex::encode(data))
}

pub fn decode_hex(data: &str) -> Result<Vec<u8>, AbiError> {
    let stripped = data.strip_prefix("0x").unwrap_or(data);
    Ok(hex::decode(stripped)?)
}

fn word(data: &[u8], at: usize) -> Result<&[u8], AbiError> {
    let end = at
        .checked_add(WORD)
        .ok_or_else(|| AbiError::Overflow(format!("word at {}", at)))?;
    data.get(at..end).ok_or(AbiError::Truncated {
        needed: end,
        actual: data.len(),
    })
}

/// Read a word used as an offset or length
fn word_as_usize(data: &[u8], at: usize) -> Result<usize, AbiError> {
    let w = word(data, at)?;
    if w[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(AbiError::Overflow(format!("word at {}", at)));
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&w[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(low))
        .map_err(|_| AbiError::Overflow(format!("word at {}", at)))
}

pub fn decode_uint(data: &[u8]) -> Result<U256, AbiError> {
    Ok(U256::from_be_slice(word(data, 0)?))
}

/// Decode a `(address,uint256,uint256)[]` return value
pub fn decode_payments(data: &[u8]) -> Result<Vec<PaymentRecord>, AbiError> {
    let offset = word_as_usize(data, 0)?;
    let len = word_as_usize(data, offset)?;

    let start = offset + WORD;
    let needed = len
        .checked_mul(PAYMENT_WORDS * WORD)
        .and_then(|body| body.checked_add(start))
        .ok_or_else(|| AbiError::Overflow(format!("array of {} payments", len)))?;
    if data.len() < needed {
        return Err(AbiError::Truncated {
            needed,
            actual: data.len(),
        });
    }

    let mut payments = Vec::with_capacity(len);
    for i in 0..len {
        let base = start + i * PAYMENT_WORDS * WORD;
        let sender = Address::from_slice(&word(data, base)?[12..]);
        let amount = U256::from_be_slice(word(data, base + WORD)?);
        let time = U256::from_be_slice(word(data, base + 2 * WORD)?);
        payments.push(PaymentRecord::new(sender, amount, time));
    }

    Ok(payments)
}
