//! Cache key generation and management

use std::fmt;

/// A structured cache key that can be converted to a string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Full, sorted stake history of one wallet
    StakeHistory(String),
}

impl CacheKey {
    /// Create a stake history key. Addresses are hex and case-insensitive,
    /// so they are normalised to lowercase.
    pub fn stake_history(address: &str) -> Self {
        Self::StakeHistory(address.trim().to_ascii_lowercase())
    }

    /// Get the wallet address a key belongs to
    pub fn address(&self) -> &str {
        match self {
            Self::StakeHistory(address) => address,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StakeHistory(address) => write!(f, "stake:history:{}", address),
        }
    }
}
