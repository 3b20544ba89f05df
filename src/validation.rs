use alloy_primitives::Address;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid wallet address format: {0}")]
    InvalidAddress(String),

    #[error("{0}")]
    InvalidParameter(String),
}

/// Parse a `0x`-prefixed, 20-byte hex wallet address. Checksums are not enforced.
pub fn validate_evm_address(address: &str) -> Result<Address, ValidationError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(ValidationError::MissingParameter("address".to_string()));
    }

    let hex_part = match address.strip_prefix("0x").or_else(|| address.strip_prefix("0X")) {
        Some(rest) => rest,
        None => return Err(ValidationError::InvalidAddress(address.to_string())),
    };
    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidAddress(address.to_string()));
    }

    Address::from_str(hex_part).map_err(|_| ValidationError::InvalidAddress(address.to_string()))
}

fn parse_positive(raw: Option<&str>, default: usize, message: &str) -> Result<usize, ValidationError> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    match raw.trim().parse::<usize>() {
        Ok(value) if value >= 1 => Ok(value),
        _ => Err(ValidationError::InvalidParameter(message.to_string())),
    }
}

/// Page number from the query string, 1 when absent
pub fn parse_page(raw: Option<&str>) -> Result<usize, ValidationError> {
    parse_positive(raw, DEFAULT_PAGE, "Invalid page number")
}

/// Page size from the query string, 20 when absent
pub fn parse_page_size(raw: Option<&str>) -> Result<usize, ValidationError> {
    parse_positive(raw, DEFAULT_PAGE_SIZE, "Invalid page size")
}

pub fn require_param<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingParameter(name.to_string())),
    }
}
