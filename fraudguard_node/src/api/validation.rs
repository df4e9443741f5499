//! Request validation utilities for the FraudGuard API

use crate::api::errors::ValidationError;
use ethers::types::{Address, U256};
use ethers::utils::to_checksum;
use serde_json::Value;

/// Feature vector used when a request omits `features`
pub const DEFAULT_FEATURES: [f64; 4] = [0.0, 0.0, 0.0, 0.0];

/// Largest integer a JSON float amount can carry without rounding (2^53)
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

/// Validate a receiver address and return it parsed.
///
/// The address must be `0x` followed by 40 hex characters. All-lowercase and
/// all-uppercase addresses carry no checksum and are accepted as is; a
/// mixed-case address must match its EIP-55 checksum.
pub fn validate_receiver(value: &Value) -> Result<Address, ValidationError> {
    let address = match value {
        Value::Null => "",
        Value::String(s) => s.as_str(),
        other => {
            return Err(ValidationError::new(
                "receiver",
                "Receiver must be a string",
                Some(other.clone()),
            ))
        }
    };

    validate_address(address).map_err(|mut err| {
        err.field = "receiver".to_string();
        err
    })
}

/// Validate an EVM address with EIP-55 checksum rules
pub fn validate_address(address: &str) -> Result<Address, ValidationError> {
    let value = Some(Value::String(address.to_string()));

    if address.is_empty() {
        return Err(ValidationError::new("address", "Address cannot be empty", value));
    }

    let hex_part = match address.strip_prefix("0x") {
        Some(rest) => rest,
        None => {
            return Err(ValidationError::new(
                "address",
                "Address must start with '0x'",
                value,
            ))
        }
    };

    if hex_part.len() != 40 {
        return Err(ValidationError::new(
            "address",
            "Address must be 42 characters long (including '0x')",
            value,
        ));
    }

    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::new(
            "address",
            "Address contains invalid hex characters",
            value,
        ));
    }

    let parsed = address
        .parse::<Address>()
        .map_err(|e| ValidationError::new("address", format!("Invalid address: {}", e), value.clone()))?;

    let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
    if has_upper && has_lower && to_checksum(&parsed, None) != address {
        return Err(ValidationError::new(
            "address",
            "Address checksum mismatch",
            value,
        ));
    }

    Ok(parsed)
}

/// EIP-55 checksummed form of an address
pub fn checksum_address(address: &Address) -> String {
    to_checksum(address, None)
}

/// Convert `features` to a numeric vector.
///
/// Numbers are taken as is, numeric strings are parsed and booleans map to
/// `1.0`/`0.0`. A missing or null field yields [`DEFAULT_FEATURES`].
pub fn parse_features(value: &Value) -> Result<Vec<f64>, ValidationError> {
    let items = match value {
        Value::Null => return Ok(DEFAULT_FEATURES.to_vec()),
        Value::Array(items) => items,
        other => {
            return Err(ValidationError::new(
                "features",
                "Features must be an array of numbers",
                Some(other.clone()),
            ))
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let number = match item {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                _ => None,
            };

            match number {
                Some(n) if n.is_finite() => Ok(n),
                _ => Err(ValidationError::new(
                    "features",
                    format!("Feature {} is not a finite number", i),
                    Some(item.clone()),
                )),
            }
        })
        .collect()
}

/// Convert `amount` to a `uint256`.
///
/// Accepts a non-negative integral JSON number or a decimal string. Numbers
/// beyond `u64` must be sent as strings. A missing or null field is zero.
pub fn parse_amount(value: &Value) -> Result<U256, ValidationError> {
    let invalid = |message: &str| {
        ValidationError::new("amount", message.to_string(), Some(value.clone()))
    };

    match value {
        Value::Null => Ok(U256::zero()),
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return Ok(U256::from(v));
            }
            match n.as_f64() {
                Some(f) if f < 0.0 => Err(invalid("Amount cannot be negative")),
                Some(f) if !f.is_finite() || f.fract() != 0.0 => {
                    Err(invalid("Amount must be a whole number"))
                }
                // Larger floats may already have been rounded by the JSON parser
                Some(f) if f <= MAX_EXACT_FLOAT_INT => Ok(U256::from(f as u64)),
                _ => Err(invalid(
                    "Amount is too large for a JSON number; send it as a decimal string",
                )),
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid("Amount must be a non-negative decimal integer"));
            }
            U256::from_dec_str(s).map_err(|_| invalid("Amount is out of range"))
        }
        _ => Err(invalid("Amount must be a number or decimal string")),
    }
}
