// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixed-point conversions between decimal strings and token base units.

use alloy::primitives::U256;

use super::client::ChainError;

/// Parse a human-readable amount into token base units.
///
/// # Arguments
/// * `amount` - Amount as a decimal string (e.g., "1.5")
/// * `decimals` - Token decimals (18 for most tokens, 6 for USDC-style)
///
/// # Returns
/// * `Ok(U256)` - Amount in smallest unit
/// * `Err` - If the string is not a plain non-negative decimal or has more
///   fractional digits than `decimals`
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, ChainError> {
    let amount = amount.trim();
    let (whole, fraction) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(ChainError::InvalidAmount(format!("empty amount: {amount:?}")));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(ChainError::InvalidAmount(format!("not a decimal number: {amount:?}")));
    }
    if fraction.len() > decimals as usize {
        return Err(ChainError::InvalidAmount(format!(
            "too many decimal places in {amount:?} (max {decimals})"
        )));
    }

    let whole = if whole.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(whole, 10)
            .map_err(|e| ChainError::InvalidAmount(format!("invalid whole part: {e}")))?
    };

    // Pad with zeros to match decimals
    let padded = format!("{:0<width$}", fraction, width = decimals as usize);
    let fraction = if padded.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(&padded, 10)
            .map_err(|e| ChainError::InvalidAmount(format!("invalid fraction: {e}")))?
    };

    let multiplier = U256::from(10u64).pow(U256::from(decimals));
    whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(fraction))
        .ok_or_else(|| ChainError::InvalidAmount("amount overflow".to_string()))
}

/// Format token base units as a decimal string with trailing zeros trimmed.
pub fn format_units(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        return whole.to_string();
    }

    let decimal_str = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
    let trimmed = decimal_str.trim_end_matches('0');
    format!("{}.{}", whole, trimmed)
}
