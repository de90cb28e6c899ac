// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Decimal display of base-unit amounts.
//!
//! Amounts stay integers everywhere; these functions only convert at the
//! presentation boundary. `format_units` is lossless, so
//! `parse_units(&format_units(a, d), d) == Ok(a)` for every amount.

use alloy::primitives::U256;

use super::types::Amount;

/// Decimals of ether (and most ERC-20 tokens).
pub const ETHER_DECIMALS: u8 = 18;

/// Largest decimal count whose scale fits in a U256 (10^77 < 2^256).
const MAX_DECIMALS: u8 = 77;

/// Format an amount with the given number of decimals, trimming trailing
/// zeros. No precision is lost.
pub fn format_units(amount: Amount, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }
    if decimals == 0 {
        return amount.to_string();
    }
    if decimals > MAX_DECIMALS {
        // Every U256 is below 10^78, so the integer part is zero.
        let digits = amount.to_string();
        let padded = format!("{:0>width$}", digits, width = decimals as usize);
        return format!("0.{}", padded.trim_end_matches('0'));
    }

    let divisor = scale(decimals);
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
        format!("{}.{}", whole, decimal_str.trim_end_matches('0'))
    }
}

/// Format an amount, keeping at most `max_fraction_digits` decimals
/// (truncated, not rounded). For display only.
pub fn format_units_truncated(amount: Amount, decimals: u8, max_fraction_digits: usize) -> String {
    let full = format_units(amount, decimals);
    match full.split_once('.') {
        Some((whole, fraction)) => {
            let kept = fraction[..fraction.len().min(max_fraction_digits)].trim_end_matches('0');
            if kept.is_empty() {
                whole.to_string()
            } else {
                format!("{whole}.{kept}")
            }
        }
        None => full,
    }
}

/// Format wei as ether.
pub fn format_ether(wei: Amount) -> String {
    format_units(wei, ETHER_DECIMALS)
}

/// Parse a decimal string into base units.
///
/// Rejects signs, exponents, more fractional digits than `decimals`
/// and values that overflow 256 bits.
pub fn parse_units(value: &str, decimals: u8) -> Result<Amount, UnitsError> {
    let value = value.trim();
    if decimals > MAX_DECIMALS {
        return Err(UnitsError::TooManyDecimals(decimals));
    }

    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(UnitsError::Invalid(value.to_string()));
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(UnitsError::Invalid(value.to_string()));
    }

    // Trailing zeros past the precision carry no value.
    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(UnitsError::TooPrecise {
            value: value.to_string(),
            decimals,
        });
    }

    let overflow = || UnitsError::Overflow(value.to_string());

    let whole: U256 = if whole.is_empty() {
        U256::ZERO
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let fraction: U256 = if fraction.is_empty() {
        U256::ZERO
    } else {
        let padded = format!("{:0<width$}", fraction, width = decimals as usize);
        padded.parse().map_err(|_| overflow())?
    };

    whole
        .checked_mul(scale(decimals))
        .and_then(|w| w.checked_add(fraction))
        .ok_or_else(overflow)
}

/// Parse an ether amount into wei.
pub fn parse_ether(value: &str) -> Result<Amount, UnitsError> {
    parse_units(value, ETHER_DECIMALS)
}

fn scale(decimals: u8) -> U256 {
    U256::from(10u64).pow(U256::from(decimals))
}

/// Errors that can occur when parsing decimal amounts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitsError {
    #[error("invalid decimal amount `{0}`")]
    Invalid(String),

    #[error("`{value}` has more than {decimals} fractional digits")]
    TooPrecise { value: String, decimals: u8 },

    #[error("`{0}` does not fit in 256 bits")]
    Overflow(String),

    #[error("{0} decimals exceed the 256-bit range")]
    TooManyDecimals(u8),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_format_units() {
        let one_eth = U256::from(1_000_000_000_000_000_000u64);
        assert_eq!(format_units(one_eth, 18), "1");

        let half_eth = U256::from(500_000_000_000_000_000u64);
        assert_eq!(format_units(half_eth, 18), "0.5");

        // Full precision, unlike the truncated display form
        let complex = U256::from(1_234_567_890_000_000_001u64);
        assert_eq!(format_units(complex, 18), "1.234567890000000001");

        assert_eq!(format_units(U256::ZERO, 18), "0");
        assert_eq!(format_units(U256::from(1u64), 18), "0.000000000000000001");

        // 1 USDC = 1e6
        assert_eq!(format_units(U256::from(1_000_000u64), 6), "1");
        assert_eq!(format_units(U256::from(42u64), 0), "42");
    }

    #[test]
    fn test_format_units_truncated() {
        let complex = U256::from(1_234_567_890_000_000_000u64);
        assert_eq!(format_units_truncated(complex, 18, 6), "1.234567");

        let tiny = U256::from(1u64);
        assert_eq!(format_units_truncated(tiny, 18, 6), "0");

        assert_eq!(format_units_truncated(U256::from(7u64), 0, 6), "7");
    }

    #[test]
    fn test_format_ether_max_value() {
        let formatted = format_ether(U256::MAX);
        assert_eq!(parse_ether(&formatted), Ok(U256::MAX));
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_ether("0.001"), Ok(U256::from(1_000_000_000_000_000u64)));
        assert_eq!(parse_ether("1"), Ok(U256::from(1_000_000_000_000_000_000u64)));
        assert_eq!(parse_ether(".5"), Ok(U256::from(500_000_000_000_000_000u64)));
        assert_eq!(parse_ether("2."), Ok(U256::from(2_000_000_000_000_000_000u64)));
        assert_eq!(parse_units("1.500000", 6), Ok(U256::from(1_500_000u64)));
    }

    #[test]
    fn test_parse_units_rejects_bad_input() {
        assert!(matches!(parse_ether(""), Err(UnitsError::Invalid(_))));
        assert!(matches!(parse_ether("."), Err(UnitsError::Invalid(_))));
        assert!(matches!(parse_ether("-1"), Err(UnitsError::Invalid(_))));
        assert!(matches!(parse_ether("1e18"), Err(UnitsError::Invalid(_))));
        assert!(matches!(parse_ether("1.2.3"), Err(UnitsError::Invalid(_))));
        assert!(matches!(
            parse_units("0.0000001", 6),
            Err(UnitsError::TooPrecise { decimals: 6, .. })
        ));
        assert!(matches!(
            parse_units(&"9".repeat(80), 0),
            Err(UnitsError::Overflow(_))
        ));
        assert!(matches!(
            parse_units("1", 78),
            Err(UnitsError::TooManyDecimals(78))
        ));
    }

    proptest! {
        #[test]
        fn format_then_parse_is_identity(hi in any::<u128>(), lo in any::<u128>(), decimals in 0u8..=36) {
            let amount = (U256::from(hi) << 128usize) | U256::from(lo);
            let formatted = format_units(amount, decimals);
            prop_assert_eq!(parse_units(&formatted, decimals), Ok(amount));
        }
    }
}
