//! Amount conversion and ENS name hashing helpers
//!
//! Amounts move between human-readable strings (e.g. "1.5") and U256 values in
//! a token's smallest unit through `rust_decimal`, so no floating point is
//! involved.

use alloy::primitives::{B256, U256, keccak256};
use rust_decimal::Decimal;
use std::str::FromStr;

use super::ServiceResult;
use super::error::ServiceError;

/// Parse human-readable amount (e.g., "1.5") to smallest unit based on decimals
///
/// Digits beyond `decimals` are truncated.
///
/// # Examples
/// - "1" with 18 decimals -> 1000000000000000000 (1 ETH in wei)
/// - "2000" with 6 decimals -> 2000000000 (2000 USDC in smallest unit)
pub fn parse_amount(amount: &str, decimals: u8) -> ServiceResult<U256> {
    let amount = amount.trim();

    let decimal_amount = Decimal::from_str(amount)
        .map_err(|e| ServiceError::InvalidAmount(format!("Invalid amount {amount}: {e}")))?;

    if decimal_amount.is_sign_negative() {
        return Err(ServiceError::InvalidAmount(format!(
            "Amount must not be negative: {amount}"
        )));
    }

    let mut multiplier = Decimal::from(1);
    for _ in 0..decimals {
        multiplier = multiplier.checked_mul(Decimal::from(10)).ok_or_else(|| {
            ServiceError::InvalidAmount(format!("Too many decimals: {decimals}"))
        })?;
    }

    let smallest_unit = decimal_amount.checked_mul(multiplier).ok_or_else(|| {
        ServiceError::InvalidAmount(format!("Amount {amount} too large for {decimals} decimals"))
    })?;

    let amount_str = smallest_unit.trunc().to_string();
    let integer_part = amount_str.split('.').next().unwrap_or("0");

    U256::from_str(integer_part)
        .map_err(|e| ServiceError::InvalidAmount(format!("Failed to parse amount: {}", e)))
}

/// Format balance from smallest unit to human-readable format
///
/// # Returns
/// Formatted balance as string with trailing zeros removed
pub fn format_balance(balance: U256, decimals: u8) -> String {
    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = balance / divisor;
    let remainder = balance % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_part = remainder.to_string();
        let padded = format!("{:0>width$}", decimal_part, width = decimals as usize);
        let trimmed = padded.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{whole}.{trimmed}")
        }
    }
}

/// Format a value in the smallest unit like `ethers` `formatUnits`: trailing
/// zeros are removed but at least one fractional digit is kept ("12.0").
pub fn format_units(value: U256, decimals: u8) -> String {
    let formatted = format_balance(value, decimals);
    if formatted.contains('.') {
        formatted
    } else {
        format!("{formatted}.0")
    }
}

/// Keeps the first `max_chars` characters of `value` (no rounding).
pub fn truncate_display(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

/// keccak256 of a single ENS label.
pub fn labelhash(label: &str) -> B256 {
    keccak256(label.as_bytes())
}

/// ENS namehash (EIP-137). The empty name hashes to 32 zero bytes.
pub fn namehash(name: &str) -> B256 {
    if name.is_empty() {
        return B256::ZERO;
    }

    name.rsplit('.').fold(B256::ZERO, |node, label| {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(labelhash(label).as_slice());
        keccak256(buf)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::b256;

    #[test]
    fn test_parse_amount_eth_should_work() {
        let amount = parse_amount("1.5", 18).unwrap();
        assert_eq!(amount, U256::from_str("1500000000000000000").unwrap());
    }

    #[test]
    fn test_parse_amount_whole_tokens_should_work() {
        assert_eq!(
            parse_amount("1000", 18).unwrap(),
            U256::from_str("1000000000000000000000").unwrap()
        );
        assert_eq!(parse_amount("2000", 6).unwrap(), U256::from(2_000_000_000u64));
    }

    #[test]
    fn test_parse_amount_truncates_extra_digits() {
        assert_eq!(parse_amount("1.0000009", 6).unwrap(), U256::from(1_000_000u64));
    }

    #[test]
    fn test_parse_amount_invalid_should_fail() {
        assert!(matches!(
            parse_amount("abc", 6),
            Err(ServiceError::InvalidAmount(_))
        ));
        assert!(matches!(
            parse_amount("-1", 6),
            Err(ServiceError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_format_balance_usdc_should_work() {
        let amount = U256::from(100500000u64);
        assert_eq!(format_balance(amount, 6), "100.5");
    }

    #[test]
    fn test_format_balance_whole_number_should_work() {
        let wei = U256::from_str("1000000000000000000").unwrap();
        assert_eq!(format_balance(wei, 18), "1");
    }

    #[test]
    fn test_format_units_keeps_one_fractional_digit() {
        assert_eq!(format_units(U256::from(12_000_000u64), 6), "12.0");
        assert_eq!(format_units(U256::from(100_500_000u64), 6), "100.5");
        assert_eq!(format_units(U256::ZERO, 18), "0.0");
        assert_eq!(format_units(U256::from(1u64), 6), "0.000001");
        assert_eq!(format_units(U256::from(7u64), 0), "7.0");
    }

    #[test]
    fn test_truncate_display_does_not_round() {
        assert_eq!(truncate_display("1899.987654", 4), "1899");
        assert_eq!(truncate_display("0.98765", 4), "0.98");
        assert_eq!(truncate_display("12", 4), "12");
    }

    #[test]
    fn test_namehash_known_names() {
        assert_eq!(namehash(""), B256::ZERO);
        assert_eq!(
            namehash("eth"),
            b256!("0x93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae")
        );
        assert_eq!(
            namehash("foo.eth"),
            b256!("0xde9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f")
        );
        assert_eq!(
            namehash("uniswap.eth"),
            b256!("0xec9ec573cf97ad1c270be71ac1de3b382790cb346036130c7d7ff844bf8f4974")
        );
        assert_eq!(
            namehash("v3-core-license-grants.uniswap.eth"),
            b256!("0xa35d592ec6e5289a387cba1d5f82be794f495bd5a361a1fb314687c6aefea1f4")
        );
    }

    #[test]
    fn test_labelhash_subdomain() {
        assert_eq!(
            labelhash("v3-core-license-grants"),
            b256!("0x15ff9b5bd7642701a10e5ea8fb29c957ffda4854cd028e9f6218506e6b509af2")
        );
    }
}
