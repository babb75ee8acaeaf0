//! Decimal to base-unit conversion

use alloy::primitives::U256;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use crate::shared::errors::SwapError;
use crate::shared::types::BaseUnitAmount;
use crate::shared::utils::format_units;

/// Largest token precision accepted
pub const MAX_DECIMALS: u8 = 18;

/// What to do with fractional digits finer than the token supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FractionPolicy {
    /// Fail with `InvalidAmount`
    #[default]
    Reject,
    /// Floor to the token's precision
    Truncate,
}

/// Converts human-readable amounts into base units.
///
/// All scaling is done on the decimal mantissa with 256-bit integers, so an
/// amount with up to `decimals` fractional digits converts exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmountConverter {
    policy: FractionPolicy,
}

impl AmountConverter {
    pub fn new(policy: FractionPolicy) -> Self {
        Self { policy }
    }

    /// Parse a decimal string and convert it
    pub fn parse(&self, amount: &str, decimals: u8) -> Result<BaseUnitAmount, SwapError> {
        let value = Decimal::from_str(amount.trim())
            .map_err(|e| SwapError::InvalidAmount(format!("'{}' is not a decimal: {}", amount, e)))?;
        self.to_base_units(value, decimals)
    }

    /// `amount * 10^decimals` as an exact integer
    pub fn to_base_units(&self, amount: Decimal, decimals: u8) -> Result<BaseUnitAmount, SwapError> {
        if amount <= Decimal::ZERO {
            return Err(SwapError::InvalidAmount(format!("amount must be positive, got {}", amount)));
        }
        if decimals > MAX_DECIMALS {
            return Err(SwapError::InvalidAmount(format!(
                "token decimals {} exceed supported maximum {}",
                decimals, MAX_DECIMALS
            )));
        }

        let normalized = amount.normalize();
        let fractional_digits = normalized.scale();
        let numerator = U256::from(normalized.mantissa().unsigned_abs());

        if fractional_digits > decimals as u32 && self.policy == FractionPolicy::Reject {
            return Err(SwapError::InvalidAmount(format!(
                "{} has {} fractional digits, token supports {}",
                amount, fractional_digits, decimals
            )));
        }

        let ten = U256::from(10u64);
        let raw = numerator * ten.pow(U256::from(decimals)) / ten.pow(U256::from(fractional_digits));

        if raw.is_zero() {
            return Err(SwapError::InvalidAmount(format!(
                "{} is below the smallest unit at {} decimals",
                amount, decimals
            )));
        }

        debug!("Converted {} at {} decimals to {} base units", amount, decimals, raw);
        Ok(BaseUnitAmount::new(raw))
    }

    /// Render base units back as a decimal string
    pub fn format_base_units(amount: BaseUnitAmount, decimals: u8) -> String {
        format_units(amount.value(), decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_one_weth() {
        let converter = AmountConverter::default();
        let raw = converter.to_base_units(dec("1.0"), 18).unwrap();
        assert_eq!(raw.to_string(), "1000000000000000000");
    }

    #[test]
    fn test_small_fraction_has_no_drift() {
        let converter = AmountConverter::default();
        // 0.001 * 1e18 computed with floats is 999999999999999.9 on some paths
        assert_eq!(converter.to_base_units(dec("0.001"), 18).unwrap().to_string(), "1000000000000000");
        assert_eq!(converter.to_base_units(dec("0.1"), 6).unwrap().to_string(), "100000");
        assert_eq!(converter.to_base_units(dec("123.456789"), 6).unwrap().to_string(), "123456789");
    }

    #[test]
    fn test_zero_decimals() {
        let converter = AmountConverter::default();
        assert_eq!(converter.to_base_units(dec("42"), 0).unwrap().to_string(), "42");
        assert!(converter.to_base_units(dec("4.2"), 0).is_err());
    }

    #[test]
    fn test_rejects_non_positive() {
        let converter = AmountConverter::default();
        assert!(matches!(converter.to_base_units(Decimal::ZERO, 18), Err(SwapError::InvalidAmount(_))));
        assert!(matches!(converter.to_base_units(dec("-1"), 18), Err(SwapError::InvalidAmount(_))));
        assert!(matches!(converter.parse("0", 6), Err(SwapError::InvalidAmount(_))));
    }

    #[test]
    fn test_rejects_unsupported_decimals() {
        let converter = AmountConverter::default();
        assert!(matches!(converter.to_base_units(dec("1"), 19), Err(SwapError::InvalidAmount(_))));
    }

    #[test]
    fn test_excess_fraction_reject_vs_truncate() {
        let strict = AmountConverter::default();
        assert!(matches!(strict.to_base_units(dec("1.1234567"), 6), Err(SwapError::InvalidAmount(_))));

        let lenient = AmountConverter::new(FractionPolicy::Truncate);
        assert_eq!(lenient.to_base_units(dec("1.1234567"), 6).unwrap().to_string(), "1123456");
        // truncated all the way to zero is still invalid
        assert!(lenient.to_base_units(dec("0.0000001"), 6).is_err());
    }

    #[test]
    fn test_trailing_zeros_do_not_count_as_precision() {
        let converter = AmountConverter::default();
        assert_eq!(converter.to_base_units(dec("2.500000000"), 6).unwrap().to_string(), "2500000");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let converter = AmountConverter::default();
        assert!(matches!(converter.parse("1.2.3", 18), Err(SwapError::InvalidAmount(_))));
        assert!(matches!(converter.parse("abc", 18), Err(SwapError::InvalidAmount(_))));
    }

    #[test]
    fn test_round_trip_recovers_amount() {
        let converter = AmountConverter::default();
        let samples = ["1", "0.5", "0.001", "1.000001", "987654.321", "0.000000000000000001"];
        for decimals in 0..=MAX_DECIMALS {
            for sample in samples {
                let amount = dec(sample);
                let fractional = amount.normalize().scale();
                if fractional > decimals as u32 {
                    continue;
                }
                let raw = converter.to_base_units(amount, decimals).unwrap();
                let back = AmountConverter::format_base_units(raw, decimals);
                assert_eq!(dec(&back), amount, "{} at {} decimals", sample, decimals);
                // deterministic
                assert_eq!(converter.to_base_units(amount, decimals).unwrap(), raw);
            }
        }
    }
}
