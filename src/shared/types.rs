//! Common types used across the application

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::utils::unix_now;

/// Token representation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub chain_id: u64,
    pub address: Address,
    pub decimals: u8,
    pub symbol: String,
    pub name: Option<String>,
}

impl Token {
    pub fn new(
        chain_id: u64,
        address: Address,
        decimals: u8,
        symbol: impl Into<String>,
        name: Option<&str>,
    ) -> Self {
        Self {
            chain_id,
            address,
            decimals,
            symbol: symbol.into(),
            name: name.map(str::to_string),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol, self.address)
    }
}

/// Exact on-chain integer amount, in the token's smallest unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseUnitAmount(U256);

impl BaseUnitAmount {
    pub const ZERO: Self = Self(U256::ZERO);

    pub fn new(value: U256) -> Self {
        Self(value)
    }

    pub fn value(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<u64> for BaseUnitAmount {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<U256> for BaseUnitAmount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl fmt::Display for BaseUnitAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of the trade the requested amount fixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    ExactInput,
    ExactOutput,
}

impl TradeDirection {
    /// Trade type as the routing API names it
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeDirection::ExactInput => "exactIn",
            TradeDirection::ExactOutput => "exactOut",
        }
    }
}

impl FromStr for TradeDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact_input" | "exactin" | "exact-input" | "in" => Ok(TradeDirection::ExactInput),
            "exact_output" | "exactout" | "exact-output" | "out" => Ok(TradeDirection::ExactOutput),
            _ => Err(anyhow::anyhow!("Unknown trade direction: {}", s)),
        }
    }
}

/// Router flavour the oracle should encode call data for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionVariant {
    SwapRouter02,
    UniversalRouter,
}

impl FromStr for ExecutionVariant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "swap_router_02" | "swaprouter02" => Ok(ExecutionVariant::SwapRouter02),
            "universal_router" | "universalrouter" => Ok(ExecutionVariant::UniversalRouter),
            _ => Err(anyhow::anyhow!("Unknown execution variant: {}", s)),
        }
    }
}

/// Slippage tolerance as a fraction, e.g. 50/10000 = 0.5%
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlippageTolerance {
    pub numerator: u64,
    pub denominator: u64,
}

impl SlippageTolerance {
    pub fn from_bps(bps: u32) -> Self {
        Self {
            numerator: bps as u64,
            denominator: 10_000,
        }
    }

    /// Percent string the routing API expects ("0.5" for 50 bps)
    pub fn as_percent_string(&self) -> String {
        let scaled = rust_decimal::Decimal::from(self.numerator) * rust_decimal::Decimal::from(100)
            / rust_decimal::Decimal::from(self.denominator.max(1));
        scaled.normalize().to_string()
    }

    /// Upper bound of `amount` after adverse slippage, rounded up.
    /// `None` when the bound does not fit in a uint256.
    pub fn max_amount(&self, amount: BaseUnitAmount) -> Option<BaseUnitAmount> {
        let den = U256::from(self.denominator.max(1));
        let scaled = amount
            .value()
            .checked_mul(den.checked_add(U256::from(self.numerator))?)?;
        let rounded = scaled.checked_add(den - U256::from(1))?;
        Some(BaseUnitAmount::new(rounded / den))
    }
}

/// Swap execution options passed to the routing oracle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOptions {
    pub recipient: Address,
    pub slippage: SlippageTolerance,
    pub deadline_unix_seconds: u64,
    pub execution_variant: ExecutionVariant,
}

impl SwapOptions {
    /// Options whose deadline is `window_secs` from now
    pub fn with_deadline_window(
        recipient: Address,
        slippage: SlippageTolerance,
        window_secs: u64,
        execution_variant: ExecutionVariant,
    ) -> Self {
        Self {
            recipient,
            slippage,
            deadline_unix_seconds: unix_now() + window_secs,
            execution_variant,
        }
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        self.deadline_unix_seconds <= now
    }
}

/// EIP-1559 fee ceilings for a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasParameters {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
    /// Estimated with a buffer when absent
    pub gas_limit: Option<u64>,
}

impl Default for GasParameters {
    fn default() -> Self {
        Self {
            max_fee_per_gas: 100_000_000_000,
            max_priority_fee_per_gas: 100_000_000_000,
            gas_limit: None,
        }
    }
}

/// Route returned by the routing oracle.
///
/// Deliberately not `Clone`: a route is submitted at most once and must be
/// re-fetched, never replayed, after a failure.
#[derive(Debug, PartialEq, Eq)]
pub struct Route {
    pub call_data: Bytes,
    pub value_to_send: U256,
    /// Output amount for exact-input trades, required input for exact-output
    pub quoted_estimate: BaseUnitAmount,
    pub direction: TradeDirection,
    pub deadline_unix_seconds: u64,
}

impl Route {
    pub fn is_stale_at(&self, now: u64) -> bool {
        self.deadline_unix_seconds <= now
    }
}

/// Result of one submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutcome {
    pub hash: B256,
    pub confirmed: bool,
    pub confirmation_count: u64,
    pub block_number: Option<u64>,
    pub gas_used: Option<u64>,
    pub revert_reason: Option<String>,
}

/// Allowance granted during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub token: Address,
    pub spender: Address,
    pub amount: BaseUnitAmount,
    pub outcome: TransactionOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slippage_percent_string() {
        assert_eq!(SlippageTolerance::from_bps(50).as_percent_string(), "0.5");
        assert_eq!(SlippageTolerance::from_bps(100).as_percent_string(), "1");
    }

    #[test]
    fn test_slippage_max_amount_rounds_up() {
        let slippage = SlippageTolerance::from_bps(50);
        assert_eq!(slippage.max_amount(BaseUnitAmount::from(10_000)), Some(BaseUnitAmount::from(10_050)));
        // 3 * 1.005 = 3.015 -> 4
        assert_eq!(slippage.max_amount(BaseUnitAmount::from(3)), Some(BaseUnitAmount::from(4)));
    }

    #[test]
    fn test_slippage_max_amount_overflow() {
        let slippage = SlippageTolerance::from_bps(50);
        assert_eq!(slippage.max_amount(BaseUnitAmount::new(U256::MAX / U256::from(5000))), None);
        assert_eq!(slippage.max_amount(BaseUnitAmount::new(U256::MAX)), None);
        // zero slippage still has to round through the denominator
        assert_eq!(SlippageTolerance::from_bps(0).max_amount(BaseUnitAmount::new(U256::MAX)), None);
    }

    #[test]
    fn test_trade_direction_parsing() {
        assert_eq!("exact_input".parse::<TradeDirection>().unwrap(), TradeDirection::ExactInput);
        assert_eq!("exactOut".parse::<TradeDirection>().unwrap(), TradeDirection::ExactOutput);
        assert!("sideways".parse::<TradeDirection>().is_err());
    }

    #[test]
    fn test_options_expiry() {
        let options = SwapOptions {
            recipient: Address::ZERO,
            slippage: SlippageTolerance::from_bps(50),
            deadline_unix_seconds: 1_000,
            execution_variant: ExecutionVariant::SwapRouter02,
        };
        assert!(!options.is_expired_at(999));
        assert!(options.is_expired_at(1_000));
    }
}
