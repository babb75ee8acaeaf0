//! Utility functions and helpers

use alloy::primitives::U256;

/// Current unix time in seconds
pub fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// Format a base-unit amount with the token's decimals, trailing zeros trimmed.
/// Falls back to the raw base units when the decimals are out of range.
pub fn format_units(amount: U256, decimals: u8) -> String {
    match alloy::primitives::utils::format_units(amount, decimals) {
        Ok(formatted) if formatted.contains('.') => formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string(),
        Ok(formatted) => formatted,
        Err(_) => amount.to_string(),
    }
}

/// Convert gwei to wei
pub fn gwei_to_wei(gwei: u64) -> u128 {
    gwei as u128 * 1_000_000_000
}

/// Generate unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
