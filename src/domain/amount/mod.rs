//! Amount domain - human decimal amounts to on-chain base units

mod amount_converter;

pub use amount_converter::{AmountConverter, FractionPolicy, MAX_DECIMALS};
