//! Shared components - common types, errors, and utilities

pub mod abi;
pub mod errors;
pub mod tokens;
pub mod types;
pub mod utils;
