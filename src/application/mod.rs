//! Application layer - CLI surface

pub mod commands;

pub use commands::{Cli, Commands};
