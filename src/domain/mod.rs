//! Domain layer - core business logic and entities

pub mod amount;
pub mod chain;
pub mod execution;
pub mod pipeline;
pub mod routing;

#[cfg(test)]
pub mod testing;
