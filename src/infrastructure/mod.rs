//! Infrastructure layer - chain and routing adapters

pub mod blockchain;
pub mod routing;
