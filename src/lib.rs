//! routeswap - routed DEX swaps on EVM chains
//! Built with Domain-Driven Design principles

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use domain::amount::AmountConverter;
pub use domain::execution::{ApprovalStep, SwapExecutor};
pub use domain::pipeline::{PipelineOrchestrator, PipelineReport, PipelineState, SwapRequest};
pub use domain::routing::RouteClient;
pub use shared::errors::SwapError;
