//! Pipeline domain - convert, quote, approve, swap

mod orchestrator;
mod state;

pub use orchestrator::{PipelineOrchestrator, RoutePreview, SwapRequest};
pub use state::{PipelineReport, PipelineState, StageFailure};
