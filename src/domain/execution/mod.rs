//! Execution domain - the approve and swap transactions

mod approval_step;
mod swap_executor;

pub use approval_step::ApprovalStep;
pub use swap_executor::SwapExecutor;

use crate::shared::errors::{ChainError, SwapError};

/// Map a submission-time chain failure into the pipeline taxonomy
fn classify_send_error(err: ChainError, on_revert: impl FnOnce(String) -> SwapError) -> SwapError {
    match err {
        ChainError::InsufficientFunds(msg) => SwapError::InsufficientFunds(msg),
        ChainError::ExecutionReverted { reason } => {
            on_revert(reason.unwrap_or_else(|| "execution reverted".to_string()))
        }
        other => SwapError::ChainUnavailable(other.to_string()),
    }
}
