//! Pipeline run state and its report

use alloy::primitives::B256;
use std::fmt;

use crate::shared::errors::SwapError;
use crate::shared::types::{ApprovalRecord, BaseUnitAmount, TransactionOutcome};

/// States of one pipeline run, in the only order they may be entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineState {
    Idle,
    Converting,
    Quoting,
    Approving,
    Swapping,
    Succeeded,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Succeeded | PipelineState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Converting => "converting",
            PipelineState::Quoting => "quoting",
            PipelineState::Approving => "approving",
            PipelineState::Swapping => "swapping",
            PipelineState::Succeeded => "succeeded",
            PipelineState::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The stage a run failed in, with the error it surfaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub stage: PipelineState,
    pub error: SwapError,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.error)
    }
}

/// Everything one run observed. Partial progress stays recorded: a confirmed
/// approval followed by a failed swap keeps its `approval` entry.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub run_id: String,
    pub states: Vec<PipelineState>,
    pub base_amount: Option<BaseUnitAmount>,
    pub quoted_estimate: Option<BaseUnitAmount>,
    pub approval: Option<ApprovalRecord>,
    pub swap: Option<TransactionOutcome>,
    pub failure: Option<StageFailure>,
}

impl PipelineReport {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            states: vec![PipelineState::Idle],
            base_amount: None,
            quoted_estimate: None,
            approval: None,
            swap: None,
            failure: None,
        }
    }

    pub fn current_state(&self) -> PipelineState {
        self.states.last().copied().unwrap_or(PipelineState::Idle)
    }

    pub fn final_state(&self) -> PipelineState {
        self.current_state()
    }

    pub fn is_success(&self) -> bool {
        self.current_state() == PipelineState::Succeeded
    }

    pub fn has_visited(&self, state: PipelineState) -> bool {
        self.states.contains(&state)
    }

    /// Hashes of every transaction the run saw mined, reverted ones included
    pub fn transaction_hashes(&self) -> Vec<B256> {
        self.approval
            .iter()
            .map(|a| a.outcome.hash)
            .chain(self.swap.iter().map(|s| s.hash))
            .collect()
    }

    /// Move forward. States are never re-entered and nothing follows a
    /// terminal state.
    pub(crate) fn enter(&mut self, next: PipelineState) {
        let current = self.current_state();
        debug_assert!(
            !current.is_terminal() && next > current,
            "illegal transition {} -> {}",
            current,
            next
        );
        self.states.push(next);
    }

    pub(crate) fn fail(&mut self, error: SwapError) {
        let stage = self.current_state();
        self.failure = Some(StageFailure { stage, error });
        self.states.push(PipelineState::Failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_progression() {
        let mut report = PipelineReport::new("run");
        assert_eq!(report.current_state(), PipelineState::Idle);
        report.enter(PipelineState::Converting);
        report.enter(PipelineState::Quoting);
        report.fail(SwapError::NoRouteFound {
            token_in: "WETH".to_string(),
            token_out: "USDC".to_string(),
        });

        assert_eq!(report.final_state(), PipelineState::Failed);
        assert!(!report.is_success());
        let failure = report.failure.unwrap();
        assert_eq!(failure.stage, PipelineState::Quoting);
        assert_eq!(failure.to_string(), "quoting failed: No route found for WETH -> USDC");
    }

    #[test]
    #[should_panic(expected = "illegal transition")]
    #[cfg(debug_assertions)]
    fn test_states_are_not_reentered() {
        let mut report = PipelineReport::new("run");
        report.enter(PipelineState::Converting);
        report.enter(PipelineState::Converting);
    }
}
