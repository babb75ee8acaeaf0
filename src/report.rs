// src/report.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use routeswap::domain::amount::AmountConverter;
use routeswap::domain::pipeline::{PipelineReport, RoutePreview, SwapRequest};
use routeswap::shared::types::{BaseUnitAmount, Token, TransactionOutcome};

#[derive(Debug, Serialize, Deserialize)]
pub struct SwapReport {
    pub run_id: String,
    pub success: bool,
    pub final_state: String,
    pub states: Vec<String>,

    pub token_in: TokenDetails,
    pub token_out: TokenDetails,
    pub direction: String,
    pub amount: String,
    pub base_amount: Option<String>,
    pub quoted_estimate: Option<String>,

    pub approval: Option<TransactionDetails>,
    pub swap: Option<TransactionDetails>,
    pub failure: Option<FailureDetails>,

    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenDetails {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

impl From<&Token> for TokenDetails {
    fn from(token: &Token) -> Self {
        Self {
            address: token.address.to_string(),
            symbol: token.symbol.clone(),
            decimals: token.decimals,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub hash: String,
    pub confirmed: bool,
    pub confirmations: u64,
    pub block_number: Option<u64>,
    pub gas_used: Option<u64>,
    pub revert_reason: Option<String>,
}

impl From<&TransactionOutcome> for TransactionDetails {
    fn from(outcome: &TransactionOutcome) -> Self {
        Self {
            hash: outcome.hash.to_string(),
            confirmed: outcome.confirmed,
            confirmations: outcome.confirmation_count,
            block_number: outcome.block_number,
            gas_used: outcome.gas_used,
            revert_reason: outcome.revert_reason.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FailureDetails {
    pub stage: String,
    pub error: String,
}

/// Quote-only output of `quote` and simulate mode
#[derive(Debug, Serialize, Deserialize)]
pub struct QuoteReport {
    pub token_in: TokenDetails,
    pub token_out: TokenDetails,
    pub direction: String,
    pub base_amount: String,
    pub quoted_estimate: String,
    pub quoted_estimate_readable: String,
    pub value_to_send: String,
    pub call_data_bytes: usize,
    pub timestamp: DateTime<Utc>,
}

fn format_amount(amount: BaseUnitAmount) -> String {
    amount.to_string()
}

impl SwapReport {
    pub fn from_pipeline(report: &PipelineReport, request: &SwapRequest) -> Self {
        Self {
            run_id: report.run_id.clone(),
            success: report.is_success(),
            final_state: report.final_state().to_string(),
            states: report.states.iter().map(|s| s.to_string()).collect(),
            token_in: (&request.token_in).into(),
            token_out: (&request.token_out).into(),
            direction: request.direction.as_str().to_string(),
            amount: request.amount.to_string(),
            base_amount: report.base_amount.map(format_amount),
            quoted_estimate: report.quoted_estimate.map(format_amount),
            approval: report.approval.as_ref().map(|a| (&a.outcome).into()),
            swap: report.swap.as_ref().map(Into::into),
            failure: report.failure.as_ref().map(|f| FailureDetails {
                stage: f.stage.to_string(),
                error: f.error.to_string(),
            }),
            timestamp: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl QuoteReport {
    pub fn from_preview(preview: &RoutePreview, request: &SwapRequest) -> Self {
        // the estimate is in whichever token the amount is not
        let estimate_decimals = request.quote_token().decimals;
        Self {
            token_in: (&request.token_in).into(),
            token_out: (&request.token_out).into(),
            direction: request.direction.as_str().to_string(),
            base_amount: format_amount(preview.base_amount),
            quoted_estimate: format_amount(preview.quoted_estimate),
            quoted_estimate_readable: AmountConverter::format_base_units(preview.quoted_estimate, estimate_decimals),
            value_to_send: preview.value_to_send.to_string(),
            call_data_bytes: preview.call_data_len,
            timestamp: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
