//! Error handling for the application

use alloy::primitives::{Address, B256};
use thiserror::Error;

/// Swap pipeline errors.
///
/// Every component maps its adapter-level failure into one of these before
/// handing it to the orchestrator, which surfaces it unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwapError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("No route found for {token_in} -> {token_out}")]
    NoRouteFound { token_in: String, token_out: String },

    #[error("Routing oracle unavailable: {0}")]
    RouteClientUnavailable(String),

    #[error("Route expired: deadline {deadline} is not after {now}")]
    RouteExpired { deadline: u64, now: u64 },

    #[error("Approval rejected{}: {reason}", fmt_hash(.tx_hash))]
    ApprovalRejected { tx_hash: Option<B256>, reason: String },

    #[error("Approval {tx_hash} not confirmed in time")]
    ApprovalTimeout { tx_hash: B256 },

    #[error("Swap reverted{}: {reason}", fmt_hash(.tx_hash))]
    SwapReverted { tx_hash: Option<B256>, reason: String },

    #[error("Swap {tx_hash} not confirmed in time")]
    SwapTimeout { tx_hash: B256 },

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Sender {from} does not match signer {signer}")]
    SignerMismatch { from: Address, signer: Address },

    #[error("Chain client unavailable: {0}")]
    ChainUnavailable(String),
}

fn fmt_hash(tx_hash: &Option<B256>) -> String {
    match tx_hash {
        Some(hash) => format!(" (tx {})", hash),
        None => String::new(),
    }
}

/// Chain RPC and signing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Execution reverted: {}", .reason.as_deref().unwrap_or("no reason"))]
    ExecutionReverted { reason: Option<String> },

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Transaction {tx_hash} not confirmed after {waited_secs}s")]
    Timeout { tx_hash: B256, waited_secs: u64 },

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),
}

/// Routing oracle errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteOracleError {
    #[error("Routing API request failed: {0}")]
    Transport(String),

    #[error("Routing API returned status {0}")]
    Status(u16),

    #[error("Invalid routing API response: {0}")]
    InvalidResponse(String),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Wallet error: {0}")]
    WalletError(String),

    #[error("Blockchain error: {0}")]
    BlockchainError(String),
}

impl From<ChainError> for AppError {
    fn from(err: ChainError) -> Self {
        AppError::BlockchainError(err.to_string())
    }
}
