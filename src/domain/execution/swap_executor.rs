//! Submission of a routed swap to the router contract

use alloy::primitives::Address;
use tracing::{error, info, warn};

use super::classify_send_error;
use crate::domain::chain::{ChainClient, TransactionRequest, TxSigner};
use crate::shared::errors::{ChainError, SwapError};
use crate::shared::types::{GasParameters, Route, TransactionOutcome};
use crate::shared::utils::unix_now;

/// Sends the route's call data to the router and waits for it to confirm
#[derive(Debug, Clone)]
pub struct SwapExecutor {
    router: Address,
    confirmations: u64,
}

impl SwapExecutor {
    pub fn new(router: Address, confirmations: u64) -> Self {
        Self {
            router,
            confirmations: confirmations.max(1),
        }
    }

    pub fn router(&self) -> Address {
        self.router
    }

    /// Execute a route. The route is consumed: a failed swap needs a fresh quote.
    pub async fn execute_swap(
        &self,
        chain: &dyn ChainClient,
        signer: &dyn TxSigner,
        route: Route,
        from: Address,
        gas: &GasParameters,
    ) -> Result<TransactionOutcome, SwapError> {
        let outcome = self.submit_swap(chain, signer, route, from, gas).await?;
        if outcome.confirmed {
            Ok(outcome)
        } else {
            Err(Self::revert_error(&outcome))
        }
    }

    /// Like `execute_swap`, but a mined revert comes back as an outcome with
    /// `confirmed == false` so the caller can keep its receipt.
    pub async fn submit_swap(
        &self,
        chain: &dyn ChainClient,
        signer: &dyn TxSigner,
        route: Route,
        from: Address,
        gas: &GasParameters,
    ) -> Result<TransactionOutcome, SwapError> {
        let now = unix_now();
        if route.is_stale_at(now) {
            warn!("Refusing to submit stale route (deadline {})", route.deadline_unix_seconds);
            return Err(SwapError::RouteExpired {
                deadline: route.deadline_unix_seconds,
                now,
            });
        }

        if from != signer.address() {
            return Err(SwapError::SignerMismatch {
                from,
                signer: signer.address(),
            });
        }

        if !route.value_to_send.is_zero() {
            let balance = chain
                .native_balance(from)
                .await
                .map_err(|e| SwapError::ChainUnavailable(e.to_string()))?;
            if balance < route.value_to_send {
                return Err(SwapError::InsufficientFunds(format!(
                    "balance {} is below route value {}",
                    balance, route.value_to_send
                )));
            }
        }

        info!(
            "Submitting swap to router {} ({} bytes call data, value {})",
            self.router,
            route.call_data.len(),
            route.value_to_send
        );

        let request = TransactionRequest {
            from,
            to: self.router,
            value: route.value_to_send,
            data: route.call_data,
            gas: *gas,
        };

        let pending = chain.send_transaction(signer, request).await.map_err(|e| {
            error!("Swap submission failed: {}", e);
            classify_send_error(e, |reason| SwapError::SwapReverted { tx_hash: None, reason })
        })?;
        info!("🚀 Swap tx sent: {}", pending.hash);

        let receipt = chain
            .wait_for_confirmations(&pending, self.confirmations)
            .await
            .map_err(|e| match e {
                ChainError::Timeout { tx_hash, .. } => SwapError::SwapTimeout { tx_hash },
                other => SwapError::ChainUnavailable(other.to_string()),
            })?;

        if !receipt.success {
            error!("❌ Swap {} reverted", receipt.transaction_hash);
            return Ok(receipt.into_outcome());
        }

        info!(
            "✅ Swap confirmed: {} in block {} (gas used {})",
            receipt.transaction_hash, receipt.block_number, receipt.gas_used
        );
        Ok(receipt.into_outcome())
    }

    /// Error for a swap that was mined but reverted
    pub fn revert_error(outcome: &TransactionOutcome) -> SwapError {
        SwapError::SwapReverted {
            tx_hash: Some(outcome.hash),
            reason: outcome
                .revert_reason
                .clone()
                .unwrap_or_else(|| "transaction reverted".to_string()),
        }
    }
}
