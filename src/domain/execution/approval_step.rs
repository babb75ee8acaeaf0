//! Bounded ERC-20 approval of the swap router

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use tracing::{error, info};

use super::classify_send_error;
use crate::domain::chain::{ChainClient, TransactionRequest, TxSigner};
use crate::shared::abi::IERC20;
use crate::shared::errors::{ChainError, SwapError};
use crate::shared::types::{BaseUnitAmount, GasParameters, Token, TransactionOutcome};

/// Grants the router an allowance of exactly the amount being traded.
///
/// Every call submits a fresh approval, even if an earlier run left enough
/// allowance behind.
#[derive(Debug, Clone)]
pub struct ApprovalStep {
    confirmations: u64,
}

impl ApprovalStep {
    pub fn new(confirmations: u64) -> Self {
        Self {
            confirmations: confirmations.max(1),
        }
    }

    pub async fn ensure_approval(
        &self,
        chain: &dyn ChainClient,
        owner: &dyn TxSigner,
        token: &Token,
        spender: Address,
        amount: BaseUnitAmount,
        gas: &GasParameters,
    ) -> Result<TransactionOutcome, SwapError> {
        if amount.is_zero() {
            return Err(SwapError::InvalidAmount("approval amount is zero".to_string()));
        }

        let data = IERC20::approveCall {
            spender,
            amount: amount.value(),
        }
        .abi_encode();

        info!("Approving {} {} for spender {}", amount, token.symbol, spender);

        let request = TransactionRequest {
            from: owner.address(),
            to: token.address,
            value: U256::ZERO,
            data: data.into(),
            gas: *gas,
        };

        let pending = chain.send_transaction(owner, request).await.map_err(|e| {
            error!("Approval submission failed: {}", e);
            classify_send_error(e, |reason| SwapError::ApprovalRejected { tx_hash: None, reason })
        })?;
        info!("Approval tx sent: {}", pending.hash);

        let receipt = chain
            .wait_for_confirmations(&pending, self.confirmations)
            .await
            .map_err(|e| match e {
                ChainError::Timeout { tx_hash, .. } => SwapError::ApprovalTimeout { tx_hash },
                other => SwapError::ChainUnavailable(other.to_string()),
            })?;

        if !receipt.success {
            error!("❌ Approval {} reverted", receipt.transaction_hash);
            return Err(SwapError::ApprovalRejected {
                tx_hash: Some(receipt.transaction_hash),
                reason: receipt
                    .revert_reason
                    .unwrap_or_else(|| "transaction reverted".to_string()),
            });
        }

        info!(
            "Approval confirmed: {} ({} confirmations, block {})",
            receipt.transaction_hash, receipt.confirmations, receipt.block_number
        );
        Ok(receipt.into_outcome())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testing::{decode_approve, token, MockChain, MockSigner, TxBehaviour, ROUTER, WETH};

    #[tokio::test]
    async fn test_submits_bounded_approval() {
        let chain = MockChain::new();
        let signer = MockSigner::wallet();
        let weth = token(WETH);
        let amount = BaseUnitAmount::from(1_000_000_000_000_000_000u64);

        let outcome = ApprovalStep::new(1)
            .ensure_approval(&chain, &signer, &weth, ROUTER, amount, &GasParameters::default())
            .await
            .unwrap();

        assert!(outcome.confirmed);
        assert_eq!(outcome.confirmation_count, 1);

        let sent = chain.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, weth.address);
        assert_eq!(sent[0].value, U256::ZERO);
        assert_eq!(&sent[0].data[..4], &IERC20::approveCall::SELECTOR);
        let (spender, approved) = decode_approve(&sent[0].data);
        assert_eq!(spender, ROUTER);
        assert_eq!(approved, amount.value());
        assert_ne!(approved, U256::MAX);
    }

    #[tokio::test]
    async fn test_waits_for_at_least_one_confirmation() {
        let chain = MockChain::new();
        ApprovalStep::new(0)
            .ensure_approval(
                &chain,
                &MockSigner::wallet(),
                &token(WETH),
                ROUTER,
                BaseUnitAmount::from(5),
                &GasParameters::default(),
            )
            .await
            .unwrap();
        assert_eq!(chain.waits()[0].1, 1);
    }

    #[tokio::test]
    async fn test_revert_is_rejection() {
        let chain = MockChain::scripted(vec![TxBehaviour::Revert("paused".to_string())]);
        let err = ApprovalStep::new(1)
            .ensure_approval(
                &chain,
                &MockSigner::wallet(),
                &token(WETH),
                ROUTER,
                BaseUnitAmount::from(5),
                &GasParameters::default(),
            )
            .await
            .unwrap_err();
        match err {
            SwapError::ApprovalRejected { tx_hash, reason } => {
                assert!(tx_hash.is_some());
                assert_eq!(reason, "paused");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout() {
        let chain = MockChain::scripted(vec![TxBehaviour::Timeout]);
        let err = ApprovalStep::new(1)
            .ensure_approval(
                &chain,
                &MockSigner::wallet(),
                &token(WETH),
                ROUTER,
                BaseUnitAmount::from(5),
                &GasParameters::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SwapError::ApprovalTimeout { .. }));
    }

    #[tokio::test]
    async fn test_submission_failures() {
        let chain = MockChain::scripted(vec![TxBehaviour::RejectOnSend(ChainError::InsufficientFunds(
            "gas * price + value".to_string(),
        ))]);
        let err = ApprovalStep::new(1)
            .ensure_approval(
                &chain,
                &MockSigner::wallet(),
                &token(WETH),
                ROUTER,
                BaseUnitAmount::from(5),
                &GasParameters::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SwapError::InsufficientFunds(_)));

        let chain = MockChain::scripted(vec![TxBehaviour::RejectOnSend(ChainError::ExecutionReverted {
            reason: None,
        })]);
        let err = ApprovalStep::new(1)
            .ensure_approval(
                &chain,
                &MockSigner::wallet(),
                &token(WETH),
                ROUTER,
                BaseUnitAmount::from(5),
                &GasParameters::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SwapError::ApprovalRejected { tx_hash: None, .. }));
        assert!(chain.waits().is_empty());
    }

    #[tokio::test]
    async fn test_zero_amount_is_invalid() {
        let chain = MockChain::new();
        let err = ApprovalStep::new(1)
            .ensure_approval(
                &chain,
                &MockSigner::wallet(),
                &token(WETH),
                ROUTER,
                BaseUnitAmount::ZERO,
                &GasParameters::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SwapError::InvalidAmount(_)));
        assert!(chain.sent().is_empty());
    }
}
