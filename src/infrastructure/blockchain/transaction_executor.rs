//! Chain client backed by a JSON-RPC node

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::rpc_client::{CallRequest, EvmRpcClient, RpcReceipt};
use crate::domain::chain::{
    ChainClient, PendingTransaction, TransactionReceipt, TransactionRequest, TxSigner, UnsignedTransaction,
};
use crate::shared::errors::ChainError;

/// Transaction execution configuration
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    pub poll_interval: Duration,
    pub confirmation_timeout: Duration,
    /// Added on top of `eth_estimateGas` when no gas limit is given
    pub gas_limit_buffer_pct: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            confirmation_timeout: Duration::from_secs(180),
            gas_limit_buffer_pct: 20,
        }
    }
}

/// Signs locally, submits raw transactions and polls for receipts
pub struct JsonRpcChainClient {
    rpc: EvmRpcClient,
    config: ExecutionConfig,
    chain_id: OnceCell<u64>,
}

impl JsonRpcChainClient {
    pub fn new(rpc: EvmRpcClient, config: ExecutionConfig) -> Self {
        Self {
            rpc,
            config,
            chain_id: OnceCell::new(),
        }
    }

    /// Chain id reported by the node, fetched once
    pub async fn chain_id(&self) -> Result<u64, ChainError> {
        self.chain_id
            .get_or_try_init(|| self.rpc.chain_id())
            .await
            .copied()
    }

    async fn gas_limit_for(&self, request: &TransactionRequest) -> Result<u64, ChainError> {
        if let Some(limit) = request.gas.gas_limit {
            return Ok(limit);
        }
        let estimate = self
            .rpc
            .estimate_gas(&CallRequest {
                from: Some(request.from),
                to: request.to,
                value: Some(request.value),
                data: request.data.clone(),
            })
            .await?;
        let limit = with_buffer(estimate, self.config.gas_limit_buffer_pct);
        debug!("Estimated gas {} -> limit {}", estimate, limit);
        Ok(limit)
    }

    /// Re-run a reverted transaction at its block to recover the reason
    async fn replay_revert_reason(&self, pending: &PendingTransaction, block: u64) -> Option<String> {
        let call = CallRequest {
            from: Some(pending.request.from),
            to: pending.request.to,
            value: Some(pending.request.value),
            data: pending.request.data.clone(),
        };
        match self.rpc.call(&call, &format!("0x{:x}", block)).await {
            Err(ChainError::ExecutionReverted { reason }) => reason,
            Err(e) => {
                debug!("Could not replay {}: {}", pending.hash, e);
                None
            }
            Ok(_) => None,
        }
    }

    /// One look at the receipt. `None` until it is mined deep enough.
    async fn poll_receipt(
        &self,
        pending: &PendingTransaction,
        wanted: u64,
    ) -> Result<Option<TransactionReceipt>, ChainError> {
        let Some(receipt) = self.rpc.transaction_receipt(pending.hash).await? else {
            return Ok(None);
        };
        let Some(block) = receipt.block_number.map(|b| b.to::<u64>()) else {
            return Ok(None);
        };

        let head = self.rpc.block_number().await?;
        let seen = head.saturating_sub(block) + 1;
        if !receipt.succeeded() {
            warn!("Tx {} reverted in block {}", pending.hash, block);
            return Ok(Some(self.to_receipt(pending, receipt, block, seen).await));
        }
        if seen >= wanted {
            return Ok(Some(self.to_receipt(pending, receipt, block, seen).await));
        }
        debug!("Tx {} has {}/{} confirmations", pending.hash, seen, wanted);
        Ok(None)
    }

    async fn to_receipt(
        &self,
        pending: &PendingTransaction,
        receipt: RpcReceipt,
        block: u64,
        confirmations: u64,
    ) -> TransactionReceipt {
        let success = receipt.succeeded();
        let revert_reason = if success {
            None
        } else {
            self.replay_revert_reason(pending, block).await
        };
        TransactionReceipt {
            transaction_hash: receipt.transaction_hash,
            success,
            block_number: block,
            gas_used: receipt.gas_used.to::<u64>(),
            confirmations,
            revert_reason,
        }
    }
}

fn with_buffer(estimate: u64, pct: u64) -> u64 {
    estimate.saturating_mul(100 + pct) / 100
}

#[async_trait]
impl ChainClient for JsonRpcChainClient {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError> {
        self.rpc
            .call(
                &CallRequest {
                    from: None,
                    to,
                    value: None,
                    data,
                },
                "latest",
            )
            .await
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, ChainError> {
        self.rpc.get_balance(owner).await
    }

    async fn send_transaction(
        &self,
        signer: &dyn TxSigner,
        request: TransactionRequest,
    ) -> Result<PendingTransaction, ChainError> {
        if request.from != signer.address() {
            return Err(ChainError::Signing(format!(
                "request sender {} is not the signer {}",
                request.from,
                signer.address()
            )));
        }

        let chain_id = self.chain_id().await?;
        let nonce = self.rpc.pending_nonce(request.from).await?;
        let gas_limit = self.gas_limit_for(&request).await?;

        let raw = signer.sign_transaction(UnsignedTransaction {
            chain_id,
            nonce,
            gas_limit,
            max_fee_per_gas: request.gas.max_fee_per_gas,
            max_priority_fee_per_gas: request.gas.max_priority_fee_per_gas,
            to: request.to,
            value: request.value,
            input: request.data.clone(),
        })?;

        let hash = self.rpc.send_raw_transaction(&raw).await?;
        info!("Submitted tx {} (nonce {}, gas limit {})", hash, nonce, gas_limit);

        Ok(PendingTransaction { hash, nonce, request })
    }

    async fn wait_for_confirmations(
        &self,
        pending: &PendingTransaction,
        confirmations: u64,
    ) -> Result<TransactionReceipt, ChainError> {
        let wanted = confirmations.max(1);
        let started = Instant::now();

        loop {
            match self.poll_receipt(pending, wanted).await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => {}
                // a flaky node says nothing about the transaction itself
                Err(e @ (ChainError::Transport(_) | ChainError::InvalidResponse(_))) => {
                    warn!("Receipt poll for {} failed, retrying: {}", pending.hash, e);
                }
                Err(e) => return Err(e),
            }

            if started.elapsed() >= self.config.confirmation_timeout {
                return Err(ChainError::Timeout {
                    tx_hash: pending.hash,
                    waited_secs: started.elapsed().as_secs(),
                });
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}
