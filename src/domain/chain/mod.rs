//! Chain domain - the RPC and signing capabilities a pipeline run borrows

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;

use crate::shared::errors::ChainError;
use crate::shared::types::{GasParameters, TransactionOutcome};

/// Transaction the pipeline wants submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub gas: GasParameters,
}

/// Fully populated EIP-1559 transaction, ready for signing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_limit: u64,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
    pub to: Address,
    pub value: U256,
    pub input: Bytes,
}

/// Submitted, not yet confirmed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub hash: B256,
    pub nonce: u64,
    pub request: TransactionRequest,
}

/// Mined transaction as seen after the confirmation wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub success: bool,
    pub block_number: u64,
    pub gas_used: u64,
    pub confirmations: u64,
    pub revert_reason: Option<String>,
}

impl TransactionReceipt {
    pub fn into_outcome(self) -> TransactionOutcome {
        TransactionOutcome {
            hash: self.transaction_hash,
            confirmed: self.success,
            confirmation_count: self.confirmations,
            block_number: Some(self.block_number),
            gas_used: Some(self.gas_used),
            revert_reason: self.revert_reason,
        }
    }
}

/// Something that can sign transactions for one account
pub trait TxSigner: Send + Sync {
    fn address(&self) -> Address;

    /// Sign and return the raw, broadcastable envelope
    fn sign_transaction(&self, tx: UnsignedTransaction) -> Result<Bytes, ChainError>;
}

/// Chain RPC capability
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Read-only contract call against the latest block
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError>;

    async fn native_balance(&self, owner: Address) -> Result<U256, ChainError>;

    /// Fill nonce/chain/gas, sign with `signer` and broadcast
    async fn send_transaction(
        &self,
        signer: &dyn TxSigner,
        request: TransactionRequest,
    ) -> Result<PendingTransaction, ChainError>;

    /// Suspend until the transaction is mined with `confirmations` blocks,
    /// or has reverted. Fails with `ChainError::Timeout` per the client's
    /// polling policy.
    async fn wait_for_confirmations(
        &self,
        pending: &PendingTransaction,
        confirmations: u64,
    ) -> Result<TransactionReceipt, ChainError>;
}
