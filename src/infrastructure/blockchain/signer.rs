//! Local private-key signer producing EIP-1559 envelopes

use alloy::consensus::{SignableTransaction, TxEip1559, TxEnvelope};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes, TxKind};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use std::fmt;

use crate::domain::chain::{TxSigner, UnsignedTransaction};
use crate::shared::errors::{AppError, ChainError};

/// secp256k1 key held in memory for the lifetime of the process
pub struct LocalSigner {
    inner: PrivateKeySigner,
}

impl LocalSigner {
    /// Hex private key, with or without `0x`
    pub fn from_private_key(key: &str) -> Result<Self, AppError> {
        let inner = key
            .trim()
            .parse::<PrivateKeySigner>()
            .map_err(|e| AppError::WalletError(format!("Invalid private key: {}", e)))?;
        Ok(Self { inner })
    }

    pub fn from_env(var: &str) -> Result<Self, AppError> {
        let key = std::env::var(var)
            .map_err(|_| AppError::WalletError(format!("Environment variable {} is not set", var)))?;
        Self::from_private_key(&key)
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.inner.address())
            .finish()
    }
}

impl TxSigner for LocalSigner {
    fn address(&self) -> Address {
        self.inner.address()
    }

    fn sign_transaction(&self, tx: UnsignedTransaction) -> Result<Bytes, ChainError> {
        let tx = TxEip1559 {
            chain_id: tx.chain_id,
            nonce: tx.nonce,
            gas_limit: tx.gas_limit,
            max_fee_per_gas: tx.max_fee_per_gas,
            max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
            to: TxKind::Call(tx.to),
            value: tx.value,
            access_list: Default::default(),
            input: tx.input,
        };

        let signature = self
            .inner
            .sign_hash_sync(&tx.signature_hash())
            .map_err(|e| ChainError::Signing(e.to_string()))?;
        let envelope: TxEnvelope = tx.into_signed(signature).into();
        Ok(envelope.encoded_2718().into())
    }
}
