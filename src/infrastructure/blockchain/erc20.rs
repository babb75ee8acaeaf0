//! ERC-20 reads and WETH wrapping

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use tracing::info;

use crate::domain::chain::{ChainClient, TransactionRequest, TxSigner};
use crate::shared::abi::{IWETH9, IERC20};
use crate::shared::errors::ChainError;
use crate::shared::types::{GasParameters, TransactionOutcome};

pub async fn balance_of(chain: &dyn ChainClient, token: Address, owner: Address) -> Result<U256, ChainError> {
    let data = IERC20::balanceOfCall { account: owner }.abi_encode();
    let out = chain.call(token, data.into()).await?;
    IERC20::balanceOfCall::abi_decode_returns(&out)
        .map_err(|e| ChainError::InvalidResponse(format!("balanceOf: {}", e)))
}

/// Amount `spender` may still move out of `owner`'s balance
pub async fn allowance(
    chain: &dyn ChainClient,
    token: Address,
    owner: Address,
    spender: Address,
) -> Result<U256, ChainError> {
    let data = IERC20::allowanceCall { owner, spender }.abi_encode();
    let out = chain.call(token, data.into()).await?;
    IERC20::allowanceCall::abi_decode_returns(&out)
        .map_err(|e| ChainError::InvalidResponse(format!("allowance: {}", e)))
}

/// Wrap native currency by calling `deposit()` with `amount` attached
pub async fn wrap_native(
    chain: &dyn ChainClient,
    signer: &dyn TxSigner,
    weth: Address,
    amount: U256,
    gas: &GasParameters,
    confirmations: u64,
) -> Result<TransactionOutcome, ChainError> {
    let request = TransactionRequest {
        from: signer.address(),
        to: weth,
        value: amount,
        data: IWETH9::depositCall {}.abi_encode().into(),
        gas: *gas,
    };

    let pending = chain.send_transaction(signer, request).await?;
    info!("Wrap tx sent: {}", pending.hash);
    let receipt = chain.wait_for_confirmations(&pending, confirmations.max(1)).await?;
    if !receipt.success {
        return Err(ChainError::ExecutionReverted {
            reason: receipt.revert_reason,
        });
    }
    Ok(receipt.into_outcome())
}
