//! Ethereum JSON-RPC client over HTTP

use alloy::primitives::{Address, Bytes, B256, U256, U64};
use alloy::sol_types::decode_revert_reason;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::shared::errors::ChainError;

/// Call object for `eth_call` / `eth_estimateGas`
#[derive(Debug, Clone, Default, Serialize)]
pub struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    pub data: Bytes,
}

/// Subset of `eth_getTransactionReceipt` the pipeline reads
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub transaction_hash: B256,
    pub block_number: Option<U64>,
    pub gas_used: U64,
    /// Post-Byzantium status, `0x1` on success
    pub status: Option<U64>,
}

impl RpcReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.map(|s| s == U64::from(1)).unwrap_or(false)
    }
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

/// JSON-RPC 2.0 transport
pub struct EvmRpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl EvmRpcClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChainError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Issue a request whose result may legitimately be `null`
    pub async fn request_optional<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<T>, ChainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });
        debug!("RPC -> {} (id {})", method, id);

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Transport(format!("{} request failed: {}", method, e)))?;

        if !response.status().is_success() {
            return Err(ChainError::Transport(format!(
                "{} returned HTTP {}",
                method,
                response.status()
            )));
        }

        let parsed: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| ChainError::InvalidResponse(format!("{}: {}", method, e)))?;

        if let Some(err) = parsed.error {
            return Err(classify_rpc_error(err.code, &err.message, err.data.as_ref()));
        }
        Ok(parsed.result)
    }

    pub async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ChainError> {
        self.request_optional(method, params)
            .await?
            .ok_or_else(|| ChainError::InvalidResponse(format!("{} returned no result", method)))
    }

    pub async fn chain_id(&self) -> Result<u64, ChainError> {
        let id: U64 = self.request("eth_chainId", json!([])).await?;
        Ok(id.to::<u64>())
    }

    pub async fn block_number(&self) -> Result<u64, ChainError> {
        let number: U64 = self.request("eth_blockNumber", json!([])).await?;
        Ok(number.to::<u64>())
    }

    pub async fn get_balance(&self, owner: Address) -> Result<U256, ChainError> {
        self.request("eth_getBalance", json!([owner, "latest"])).await
    }

    /// Next nonce including transactions still in the mempool
    pub async fn pending_nonce(&self, owner: Address) -> Result<u64, ChainError> {
        let nonce: U64 = self
            .request("eth_getTransactionCount", json!([owner, "pending"]))
            .await?;
        Ok(nonce.to::<u64>())
    }

    pub async fn estimate_gas(&self, call: &CallRequest) -> Result<u64, ChainError> {
        let gas: U64 = self.request("eth_estimateGas", json!([call])).await?;
        Ok(gas.to::<u64>())
    }

    pub async fn call(&self, call: &CallRequest, block: &str) -> Result<Bytes, ChainError> {
        self.request("eth_call", json!([call, block])).await
    }

    pub async fn send_raw_transaction(&self, raw: &Bytes) -> Result<B256, ChainError> {
        self.request("eth_sendRawTransaction", json!([raw])).await
    }

    pub async fn transaction_receipt(&self, hash: B256) -> Result<Option<RpcReceipt>, ChainError> {
        self.request_optional("eth_getTransactionReceipt", json!([hash])).await
    }
}

/// Sort node errors into the cases the pipeline reacts to differently
pub fn classify_rpc_error(code: i64, message: &str, data: Option<&Value>) -> ChainError {
    let lower = message.to_lowercase();
    if lower.contains("insufficient funds") {
        return ChainError::InsufficientFunds(message.to_string());
    }
    if code == 3 || lower.contains("execution reverted") || lower.contains("revert") {
        let from_data = data
            .and_then(Value::as_str)
            .and_then(|hex| hex.parse::<Bytes>().ok())
            .and_then(|bytes| decode_revert_reason(&bytes))
            .map(|reason| match reason.strip_prefix("revert: ") {
                Some(stripped) => stripped.to_string(),
                None => reason,
            });
        let from_message = message
            .split_once("execution reverted: ")
            .map(|(_, reason)| reason.trim().to_string())
            .filter(|reason| !reason.is_empty());
        return ChainError::ExecutionReverted {
            reason: from_data.or(from_message),
        };
    }
    ChainError::Rpc {
        code,
        message: message.to_string(),
    }
}
