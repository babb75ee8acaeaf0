//! EVM chain access over JSON-RPC

pub mod erc20;
pub mod rpc_client;
pub mod signer;
pub mod transaction_executor;

pub use rpc_client::EvmRpcClient;
pub use signer::LocalSigner;
pub use transaction_executor::{ExecutionConfig, JsonRpcChainClient};
