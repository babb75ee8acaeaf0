//! Test doubles for the chain, signer and routing oracle seams

use alloy::primitives::{address, Address, Bytes, B256, U256};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::domain::chain::{
    ChainClient, PendingTransaction, TransactionReceipt, TransactionRequest, TxSigner, UnsignedTransaction,
};
use crate::domain::routing::{RouteOracle, RouteRequest};
use crate::shared::errors::{ChainError, RouteOracleError};
use crate::shared::tokens::{known_token, MAINNET_CHAIN_ID, V3_SWAP_ROUTER_ADDRESS};
use crate::shared::types::{
    BaseUnitAmount, ExecutionVariant, Route, SlippageTolerance, SwapOptions, Token,
};

pub const WETH: &str = "WETH";
pub const USDC: &str = "USDC";
pub const ROUTER: Address = V3_SWAP_ROUTER_ADDRESS;
pub const WALLET: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

pub fn token(symbol: &str) -> Token {
    known_token(MAINNET_CHAIN_ID, symbol).expect("known test token")
}

pub fn options_expiring_in(secs: u64) -> SwapOptions {
    SwapOptions::with_deadline_window(
        WALLET,
        SlippageTolerance::from_bps(50),
        secs,
        ExecutionVariant::SwapRouter02,
    )
}

/// Fields of the route a stub oracle hands out
#[derive(Debug, Clone)]
pub struct RouteTemplate {
    pub call_data: Bytes,
    pub value_to_send: U256,
    pub quoted_estimate: BaseUnitAmount,
}

/// `Route{callData: 0xdead, valueToSend: 0}` quoting 2500 USDC
pub fn stub_route() -> RouteTemplate {
    RouteTemplate {
        call_data: Bytes::from_static(&[0xde, 0xad]),
        value_to_send: U256::ZERO,
        quoted_estimate: BaseUnitAmount::from(2_500_000_000u64),
    }
}

enum OracleReply {
    Route(RouteTemplate),
    Empty,
    Fail(RouteOracleError),
}

pub struct StubOracle {
    reply: OracleReply,
    requests: Mutex<Vec<RouteRequest>>,
}

impl StubOracle {
    pub fn returning(template: RouteTemplate) -> Self {
        Self::with_reply(OracleReply::Route(template))
    }

    pub fn empty() -> Self {
        Self::with_reply(OracleReply::Empty)
    }

    pub fn failing(err: RouteOracleError) -> Self {
        Self::with_reply(OracleReply::Fail(err))
    }

    fn with_reply(reply: OracleReply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<RouteRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl RouteOracle for StubOracle {
    async fn route(&self, request: &RouteRequest) -> Result<Option<Route>, RouteOracleError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            OracleReply::Route(template) => Ok(Some(Route {
                call_data: template.call_data.clone(),
                value_to_send: template.value_to_send,
                quoted_estimate: template.quoted_estimate,
                direction: request.direction,
                deadline_unix_seconds: request.options.deadline_unix_seconds,
            })),
            OracleReply::Empty => Ok(None),
            OracleReply::Fail(err) => Err(err.clone()),
        }
    }
}

/// How the mock chain treats the next submitted transaction
#[derive(Debug, Clone)]
pub enum TxBehaviour {
    Confirm,
    Revert(String),
    Timeout,
    RejectOnSend(ChainError),
}

#[derive(Default)]
struct MockChainState {
    script: VecDeque<TxBehaviour>,
    outcomes: HashMap<B256, TxBehaviour>,
    sent: Vec<TransactionRequest>,
    waits: Vec<(B256, u64)>,
    native_balance: U256,
    call_response: Bytes,
    calls: Vec<(Address, Bytes)>,
}

/// Scripted chain: each submission takes the next behaviour, defaulting to
/// `Confirm`, and every request is recorded in order.
pub struct MockChain {
    state: Mutex<MockChainState>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockChainState {
                native_balance: U256::from(10u64).pow(U256::from(19u64)),
                ..Default::default()
            }),
        }
    }

    pub fn scripted(script: Vec<TxBehaviour>) -> Self {
        let chain = Self::new();
        chain.state.lock().unwrap().script = script.into();
        chain
    }

    pub fn with_native_balance(self, balance: U256) -> Self {
        self.state.lock().unwrap().native_balance = balance;
        self
    }

    pub fn with_call_response(self, response: Bytes) -> Self {
        self.state.lock().unwrap().call_response = response;
        self
    }

    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn waits(&self) -> Vec<(B256, u64)> {
        self.state.lock().unwrap().waits.clone()
    }

    pub fn calls(&self) -> Vec<(Address, Bytes)> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((to, data));
        Ok(state.call_response.clone())
    }

    async fn native_balance(&self, _owner: Address) -> Result<U256, ChainError> {
        Ok(self.state.lock().unwrap().native_balance)
    }

    async fn send_transaction(
        &self,
        signer: &dyn TxSigner,
        request: TransactionRequest,
    ) -> Result<PendingTransaction, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.sent.push(request.clone());
        let behaviour = state.script.pop_front().unwrap_or(TxBehaviour::Confirm);
        if let TxBehaviour::RejectOnSend(err) = behaviour {
            return Err(err);
        }

        let nonce = state.sent.len() as u64 - 1;
        signer.sign_transaction(UnsignedTransaction {
            chain_id: MAINNET_CHAIN_ID,
            nonce,
            gas_limit: request.gas.gas_limit.unwrap_or(21_000),
            max_fee_per_gas: request.gas.max_fee_per_gas,
            max_priority_fee_per_gas: request.gas.max_priority_fee_per_gas,
            to: request.to,
            value: request.value,
            input: request.data.clone(),
        })?;

        let hash = B256::with_last_byte(state.sent.len() as u8);
        state.outcomes.insert(hash, behaviour);
        Ok(PendingTransaction { hash, nonce, request })
    }

    async fn wait_for_confirmations(
        &self,
        pending: &PendingTransaction,
        confirmations: u64,
    ) -> Result<TransactionReceipt, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.waits.push((pending.hash, confirmations));
        let behaviour = state.outcomes.get(&pending.hash).cloned().unwrap_or(TxBehaviour::Confirm);
        let receipt = |success: bool, revert_reason: Option<String>| TransactionReceipt {
            transaction_hash: pending.hash,
            success,
            block_number: 100 + pending.nonce,
            gas_used: 50_000,
            confirmations,
            revert_reason,
        };
        match behaviour {
            TxBehaviour::Confirm => Ok(receipt(true, None)),
            TxBehaviour::Revert(reason) => Ok(receipt(false, Some(reason))),
            TxBehaviour::Timeout => Err(ChainError::Timeout {
                tx_hash: pending.hash,
                waited_secs: 120,
            }),
            TxBehaviour::RejectOnSend(err) => Err(err),
        }
    }
}

pub struct MockSigner {
    pub address: Address,
}

impl MockSigner {
    pub fn wallet() -> Self {
        Self { address: WALLET }
    }
}

impl TxSigner for MockSigner {
    fn address(&self) -> Address {
        self.address
    }

    fn sign_transaction(&self, tx: UnsignedTransaction) -> Result<Bytes, ChainError> {
        Ok(tx.input)
    }
}

/// Spender and amount of an encoded `approve(address,uint256)`
pub fn decode_approve(data: &[u8]) -> (Address, U256) {
    assert!(data.len() >= 68, "approve call data too short");
    (Address::from_slice(&data[16..36]), U256::from_be_slice(&data[36..68]))
}
