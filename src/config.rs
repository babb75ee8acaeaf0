use alloy::primitives::Address;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

use routeswap::shared::tokens::{known_token, MAINNET_CHAIN_ID};
use routeswap::shared::types::Token;

#[derive(Debug, Clone, Deserialize)]
pub struct RpcCfg {
    pub url: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_rpc_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletCfg {
    /// Environment variable holding the hex private key
    #[serde(default = "default_key_env")]
    pub private_key_env: String,
}

impl Default for WalletCfg {
    fn default() -> Self {
        Self {
            private_key_env: default_key_env(),
        }
    }
}

/// Either a full descriptor or just a symbol from the known-token table
#[derive(Debug, Clone, Deserialize)]
pub struct TokenEntry {
    pub symbol: String,
    pub address: Option<String>,
    pub decimals: Option<u8>,
    pub name: Option<String>,
}

impl TokenEntry {
    pub fn resolve(&self, chain_id: u64) -> Result<Token> {
        match (&self.address, self.decimals) {
            (Some(address), Some(decimals)) => {
                let address: Address = address
                    .parse()
                    .with_context(|| format!("invalid address for token {}", self.symbol))?;
                Ok(Token::new(chain_id, address, decimals, self.symbol.clone(), self.name.as_deref()))
            }
            (None, None) => known_token(chain_id, &self.symbol)
                .ok_or_else(|| anyhow!("token {} is not known on chain {}", self.symbol, chain_id)),
            _ => Err(anyhow!(
                "token {} needs both address and decimals, or neither",
                self.symbol
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenCfg {
    pub token_in: TokenEntry,
    pub token_out: TokenEntry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeCfg {
    /// Decimal string, parsed without floating point
    pub amount: String,
    #[serde(default = "default_direction")]
    pub direction: String,
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u32,
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    #[serde(default = "default_execution_variant")]
    pub execution_variant: String,
    #[serde(default = "default_fraction_policy")]
    pub fraction_policy: String,
    pub simulate_only: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouterCfg {
    pub swap_router: Option<String>,
    pub api_url: String,
    #[serde(default = "default_router_timeout")]
    pub timeout_secs: u64,
    pub protocols: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GasCfg {
    #[serde(default = "default_fee_gwei")]
    pub max_fee_gwei: u64,
    #[serde(default = "default_fee_gwei")]
    pub max_priority_fee_gwei: u64,
    pub gas_limit: Option<u64>,
}

impl Default for GasCfg {
    fn default() -> Self {
        Self {
            max_fee_gwei: default_fee_gwei(),
            max_priority_fee_gwei: default_fee_gwei(),
            gas_limit: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmationsCfg {
    #[serde(default = "default_confirmations")]
    pub approval: u64,
    #[serde(default = "default_confirmations")]
    pub swap: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_confirmation_timeout")]
    pub timeout_secs: u64,
}

impl Default for ConfirmationsCfg {
    fn default() -> Self {
        Self {
            approval: default_confirmations(),
            swap: default_confirmations(),
            poll_interval_ms: default_poll_interval_ms(),
            timeout_secs: default_confirmation_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub rpc: RpcCfg,
    #[serde(default)]
    pub wallet: WalletCfg,
    pub tokens: TokenCfg,
    pub trade: TradeCfg,
    pub router: RouterCfg,
    #[serde(default)]
    pub gas: GasCfg,
    #[serde(default)]
    pub confirmations: ConfirmationsCfg,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())
            .with_context(|| format!("read {}", path.as_ref().display()))?;
        Self::from_toml(&s)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s).context("parse Config.toml")?;
        Ok(cfg)
    }
}

fn default_chain_id() -> u64 {
    MAINNET_CHAIN_ID
}

fn default_rpc_timeout() -> u64 {
    30
}

fn default_key_env() -> String {
    "PRIVATE_KEY".to_string()
}

fn default_direction() -> String {
    "exact_input".to_string()
}

fn default_slippage_bps() -> u32 {
    50
}

fn default_deadline_secs() -> u64 {
    1800
}

fn default_execution_variant() -> String {
    "swap_router_02".to_string()
}

fn default_fraction_policy() -> String {
    "reject".to_string()
}

fn default_router_timeout() -> u64 {
    10
}

fn default_fee_gwei() -> u64 {
    100
}

fn default_confirmations() -> u64 {
    1
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_confirmation_timeout() -> u64 {
    180
}
