// src/app.rs
use alloy::primitives::Address;
use anyhow::{anyhow, bail, Context, Result};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use routeswap::application::Commands;
use routeswap::domain::amount::{AmountConverter, FractionPolicy};
use routeswap::domain::chain::{ChainClient, TxSigner};
use routeswap::domain::execution::{ApprovalStep, SwapExecutor};
use routeswap::domain::pipeline::{PipelineOrchestrator, SwapRequest};
use routeswap::domain::routing::RouteClient;
use routeswap::infrastructure::blockchain::{erc20, EvmRpcClient, ExecutionConfig, JsonRpcChainClient, LocalSigner};
use routeswap::infrastructure::routing::RoutingApiClient;
use routeswap::shared::tokens::{known_token, V3_SWAP_ROUTER_ADDRESS};
use routeswap::shared::types::{
    ExecutionVariant, GasParameters, SlippageTolerance, SwapOptions, Token, TradeDirection,
};
use routeswap::shared::utils::{format_units, gwei_to_wei};

use crate::config::Config;
use crate::report::{QuoteReport, SwapReport};

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub simulate_only: bool,
    pub rpc_url: String,
    pub rpc_timeout: Duration,
    pub chain_id: u64,
    pub private_key_env: String,

    pub token_in: Token,
    pub token_out: Token,
    pub amount: String,
    pub direction: TradeDirection,
    pub slippage: SlippageTolerance,
    pub deadline_secs: u64,
    pub execution_variant: ExecutionVariant,
    pub fraction_policy: FractionPolicy,

    pub swap_router: Address,
    pub routing_api_url: String,
    pub routing_timeout: Duration,
    pub protocols: Option<String>,

    pub gas: GasParameters,
    pub approval_confirmations: u64,
    pub swap_confirmations: u64,
    pub poll_interval: Duration,
    pub confirmation_timeout: Duration,
}

fn parse_fraction_policy(s: &str) -> Result<FractionPolicy> {
    match s.to_lowercase().as_str() {
        "reject" => Ok(FractionPolicy::Reject),
        "truncate" => Ok(FractionPolicy::Truncate),
        other => Err(anyhow!("Unknown fraction policy: {}", other)),
    }
}

/// The routing API client only requests SwapRouter02 call data
fn parse_execution_variant(s: &str) -> Result<ExecutionVariant> {
    match s.parse::<ExecutionVariant>()? {
        ExecutionVariant::SwapRouter02 => Ok(ExecutionVariant::SwapRouter02),
        ExecutionVariant::UniversalRouter => Err(anyhow!(
            "execution_variant '{}' is not supported: the routing API client only encodes SwapRouter02 calls",
            s
        )),
    }
}

impl AppCfg {
    pub fn from_config(cfg: Config, override_simulate: bool) -> Result<Self> {
        let chain_id = cfg.rpc.chain_id;
        let swap_router: Address = match &cfg.router.swap_router {
            Some(addr) => addr.parse().context("invalid router.swap_router")?,
            None => V3_SWAP_ROUTER_ADDRESS,
        };

        Ok(Self {
            simulate_only: if override_simulate { true } else { cfg.trade.simulate_only.unwrap_or(false) },
            rpc_url: cfg.rpc.url,
            rpc_timeout: Duration::from_secs(cfg.rpc.timeout_secs),
            chain_id,
            private_key_env: cfg.wallet.private_key_env,

            token_in: cfg.tokens.token_in.resolve(chain_id)?,
            token_out: cfg.tokens.token_out.resolve(chain_id)?,
            amount: cfg.trade.amount,
            direction: cfg.trade.direction.parse()?,
            slippage: SlippageTolerance::from_bps(cfg.trade.slippage_bps),
            deadline_secs: cfg.trade.deadline_secs,
            execution_variant: parse_execution_variant(&cfg.trade.execution_variant)?,
            fraction_policy: parse_fraction_policy(&cfg.trade.fraction_policy)?,

            swap_router,
            routing_api_url: cfg.router.api_url,
            routing_timeout: Duration::from_secs(cfg.router.timeout_secs),
            protocols: cfg.router.protocols,

            gas: GasParameters {
                max_fee_per_gas: gwei_to_wei(cfg.gas.max_fee_gwei),
                max_priority_fee_per_gas: gwei_to_wei(cfg.gas.max_priority_fee_gwei),
                gas_limit: cfg.gas.gas_limit,
            },
            approval_confirmations: cfg.confirmations.approval,
            swap_confirmations: cfg.confirmations.swap,
            poll_interval: Duration::from_millis(cfg.confirmations.poll_interval_ms),
            confirmation_timeout: Duration::from_secs(cfg.confirmations.timeout_secs),
        })
    }

    fn swap_request(&self, recipient: Address) -> Result<SwapRequest> {
        let amount = Decimal::from_str(self.amount.trim())
            .with_context(|| format!("'{}' is not a decimal amount", self.amount))?;
        Ok(SwapRequest {
            token_in: self.token_in.clone(),
            token_out: self.token_out.clone(),
            amount,
            direction: self.direction,
            options: SwapOptions::with_deadline_window(
                recipient,
                self.slippage,
                self.deadline_secs,
                self.execution_variant,
            ),
            gas: self.gas,
        })
    }

    fn orchestrator(&self) -> Result<PipelineOrchestrator> {
        let mut oracle = RoutingApiClient::new(&self.routing_api_url, self.routing_timeout)?;
        if let Some(protocols) = &self.protocols {
            oracle = oracle.with_protocols(protocols);
        }
        Ok(PipelineOrchestrator::new(
            AmountConverter::new(self.fraction_policy),
            RouteClient::new(Arc::new(oracle)),
            ApprovalStep::new(self.approval_confirmations),
            SwapExecutor::new(self.swap_router, self.swap_confirmations),
        ))
    }

    fn chain_client(&self) -> Result<JsonRpcChainClient> {
        let rpc = EvmRpcClient::new(&self.rpc_url, self.rpc_timeout)?;
        Ok(JsonRpcChainClient::new(
            rpc,
            ExecutionConfig {
                poll_interval: self.poll_interval,
                confirmation_timeout: self.confirmation_timeout,
                ..ExecutionConfig::default()
            },
        ))
    }
}

pub async fn run(app_cfg: AppCfg, command: Commands) -> Result<()> {
    info!(
        "Starting routeswap on chain {} ({} -> {}, router {})",
        app_cfg.chain_id, app_cfg.token_in.symbol, app_cfg.token_out.symbol, app_cfg.swap_router
    );

    match command {
        Commands::Quote { .. } => quote(&app_cfg).await,
        Commands::Swap { .. } if app_cfg.simulate_only => {
            info!("🧪 Simulation mode - quoting only, nothing is submitted");
            quote(&app_cfg).await
        }
        Commands::Swap { .. } => swap(&app_cfg).await,
        Commands::Wrap { amount } => wrap(&app_cfg, &amount).await,
        Commands::Balance => balance(&app_cfg).await,
    }
}

/// Refuse to sign for a node on another chain than the configured tokens
async fn connect(app_cfg: &AppCfg) -> Result<(JsonRpcChainClient, LocalSigner)> {
    let chain = app_cfg.chain_client()?;
    let node_chain_id = chain.chain_id().await.context("query chain id")?;
    if node_chain_id != app_cfg.chain_id {
        bail!(
            "RPC endpoint is on chain {}, config expects {}",
            node_chain_id,
            app_cfg.chain_id
        );
    }

    let signer = LocalSigner::from_env(&app_cfg.private_key_env)?;
    info!("Loaded wallet: {}", signer.address());
    Ok((chain, signer))
}

async fn quote(app_cfg: &AppCfg) -> Result<()> {
    // recipient only shapes the call data, a wallet is optional here
    let recipient = LocalSigner::from_env(&app_cfg.private_key_env)
        .map(|s| s.address())
        .unwrap_or_else(|_| {
            warn!("No wallet configured, quoting for the zero address");
            Address::ZERO
        });

    let request = app_cfg.swap_request(recipient)?;
    let preview = app_cfg
        .orchestrator()?
        .preview(&request)
        .await
        .map_err(|failure| anyhow!("{}", failure))?;

    let report = QuoteReport::from_preview(&preview, &request);
    println!("{}", report.to_json()?);
    Ok(())
}

async fn swap(app_cfg: &AppCfg) -> Result<()> {
    let (chain, signer) = connect(app_cfg).await?;
    let request = app_cfg.swap_request(signer.address())?;

    let report = app_cfg
        .orchestrator()?
        .run(&chain, &signer, request.clone())
        .await;

    let swap_report = SwapReport::from_pipeline(&report, &request);
    println!("{}", swap_report.to_json()?);

    match &report.failure {
        None => {
            info!("✅ Swap complete: {:?}", report.transaction_hashes());
            Ok(())
        }
        Some(failure) => {
            error!("❌ {}", failure);
            Err(anyhow!("swap run {} failed: {}", report.run_id, failure))
        }
    }
}

async fn wrap(app_cfg: &AppCfg, amount: &str) -> Result<()> {
    let weth = known_token(app_cfg.chain_id, "WETH")
        .ok_or_else(|| anyhow!("no WETH known on chain {}", app_cfg.chain_id))?;
    let value = AmountConverter::new(app_cfg.fraction_policy).parse(amount, weth.decimals)?;

    let (chain, signer) = connect(app_cfg).await?;
    let outcome = erc20::wrap_native(
        &chain,
        &signer,
        weth.address,
        value.value(),
        &app_cfg.gas,
        app_cfg.approval_confirmations,
    )
    .await?;

    info!("✅ Wrapped {} into {}: {}", amount, weth.symbol, outcome.hash);
    Ok(())
}

async fn balance(app_cfg: &AppCfg) -> Result<()> {
    let (chain, signer) = connect(app_cfg).await?;
    let owner = signer.address();

    let native = chain.native_balance(owner).await?;
    info!("Native balance of {}: {}", owner, format_units(native, 18));

    for token in [&app_cfg.token_in, &app_cfg.token_out] {
        let amount = erc20::balance_of(&chain, token.address, owner).await?;
        info!("{} balance: {}", token.symbol, format_units(amount, token.decimals));
    }

    let token_in = &app_cfg.token_in;
    let allowance = erc20::allowance(&chain, token_in.address, owner, app_cfg.swap_router).await?;
    info!(
        "{} allowance for router {}: {}",
        token_in.symbol,
        app_cfg.swap_router,
        format_units(allowance, token_in.decimals)
    );
    Ok(())
}
