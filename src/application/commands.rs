//! CLI commands
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "routeswap")]
#[command(version, about = "Routed DEX swaps: quote, approve and swap with confirmations")]
pub struct Cli {
    /// Path to config file
    #[arg(long, global = true, default_value = "Config.toml")]
    pub config: String,

    /// RPC endpoint URL (overrides config)
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Convert, quote, approve and swap
    Swap {
        /// Amount to trade, as a decimal string (overrides config)
        #[arg(long)]
        amount: Option<String>,

        /// Only quote, submit nothing
        #[arg(long)]
        simulate_only: bool,
    },

    /// Fetch a route without submitting anything
    Quote {
        #[arg(long)]
        amount: Option<String>,
    },

    /// Wrap native currency into WETH
    Wrap {
        /// Amount of native currency, e.g. 0.5
        #[arg(long)]
        amount: String,
    },

    /// Show native and token balances of the wallet
    Balance,
}

impl Commands {
    /// Amount override carried by the command, if any
    pub fn amount_override(&self) -> Option<&str> {
        match self {
            Commands::Swap { amount, .. } | Commands::Quote { amount } => amount.as_deref(),
            _ => None,
        }
    }
}
