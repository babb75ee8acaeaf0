//! Well-known token descriptors and router addresses

use alloy::primitives::{address, Address};

use crate::shared::types::Token;

/// Uniswap SwapRouter02, same address on mainnet and Goerli
pub const V3_SWAP_ROUTER_ADDRESS: Address = address!("68b3465833fb72A70ecDF485E0e4C7bD8665Fc45");

pub const MAINNET_CHAIN_ID: u64 = 1;
pub const GOERLI_CHAIN_ID: u64 = 5;

/// (chain_id, symbol, address, decimals, name)
const KNOWN_TOKENS: &[(u64, &str, Address, u8, &str)] = &[
    (MAINNET_CHAIN_ID, "WETH", address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"), 18, "Wrapped Ether"),
    (MAINNET_CHAIN_ID, "USDC", address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"), 6, "USD//C"),
    (GOERLI_CHAIN_ID, "WETH", address!("B4FBF271143F4FBf7B91A5ded31805e42b2208d6"), 18, "Wrapped Ether"),
    (GOERLI_CHAIN_ID, "USDC", address!("2f3A40A3db8a7e3D09B0adfEfbCe4f6F81927557"), 6, "USD//C"),
];

/// Look up a token by chain and symbol (case-insensitive)
pub fn known_token(chain_id: u64, symbol: &str) -> Option<Token> {
    KNOWN_TOKENS
        .iter()
        .find(|(chain, sym, ..)| *chain == chain_id && sym.eq_ignore_ascii_case(symbol))
        .map(|(chain, sym, address, decimals, name)| {
            Token::new(*chain, *address, *decimals, *sym, Some(name))
        })
}
