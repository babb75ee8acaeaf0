//! Route acquisition with deadline and failure classification

use std::sync::Arc;
use tracing::{info, warn};

use super::{RouteOracle, RouteRequest};
use crate::shared::errors::SwapError;
use crate::shared::types::{BaseUnitAmount, Route, SwapOptions, Token, TradeDirection};
use crate::shared::utils::unix_now;

/// Wraps a routing oracle. Never retries: a failed quote is handed back to
/// the caller, who decides whether to ask again with fresh options.
pub struct RouteClient {
    oracle: Arc<dyn RouteOracle>,
}

impl RouteClient {
    pub fn new(oracle: Arc<dyn RouteOracle>) -> Self {
        Self { oracle }
    }

    pub async fn quote_route(
        &self,
        amount: BaseUnitAmount,
        amount_token: &Token,
        quote_token: &Token,
        direction: TradeDirection,
        options: &SwapOptions,
    ) -> Result<Route, SwapError> {
        let now = unix_now();
        if options.is_expired_at(now) {
            return Err(SwapError::RouteExpired {
                deadline: options.deadline_unix_seconds,
                now,
            });
        }
        if amount.is_zero() {
            return Err(SwapError::InvalidAmount("cannot route a zero amount".to_string()));
        }

        let request = RouteRequest {
            amount,
            amount_token: amount_token.clone(),
            quote_token: quote_token.clone(),
            direction,
            options: options.clone(),
        };
        let no_route = || SwapError::NoRouteFound {
            token_in: request.token_in().symbol.clone(),
            token_out: request.token_out().symbol.clone(),
        };

        if amount_token.chain_id != quote_token.chain_id {
            warn!(
                "Tokens live on different chains ({} vs {}), nothing to route",
                amount_token.chain_id, quote_token.chain_id
            );
            return Err(no_route());
        }

        info!(
            "Requesting {} route: {} {} -> {}",
            direction.as_str(),
            amount,
            request.token_in().symbol,
            request.token_out().symbol
        );

        match self.oracle.route(&request).await {
            Ok(Some(route)) => {
                info!(
                    "Route received: {} bytes of call data, value {}, estimate {}",
                    route.call_data.len(),
                    route.value_to_send,
                    route.quoted_estimate
                );
                Ok(route)
            }
            Ok(None) => {
                warn!("Routing oracle found no route");
                Err(no_route())
            }
            Err(e) => {
                warn!("Routing oracle failed: {}", e);
                Err(SwapError::RouteClientUnavailable(e.to_string()))
            }
        }
    }
}
