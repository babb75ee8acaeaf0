//! Routing domain - best-execution routes from an external oracle

mod route_client;

pub use route_client::RouteClient;

use async_trait::async_trait;

use crate::shared::errors::RouteOracleError;
use crate::shared::types::{BaseUnitAmount, Route, SwapOptions, Token, TradeDirection};

/// Question put to the routing oracle.
///
/// For `ExactInput` the amount is denominated in `amount_token`, which is
/// sold for `quote_token`. For `ExactOutput` the amount is denominated in
/// `amount_token`, which is bought with `quote_token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub amount: BaseUnitAmount,
    pub amount_token: Token,
    pub quote_token: Token,
    pub direction: TradeDirection,
    pub options: SwapOptions,
}

impl RouteRequest {
    /// Token sold by the trade
    pub fn token_in(&self) -> &Token {
        match self.direction {
            TradeDirection::ExactInput => &self.amount_token,
            TradeDirection::ExactOutput => &self.quote_token,
        }
    }

    /// Token bought by the trade
    pub fn token_out(&self) -> &Token {
        match self.direction {
            TradeDirection::ExactInput => &self.quote_token,
            TradeDirection::ExactOutput => &self.amount_token,
        }
    }
}

/// External routing oracle
#[async_trait]
pub trait RouteOracle: Send + Sync {
    /// `Ok(None)` when no viable path exists
    async fn route(&self, request: &RouteRequest) -> Result<Option<Route>, RouteOracleError>;
}
