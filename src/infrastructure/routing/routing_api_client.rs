use alloy::primitives::{Bytes, U256};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::routing::{RouteOracle, RouteRequest};
use crate::shared::errors::RouteOracleError;
use crate::shared::types::{BaseUnitAmount, Route};
use crate::shared::utils::unix_now;

const NO_ROUTE: &str = "NO_ROUTE";

#[derive(Debug, Deserialize)]
struct MethodParameters {
    calldata: String,
    value: String,
}

/// Body of `GET /quote`, success or error
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(rename = "errorCode")]
    error_code: Option<String>,
    detail: Option<String>,
    quote: Option<String>,
    #[serde(rename = "methodParameters")]
    method_parameters: Option<MethodParameters>,
}

/// Client for a hosted smart-order-router quote endpoint
pub struct RoutingApiClient {
    http_client: Client,
    base_url: String,
    protocols: String,
}

impl RoutingApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RouteOracleError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RouteOracleError::Transport(e.to_string()))?;
        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            protocols: "v2,v3".to_string(),
        })
    }

    pub fn with_protocols(mut self, protocols: impl Into<String>) -> Self {
        self.protocols = protocols.into();
        self
    }

    fn query(&self, request: &RouteRequest) -> Vec<(&'static str, String)> {
        let window = request
            .options
            .deadline_unix_seconds
            .saturating_sub(unix_now());
        vec![
            ("tokenInAddress", request.token_in().address.to_string()),
            ("tokenInChainId", request.token_in().chain_id.to_string()),
            ("tokenOutAddress", request.token_out().address.to_string()),
            ("tokenOutChainId", request.token_out().chain_id.to_string()),
            ("amount", request.amount.to_string()),
            ("type", request.direction.as_str().to_string()),
            ("recipient", request.options.recipient.to_string()),
            ("slippageTolerance", request.options.slippage.as_percent_string()),
            ("deadline", window.to_string()),
            ("protocols", self.protocols.clone()),
        ]
    }
}

/// Turn a decoded quote body into a route, `None` when the router found no path
fn route_from_response(
    status: StatusCode,
    body: QuoteResponse,
    request: &RouteRequest,
) -> Result<Option<Route>, RouteOracleError> {
    if body.error_code.as_deref() == Some(NO_ROUTE) || status == StatusCode::NOT_FOUND {
        debug!("No route: {}", body.detail.unwrap_or_default());
        return Ok(None);
    }
    if !status.is_success() {
        return Err(RouteOracleError::Status(status.as_u16()));
    }
    if let Some(code) = body.error_code {
        return Err(RouteOracleError::InvalidResponse(format!(
            "{}: {}",
            code,
            body.detail.unwrap_or_default()
        )));
    }

    let quote = body
        .quote
        .ok_or_else(|| RouteOracleError::InvalidResponse("missing quote".to_string()))?
        .parse::<U256>()
        .map_err(|e| RouteOracleError::InvalidResponse(format!("quote: {}", e)))?;
    let params = body
        .method_parameters
        .ok_or_else(|| RouteOracleError::InvalidResponse("missing methodParameters".to_string()))?;
    let call_data = params
        .calldata
        .parse::<Bytes>()
        .map_err(|e| RouteOracleError::InvalidResponse(format!("calldata: {}", e)))?;
    let value_to_send = params
        .value
        .parse::<U256>()
        .map_err(|e| RouteOracleError::InvalidResponse(format!("value: {}", e)))?;

    Ok(Some(Route {
        call_data,
        value_to_send,
        quoted_estimate: BaseUnitAmount::new(quote),
        direction: request.direction,
        deadline_unix_seconds: request.options.deadline_unix_seconds,
    }))
}

#[async_trait]
impl RouteOracle for RoutingApiClient {
    async fn route(&self, request: &RouteRequest) -> Result<Option<Route>, RouteOracleError> {
        let url = format!("{}/quote", self.base_url);
        info!("🔍 Fetching route from: {}", url);

        let response = self
            .http_client
            .get(&url)
            .query(&self.query(request))
            .send()
            .await
            .map_err(|e| RouteOracleError::Transport(e.to_string()))?;

        let status = response.status();
        let body: QuoteResponse = match response.json().await {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                return Err(RouteOracleError::InvalidResponse(e.to_string()));
            }
            Err(_) if status == StatusCode::NOT_FOUND => return Ok(None),
            Err(_) => return Err(RouteOracleError::Status(status.as_u16())),
        };

        let route = route_from_response(status, body, request)?;
        if route.is_none() {
            warn!(
                "Router has no path {} -> {}",
                request.token_in().symbol,
                request.token_out().symbol
            );
        }
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testing::{options_expiring_in, token, USDC, WETH};
    use crate::shared::types::TradeDirection;
    use serde_json::json;

    fn request() -> RouteRequest {
        RouteRequest {
            amount: BaseUnitAmount::from(1_000_000_000_000_000_000u64),
            amount_token: token(WETH),
            quote_token: token(USDC),
            direction: TradeDirection::ExactInput,
            options: options_expiring_in(1_800),
        }
    }

    fn body(value: serde_json::Value) -> QuoteResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_query_parameters() {
        let client = RoutingApiClient::new("https://router.example/", Duration::from_secs(5)).unwrap();
        let req = request();
        let query = client.query(&req);
        let get = |key: &str| {
            query
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
                .unwrap()
        };

        assert_eq!(client.base_url, "https://router.example");
        assert_eq!(get("tokenInAddress"), token(WETH).address.to_string());
        assert_eq!(get("tokenOutAddress"), token(USDC).address.to_string());
        assert_eq!(get("tokenInChainId"), "1");
        assert_eq!(get("amount"), "1000000000000000000");
        assert_eq!(get("type"), "exactIn");
        assert_eq!(get("slippageTolerance"), "0.5");
        let window: u64 = get("deadline").parse().unwrap();
        assert!(window > 1_790 && window <= 1_800);
    }

    #[test]
    fn test_parse_route() {
        let route = route_from_response(
            StatusCode::OK,
            body(json!({
                "quote": "2500000000",
                "quoteDecimals": "2500",
                "methodParameters": {
                    "calldata": "0xdead",
                    "value": "0x00",
                    "to": "0x68b3465833fb72A70ecDF485E0e4C7bD8665Fc45"
                }
            })),
            &request(),
        )
        .unwrap()
        .unwrap();

        assert_eq!(route.call_data, Bytes::from_static(&[0xde, 0xad]));
        assert_eq!(route.value_to_send, U256::ZERO);
        assert_eq!(route.quoted_estimate, BaseUnitAmount::from(2_500_000_000u64));
        assert_eq!(route.direction, TradeDirection::ExactInput);
    }

    #[test]
    fn test_no_route() {
        let none = route_from_response(
            StatusCode::NOT_FOUND,
            body(json!({"errorCode": "NO_ROUTE", "detail": "No route found"})),
            &request(),
        )
        .unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_error_statuses() {
        let err = route_from_response(
            StatusCode::SERVICE_UNAVAILABLE,
            body(json!({"errorCode": "INTERNAL_ERROR"})),
            &request(),
        )
        .unwrap_err();
        assert_eq!(err, RouteOracleError::Status(503));

        let err = route_from_response(StatusCode::OK, body(json!({"quote": "1"})), &request()).unwrap_err();
        assert!(matches!(err, RouteOracleError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_api() {
        let client = RoutingApiClient::new("http://127.0.0.1:1", Duration::from_millis(500)).unwrap();
        let err = client.route(&request()).await.unwrap_err();
        assert!(matches!(err, RouteOracleError::Transport(_)));
    }
}
