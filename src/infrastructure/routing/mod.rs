//! Routing oracle adapters

pub mod routing_api_client;

pub use routing_api_client::RoutingApiClient;
