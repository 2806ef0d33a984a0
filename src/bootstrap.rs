use std::sync::Arc;
use ethers::prelude::*;
use crate::config::Config;
use crate::chain::{providers, price_client::PriceClient};
use crate::engine::position::PositionPlanner;

pub struct AppState {
    pub provider: Option<Arc<Provider<Http>>>,
    pub price_client: PriceClient,
    pub planner: PositionPlanner,

    // Pricing defaults
    pub default_token0_symbol: String,
    pub token1_usd_peg: f64,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let provider = match &config.rpc_url {
            Some(url) => Some(providers::create_provider(url)?),
            None => {
                log::warn!("RPC_URL not set; only inline pool snapshots will be accepted");
                None
            }
        };

        Ok(AppState {
            provider,
            price_client: PriceClient::new(config.price_api_url.clone()),
            planner: PositionPlanner::new(),
            default_token0_symbol: config.default_token0_symbol.clone(),
            token1_usd_peg: config.token1_usd_peg,
        })
    }
}
