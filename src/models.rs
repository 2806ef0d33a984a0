use serde::{Deserialize, Serialize};

/// Pool state as seen by the caller at calculation time. Staleness is the caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Q64.96 sqrt price as a decimal string
    pub sqrt_price_x96: String,
    pub tick: i32,
    pub tick_spacing: i32,
    pub token0_decimals: Option<u8>,
    pub token1_decimals: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeRequest {
    FullRange,
    /// token1 per token0
    Bounds { min_price: f64, max_price: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AmountRequest {
    TargetUsd { target_usd: f64 },
    Raw { amount0_raw: String, amount1_raw: String },
}

/// USD prices used to split a USD notional between the two tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenPricing {
    pub token0_price_usd: Option<f64>,
    pub token1_price_usd: f64,
}

impl Default for TokenPricing {
    fn default() -> Self {
        Self { token0_price_usd: None, token1_price_usd: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRange {
    pub tick_lower: i32,
    pub tick_upper: i32,
}

/// Computed position, ready to hand to a transaction encoder. Nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedPosition {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub price_lower: f64,
    pub price_upper: f64,
    pub amount0: String,
    pub amount1: String,
    pub liquidity: String,
}
