use rocket::serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::models::{AmountRequest, PoolSnapshot, PreparedPosition, RangeRequest};

#[derive(Debug, Default, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct PreparePositionRequest {
    /// Read the snapshot from chain (needs RPC_URL)
    pub pool_address: Option<String>,
    /// Inline snapshot; wins over pool_address
    pub pool: Option<PoolSnapshot>,

    pub is_full_range: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,

    pub target_usd: Option<f64>,
    pub amount0_raw: Option<String>,
    pub amount1_raw: Option<String>,

    pub token0_price_usd: Option<f64>,
    pub token0_symbol: Option<String>,
}

impl PreparePositionRequest {
    pub fn range_request(&self) -> CalcResult<RangeRequest> {
        range_from_parts(self.is_full_range, self.min_price, self.max_price)
    }

    pub fn amount_request(&self) -> CalcResult<AmountRequest> {
        match (self.target_usd, &self.amount0_raw, &self.amount1_raw) {
            (Some(target_usd), _, _) => Ok(AmountRequest::TargetUsd { target_usd }),
            (None, Some(a0), Some(a1)) => Ok(AmountRequest::Raw {
                amount0_raw: a0.clone(),
                amount1_raw: a1.clone(),
            }),
            _ => Err(CalcError::invalid("either target_usd or both amount0_raw and amount1_raw are required")),
        }
    }
}

fn range_from_parts(is_full_range: Option<bool>, min_price: Option<f64>, max_price: Option<f64>) -> CalcResult<RangeRequest> {
    if is_full_range.unwrap_or(false) {
        return Ok(RangeRequest::FullRange);
    }
    match (min_price, max_price) {
        (Some(min_price), Some(max_price)) => Ok(RangeRequest::Bounds { min_price, max_price }),
        _ => Err(CalcError::invalid("min_price and max_price are required unless is_full_range is set")),
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct PreparePositionResponse {
    pub timestamp_utc: String,
    #[serde(flatten)]
    pub position: PreparedPosition,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ResolveTicksRequest {
    pub tick_spacing: i32,
    pub is_full_range: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl ResolveTicksRequest {
    pub fn range_request(&self) -> CalcResult<RangeRequest> {
        range_from_parts(self.is_full_range, self.min_price, self.max_price)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ResolveTicksResponse {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub price_lower: f64, // raw, 1.0001^tick
    pub price_upper: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}
