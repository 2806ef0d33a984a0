use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, post, State};
use std::sync::Arc;
use thiserror::Error;

use ethers::types::Address;

use crate::bootstrap::AppState;
use crate::chain::pool_client::load_v3_pool_snapshot;
use crate::engine::amounts::validate_amount_request;
use crate::engine::range::{resolve_tick_range, validate_bounds};
use crate::error::CalcError;
use crate::math::tick_math::tick_to_price;
use crate::models::{AmountRequest, PoolSnapshot, RangeRequest, TokenPricing};
use crate::web::dto::{
    ErrorResponse, PreparePositionRequest, PreparePositionResponse, ResolveTicksRequest, ResolveTicksResponse,
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Calc(#[from] CalcError),

    #[error("upstream failure: {0}")]
    Upstream(String),
}

pub type ApiError = (Status, Json<ErrorResponse>);

impl ServiceError {
    pub fn status(&self) -> Status {
        match self {
            ServiceError::Calc(CalcError::InvalidInput(_)) => Status::BadRequest,
            ServiceError::Calc(CalcError::DegenerateRange { .. }) => Status::BadRequest,
            ServiceError::Calc(CalcError::Configuration(_)) => Status::UnprocessableEntity,
            ServiceError::Upstream(_) => Status::BadGateway,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ServiceError::Calc(e) => e.kind(),
            ServiceError::Upstream(_) => "upstream",
        }
    }

    pub fn into_response(self) -> ApiError {
        match &self {
            ServiceError::Calc(CalcError::Configuration(_)) | ServiceError::Upstream(_) => {
                log::error!("request failed: {}", self)
            }
            _ => log::warn!("request rejected: {}", self),
        }
        let status = self.status();
        (status, Json(ErrorResponse { error: self.to_string(), kind: self.kind().to_string() }))
    }
}

#[post("/api/v1/positions/prepare", format = "json", data = "<body>")]
pub async fn prepare_position(
    body: Json<PreparePositionRequest>,
    app_state: &State<Arc<AppState>>,
) -> Result<Json<PreparePositionResponse>, ApiError> {
    prepare(body.into_inner(), app_state.inner())
        .await
        .map(Json)
        .map_err(ServiceError::into_response)
}

async fn prepare(req: PreparePositionRequest, app_state: &AppState) -> Result<PreparePositionResponse, ServiceError> {
    let range_request = req.range_request()?;
    let amount_request = req.amount_request()?;
    // reject bad input before any RPC or price lookups
    validate_amount_request(&amount_request)?;
    if let RangeRequest::Bounds { min_price, max_price } = range_request {
        validate_bounds(min_price, max_price)?;
    }

    let snapshot = resolve_snapshot(&req, app_state).await?;
    let pricing = resolve_pricing(&req, &amount_request, app_state).await?;

    let position = app_state.planner.prepare(&snapshot, &range_request, &amount_request, &pricing)?;
    Ok(PreparePositionResponse {
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        position,
    })
}

async fn resolve_snapshot(req: &PreparePositionRequest, app_state: &AppState) -> Result<PoolSnapshot, ServiceError> {
    if let Some(pool) = &req.pool {
        return Ok(pool.clone());
    }
    let address = req
        .pool_address
        .as_deref()
        .ok_or_else(|| CalcError::invalid("either pool or pool_address is required"))?;
    let address: Address = address
        .parse()
        .map_err(|_| CalcError::invalid(format!("pool_address {:?} is not a valid address", address)))?;
    let provider = app_state
        .provider
        .clone()
        .ok_or_else(|| CalcError::config("RPC_URL is not configured; send an inline pool snapshot"))?;

    load_v3_pool_snapshot(provider, address)
        .await
        .map_err(|e| ServiceError::Upstream(format!("{:#}", e)))
}

async fn resolve_pricing(
    req: &PreparePositionRequest,
    amount_request: &AmountRequest,
    app_state: &AppState,
) -> Result<TokenPricing, ServiceError> {
    let mut pricing = TokenPricing {
        token0_price_usd: req.token0_price_usd,
        token1_price_usd: app_state.token1_usd_peg,
    };
    // raw amounts never need a price
    if pricing.token0_price_usd.is_some() || matches!(amount_request, AmountRequest::Raw { .. }) {
        return Ok(pricing);
    }

    let symbol = req.token0_symbol.as_deref().unwrap_or(&app_state.default_token0_symbol);
    let price = app_state
        .price_client
        .get_usd_price(symbol)
        .await
        .map_err(|e| CalcError::config(format!("no USD price for {}: {:#}", symbol, e)))?;
    log::debug!("{} USD price from oracle: {}", symbol, price);
    pricing.token0_price_usd = Some(price);
    Ok(pricing)
}

#[post("/api/v1/ticks/resolve", format = "json", data = "<body>")]
pub fn resolve_ticks(body: Json<ResolveTicksRequest>) -> Result<Json<ResolveTicksResponse>, ApiError> {
    let resolve = || -> Result<ResolveTicksResponse, ServiceError> {
        let range = resolve_tick_range(&body.range_request()?, body.tick_spacing)?;
        Ok(ResolveTicksResponse {
            tick_lower: range.tick_lower,
            tick_upper: range.tick_upper,
            price_lower: tick_to_price(range.tick_lower),
            price_upper: tick_to_price(range.tick_upper),
        })
    };
    resolve().map(Json).map_err(ServiceError::into_response)
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}
