use anyhow::{Context, Result};
use ethers::contract::abigen;
use ethers::prelude::*;
use std::sync::Arc;

use crate::models::PoolSnapshot;

abigen!(
    UniswapV3Pool,
    r#"[
        function slot0() external view returns (uint160 sqrtPriceX96, int24 tick, uint16 observationIndex, uint16 observationCardinality, uint16 observationCardinalityNext, uint8 feeProtocol, bool unlocked)
        function tickSpacing() external view returns (int24)
        function token0() external view returns (address)
        function token1() external view returns (address)
    ]"#
);

abigen!(
    Erc20Metadata,
    r#"[
        function decimals() external view returns (uint8)
    ]"#
);

/// Read slot0, spacing and both tokens' decimals for a v3 pool. Pool reads run
/// concurrently, then the two decimals reads.
pub async fn load_v3_pool_snapshot(
    provider: Arc<Provider<Http>>,
    pool_address: Address,
) -> Result<PoolSnapshot> {
    let pool = UniswapV3Pool::new(pool_address, provider.clone());

    let slot0_call = pool.slot_0();
    let spacing_call = pool.tick_spacing();
    let token0_call = pool.token_0();
    let token1_call = pool.token_1();

    let (slot0, tick_spacing, token0, token1) = futures::try_join!(
        slot0_call.call(),
        spacing_call.call(),
        token0_call.call(),
        token1_call.call()
    )
    .with_context(|| format!("Failed to read pool state for {:?}", pool_address))?;

    let (sqrt_price_x96, tick, ..) = slot0;
    log::debug!("v3 pool {:?}: tick: {}, spacing: {}, sqrtPriceX96: {}", pool_address, tick, tick_spacing, sqrt_price_x96);

    let erc0 = Erc20Metadata::new(token0, provider.clone());
    let erc1 = Erc20Metadata::new(token1, provider);
    let dec0_call = erc0.decimals();
    let dec1_call = erc1.decimals();
    let (token0_decimals, token1_decimals) = futures::try_join!(dec0_call.call(), dec1_call.call())
        .with_context(|| format!("Failed to read token decimals for {:?}/{:?}", token0, token1))?;

    Ok(snapshot_from_parts(sqrt_price_x96, tick, tick_spacing, token0_decimals, token1_decimals))
}

pub fn snapshot_from_parts(
    sqrt_price_x96: U256,
    tick: i32,
    tick_spacing: i32,
    token0_decimals: u8,
    token1_decimals: u8,
) -> PoolSnapshot {
    PoolSnapshot {
        sqrt_price_x96: sqrt_price_x96.to_string(),
        tick,
        tick_spacing,
        token0_decimals: Some(token0_decimals),
        token1_decimals: Some(token1_decimals),
    }
}
