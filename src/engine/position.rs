// position.rs
//
// "Prepare position" calculation: validate -> resolve ticks -> derive desired
// amounts -> reconcile into (liquidity, amount0, amount1). Pure and synchronous,
// so one planner can be shared across request handlers without locking.

use num_bigint::BigInt;
use std::str::FromStr;

use crate::engine::amounts::{desired_amounts, validate_amount_request, DesiredAmounts};
use crate::engine::range::{resolve_tick_range, validate_bounds};
use crate::error::{CalcError, CalcResult};
use crate::math::liquidity::{max_liquidity_for_amounts, mint_amounts};
use crate::math::tick_math::{
    get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, human_to_raw_price, max_sqrt_ratio,
    min_sqrt_ratio, raw_to_human_price, tick_to_price,
};
use crate::models::{AmountRequest, PoolSnapshot, PreparedPosition, RangeRequest, TickRange, TokenPricing};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub liquidity: BigInt,
    pub amount0: BigInt,
    pub amount1: BigInt,
}

/// Turns upper-bound deposit amounts into the liquidity actually mintable and the
/// amounts that mint consumes.
pub trait AmountReconciler {
    fn reconcile(
        &self,
        sqrt_price_x96: &BigInt,
        range: &TickRange,
        desired: &DesiredAmounts,
    ) -> CalcResult<Reconciled>;
}

/// Uniswap v3 LiquidityAmounts + Position.mintAmounts, in exact integer math.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactV3Reconciler;

impl AmountReconciler for ExactV3Reconciler {
    fn reconcile(
        &self,
        sqrt_price_x96: &BigInt,
        range: &TickRange,
        desired: &DesiredAmounts,
    ) -> CalcResult<Reconciled> {
        let sa = get_sqrt_ratio_at_tick(range.tick_lower)?;
        let sb = get_sqrt_ratio_at_tick(range.tick_upper)?;

        let liquidity = max_liquidity_for_amounts(sqrt_price_x96, &sa, &sb, &desired.amount0, &desired.amount1);
        if liquidity > BigInt::from(u128::MAX) {
            return Err(CalcError::invalid(format!(
                "liquidity {} exceeds what a single position can hold", liquidity
            )));
        }
        let (amount0, amount1) = mint_amounts(sqrt_price_x96, &sa, &sb, &liquidity);
        Ok(Reconciled { liquidity, amount0, amount1 })
    }
}

#[derive(Debug, Clone, Default)]
pub struct PositionPlanner<R = ExactV3Reconciler> {
    reconciler: R,
}

impl PositionPlanner<ExactV3Reconciler> {
    pub fn new() -> Self {
        Self { reconciler: ExactV3Reconciler }
    }
}

impl<R: AmountReconciler> PositionPlanner<R> {
    pub fn with_reconciler(reconciler: R) -> Self {
        Self { reconciler }
    }

    pub fn prepare(
        &self,
        snapshot: &PoolSnapshot,
        range_request: &RangeRequest,
        amount_request: &AmountRequest,
        pricing: &TokenPricing,
    ) -> CalcResult<PreparedPosition> {
        // amounts first: a bad deposit never reaches tick resolution
        validate_amount_request(amount_request)?;

        let (decimals0, decimals1) = snapshot_decimals(snapshot)?;
        let sqrt_price_x96 = parse_sqrt_price(&snapshot.sqrt_price_x96)?;

        if let Ok(tick) = get_tick_at_sqrt_ratio(&sqrt_price_x96) {
            if tick != snapshot.tick {
                log::warn!("snapshot tick {} disagrees with sqrt price (tick {}); using sqrt price", snapshot.tick, tick);
            }
        }

        let raw_request = match *range_request {
            RangeRequest::FullRange => RangeRequest::FullRange,
            RangeRequest::Bounds { min_price, max_price } => {
                validate_bounds(min_price, max_price)?;
                RangeRequest::Bounds {
                    min_price: human_to_raw_price(min_price, decimals0, decimals1),
                    max_price: human_to_raw_price(max_price, decimals0, decimals1),
                }
            }
        };
        let range = resolve_tick_range(&raw_request, snapshot.tick_spacing)?;

        let desired = desired_amounts(amount_request, decimals0, decimals1, pricing)?;
        let reconciled = self.reconciler.reconcile(&sqrt_price_x96, &range, &desired)?;

        log::debug!(
            "prepared position ticks {}..{} L={} amount0={} amount1={}",
            range.tick_lower, range.tick_upper, reconciled.liquidity, reconciled.amount0, reconciled.amount1
        );

        Ok(PreparedPosition {
            tick_lower: range.tick_lower,
            tick_upper: range.tick_upper,
            price_lower: raw_to_human_price(tick_to_price(range.tick_lower), decimals0, decimals1),
            price_upper: raw_to_human_price(tick_to_price(range.tick_upper), decimals0, decimals1),
            amount0: reconciled.amount0.to_string(),
            amount1: reconciled.amount1.to_string(),
            liquidity: reconciled.liquidity.to_string(),
        })
    }
}

fn snapshot_decimals(snapshot: &PoolSnapshot) -> CalcResult<(u8, u8)> {
    match (snapshot.token0_decimals, snapshot.token1_decimals) {
        (Some(d0), Some(d1)) => Ok((d0, d1)),
        _ => Err(CalcError::config("pool snapshot is missing token decimals")),
    }
}

/// Q64.96 decimal string -> BigInt within [MIN_SQRT_RATIO, MAX_SQRT_RATIO).
pub fn parse_sqrt_price(value: &str) -> CalcResult<BigInt> {
    let v = BigInt::from_str(value.trim())
        .map_err(|_| CalcError::invalid(format!("sqrt_price_x96 must be a decimal integer, got {:?}", value)))?;
    if v < min_sqrt_ratio() || v >= max_sqrt_ratio() {
        return Err(CalcError::invalid(format!("sqrt_price_x96 {} outside the valid range", v)));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    fn snapshot_at_tick(tick: i32, spacing: i32, d0: u8, d1: u8) -> PoolSnapshot {
        PoolSnapshot {
            sqrt_price_x96: get_sqrt_ratio_at_tick(tick).unwrap().to_string(),
            tick,
            tick_spacing: spacing,
            token0_decimals: Some(d0),
            token1_decimals: Some(d1),
        }
    }

    fn priced(p: f64) -> TokenPricing {
        TokenPricing { token0_price_usd: Some(p), ..TokenPricing::default() }
    }

    #[test]
    fn negative_target_is_rejected_before_ticks() {
        // spacing 0 would fail range resolution; the amount error must win
        let snap = snapshot_at_tick(0, 0, 18, 18);
        let err = PositionPlanner::new()
            .prepare(&snap, &RangeRequest::FullRange, &AmountRequest::TargetUsd { target_usd: -5.0 }, &priced(1.0))
            .unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput(ref m) if m.contains("target_usd")));
    }

    #[test]
    fn missing_decimals_is_configuration_error() {
        let mut snap = snapshot_at_tick(0, 60, 18, 18);
        snap.token1_decimals = None;
        let err = PositionPlanner::new()
            .prepare(&snap, &RangeRequest::FullRange, &AmountRequest::TargetUsd { target_usd: 10.0 }, &priced(1.0))
            .unwrap_err();
        assert!(matches!(err, CalcError::Configuration(_)));
    }

    #[test]
    fn garbage_sqrt_price_is_invalid() {
        for s in ["", "abc", "0", "-5"] {
            let mut snap = snapshot_at_tick(0, 60, 18, 18);
            snap.sqrt_price_x96 = s.to_string();
            let err = PositionPlanner::new()
                .prepare(&snap, &RangeRequest::FullRange, &AmountRequest::TargetUsd { target_usd: 10.0 }, &priced(1.0))
                .unwrap_err();
            assert!(matches!(err, CalcError::InvalidInput(_)), "input {:?}", s);
        }
    }

    #[test]
    fn in_range_position_consumes_both_tokens_within_bounds() {
        // equal decimals, price 1.0, range 0.9..1.1
        let snap = snapshot_at_tick(0, 10, 18, 18);
        let p = PositionPlanner::new()
            .prepare(
                &snap,
                &RangeRequest::Bounds { min_price: 0.9, max_price: 1.1 },
                &AmountRequest::TargetUsd { target_usd: 2000.0 },
                &priced(1.0),
            )
            .unwrap();
        assert_eq!(p.tick_lower % 10, 0);
        assert_eq!(p.tick_upper % 10, 0);
        assert!(p.tick_lower < 0 && p.tick_upper > 0);
        let a0 = BigInt::from_str(&p.amount0).unwrap();
        let a1 = BigInt::from_str(&p.amount1).unwrap();
        let cap = BigInt::from(1000u64) * BigInt::from(10u64.pow(18));
        assert!(a0 > BigInt::zero() && a0 <= cap);
        assert!(a1 > BigInt::zero() && a1 <= cap);
        assert!(BigInt::from_str(&p.liquidity).unwrap() > BigInt::zero());
        assert!(p.price_lower < 1.0 && p.price_upper > 1.0);
    }

    #[test]
    fn range_above_price_uses_only_token0() {
        let snap = snapshot_at_tick(0, 60, 18, 18);
        let p = PositionPlanner::new()
            .prepare(
                &snap,
                &RangeRequest::Bounds { min_price: 1.5, max_price: 2.0 },
                &AmountRequest::Raw { amount0_raw: "1000000".into(), amount1_raw: "1000000".into() },
                &TokenPricing::default(),
            )
            .unwrap();
        assert_eq!(p.amount1, "0");
        assert_ne!(p.amount0, "0");
    }

    #[test]
    fn human_prices_are_scaled_by_decimals() {
        // WETH(18)/USDC(6) at 3000 USDC per WETH
        let raw = human_to_raw_price(3000.0, 18, 6);
        let tick = crate::math::tick_math::price_to_tick(raw).unwrap();
        let snap = snapshot_at_tick(tick, 60, 18, 6);
        let p = PositionPlanner::new()
            .prepare(
                &snap,
                &RangeRequest::Bounds { min_price: 2500.0, max_price: 3500.0 },
                &AmountRequest::TargetUsd { target_usd: 10_000.0 },
                &priced(3000.0),
            )
            .unwrap();
        assert!(p.tick_lower < tick && tick < p.tick_upper);
        assert!((p.price_lower - 2500.0).abs() / 2500.0 < 0.01, "{}", p.price_lower);
        assert!((p.price_upper - 3500.0).abs() / 3500.0 < 0.01, "{}", p.price_upper);
        // at most ~1.67 WETH and 5000 USDC
        assert!(BigInt::from_str(&p.amount0).unwrap() <= BigInt::from(1_666_666_666_666_666_667u64));
        assert!(BigInt::from_str(&p.amount1).unwrap() <= BigInt::from(5_000_000_000u64));
    }

    #[test]
    fn liquidity_beyond_u128_is_rejected() {
        let snap = snapshot_at_tick(0, 60, 18, 18);
        let huge = format!("1{}", "0".repeat(60));
        let err = PositionPlanner::new()
            .prepare(
                &snap,
                &RangeRequest::FullRange,
                &AmountRequest::Raw { amount0_raw: huge.clone(), amount1_raw: huge },
                &TokenPricing::default(),
            )
            .unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput(ref m) if m.contains("liquidity")), "{}", err);
    }

    struct FixedReconciler;

    impl AmountReconciler for FixedReconciler {
        fn reconcile(&self, _: &BigInt, _: &TickRange, d: &DesiredAmounts) -> CalcResult<Reconciled> {
            Ok(Reconciled { liquidity: BigInt::from(7), amount0: d.amount0.clone(), amount1: d.amount1.clone() })
        }
    }

    #[test]
    fn reconciler_is_pluggable() {
        let snap = snapshot_at_tick(0, 60, 6, 6);
        let p = PositionPlanner::with_reconciler(FixedReconciler)
            .prepare(
                &snap,
                &RangeRequest::FullRange,
                &AmountRequest::Raw { amount0_raw: "11".into(), amount1_raw: "22".into() },
                &TokenPricing::default(),
            )
            .unwrap();
        assert_eq!((p.liquidity.as_str(), p.amount0.as_str(), p.amount1.as_str()), ("7", "11", "22"));
    }
}
