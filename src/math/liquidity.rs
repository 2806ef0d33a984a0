// Exact BigInt liquidity math (Uniswap v3 SqrtPriceMath / LiquidityAmounts)
// -------------------------------------------------------------------------
// All sqrt prices are Q64.96. Rounding matches the on-chain contracts: amounts
// owed to the pool at mint are rounded up, liquidity is rounded down.

use num_bigint::BigInt;
use num_traits::{One, Zero};

const Q96_SHIFT: usize = 96;

#[inline]
fn q96() -> BigInt { BigInt::one() << Q96_SHIFT }

#[inline]
fn ceil_div(a: &BigInt, b: &BigInt) -> BigInt {
    // assumes a>=0, b>0
    if a.is_zero() { return BigInt::zero(); }
    (a + (b - BigInt::one())) / b
}

#[inline]
fn ordered<'a>(a: &'a BigInt, b: &'a BigInt) -> (&'a BigInt, &'a BigInt) {
    if a < b { (a, b) } else { (b, a) }
}

// --------------------------- SqrtPriceMath deltas ---------------------------

/// amount0 = L * 2^96 * (sb - sa) / sb / sa, with two-step rounding.
pub fn amount0_delta(
    sqrt_ratio_a_x96: &BigInt,
    sqrt_ratio_b_x96: &BigInt,
    liquidity: &BigInt,
    round_up: bool,
) -> BigInt {
    if liquidity.is_zero() { return BigInt::zero(); }
    let (sa, sb) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if sa.is_zero() || sa == sb { return BigInt::zero(); }

    let numerator1 = liquidity << Q96_SHIFT;
    let numerator2 = sb - sa;

    if round_up {
        let t = ceil_div(&(&numerator1 * &numerator2), sb);
        ceil_div(&t, sa)
    } else {
        ((&numerator1 * &numerator2) / sb) / sa
    }
}

/// amount1 = L * (sb - sa) / 2^96
pub fn amount1_delta(
    sqrt_ratio_a_x96: &BigInt,
    sqrt_ratio_b_x96: &BigInt,
    liquidity: &BigInt,
    round_up: bool,
) -> BigInt {
    if liquidity.is_zero() { return BigInt::zero(); }
    let (sa, sb) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if sa == sb { return BigInt::zero(); }

    let num = liquidity * (sb - sa);
    if round_up { ceil_div(&num, &q96()) } else { num / q96() }
}

// ------------------------------ Liquidity amounts ------------------------------

/// Full-precision L for a token0 amount over [sa, sb]: amount0 * sa * sb / (2^96 * (sb - sa)).
pub fn max_liquidity_for_amount0(sqrt_ratio_a_x96: &BigInt, sqrt_ratio_b_x96: &BigInt, amount0: &BigInt) -> BigInt {
    let (sa, sb) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    let denom = q96() * (sb - sa);
    if denom.is_zero() { return BigInt::zero(); }
    (amount0 * sa * sb) / denom
}

/// L for a token1 amount over [sa, sb]: amount1 * 2^96 / (sb - sa).
pub fn max_liquidity_for_amount1(sqrt_ratio_a_x96: &BigInt, sqrt_ratio_b_x96: &BigInt, amount1: &BigInt) -> BigInt {
    let (sa, sb) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    let diff = sb - sa;
    if diff.is_zero() { return BigInt::zero(); }
    (amount1 * q96()) / diff
}

/// Largest L that can be minted at the current price without exceeding either amount.
pub fn max_liquidity_for_amounts(
    sqrt_price_x96: &BigInt,
    sqrt_ratio_a_x96: &BigInt,
    sqrt_ratio_b_x96: &BigInt,
    amount0: &BigInt,
    amount1: &BigInt,
) -> BigInt {
    let (sa, sb) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if sqrt_price_x96 <= sa {
        max_liquidity_for_amount0(sa, sb, amount0)
    } else if sqrt_price_x96 < sb {
        let l0 = max_liquidity_for_amount0(sqrt_price_x96, sb, amount0);
        let l1 = max_liquidity_for_amount1(sa, sqrt_price_x96, amount1);
        // the limiting side decides
        if l0 < l1 { l0 } else { l1 }
    } else {
        max_liquidity_for_amount1(sa, sb, amount1)
    }
}

/// Token amounts pulled from the depositor when minting L at the current price (rounded up).
pub fn mint_amounts(
    sqrt_price_x96: &BigInt,
    sqrt_ratio_a_x96: &BigInt,
    sqrt_ratio_b_x96: &BigInt,
    liquidity: &BigInt,
) -> (BigInt, BigInt) {
    let (sa, sb) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if sqrt_price_x96 <= sa {
        (amount0_delta(sa, sb, liquidity, true), BigInt::zero())
    } else if sqrt_price_x96 < sb {
        (
            amount0_delta(sqrt_price_x96, sb, liquidity, true),
            amount1_delta(sa, sqrt_price_x96, liquidity, true),
        )
    } else {
        (BigInt::zero(), amount1_delta(sa, sb, liquidity, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tick_math::get_sqrt_ratio_at_tick;

    fn sqrt(t: i32) -> BigInt { get_sqrt_ratio_at_tick(t).unwrap() }

    #[test]
    fn deltas_round_in_the_requested_direction() {
        let l = BigInt::from(1_000_000_000_000_000_000u128);
        let (a, b) = (sqrt(-60), sqrt(60));
        let up0 = amount0_delta(&a, &b, &l, true);
        let down0 = amount0_delta(&a, &b, &l, false);
        assert!(up0 >= down0 && &up0 - &down0 <= BigInt::one());
        let up1 = amount1_delta(&a, &b, &l, true);
        let down1 = amount1_delta(&a, &b, &l, false);
        assert!(up1 >= down1 && &up1 - &down1 <= BigInt::one());
        // argument order does not matter
        assert_eq!(amount0_delta(&b, &a, &l, true), up0);
    }

    #[test]
    fn zero_liquidity_or_empty_range_gives_zero() {
        let a = sqrt(0);
        assert!(amount0_delta(&a, &sqrt(10), &BigInt::zero(), true).is_zero());
        assert!(amount1_delta(&a, &a, &BigInt::from(5), true).is_zero());
        assert!(max_liquidity_for_amount1(&a, &a, &BigInt::from(5)).is_zero());
    }

    #[test]
    fn below_range_uses_only_token0() {
        let (a, b) = (sqrt(600), sqrt(1200));
        let current = sqrt(0);
        let amount0 = BigInt::from(10u64.pow(18));
        let amount1 = BigInt::from(10u64.pow(18));
        let l = max_liquidity_for_amounts(&current, &a, &b, &amount0, &amount1);
        assert!(l > BigInt::zero());
        let (m0, m1) = mint_amounts(&current, &a, &b, &l);
        assert!(m0 <= amount0);
        assert!(m1.is_zero());
    }

    #[test]
    fn above_range_uses_only_token1() {
        let (a, b) = (sqrt(-1200), sqrt(-600));
        let current = sqrt(0);
        let amount0 = BigInt::from(10u64.pow(18));
        let amount1 = BigInt::from(10u64.pow(18));
        let l = max_liquidity_for_amounts(&current, &a, &b, &amount0, &amount1);
        let (m0, m1) = mint_amounts(&current, &a, &b, &l);
        assert!(m0.is_zero());
        assert!(m1 <= amount1 && m1 > BigInt::zero());
    }

    #[test]
    fn in_range_never_exceeds_either_amount() {
        let (a, b) = (sqrt(-600), sqrt(600));
        let current = sqrt(120);
        let amount0 = BigInt::from(5u64 * 10u64.pow(17));
        let amount1 = BigInt::from(10u64.pow(18));
        let l = max_liquidity_for_amounts(&current, &a, &b, &amount0, &amount1);
        let (m0, m1) = mint_amounts(&current, &a, &b, &l);
        assert!(m0 <= amount0, "m0 {} > {}", m0, amount0);
        assert!(m1 <= amount1, "m1 {} > {}", m1, amount1);
        // one side is (nearly) exhausted
        let slack0 = &amount0 - &m0;
        let slack1 = &amount1 - &m1;
        assert!(slack0 < BigInt::from(10u64.pow(12)) || slack1 < BigInt::from(10u64.pow(12)));
    }
}
