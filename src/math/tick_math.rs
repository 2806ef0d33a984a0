// Tick <-> price conversion for Uniswap v3 style pools
// ----------------------------------------------------
// Two flavours live here:
// - f64 conversions (price_to_tick / tick_to_price) used to pick tick buckets
//   from human price bounds. Only the bucket needs to be right, so the small
//   log/pow error near the extremes is acceptable.
// - Exact Q64.96 sqrt ratios (BigInt) used by the liquidity reconciliation.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;

use crate::error::{CalcError, CalcResult};

pub const MIN_TICK: i32 = -887_272;
pub const MAX_TICK: i32 = 887_272;

/// getSqrtRatioAtTick(MIN_TICK)
pub const MIN_SQRT_RATIO: u128 = 4_295_128_739;

const TICK_BASE: f64 = 1.0001;

// --------------------------------- f64 side ---------------------------------

/// floor(ln(price) / ln(1.0001)), clamped into the global tick bounds.
pub fn price_to_tick(price: f64) -> CalcResult<i32> {
    if !price.is_finite() || price <= 0.0 {
        return Err(CalcError::invalid(format!("price must be finite and positive, got {}", price)));
    }
    let t = (price.ln() / TICK_BASE.ln()).floor();
    Ok((t as i64).clamp(MIN_TICK as i64, MAX_TICK as i64) as i32)
}

/// 1.0001^tick
pub fn tick_to_price(tick: i32) -> f64 {
    TICK_BASE.powf(tick as f64)
}

/// Human price (token1 per whole token0) -> raw price (token1 units per token0 unit).
pub fn human_to_raw_price(price: f64, decimals0: u8, decimals1: u8) -> f64 {
    price * 10f64.powi(decimals1 as i32 - decimals0 as i32)
}

pub fn raw_to_human_price(price: f64, decimals0: u8, decimals1: u8) -> f64 {
    price * 10f64.powi(decimals0 as i32 - decimals1 as i32)
}

// ------------------------------ Tick alignment -------------------------------

fn check_spacing(tick_spacing: i32) -> CalcResult<()> {
    if tick_spacing <= 0 || tick_spacing > MAX_TICK {
        return Err(CalcError::invalid(format!("tick spacing must be in 1..={}, got {}", MAX_TICK, tick_spacing)));
    }
    Ok(())
}

/// Largest multiple of spacing that is <= tick.
pub fn align_down(tick: i32, tick_spacing: i32) -> CalcResult<i32> {
    check_spacing(tick_spacing)?;
    Ok(Integer::div_floor(&tick, &tick_spacing) * tick_spacing)
}

/// Smallest multiple of spacing that is >= tick.
pub fn align_up(tick: i32, tick_spacing: i32) -> CalcResult<i32> {
    check_spacing(tick_spacing)?;
    Ok(-(Integer::div_floor(&-tick, &tick_spacing) * tick_spacing))
}

/// Lowest tick a position may use with this spacing (global minimum aligned inward).
pub fn min_usable_tick(tick_spacing: i32) -> CalcResult<i32> {
    align_up(MIN_TICK, tick_spacing)
}

/// Highest tick a position may use with this spacing (global maximum aligned inward).
pub fn max_usable_tick(tick_spacing: i32) -> CalcResult<i32> {
    align_down(MAX_TICK, tick_spacing)
}

/// Closest multiple of spacing; exact halves round toward zero. A result that
/// lands outside the global bounds is pulled back in by one spacing step.
pub fn nearest_usable_tick(tick: i32, tick_spacing: i32) -> CalcResult<i32> {
    check_spacing(tick_spacing)?;
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(CalcError::invalid(format!("tick {} outside [{}, {}]", tick, MIN_TICK, MAX_TICK)));
    }

    let t = tick as i64;
    let s = tick_spacing as i64;
    let mut q = t / s;
    let r = t % s;
    if 2 * r.abs() > s {
        q += t.signum();
    }
    let mut rounded = q * s;

    if rounded < MIN_TICK as i64 {
        rounded += s;
    } else if rounded > MAX_TICK as i64 {
        rounded -= s;
    }
    Ok(rounded as i32)
}

// -------------------------------- Exact side ---------------------------------

/// Exact TickMath.getSqrtRatioAtTick (Q64.96).
pub fn get_sqrt_ratio_at_tick(tick: i32) -> CalcResult<BigInt> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(CalcError::invalid(format!("tick {} outside [{}, {}]", tick, MIN_TICK, MAX_TICK)));
    }
    let abs_tick = tick.unsigned_abs();

    // Q128.128
    let mut ratio = if abs_tick & 0x1 != 0 {
        BigInt::from(0xfffcb933bd6fad37aa2d162d1a594001u128)
    } else {
        BigInt::one() << 128
    };

    const STEPS: [(u32, u128); 19] = [
        (0x2, 0xfff97272373d413259a46990580e213a),
        (0x4, 0xfff2e50f5f656932ef12357cf3c7fdcc),
        (0x8, 0xffe5caca7e10e4e61c3624eaa0941cd0),
        (0x10, 0xffcb9843d60f6159c9db58835c926644),
        (0x20, 0xff973b41fa98c081472e6896dfb254c0),
        (0x40, 0xff2ea16466c96a3843ec78b326b52861),
        (0x80, 0xfe5dee046a99a2a811c461f1969c3053),
        (0x100, 0xfcbe86c7900a88aedcffc83b479aa3a4),
        (0x200, 0xf987a7253ac413176f2b074cf7815e54),
        (0x400, 0xf3392b0822b70005940c7a398e4b70f3),
        (0x800, 0xe7159475a2c29b7443b29c7fa6e889d9),
        (0x1000, 0xd097f3bdfd2022b8845ad8f792aa5825),
        (0x2000, 0xa9f746462d870fdf8a65dc1f90e061e5),
        (0x4000, 0x70d869a156d2a1b890bb3df62baf32f7),
        (0x8000, 0x31be135f97d08fd981231505542fcfa6),
        (0x10000, 0x09aa508b5b7a84e1c677de54f3e99bc9),
        (0x20000, 0x005d6af8dedb81196699c329225ee604),
        (0x40000, 0x00002216e584f5fa1ea926041bedfe98),
        (0x80000, 0x00000000048a170391f7dc42444e8fa2),
    ];

    for (bit, factor) in STEPS {
        if abs_tick & bit != 0 {
            ratio = (&ratio * BigInt::from(factor)) >> 128;
        }
    }

    if tick > 0 {
        let max = (BigInt::one() << 256) - 1;
        ratio = max / ratio;
    }
    // Q128.128 -> Q64.96, rounding up
    Ok((&ratio + ((BigInt::one() << 32) - 1)) >> 32)
}

pub fn min_sqrt_ratio() -> BigInt {
    BigInt::from(MIN_SQRT_RATIO)
}

/// getSqrtRatioAtTick(MAX_TICK); valid prices are strictly below this.
pub fn max_sqrt_ratio() -> BigInt {
    // MAX_TICK is in range by construction
    get_sqrt_ratio_at_tick(MAX_TICK).unwrap_or_default()
}

/// Greatest tick whose sqrt ratio is <= the input (binary search over the exact ratios).
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: &BigInt) -> CalcResult<i32> {
    if *sqrt_price_x96 < min_sqrt_ratio() || *sqrt_price_x96 >= max_sqrt_ratio() {
        return Err(CalcError::invalid(format!("sqrt price {} outside the valid Q64.96 range", sqrt_price_x96)));
    }
    let mut lo = MIN_TICK;
    let mut hi = MAX_TICK;
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if get_sqrt_ratio_at_tick(mid)? <= *sqrt_price_x96 { lo = mid; } else { hi = mid - 1; }
    }
    Ok(lo)
}
