// range.rs
use crate::error::{CalcError, CalcResult};
use crate::math::tick_math::{max_usable_tick, min_usable_tick, nearest_usable_tick, price_to_tick};
use crate::models::{RangeRequest, TickRange};

/// Turn a full-range flag or a (min, max) price pair into spacing-aligned ticks.
///
/// Prices are raw pool prices (token1 units per token0 unit). Inverted or
/// equal bounds are rejected rather than swapped, and a pair that collapses
/// onto one usable tick is reported as [`CalcError::DegenerateRange`].
pub fn resolve_tick_range(request: &RangeRequest, tick_spacing: i32) -> CalcResult<TickRange> {
    let (min_price, max_price) = match *request {
        RangeRequest::FullRange => {
            return Ok(TickRange {
                tick_lower: min_usable_tick(tick_spacing)?,
                tick_upper: max_usable_tick(tick_spacing)?,
            });
        }
        RangeRequest::Bounds { min_price, max_price } => (min_price, max_price),
    };

    validate_bounds(min_price, max_price)?;

    let raw_lower = price_to_tick(min_price)?;
    let raw_upper = price_to_tick(max_price)?;
    let tick_lower = nearest_usable_tick(raw_lower, tick_spacing)?;
    let tick_upper = nearest_usable_tick(raw_upper, tick_spacing)?;

    log::debug!(
        "range {}..{} -> raw ticks {}..{} -> aligned {}..{} (spacing {})",
        min_price, max_price, raw_lower, raw_upper, tick_lower, tick_upper, tick_spacing
    );

    if tick_lower >= tick_upper {
        return Err(CalcError::DegenerateRange { tick_lower, tick_upper, tick_spacing });
    }
    Ok(TickRange { tick_lower, tick_upper })
}

/// Both bounds finite and positive, strictly ordered.
pub fn validate_bounds(min_price: f64, max_price: f64) -> CalcResult<()> {
    for (name, p) in [("min_price", min_price), ("max_price", max_price)] {
        if !p.is_finite() || p <= 0.0 {
            return Err(CalcError::invalid(format!("{} must be finite and positive, got {}", name, p)));
        }
    }
    if min_price >= max_price {
        return Err(CalcError::invalid(format!(
            "min_price ({}) must be strictly below max_price ({})", min_price, max_price
        )));
    }
    Ok(())
}
