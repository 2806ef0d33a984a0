// amounts.rs
//
// Upper-bound deposit amounts for a new position.
// - USD notional: split 50/50 in USD terms, token0 valued at the supplied
//   price, token1 at its peg (1.0 for stablecoins). This is a simplification
//   and not the optimal ratio for the range; the reconciler trims the excess.
// - Raw amounts: taken as given.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{CalcError, CalcResult};
use crate::models::{AmountRequest, TokenPricing};

/// Widest token precision accepted (ERC-20 tokens in practice use <= 18).
pub const MAX_TOKEN_DECIMALS: u8 = 38;

/// Largest USD notional accepted; the split runs in 96-bit decimal arithmetic.
pub const MAX_TARGET_USD: f64 = 1e28;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredAmounts {
    pub amount0: BigInt,
    pub amount1: BigInt,
}

/// Cheap validation run before any tick work so bad amounts fail fast.
pub fn validate_amount_request(request: &AmountRequest) -> CalcResult<()> {
    match request {
        AmountRequest::TargetUsd { target_usd } => {
            if !target_usd.is_finite() || *target_usd < 0.0 {
                return Err(CalcError::invalid(format!(
                    "target_usd must be finite and non-negative, got {}", target_usd
                )));
            }
            if *target_usd > MAX_TARGET_USD {
                return Err(CalcError::invalid(format!(
                    "target_usd {} exceeds the supported maximum of {}", target_usd, MAX_TARGET_USD
                )));
            }
            Ok(())
        }
        AmountRequest::Raw { amount0_raw, amount1_raw } => {
            parse_raw_amount("amount0_raw", amount0_raw)?;
            parse_raw_amount("amount1_raw", amount1_raw)?;
            Ok(())
        }
    }
}

pub fn desired_amounts(
    request: &AmountRequest,
    decimals0: u8,
    decimals1: u8,
    pricing: &TokenPricing,
) -> CalcResult<DesiredAmounts> {
    validate_amount_request(request)?;
    for d in [decimals0, decimals1] {
        if d > MAX_TOKEN_DECIMALS {
            return Err(CalcError::config(format!("token decimals {} exceed {}", d, MAX_TOKEN_DECIMALS)));
        }
    }

    match request {
        AmountRequest::Raw { amount0_raw, amount1_raw } => Ok(DesiredAmounts {
            amount0: parse_raw_amount("amount0_raw", amount0_raw)?,
            amount1: parse_raw_amount("amount1_raw", amount1_raw)?,
        }),
        AmountRequest::TargetUsd { target_usd } => {
            let token0_price = pricing
                .token0_price_usd
                .ok_or_else(|| CalcError::config("token0 USD price is required to split a USD target"))?;
            let token0_price = positive_price("token0", token0_price)?;
            let token1_price = positive_price("token1", pricing.token1_price_usd)?;

            let target = Decimal::from_f64(*target_usd)
                .ok_or_else(|| CalcError::invalid(format!("target_usd {} is not representable", target_usd)))?;
            let half = target / Decimal::TWO;

            let tokens0 = half
                .checked_div(token0_price)
                .ok_or_else(|| CalcError::invalid("token0 amount overflows"))?;
            let tokens1 = half
                .checked_div(token1_price)
                .ok_or_else(|| CalcError::invalid("token1 amount overflows"))?;

            let amounts = DesiredAmounts {
                amount0: to_raw_units(tokens0, decimals0),
                amount1: to_raw_units(tokens1, decimals1),
            };
            log::debug!(
                "USD split: {} USD -> {} token0 ({} raw), {} token1 ({} raw)",
                target_usd, tokens0, amounts.amount0, tokens1, amounts.amount1
            );
            Ok(amounts)
        }
    }
}

fn positive_price(name: &str, price: f64) -> CalcResult<Decimal> {
    if !price.is_finite() || price <= 0.0 {
        return Err(CalcError::config(format!("{} USD price must be positive, got {}", name, price)));
    }
    Decimal::from_f64(price)
        .filter(|d| !d.is_zero())
        .ok_or_else(|| CalcError::config(format!("{} USD price {} is not representable", name, price)))
}

/// Whole-token decimal amount -> integer smallest units, truncated.
pub fn to_raw_units(amount: Decimal, decimals: u8) -> BigInt {
    if amount.is_sign_negative() || amount.is_zero() {
        return BigInt::zero();
    }
    // amount = mantissa / 10^scale
    let mantissa = BigInt::from(amount.mantissa());
    let scaled = mantissa * BigInt::from(10u8).pow(decimals as u32);
    scaled / BigInt::from(10u8).pow(amount.scale())
}

fn parse_raw_amount(name: &str, value: &str) -> CalcResult<BigInt> {
    let v = BigInt::from_str(value.trim())
        .map_err(|_| CalcError::invalid(format!("{} must be a decimal integer string, got {:?}", name, value)))?;
    if v.is_negative() {
        return Err(CalcError::invalid(format!("{} must be non-negative, got {}", name, v)));
    }
    Ok(v)
}
