pub mod liquidity;
pub mod tick_math;
