use thiserror::Error;

/// Failures of the pure range/amount calculator. None of them are transient.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("range too narrow for this fee tier (ticks {tick_lower}..{tick_upper} with spacing {tick_spacing}); widen it or pick a different fee tier")]
    DegenerateRange {
        tick_lower: i32,
        tick_upper: i32,
        tick_spacing: i32,
    },

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl CalcError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        CalcError::InvalidInput(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        CalcError::Configuration(msg.into())
    }

    /// Short machine-readable tag used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            CalcError::InvalidInput(_) => "invalid_input",
            CalcError::DegenerateRange { .. } => "degenerate_range",
            CalcError::Configuration(_) => "configuration",
        }
    }
}

pub type CalcResult<T> = Result<T, CalcError>;
