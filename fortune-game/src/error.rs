//! Error kinds raised by the event engine and catalog loading.
use thiserror::Error;

/// Errors produced by sampling, round actions, and catalog handling.
#[derive(Debug, Error)]
pub enum FortuneError {
    /// The sampling input has no item with a positive weight.
    #[error("sampling weights are invalid (total weight {total})")]
    InvalidWeights { total: f64 },
    /// The requested action costs more than the remaining budget.
    #[error("action costs {cost} tokens but only {available} remain")]
    InsufficientTokens { cost: u32, available: u32 },
    /// Every slot in the current round has already been revealed.
    #[error("every slot in this round has already been revealed")]
    RoundExhausted,
    /// The catalog is missing required data or contains malformed records.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A presentation-layer choice was outside the offered range.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FortuneError {
    /// True when the error only reflects an unaffordable action.
    #[must_use]
    pub const fn is_affordability(&self) -> bool {
        matches!(self, Self::InsufficientTokens { .. })
    }
}

impl PartialEq for FortuneError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidWeights { total: a }, Self::InvalidWeights { total: b }) => {
                a.to_bits() == b.to_bits()
            }
            (
                Self::InsufficientTokens {
                    cost: a_cost,
                    available: a_available,
                },
                Self::InsufficientTokens {
                    cost: b_cost,
                    available: b_available,
                },
            ) => a_cost == b_cost && a_available == b_available,
            (Self::RoundExhausted, Self::RoundExhausted) => true,
            (Self::InvalidConfiguration(a), Self::InvalidConfiguration(b))
            | (Self::InvalidSelection(a), Self::InvalidSelection(b)) => a == b,
            _ => false,
        }
    }
}
