//! Error types for dice rolling.

/// Errors that can occur while rolling dice or building roll records.
#[derive(Debug, thiserror::Error)]
pub enum DiceError {
    /// An argument was outside its allowed range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A roll is already being animated; only one may be active at a time.
    #[error("a roll is already in progress")]
    RollInProgress,

    /// A die tag or face count does not name a supported die.
    #[error("unknown die: {0}")]
    UnknownDie(String),
}

/// Convenience result type for dice operations.
pub type DiceResult<T> = Result<T, DiceError>;
