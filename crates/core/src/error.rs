//! Error taxonomy shared by the computation crates.

/// Error type for core computations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by schedule validation and the pure calculators.
///
/// Task ids unknown to the schedule are never errors; they are skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// The static schedule breaks one of its invariants.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A caller passed an out-of-range or inconsistent value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CoreError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Shorthand for [`CoreError::InvalidArgument`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
