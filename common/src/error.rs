//! Error types for shared rate types.

use thiserror::Error;

use crate::CurrencyPair;

/// Errors raised while building a [`crate::RatePair`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RatePairError {
    /// A rate was zero or negative.
    #[error("Rate for {pair} must be positive, got {value}")]
    NonPositiveRate { pair: CurrencyPair, value: String },
}

/// Result type alias for rate pair construction.
pub type Result<T> = std::result::Result<T, RatePairError>;
