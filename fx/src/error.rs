//! FX pipeline error types.

use thiserror::Error;
use usdcny_common::{CurrencyPair, RatePairError};

/// Errors that can occur in the rate pipeline.
#[derive(Debug, Error)]
pub enum FxError {
    /// The request never produced a usable HTTP response.
    #[error("Network failure from {feed}: {reason}")]
    NetworkFailure { feed: String, reason: String },

    /// The endpoint answered, but not with the expected JSON document.
    #[error("Malformed response from {feed}: {reason}")]
    MalformedResponse { feed: String, reason: String },

    /// The `rates` object had no usable entry for the target currency.
    #[error("{feed} returned no rate for {pair}")]
    MissingField { feed: String, pair: CurrencyPair },

    /// User input could not be read as an amount.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Rates have not been loaded yet.
    #[error("Rate not available for {0}")]
    RateUnavailable(CurrencyPair),

    /// Storage size text did not match `<number><unit>`.
    #[error("Invalid storage size format: {0:?}")]
    InvalidFormat(String),

    /// A fetched or generated rate could not form a valid pair.
    #[error(transparent)]
    InvalidRate(#[from] RatePairError),

    /// Configuration is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl FxError {
    /// Whether the error came from talking to a rate feed.
    pub fn is_feed_error(&self) -> bool {
        matches!(
            self,
            FxError::NetworkFailure { .. }
                | FxError::MalformedResponse { .. }
                | FxError::MissingField { .. }
        )
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_error_classification() {
        let missing = FxError::MissingField {
            feed: "primary".to_string(),
            pair: CurrencyPair::usd_cny(),
        };
        assert!(missing.is_feed_error());
        assert_eq!(missing.to_string(), "primary returned no rate for USD/CNY");

        assert!(!FxError::InvalidInput("abc".to_string()).is_feed_error());
        assert!(!FxError::RateUnavailable(CurrencyPair::cny_usd()).is_feed_error());
    }
}
