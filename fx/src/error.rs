//! Rate feed error types.

use tasacalc_common::ForeignCurrency;
use thiserror::Error;

/// Errors that can occur while fetching reference rates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FxError {
    /// Provider failed to return current rates.
    #[error("Could not fetch exchange rates from {provider}: {reason}")]
    FetchFailed { provider: String, reason: String },

    /// Provider failed to return a historical series.
    #[error("Historical rates not available for {0}")]
    HistoricalUnavailable(ForeignCurrency),

    /// Custom rate text does not match the accepted grammar.
    #[error("Invalid custom rate: {0:?}")]
    InvalidCustomRate(String),
}

impl FxError {
    /// Check if this error could succeed on a later attempt.
    ///
    /// Nothing in the core retries automatically; this only informs logs.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FxError::FetchFailed { .. } | FxError::HistoricalUnavailable(_)
        )
    }

    /// Get error code for logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            FxError::FetchFailed { .. } => "FETCH_FAILED",
            FxError::HistoricalUnavailable(_) => "HISTORICAL_UNAVAILABLE",
            FxError::InvalidCustomRate(_) => "INVALID_CUSTOM_RATE",
        }
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        let fetch = FxError::FetchFailed {
            provider: "static".to_string(),
            reason: "timeout".to_string(),
        };
        assert!(fetch.is_retryable());
        assert!(FxError::HistoricalUnavailable(ForeignCurrency::Eur).is_retryable());
        assert!(!FxError::InvalidCustomRate("1,2,3".to_string()).is_retryable());
        assert_eq!(fetch.error_code(), "FETCH_FAILED");
    }
}
