//! # Apple Pay Error Types
//!
//! Typed error handling for Apple Pay sessions.
//! Every fallible operation returns `Result<T, ApplePayError>`, and the same
//! value is the payload of the `error` session event.

use serde::Serialize;
use thiserror::Error;

/// Core error type for Apple Pay configuration and session failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplePayError {
    /// The platform has no Apple Pay support at all
    #[error("Apple Pay is not supported by this platform")]
    NotSupported,

    /// Apple Pay is supported but cannot make payments (no cards, disabled)
    #[error("Apple Pay is not available")]
    NotAvailable,

    /// A required configuration option was not provided
    #[error("Missing required Apple Pay option: {option}")]
    ConfigMissing { option: String },

    /// A configuration option has an unusable value
    #[error("Invalid Apple Pay option {option}: {reason}")]
    ConfigInvalid { option: String, reason: String },

    /// `begin` was called before the session finished initializing
    #[error("Apple Pay session is not ready")]
    NotReady,

    /// `begin` was called while a payment sheet is already presented
    #[error("Apple Pay session already in progress")]
    InProgress,

    /// Initialization failed for a reason outside the configuration
    #[error("Apple Pay initialization failed: {0}")]
    InitError(String),

    /// Merchant validation with the processor failed
    #[error("Merchant validation failed: {0}")]
    MerchantValidation(String),

    /// The authorized payment could not be turned into a token
    #[error("Apple Pay payment failed: {0}")]
    PaymentFailure(String),

    /// Processor client configuration errors (missing keys, bad URLs)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network/HTTP error communicating with the processor
    #[error("Network error: {0}")]
    Network(String),

    /// Processor API returned an error response
    #[error("Provider error [{code}]: {message}")]
    Provider { code: String, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The native payment sheet reported a failure
    #[error("Payment sheet error: {0}")]
    Sheet(String),
}

impl ApplePayError {
    /// Shorthand for [`ApplePayError::ConfigMissing`]
    pub fn missing(option: impl Into<String>) -> Self {
        ApplePayError::ConfigMissing {
            option: option.into(),
        }
    }

    /// Shorthand for [`ApplePayError::ConfigInvalid`]
    pub fn invalid(option: impl Into<String>, reason: impl Into<String>) -> Self {
        ApplePayError::ConfigInvalid {
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApplePayError::Network(_) | ApplePayError::Provider { .. }
        )
    }

    /// Stable machine-readable code, as reported to event listeners
    pub fn code(&self) -> &'static str {
        match self {
            ApplePayError::NotSupported => "apple-pay-not-supported",
            ApplePayError::NotAvailable => "apple-pay-not-available",
            ApplePayError::ConfigMissing { .. } => "apple-pay-config-missing",
            ApplePayError::ConfigInvalid { .. } => "apple-pay-config-invalid",
            ApplePayError::NotReady => "apple-pay-not-ready",
            ApplePayError::InProgress => "apple-pay-in-progress",
            ApplePayError::InitError(_) => "apple-pay-init-error",
            ApplePayError::MerchantValidation(_) => "apple-pay-merchant-validation-failure",
            ApplePayError::PaymentFailure(_) => "apple-pay-payment-failure",
            ApplePayError::Configuration(_) => "configuration-error",
            ApplePayError::Network(_) => "network-error",
            ApplePayError::Provider { .. } => "provider-error",
            ApplePayError::Serialization(_) => "serialization-error",
            ApplePayError::Sheet(_) => "apple-pay-sheet-error",
        }
    }

    /// Code and message pair for handing the error across a JSON boundary
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApplePayError {
    fn from(err: serde_json::Error) -> Self {
        ApplePayError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ApplePayError {
    fn from(err: toml::de::Error) -> Self {
        ApplePayError::Serialization(err.to_string())
    }
}

/// Serializable form of an [`ApplePayError`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub code: &'static str,
    pub message: String,
}

/// Result type alias for Apple Pay operations
pub type ApplePayResult<T> = Result<T, ApplePayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ApplePayError::Network("timeout".into()).is_retryable());
        assert!(ApplePayError::Provider {
            code: "server_error".into(),
            message: "try again".into()
        }
        .is_retryable());
        assert!(!ApplePayError::NotAvailable.is_retryable());
        assert!(!ApplePayError::missing("total").is_retryable());
    }

    #[test]
    fn test_codes() {
        assert_eq!(ApplePayError::NotSupported.code(), "apple-pay-not-supported");
        assert_eq!(ApplePayError::missing("country").code(), "apple-pay-config-missing");
        assert_eq!(
            ApplePayError::invalid("total", "not a number").code(),
            "apple-pay-config-invalid"
        );
        assert_eq!(
            ApplePayError::PaymentFailure("declined".into()).code(),
            "apple-pay-payment-failure"
        );
    }

    #[test]
    fn test_report() {
        let report = ApplePayError::missing("currency").to_report();
        assert_eq!(report.code, "apple-pay-config-missing");
        assert_eq!(report.message, "Missing required Apple Pay option: currency");
    }
}
