//! # Processor Configuration
//!
//! Configuration for the processor client.
//! The public key and endpoint are loaded from environment variables.

use applepay_core::ApplePayError;
use std::env;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "https://api.recurly.com/js/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Processor API configuration
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Site public key, sent with every request
    pub public_key: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl ProcessorConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `RECURLY_PUBLIC_KEY`
    ///
    /// Optional:
    /// - `RECURLY_API_URL`
    /// - `RECURLY_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, ApplePayError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let public_key = env::var("RECURLY_PUBLIC_KEY").map_err(|_| {
            ApplePayError::Configuration("RECURLY_PUBLIC_KEY not set".to_string())
        })?;
        validate_public_key(&public_key)?;

        let api_base_url =
            env::var("RECURLY_API_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        if !api_base_url.starts_with("https://") && !api_base_url.starts_with("http://") {
            return Err(ApplePayError::Configuration(
                "RECURLY_API_URL must be an http(s) URL".to_string(),
            ));
        }

        let timeout = match env::var("RECURLY_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map(Duration::from_secs).map_err(|_| {
                ApplePayError::Configuration(format!(
                    "RECURLY_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    raw
                ))
            })?,
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            public_key,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Create config with an explicit key (for testing)
    pub fn new(public_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder: set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL for an API path such as `apple_pay/start`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

fn validate_public_key(key: &str) -> Result<(), ApplePayError> {
    if key.is_empty() || key.chars().any(char::is_whitespace) {
        return Err(ApplePayError::Configuration(
            "RECURLY_PUBLIC_KEY must be a non-empty key without whitespace".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let config = ProcessorConfig::new("ewr1-abc").with_api_base_url("http://localhost:9000/js/v1/");
        assert_eq!(config.api_base_url, "http://localhost:9000/js/v1");
        assert_eq!(
            config.endpoint("/apple_pay/start"),
            "http://localhost:9000/js/v1/apple_pay/start"
        );
    }

    #[test]
    fn test_defaults() {
        let config = ProcessorConfig::new("ewr1-abc");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_public_key_validation() {
        assert!(validate_public_key("ewr1-abc123").is_ok());
        assert!(validate_public_key("").is_err());
        assert!(validate_public_key("ewr1 abc").is_err());
    }
}
