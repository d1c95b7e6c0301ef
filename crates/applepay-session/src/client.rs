//! # Processor Client
//!
//! HTTP client for the Apple Pay endpoints of the Recurly.js API.
//!
//! | Call | Endpoint |
//! |------|----------|
//! | merchant info | `GET apple_pay/info?key=` |
//! | merchant validation | `POST apple_pay/start` |
//! | token exchange | `POST apple_pay/token` |

use crate::config::ProcessorConfig;
use crate::processor::{MerchantValidationRequest, TokenProcessor, TokenRequest};
use applepay_core::{ApplePayError, ApplePayResult, MerchantInfo, MerchantSession, Token};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

/// Processor backed by the Recurly.js API
pub struct RecurlyClient {
    config: ProcessorConfig,
    client: Client,
}

impl RecurlyClient {
    /// Create a new client
    pub fn new(config: ProcessorConfig) -> ApplePayResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApplePayError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> ApplePayResult<Self> {
        Self::new(ProcessorConfig::from_env()?)
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Send a request and decode the JSON body.
    ///
    /// Error bodies (`{"error": {"code", "message"}}`) become
    /// [`ApplePayError::Provider`], whatever the status code.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApplePayResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| ApplePayError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApplePayError::Network(e.to_string()))?;

        if let Ok(ErrorBody { error: api_error }) = serde_json::from_str::<ErrorBody>(&body) {
            error!("Processor error {}: {}", api_error.code, api_error.message);
            return Err(ApplePayError::Provider {
                code: api_error.code,
                message: api_error.message,
            });
        }

        if !status.is_success() {
            error!("Processor returned {}: {}", status, body);
            return Err(ApplePayError::Provider {
                code: status.as_u16().to_string(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(ApplePayError::from)
    }
}

#[async_trait]
impl TokenProcessor for RecurlyClient {
    #[instrument(skip(self))]
    async fn merchant_info(&self) -> ApplePayResult<MerchantInfo> {
        let url = self.config.endpoint("apple_pay/info");
        debug!("Fetching merchant info from {}", url);

        let info: MerchantInfo = self
            .send(
                self.client
                    .get(&url)
                    .query(&[("key", self.config.public_key.as_str())]),
            )
            .await?;

        info!(
            "Merchant enabled for {} countries, {} currencies",
            info.countries.len(),
            info.currencies.len()
        );
        Ok(info)
    }

    #[instrument(skip(self, request), fields(validation_url = %request.validation_url))]
    async fn validate_merchant(
        &self,
        request: &MerchantValidationRequest,
    ) -> ApplePayResult<MerchantSession> {
        let url = self.config.endpoint("apple_pay/start");
        let session: MerchantSession = self
            .send(self.client.post(&url).json(&Keyed {
                key: &self.config.public_key,
                body: request,
            }))
            .await?;

        info!("Merchant validated");
        Ok(session)
    }

    #[instrument(skip(self, request), fields(transaction = %request.transaction_identifier))]
    async fn tokenize(&self, request: &TokenRequest) -> ApplePayResult<Token> {
        let url = self.config.endpoint("apple_pay/token");
        debug!(
            "Requesting token with {} billing fields, braintree={}",
            request.billing.len(),
            request.braintree.is_some()
        );

        let token: Token = self
            .send(self.client.post(&url).json(&Keyed {
                key: &self.config.public_key,
                body: request,
            }))
            .await?;

        info!("Token created: {}", token.id);
        Ok(token)
    }

    fn processor_name(&self) -> &'static str {
        "recurly"
    }
}

// Processor API wire types

#[derive(Serialize)]
struct Keyed<'a, T: Serialize> {
    key: &'a str,
    #[serde(flatten)]
    body: &'a T,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}
