//! # Token Processor
//!
//! The server side of an Apple Pay session: merchant setup, merchant
//! validation and token exchange.

use applepay_core::{
    ApplePayPayment, ApplePayResult, BillingAddress, BraintreeConfig, FormRef, MerchantInfo,
    MerchantSession, PaymentMethod, Token,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of a merchant validation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantValidationRequest {
    #[serde(rename = "validationURL")]
    pub validation_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Body of a token exchange request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    /// Encrypted payment data, forwarded untouched
    pub payment_data: serde_json::Value,
    pub payment_method: PaymentMethod,
    pub transaction_identifier: String,

    /// Billing fields, flattened into the body
    #[serde(flatten)]
    pub billing: BillingAddress,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub braintree: Option<BraintreeConfig>,
}

impl TokenRequest {
    /// Build a token request for an authorized payment.
    ///
    /// Billing fields come from the sheet's billing contact; any non-blank
    /// field on `form` replaces the sheet's value.
    pub fn new(
        payment: &ApplePayPayment,
        form: Option<&FormRef>,
        braintree: Option<&BraintreeConfig>,
    ) -> Self {
        let mut billing = payment
            .billing_contact
            .as_ref()
            .map(BillingAddress::from_contact)
            .unwrap_or_default();
        if let Some(form) = form {
            billing.apply_form(form);
        }

        Self {
            payment_data: payment.token.payment_data.clone(),
            payment_method: payment.token.payment_method.clone(),
            transaction_identifier: payment.token.transaction_identifier.clone(),
            billing,
            braintree: braintree.cloned(),
        }
    }
}

/// Processor used by a session
///
/// Implement this trait to plug in a different backend.
#[async_trait]
pub trait TokenProcessor: Send + Sync {
    /// Countries, currencies and card features the merchant is enabled for
    async fn merchant_info(&self) -> ApplePayResult<MerchantInfo>;

    /// Obtain a merchant session for the sheet's validation URL
    async fn validate_merchant(
        &self,
        request: &MerchantValidationRequest,
    ) -> ApplePayResult<MerchantSession>;

    /// Exchange an authorized payment for a single-use token
    async fn tokenize(&self, request: &TokenRequest) -> ApplePayResult<Token>;

    /// Processor name for logging
    fn processor_name(&self) -> &'static str;
}

/// Type alias for boxed processor
pub type BoxedTokenProcessor = Arc<dyn TokenProcessor>;
