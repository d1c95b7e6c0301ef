//! # Payment Sheet
//!
//! Platform seam for the native Apple Pay sheet. A session asks the
//! provider whether payments are possible, presents a sheet for a
//! [`PaymentRequest`], then answers the sheet's events one at a time.

use applepay_core::{
    ApplePayPayment, ApplePayResult, MerchantSession, PaymentContact, PaymentRequest,
    PaymentRequestUpdate, ShippingMethod,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Something the customer (or the platform) did on an open sheet
#[derive(Debug, Clone, PartialEq)]
pub enum SheetEvent {
    /// The platform needs a merchant session from `validation_url`
    ValidateMerchant { validation_url: String },

    ShippingContactSelected(PaymentContact),

    ShippingMethodSelected(ShippingMethod),

    /// The customer approved the payment
    PaymentAuthorized(ApplePayPayment),

    /// The customer dismissed the sheet
    Cancelled,
}

/// Result reported back to the sheet once a payment has been processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationStatus {
    Success,
    Failure,
}

/// Platform capability checks and sheet presentation
#[async_trait]
pub trait PaymentSheetProvider: Send + Sync {
    /// Whether the platform has Apple Pay at all
    fn is_supported(&self) -> bool {
        true
    }

    /// Whether the platform implements the given Apple Pay API version
    fn supports_version(&self, version: u32) -> bool;

    /// Whether the customer can pay right now (device, wallet, cards)
    async fn can_make_payments(&self) -> bool;

    /// Show the sheet for `request`
    async fn present(&self, request: &PaymentRequest) -> ApplePayResult<Box<dyn PaymentSheet>>;
}

/// An open payment sheet.
///
/// Every event that expects an answer must get exactly one `complete_*`
/// call before the next event is read.
#[async_trait]
pub trait PaymentSheet: Send {
    /// Next event from the sheet; `None` once the sheet has closed
    async fn next_event(&mut self) -> Option<SheetEvent>;

    async fn complete_merchant_validation(&mut self, session: MerchantSession)
        -> ApplePayResult<()>;

    async fn complete_shipping_contact_selection(
        &mut self,
        update: PaymentRequestUpdate,
    ) -> ApplePayResult<()>;

    async fn complete_shipping_method_selection(
        &mut self,
        update: PaymentRequestUpdate,
    ) -> ApplePayResult<()>;

    async fn complete_payment(&mut self, status: AuthorizationStatus) -> ApplePayResult<()>;

    /// Close the sheet without completing the payment
    async fn abort(&mut self);
}
