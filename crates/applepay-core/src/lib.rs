//! # applepay-core
//!
//! Configuration and event contract for Apple Pay checkout sessions.
//!
//! This crate provides:
//! - `ApplePayConfig` and `I18n` for the options a session accepts
//! - `ApplePayEvent`, the closed set of session event names, and the
//!   `SessionEvent` payloads
//! - `Emitter` / `EventEmitter` for subscribing to those events
//! - `ApplePayInstance` and the `ApplePay` factory type
//! - `Pricing`, a price quote that is either resolved or pending
//! - `PaymentRequest` and `build_payment_request` for the native sheet
//! - `ApplePayError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use applepay_core::{callback, ApplePayConfig, ApplePayEvent, Emitter};
//!
//! let config = ApplePayConfig::new("US", "USD")
//!     .with_label("Acme Store")
//!     .with_total("19.99");
//!
//! // `apple_pay` is any factory, e.g. applepay_session::factory(..)
//! let session = apple_pay(config);
//!
//! session.on(ApplePayEvent::Token, Arc::new(|event| println!("{:?}", event)));
//! session.ready(callback(|| println!("show the Apple Pay button")));
//!
//! // From the button's click handler
//! session.begin(None);
//! ```

pub mod config;
pub mod emitter;
pub mod error;
pub mod event;
pub mod form;
pub mod instance;
pub mod payment;
pub mod payment_request;
pub mod pricing;
pub mod request;

// Re-exports for convenience
pub use config::{ApplePayConfig, BraintreeConfig, I18n};
pub use emitter::{Emitter, Event, EventEmitter, Listener, ListenerId};
pub use error::{ApplePayError, ApplePayResult, ErrorReport};
pub use event::{ApplePayEvent, SessionEvent, UnknownEvent};
pub use form::{BillingForm, FormRef, BILLING_FIELDS};
pub use instance::{callback, ApplePay, ApplePayInstance, Callback};
pub use payment::{
    ApplePayPayment, BillingAddress, MerchantInfo, MerchantSession, PaymentContact,
    PaymentMethod, PaymentToken, Token,
};
pub use payment_request::{
    ContactField, IntervalUnit, LineItem, LineItemType, MerchantCapability, PaymentRequest,
    PaymentRequestUpdate, PaymentTiming, RecurringPaymentRequest, ShippingMethod,
};
pub use pricing::{Amount, PriceQuote, Pricing, PricingHandle, PricingResolver};
pub use request::{
    build_payment_request, pricing_line_items, DEFAULT_SUPPORTED_NETWORKS,
    MIN_SHIPPING_CONTACT_FIELDS_VERSION,
};
