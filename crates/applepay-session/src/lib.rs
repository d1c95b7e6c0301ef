//! # applepay-session
//!
//! Runtime for Apple Pay sessions.
//!
//! This crate provides:
//! - `ApplePaySession`, the [`ApplePayInstance`](applepay_core::ApplePayInstance)
//!   implementation, and `factory` to build an `ApplePay` factory from it
//! - `PaymentSheetProvider` / `PaymentSheet`, the seam to the native sheet
//! - `TokenProcessor`, the seam to the payment processor
//! - `RecurlyClient`, an HTTP `TokenProcessor`
//!
//! ## Configuration
//!
//! Set these environment variables (or use a `.env` file):
//!
//! ```bash
//! RECURLY_PUBLIC_KEY=ewr1-xxx
//! RECURLY_API_URL=https://api.recurly.com/js/v1   # optional
//! RECURLY_TIMEOUT_SECS=30                          # optional
//! ```

pub mod client;
pub mod config;
pub mod processor;
pub mod session;
pub mod sheet;

// Re-exports
pub use client::RecurlyClient;
pub use config::ProcessorConfig;
pub use processor::{BoxedTokenProcessor, MerchantValidationRequest, TokenProcessor, TokenRequest};
pub use session::{factory, ApplePaySession, SessionState};
pub use sheet::{AuthorizationStatus, PaymentSheet, PaymentSheetProvider, SheetEvent};
