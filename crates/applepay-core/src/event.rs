//! # Session Events
//!
//! The closed set of events an Apple Pay session emits, and the payload each
//! one carries.

use crate::emitter::Event;
use crate::error::ApplePayError;
use crate::payment::{ApplePayPayment, PaymentContact, Token};
use crate::payment_request::ShippingMethod;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Names of the events a session emits. No other names exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApplePayEvent {
    Token,
    Error,
    Ready,
    ShippingContactSelected,
    PaymentAuthorized,
    ShippingMethodSelected,
    Cancel,
}

impl ApplePayEvent {
    /// Every event name, in declaration order
    pub const ALL: [ApplePayEvent; 7] = [
        ApplePayEvent::Token,
        ApplePayEvent::Error,
        ApplePayEvent::Ready,
        ApplePayEvent::ShippingContactSelected,
        ApplePayEvent::PaymentAuthorized,
        ApplePayEvent::ShippingMethodSelected,
        ApplePayEvent::Cancel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplePayEvent::Token => "token",
            ApplePayEvent::Error => "error",
            ApplePayEvent::Ready => "ready",
            ApplePayEvent::ShippingContactSelected => "shippingContactSelected",
            ApplePayEvent::PaymentAuthorized => "paymentAuthorized",
            ApplePayEvent::ShippingMethodSelected => "shippingMethodSelected",
            ApplePayEvent::Cancel => "cancel",
        }
    }

    /// True for events that end a presented payment sheet
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplePayEvent::Token | ApplePayEvent::Error | ApplePayEvent::Cancel
        )
    }
}

impl fmt::Display for ApplePayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a string that is not one of the seven event names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown Apple Pay event: {0}")]
pub struct UnknownEvent(pub String);

impl FromStr for ApplePayEvent {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplePayEvent::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| UnknownEvent(s.to_string()))
    }
}

/// An emitted session event with its payload
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The processor issued a token for the authorized payment
    Token(Token),
    /// Something failed; the session reports each failure once
    Error(ApplePayError),
    /// The payment sheet can be shown
    Ready,
    /// The customer picked a shipping contact
    ShippingContactSelected(PaymentContact),
    /// The customer authorized the payment on the sheet
    PaymentAuthorized(ApplePayPayment),
    /// The customer picked a shipping method
    ShippingMethodSelected(ShippingMethod),
    /// The customer dismissed the sheet
    Cancel,
}

impl Event for SessionEvent {
    type Name = ApplePayEvent;

    fn name(&self) -> ApplePayEvent {
        match self {
            SessionEvent::Token(_) => ApplePayEvent::Token,
            SessionEvent::Error(_) => ApplePayEvent::Error,
            SessionEvent::Ready => ApplePayEvent::Ready,
            SessionEvent::ShippingContactSelected(_) => ApplePayEvent::ShippingContactSelected,
            SessionEvent::PaymentAuthorized(_) => ApplePayEvent::PaymentAuthorized,
            SessionEvent::ShippingMethodSelected(_) => ApplePayEvent::ShippingMethodSelected,
            SessionEvent::Cancel => ApplePayEvent::Cancel,
        }
    }
}
