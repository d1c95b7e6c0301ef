//! # Pricing Types
//!
//! Price values handed to an Apple Pay session by the checkout-pricing
//! subsystem. A session accepts either a quote that is already computed or a
//! handle whose quote arrives later; both are read the same way.

use crate::error::{ApplePayError, ApplePayResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;

/// Decimal amount kept in its string form (e.g. `"19.99"`, `"-5.00"`)
///
/// Apple Pay line items carry amounts as strings, so the value is validated
/// once and never converted through floating point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(String);

impl Amount {
    /// Parse a decimal string: optional `-`, digits, optional fraction
    pub fn parse(value: &str) -> ApplePayResult<Self> {
        let value = value.trim();
        let unsigned = value.strip_prefix('-').unwrap_or(value);
        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (unsigned, None),
        };

        let digits_ok = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !digits_ok(whole) || !fraction.map(digits_ok).unwrap_or(true) {
            return Err(ApplePayError::invalid(
                "amount",
                format!("'{}' is not a decimal amount", value),
            ));
        }

        Ok(Self(value.to_string()))
    }

    /// The zero amount
    pub fn zero() -> Self {
        Self("0.00".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when every digit is zero (`"0"`, `"0.00"`, `"-0.0"`)
    pub fn is_zero(&self) -> bool {
        self.0.bytes().filter(u8::is_ascii_digit).all(|b| b == b'0')
    }

    pub fn is_negative(&self) -> bool {
        self.0.starts_with('-') && !self.is_zero()
    }

    /// Flip the sign; zero stays unsigned
    pub fn negated(&self) -> Self {
        if self.is_zero() {
            return self.clone();
        }
        match self.0.strip_prefix('-') {
            Some(rest) => Self(rest.to_string()),
            None => Self(format!("-{}", self.0)),
        }
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Amount {
    type Error = ApplePayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Amount {
    type Error = ApplePayError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Current price breakdown produced by checkout pricing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    /// Sum of items before adjustments
    #[serde(default)]
    pub subtotal: Amount,

    /// Amount due
    pub total: Amount,

    /// Coupon discount (positive value; shown negated)
    #[serde(default)]
    pub discount: Amount,

    /// Tax due
    #[serde(default)]
    pub taxes: Amount,

    /// Gift card credit (positive value; shown negated)
    #[serde(default)]
    pub gift_card: Amount,
}

impl PriceQuote {
    /// Quote with only a total; subtotal mirrors it
    pub fn new(total: Amount) -> Self {
        Self {
            subtotal: total.clone(),
            total,
            ..Default::default()
        }
    }

    pub fn with_subtotal(mut self, subtotal: Amount) -> Self {
        self.subtotal = subtotal;
        self
    }

    pub fn with_discount(mut self, discount: Amount) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_taxes(mut self, taxes: Amount) -> Self {
        self.taxes = taxes;
        self
    }

    pub fn with_gift_card(mut self, gift_card: Amount) -> Self {
        self.gift_card = gift_card;
        self
    }
}

/// Read side of a quote that is not available yet, or that may change
#[derive(Debug, Clone)]
pub struct PricingHandle {
    rx: watch::Receiver<Option<PriceQuote>>,
}

/// Write side paired with a [`PricingHandle`]
#[derive(Debug)]
pub struct PricingResolver {
    tx: watch::Sender<Option<PriceQuote>>,
}

impl PricingResolver {
    /// Publish a quote. Later calls replace the previous quote.
    pub fn resolve(&self, quote: PriceQuote) {
        self.tx.send_replace(Some(quote));
    }
}

impl PricingHandle {
    /// Latest published quote, if any
    pub fn current(&self) -> Option<PriceQuote> {
        self.rx.borrow().clone()
    }

    /// Wait until a quote is published and return it.
    ///
    /// Fails if the resolver is dropped without ever publishing.
    pub async fn resolved(&self) -> ApplePayResult<PriceQuote> {
        let mut rx = self.rx.clone();
        let quote = {
            let current = rx.wait_for(Option::is_some).await.map_err(|_| {
                ApplePayError::invalid("pricing", "pricing was dropped before it resolved")
            })?;
            current.clone()
        };
        quote.ok_or_else(|| ApplePayError::invalid("pricing", "pricing resolved without a quote"))
    }
}

/// Price source for a session: resolved now, or resolved later
#[derive(Debug, Clone)]
pub enum Pricing {
    Resolved(PriceQuote),
    Pending(PricingHandle),
}

impl Pricing {
    /// Create a pending price source and the resolver that completes it
    pub fn pending() -> (PricingResolver, Self) {
        let (tx, rx) = watch::channel(None);
        (PricingResolver { tx }, Pricing::Pending(PricingHandle { rx }))
    }

    /// Quote available right now without waiting
    pub fn current(&self) -> Option<PriceQuote> {
        match self {
            Pricing::Resolved(quote) => Some(quote.clone()),
            Pricing::Pending(handle) => handle.current(),
        }
    }

    /// Quote, waiting for a pending source to resolve
    pub async fn quote(&self) -> ApplePayResult<PriceQuote> {
        match self {
            Pricing::Resolved(quote) => Ok(quote.clone()),
            Pricing::Pending(handle) => handle.resolved().await,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Pricing::Pending(_)) && self.current().is_none()
    }
}

impl From<PriceQuote> for Pricing {
    fn from(quote: PriceQuote) -> Self {
        Pricing::Resolved(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> Amount {
        Amount::parse(s).unwrap()
    }

    #[test]
    fn test_amount_parse() {
        assert_eq!(amount("19.99").as_str(), "19.99");
        assert_eq!(amount(" 5 ").as_str(), "5");
        assert_eq!(amount("-3.50").as_str(), "-3.50");
        assert!(Amount::parse("").is_err());
        assert!(Amount::parse("abc").is_err());
        assert!(Amount::parse("1.").is_err());
        assert!(Amount::parse(".5").is_err());
        assert!(Amount::parse("1,000.00").is_err());
    }

    #[test]
    fn test_amount_sign() {
        assert!(amount("0.00").is_zero());
        assert!(amount("-0").is_zero());
        assert!(!amount("0.01").is_zero());
        assert_eq!(amount("5.00").negated().as_str(), "-5.00");
        assert_eq!(amount("-5.00").negated().as_str(), "5.00");
        assert_eq!(amount("0.00").negated().as_str(), "0.00");
        assert!(amount("-1").is_negative());
        assert!(!amount("-0.00").is_negative());
    }

    #[test]
    fn test_amount_serde() {
        let parsed: Amount = serde_json::from_str("\"12.00\"").unwrap();
        assert_eq!(parsed, amount("12.00"));
        assert!(serde_json::from_str::<Amount>("\"twelve\"").is_err());
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"12.00\"");
    }

    #[test]
    fn test_quote_deserialize() {
        let quote: PriceQuote = serde_json::from_str(
            r#"{"subtotal":"20.00","total":"18.00","discount":"2.00","giftCard":"0.00"}"#,
        )
        .unwrap();
        assert_eq!(quote.total, amount("18.00"));
        assert_eq!(quote.discount, amount("2.00"));
        assert!(quote.taxes.is_zero());
    }

    #[tokio::test]
    async fn test_resolved_pricing() {
        let pricing = Pricing::from(PriceQuote::new(amount("10.00")));
        assert!(!pricing.is_pending());
        assert_eq!(pricing.quote().await.unwrap().total, amount("10.00"));
    }

    #[tokio::test]
    async fn test_pending_pricing_resolves() {
        let (resolver, pricing) = Pricing::pending();
        assert!(pricing.is_pending());
        assert!(pricing.current().is_none());

        let waiter = {
            let pricing = pricing.clone();
            tokio::spawn(async move { pricing.quote().await })
        };
        resolver.resolve(PriceQuote::new(amount("42.00")));

        let quote = waiter.await.unwrap().unwrap();
        assert_eq!(quote.total, amount("42.00"));
        assert_eq!(pricing.current().unwrap().total, amount("42.00"));
    }

    #[tokio::test]
    async fn test_pending_pricing_keeps_latest() {
        let (resolver, pricing) = Pricing::pending();
        resolver.resolve(PriceQuote::new(amount("1.00")));
        resolver.resolve(PriceQuote::new(amount("2.00")));
        assert_eq!(pricing.quote().await.unwrap().total, amount("2.00"));
    }

    #[tokio::test]
    async fn test_dropped_resolver_fails() {
        let (resolver, pricing) = Pricing::pending();
        drop(resolver);
        let err = pricing.quote().await.unwrap_err();
        assert_eq!(err.code(), "apple-pay-config-invalid");
    }

    #[tokio::test]
    async fn test_resolved_then_dropped_still_reads() {
        let (resolver, pricing) = Pricing::pending();
        resolver.resolve(PriceQuote::new(amount("7.00")));
        drop(resolver);
        assert_eq!(pricing.quote().await.unwrap().total, amount("7.00"));
    }
}
