//! # applepay-wasm
//!
//! WebAssembly bindings for Apple Pay session configs.
//!
//! This crate provides WASM-compatible functions for:
//! - Validating a session config before creating a session
//! - Previewing the payment request a config produces
//! - Checking event and contact field names
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { validate_config, preview_payment_request } from 'applepay-wasm';
//!
//! await init();
//!
//! validate_config({ country: 'US', currency: 'USD', total: '19.99' });
//! const request = preview_payment_request(
//!   { country: 'US', currency: 'USD', label: 'Acme' },
//!   { subtotal: '20.00', discount: '2.00', total: '18.00' },
//! );
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web
//! ```

use applepay_core::{
    build_payment_request, ApplePayConfig, ApplePayEvent, ContactField, ErrorReport,
    PaymentRequest, PriceQuote,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Validate a config, as a session would during initialization (minus the
/// platform and processor checks)
pub fn check_config(config: &ApplePayConfig) -> Result<(), ErrorReport> {
    config.validate().map_err(|e| e.to_report())?;
    let quote = config
        .pricing
        .as_ref()
        .map(|pricing| pricing.current().unwrap_or_default());
    build_payment_request(config, quote.as_ref(), None)
        .map(|_| ())
        .map_err(|e| e.to_report())
}

/// Payment request for a config and an optional price quote
pub fn preview(
    config: ApplePayConfig,
    quote: Option<PriceQuote>,
) -> Result<PaymentRequest, ErrorReport> {
    let config = match quote.clone() {
        Some(quote) => config.with_pricing(quote),
        None => config,
    };
    config.validate().map_err(|e| e.to_report())?;
    build_payment_request(&config, quote.as_ref(), None).map_err(|e| e.to_report())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

fn report_to_js(report: ErrorReport) -> JsValue {
    web_sys::console::warn_1(&JsValue::from_str(&format!(
        "[{}] {}",
        report.code, report.message
    )));
    to_js(&report).unwrap_or_else(|_| JsValue::from_str(&report.message))
}

fn parse_config(config: JsValue) -> Result<ApplePayConfig, JsValue> {
    serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsValue::from_str(&format!("Invalid Apple Pay config: {}", e)))
}

/// Validate a config object. Throws `{ code, message }` when invalid.
#[wasm_bindgen]
pub fn validate_config(config: JsValue) -> Result<(), JsValue> {
    let config = parse_config(config)?;
    check_config(&config).map_err(report_to_js)
}

/// Build the payment request for a config object and an optional quote
/// (`{ subtotal, total, discount, taxes, giftCard }`)
#[wasm_bindgen]
pub fn preview_payment_request(config: JsValue, quote: JsValue) -> Result<JsValue, JsValue> {
    let config = parse_config(config)?;
    let quote = if quote.is_undefined() || quote.is_null() {
        None
    } else {
        Some(
            serde_wasm_bindgen::from_value::<PriceQuote>(quote)
                .map_err(|e| JsValue::from_str(&format!("Invalid price quote: {}", e)))?,
        )
    };

    let request = preview(config, quote).map_err(report_to_js)?;
    to_js(&request)
}

/// Whether `name` is one of the session event names
#[wasm_bindgen]
pub fn is_apple_pay_event(name: &str) -> bool {
    name.parse::<ApplePayEvent>().is_ok()
}

/// All session event names
#[wasm_bindgen]
pub fn event_names() -> js_sys::Array {
    ApplePayEvent::ALL
        .iter()
        .map(|event| JsValue::from_str(event.as_str()))
        .collect()
}

/// All contact field names accepted by `requiredShippingContactFields`
#[wasm_bindgen]
pub fn contact_fields() -> js_sys::Array {
    ContactField::ALL
        .iter()
        .map(|field| JsValue::from_str(field.as_str()))
        .collect()
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use applepay_core::Amount;

    fn amount(s: &str) -> Amount {
        Amount::parse(s).unwrap()
    }

    #[test]
    fn test_check_config() {
        let config = ApplePayConfig::new("US", "USD").with_total("19.99");
        assert!(check_config(&config).is_ok());

        let report = check_config(&ApplePayConfig::new("US", "USD")).unwrap_err();
        assert_eq!(report.code, "apple-pay-config-missing");

        let bad_total = ApplePayConfig::new("US", "USD").with_total("19,99");
        assert_eq!(
            check_config(&bad_total).unwrap_err().code,
            "apple-pay-config-invalid"
        );
    }

    #[test]
    fn test_preview_with_quote() {
        let quote = PriceQuote::new(amount("18.00"))
            .with_subtotal(amount("20.00"))
            .with_discount(amount("2.00"));
        let request = preview(ApplePayConfig::new("US", "USD"), Some(quote)).unwrap();

        assert_eq!(request.total_amount(), Some(&amount("18.00")));
        assert_eq!(request.line_items.len(), 2);
        assert_eq!(request.line_items[1].amount, amount("-2.00"));
    }

    #[test]
    fn test_preview_requires_total() {
        let report = preview(ApplePayConfig::new("US", "USD"), None).unwrap_err();
        assert_eq!(report.code, "apple-pay-config-missing");
    }

    #[test]
    fn test_is_apple_pay_event() {
        assert!(is_apple_pay_event("paymentAuthorized"));
        assert!(is_apple_pay_event("cancel"));
        assert!(!is_apple_pay_event("authorized"));
        assert!(!is_apple_pay_event("Cancel"));
    }
}
