//! # Session Configuration
//!
//! Options accepted by the Apple Pay factory. The serializable part loads
//! from TOML or JSON using the same camelCase names browser callers use; the
//! pricing source and billing form are runtime handles attached with the
//! builder methods.

use crate::error::{ApplePayError, ApplePayResult};
use crate::form::FormRef;
use crate::payment_request::{ContactField, PaymentRequest};
use crate::pricing::{Amount, Pricing};
use serde::{Deserialize, Serialize};

/// Localized labels for the line items built from pricing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct I18n {
    /// The short, localized description of the subtotal line item
    #[serde(default = "default_subtotal_label")]
    pub subtotal_line_item_label: String,

    /// The short, localized description of the total line item
    #[serde(default = "default_total_label")]
    pub total_line_item_label: String,

    /// The short, localized description of the discount line item
    #[serde(default = "default_discount_label")]
    pub discount_line_item_label: String,

    /// The short, localized description of the tax line item
    #[serde(default = "default_tax_label")]
    pub tax_line_item_label: String,

    /// The short, localized description of the gift card line item
    #[serde(default = "default_gift_card_label")]
    pub gift_card_line_item_label: String,
}

fn default_subtotal_label() -> String {
    "Subtotal".to_string()
}

fn default_total_label() -> String {
    "Total".to_string()
}

fn default_discount_label() -> String {
    "Discount".to_string()
}

fn default_tax_label() -> String {
    "Tax".to_string()
}

fn default_gift_card_label() -> String {
    "Gift card".to_string()
}

impl Default for I18n {
    fn default() -> Self {
        Self {
            subtotal_line_item_label: default_subtotal_label(),
            total_line_item_label: default_total_label(),
            discount_line_item_label: default_discount_label(),
            tax_line_item_label: default_tax_label(),
            gift_card_line_item_label: default_gift_card_label(),
        }
    }
}

impl I18n {
    /// Every label must be displayable
    pub fn validate(&self) -> ApplePayResult<()> {
        let labels = [
            ("i18n.subtotalLineItemLabel", &self.subtotal_line_item_label),
            ("i18n.totalLineItemLabel", &self.total_line_item_label),
            ("i18n.discountLineItemLabel", &self.discount_line_item_label),
            ("i18n.taxLineItemLabel", &self.tax_line_item_label),
            ("i18n.giftCardLineItemLabel", &self.gift_card_line_item_label),
        ];

        for (option, label) in labels {
            if label.trim().is_empty() {
                return Err(ApplePayError::invalid(option, "label must not be empty"));
            }
        }
        Ok(())
    }
}

/// Credentials for processing through Braintree instead of the default processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BraintreeConfig {
    pub client_authorization: String,
}

/// Configuration for one Apple Pay session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplePayConfig {
    /// Merchant ISO 3166 country code (ex: `US`).
    /// Required unless `payment_request.country_code` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// ISO 4217 purchase currency (ex: `USD`).
    /// Required unless `payment_request.currency_code` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Purchase description shown on the payment sheet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Total cost as a decimal string. Required unless `pricing` or
    /// `payment_request.total` is provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,

    /// Show the total as a monthly recurring charge
    #[serde(default)]
    pub recurring: bool,

    /// Labels for line items built from `pricing`
    #[serde(default)]
    pub i18n: I18n,

    /// Price source; once resolved it overrides `total`
    #[serde(skip)]
    pub pricing: Option<Pricing>,

    /// Form whose values override the billing address gathered by the sheet
    #[serde(skip)]
    pub form: Option<FormRef>,

    /// Require a platform version that supports `required_shipping_contact_fields`
    #[serde(default)]
    pub enforce_version: bool,

    /// Contact attributes the customer must provide
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_shipping_contact_fields: Vec<ContactField>,

    /// Process through Braintree when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub braintree: Option<BraintreeConfig>,

    /// Native payment request to start from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_request: Option<PaymentRequest>,
}

impl ApplePayConfig {
    /// Create a config for a merchant country and currency
    pub fn new(country: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            country: Some(country.into()),
            currency: Some(currency.into()),
            ..Default::default()
        }
    }

    /// Load a config from a TOML document
    pub fn from_toml(toml_str: &str) -> ApplePayResult<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load a config from a JSON document
    pub fn from_json(json: &str) -> ApplePayResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builder: set the sheet label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Builder: set a fixed total
    pub fn with_total(mut self, total: impl Into<String>) -> Self {
        self.total = Some(total.into());
        self
    }

    /// Builder: set a price source
    pub fn with_pricing(mut self, pricing: impl Into<Pricing>) -> Self {
        self.pricing = Some(pricing.into());
        self
    }

    /// Builder: set the billing override form
    pub fn with_form(mut self, form: FormRef) -> Self {
        self.form = Some(form);
        self
    }

    /// Builder: set line item labels
    pub fn with_i18n(mut self, i18n: I18n) -> Self {
        self.i18n = i18n;
        self
    }

    /// Builder: bill monthly
    pub fn with_recurring(mut self, recurring: bool) -> Self {
        self.recurring = recurring;
        self
    }

    /// Builder: enforce the minimum platform version
    pub fn with_enforce_version(mut self, enforce: bool) -> Self {
        self.enforce_version = enforce;
        self
    }

    /// Builder: require contact fields
    pub fn with_required_shipping_contact_fields(
        mut self,
        fields: impl IntoIterator<Item = ContactField>,
    ) -> Self {
        self.required_shipping_contact_fields = fields.into_iter().collect();
        self
    }

    /// Builder: process through Braintree
    pub fn with_braintree(mut self, client_authorization: impl Into<String>) -> Self {
        self.braintree = Some(BraintreeConfig {
            client_authorization: client_authorization.into(),
        });
        self
    }

    /// Builder: start from a native payment request
    pub fn with_payment_request(mut self, request: PaymentRequest) -> Self {
        self.payment_request = Some(request);
        self
    }

    /// The fixed total, validated
    pub fn total_amount(&self) -> ApplePayResult<Option<Amount>> {
        self.total
            .as_deref()
            .map(|total| {
                Amount::parse(total).map_err(|_| {
                    ApplePayError::invalid("total", format!("'{}' is not a decimal amount", total))
                })
            })
            .transpose()
    }

    /// True when some source can supply the amount due
    pub fn has_resolvable_total(&self) -> bool {
        self.total.is_some()
            || self.pricing.is_some()
            || self
                .payment_request
                .as_ref()
                .and_then(|r| r.total.as_ref())
                .is_some()
    }

    /// Check everything that can be checked without a processor
    pub fn validate(&self) -> ApplePayResult<()> {
        self.i18n.validate()?;
        self.total_amount()?;

        if !self.has_resolvable_total() {
            return Err(ApplePayError::missing("total"));
        }

        if let Some(braintree) = &self.braintree {
            if braintree.client_authorization.trim().is_empty() {
                return Err(ApplePayError::invalid(
                    "braintree.clientAuthorization",
                    "must not be empty",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PriceQuote;

    #[test]
    fn test_i18n_defaults() {
        let i18n = I18n::default();
        assert_eq!(i18n.subtotal_line_item_label, "Subtotal");
        assert_eq!(i18n.gift_card_line_item_label, "Gift card");
        assert!(i18n.validate().is_ok());
    }

    #[test]
    fn test_i18n_partial_json_fills_defaults() {
        let i18n: I18n = serde_json::from_str(r#"{"taxLineItemLabel":"VAT"}"#).unwrap();
        assert_eq!(i18n.tax_line_item_label, "VAT");
        assert_eq!(i18n.total_line_item_label, "Total");
    }

    #[test]
    fn test_i18n_rejects_empty_label() {
        let i18n = I18n {
            discount_line_item_label: "  ".into(),
            ..Default::default()
        };
        let err = i18n.validate().unwrap_err();
        assert_eq!(
            err,
            ApplePayError::invalid("i18n.discountLineItemLabel", "label must not be empty")
        );
    }

    #[test]
    fn test_scenario_config_from_json() {
        let config = ApplePayConfig::from_json(
            r#"{
                "country": "US",
                "currency": "USD",
                "total": "19.99",
                "i18n": {
                    "subtotalLineItemLabel": "Subtotal",
                    "totalLineItemLabel": "Total",
                    "discountLineItemLabel": "Discount",
                    "taxLineItemLabel": "Tax",
                    "giftCardLineItemLabel": "Gift Card"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.country.as_deref(), Some("US"));
        assert_eq!(config.total_amount().unwrap().unwrap().as_str(), "19.99");
        assert_eq!(config.i18n.gift_card_line_item_label, "Gift Card");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let config = ApplePayConfig::from_toml(
            r#"
            country = "US"
            currency = "USD"
            label = "Acme Store"
            total = "5.00"
            recurring = true
            enforceVersion = true
            requiredShippingContactFields = ["email", "phone"]

            [braintree]
            clientAuthorization = "sandbox_abc"

            [i18n]
            taxLineItemLabel = "Sales tax"
            "#,
        )
        .unwrap();

        assert!(config.recurring);
        assert!(config.enforce_version);
        assert_eq!(
            config.required_shipping_contact_fields,
            vec![ContactField::Email, ContactField::Phone]
        );
        assert_eq!(config.braintree.unwrap().client_authorization, "sandbox_abc");
        assert_eq!(config.i18n.tax_line_item_label, "Sales tax");
    }

    #[test]
    fn test_unknown_contact_field_rejected() {
        let result = ApplePayConfig::from_json(r#"{"requiredShippingContactFields":["fax"]}"#);
        assert!(matches!(result, Err(ApplePayError::Serialization(_))));
    }

    #[test]
    fn test_missing_total_source() {
        let config = ApplePayConfig::new("US", "USD");
        assert_eq!(config.validate().unwrap_err(), ApplePayError::missing("total"));

        let priced = ApplePayConfig::new("US", "USD")
            .with_pricing(PriceQuote::new(Amount::parse("1.00").unwrap()));
        assert!(priced.validate().is_ok());
    }

    #[test]
    fn test_invalid_total() {
        let config = ApplePayConfig::new("US", "USD").with_total("nineteen");
        assert_eq!(config.validate().unwrap_err().code(), "apple-pay-config-invalid");
    }

    #[test]
    fn test_empty_braintree_authorization() {
        let config = ApplePayConfig::new("US", "USD")
            .with_total("1.00")
            .with_braintree(" ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_runtime_handles_not_serialized() {
        let config = ApplePayConfig::new("US", "USD")
            .with_total("1.00")
            .with_pricing(PriceQuote::new(Amount::parse("2.00").unwrap()));
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("pricing").is_none());
        assert!(json.get("form").is_none());
        assert_eq!(json["total"], "1.00");
    }
}
