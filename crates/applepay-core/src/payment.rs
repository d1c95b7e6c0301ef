//! # Payment Types
//!
//! Values produced while a payment sheet is open: contacts chosen by the
//! customer, the authorized payment, and the token a processor exchanges it
//! for. Also the merchant data a processor returns during setup.

use crate::form::FormRef;
use crate::payment_request::MerchantCapability;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Contact details selected on the payment sheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentContact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic_given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic_family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address_lines: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administrative_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

/// Card that funded the payment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub network: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Encrypted payment token produced by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentToken {
    /// Opaque encrypted payload, forwarded as-is to the processor
    pub payment_data: serde_json::Value,
    pub payment_method: PaymentMethod,
    pub transaction_identifier: String,
}

/// An authorized payment, as delivered by the sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplePayPayment {
    pub token: PaymentToken,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_contact: Option<PaymentContact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_contact: Option<PaymentContact>,
}

/// Billing fields sent with a token request, keyed by token field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillingAddress(BTreeMap<String, String>);

impl BillingAddress {
    /// Billing fields taken from a sheet contact
    pub fn from_contact(contact: &PaymentContact) -> Self {
        let mut fields = BTreeMap::new();
        let mut put = |key: &str, value: Option<&String>| {
            if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
                fields.insert(key.to_string(), v.clone());
            }
        };

        put("first_name", contact.given_name.as_ref());
        put("last_name", contact.family_name.as_ref());
        put("address1", contact.address_lines.first());
        put("address2", contact.address_lines.get(1));
        put("city", contact.locality.as_ref());
        put("state", contact.administrative_area.as_ref());
        put("postal_code", contact.postal_code.as_ref());
        put("country", contact.country_code.as_ref());
        put("phone", contact.phone_number.as_ref());

        Self(fields)
    }

    /// Replace fields with every non-blank value present on the form
    pub fn apply_form(&mut self, form: &FormRef) {
        for (field, value) in form.filled_fields() {
            self.0.insert(field.to_string(), value);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Single-use token issued by the processor for an authorized payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    #[serde(rename = "type", default = "default_token_type")]
    pub kind: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_token_type() -> String {
    "apple_pay".to_string()
}

impl Token {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: default_token_type(),
            created_at: Utc::now(),
        }
    }
}

/// Opaque merchant session returned by merchant validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerchantSession(pub serde_json::Value);

/// What the merchant account is enabled for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantInfo {
    /// Enabled merchant countries; empty means unrestricted
    #[serde(default)]
    pub countries: Vec<String>,

    /// Enabled currencies; empty means unrestricted
    #[serde(default)]
    pub currencies: Vec<String>,

    #[serde(default)]
    pub merchant_capabilities: Vec<MerchantCapability>,

    #[serde(default)]
    pub supported_networks: Vec<String>,

    /// Name shown during merchant validation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl MerchantInfo {
    pub fn supports_country(&self, country: &str) -> bool {
        self.countries.is_empty() || self.countries.iter().any(|c| c.eq_ignore_ascii_case(country))
    }

    pub fn supports_currency(&self, currency: &str) -> bool {
        self.currencies.is_empty()
            || self.currencies.iter().any(|c| c.eq_ignore_ascii_case(currency))
    }
}
