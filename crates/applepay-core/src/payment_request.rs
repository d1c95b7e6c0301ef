//! # Native Payment Request
//!
//! Serde model of the platform payment-request descriptor that is handed to
//! the Apple Pay sheet. Field names follow the platform's camelCase names so
//! the value can be passed through JSON unchanged.

use crate::error::ApplePayError;
use crate::pricing::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Contact attributes the sheet can require from the customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContactField {
    PostalAddress,
    Name,
    PhoneticName,
    Phone,
    Email,
}

impl ContactField {
    /// Every accepted field, in declaration order
    pub const ALL: [ContactField; 5] = [
        ContactField::PostalAddress,
        ContactField::Name,
        ContactField::PhoneticName,
        ContactField::Phone,
        ContactField::Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactField::PostalAddress => "postalAddress",
            ContactField::Name => "name",
            ContactField::PhoneticName => "phoneticName",
            ContactField::Phone => "phone",
            ContactField::Email => "email",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactField {
    type Err = ApplePayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContactField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| {
                ApplePayError::invalid(
                    "requiredShippingContactFields",
                    format!("unknown contact field '{}'", s),
                )
            })
    }
}

/// Payment processing capabilities of the merchant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MerchantCapability {
    #[serde(rename = "supports3DS")]
    Supports3DS,
    #[serde(rename = "supportsEMV")]
    SupportsEMV,
    #[serde(rename = "supportsCredit")]
    SupportsCredit,
    #[serde(rename = "supportsDebit")]
    SupportsDebit,
}

/// Whether a line item amount is final or an estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineItemType {
    Final,
    Pending,
}

/// When a line item is charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentTiming {
    Immediate,
    Recurring,
    Deferred,
    Automatic,
}

/// Calendar unit for recurring line items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Year,
    Month,
    Day,
    Hour,
    Minute,
}

/// A line on the payment sheet (including the total)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Short, localized description
    pub label: String,

    /// Amount as a decimal string
    pub amount: Amount,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<LineItemType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_timing: Option<PaymentTiming>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_payment_interval_unit: Option<IntervalUnit>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_payment_interval_count: Option<u32>,
}

impl LineItem {
    pub fn new(label: impl Into<String>, amount: Amount) -> Self {
        Self {
            label: label.into(),
            amount,
            kind: None,
            payment_timing: None,
            recurring_payment_interval_unit: None,
            recurring_payment_interval_count: None,
        }
    }

    /// Builder: mark the amount as an estimate
    pub fn pending(mut self) -> Self {
        self.kind = Some(LineItemType::Pending);
        self
    }

    /// Builder: bill this line every month
    pub fn monthly(mut self) -> Self {
        self.payment_timing = Some(PaymentTiming::Recurring);
        self.recurring_payment_interval_unit = Some(IntervalUnit::Month);
        self
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self.payment_timing, Some(PaymentTiming::Recurring))
    }
}

/// A delivery option offered on the sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingMethod {
    pub label: String,
    #[serde(default)]
    pub detail: String,
    pub amount: Amount,
    pub identifier: String,
}

/// Description of a recurring payment shown on the sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringPaymentRequest {
    pub payment_description: String,
    pub regular_billing: LineItem,
    pub management_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_agreement: Option<String>,
}

/// The payment request presented by the native sheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Merchant's ISO 3166 country code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,

    /// ISO 4217 currency code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merchant_capabilities: Vec<MerchantCapability>,

    /// Card networks, e.g. `visa`, `masterCard`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_networks: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<LineItem>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<LineItem>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_billing_contact_fields: Vec<ContactField>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_shipping_contact_fields: Vec<ContactField>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shipping_methods: Vec<ShippingMethod>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_payment_request: Option<RecurringPaymentRequest>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_data: Option<String>,
}

impl PaymentRequest {
    /// Amount the sheet will charge, if a total is set
    pub fn total_amount(&self) -> Option<&Amount> {
        self.total.as_ref().map(|item| &item.amount)
    }
}

/// Sheet update sent after the customer changes contact or shipping method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequestUpdate {
    pub new_total: LineItem,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new_line_items: Vec<LineItem>,
}

impl PaymentRequestUpdate {
    /// Update that re-states the totals of an existing request
    pub fn from_request(request: &PaymentRequest) -> Option<Self> {
        request.total.clone().map(|new_total| Self {
            new_total,
            new_line_items: request.line_items.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_contact_field_names() {
        let names: Vec<_> = ContactField::ALL.iter().map(|f| f.as_str()).collect();
        assert_eq!(
            names,
            ["postalAddress", "name", "phoneticName", "phone", "email"]
        );
        for field in ContactField::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.as_str()));
            assert_eq!(field.as_str().parse::<ContactField>().unwrap(), field);
        }
    }

    #[test]
    fn test_contact_field_rejects_unknown() {
        assert!(serde_json::from_str::<ContactField>("\"address\"").is_err());
        assert!(serde_json::from_str::<ContactField>("\"PostalAddress\"").is_err());
        assert!("fax".parse::<ContactField>().is_err());
    }

    #[test]
    fn test_native_request_parse() {
        let request: PaymentRequest = serde_json::from_value(json!({
            "countryCode": "US",
            "currencyCode": "USD",
            "merchantCapabilities": ["supports3DS", "supportsCredit"],
            "supportedNetworks": ["visa"],
            "total": { "label": "Acme", "amount": "12.00", "type": "final" },
            "requiredShippingContactFields": ["email"]
        }))
        .unwrap();

        assert_eq!(request.country_code.as_deref(), Some("US"));
        assert_eq!(
            request.merchant_capabilities,
            vec![MerchantCapability::Supports3DS, MerchantCapability::SupportsCredit]
        );
        assert_eq!(request.total_amount().unwrap().as_str(), "12.00");
        assert_eq!(request.total.unwrap().kind, Some(LineItemType::Final));
    }

    #[test]
    fn test_recurring_line_item_serialization() {
        let item = LineItem::new("Plan", Amount::parse("9.00").unwrap()).monthly();
        assert!(item.is_recurring());
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({
                "label": "Plan",
                "amount": "9.00",
                "paymentTiming": "recurring",
                "recurringPaymentIntervalUnit": "month"
            })
        );
    }

    #[test]
    fn test_update_from_request() {
        let request = PaymentRequest {
            total: Some(LineItem::new("Acme", Amount::parse("3.00").unwrap())),
            line_items: vec![LineItem::new("Subtotal", Amount::parse("3.00").unwrap())],
            ..Default::default()
        };
        let update = PaymentRequestUpdate::from_request(&request).unwrap();
        assert_eq!(update.new_total.label, "Acme");
        assert_eq!(update.new_line_items.len(), 1);

        assert!(PaymentRequestUpdate::from_request(&PaymentRequest::default()).is_none());
    }
}
