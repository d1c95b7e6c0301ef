//! # Payment Request Builder
//!
//! Turns an [`ApplePayConfig`] (plus the current price quote and the
//! merchant's enabled features) into the native [`PaymentRequest`] shown on
//! the payment sheet.

use crate::config::{ApplePayConfig, I18n};
use crate::error::{ApplePayError, ApplePayResult};
use crate::payment::MerchantInfo;
use crate::payment_request::{ContactField, LineItem, MerchantCapability, PaymentRequest};
use crate::pricing::{Amount, PriceQuote};

/// Card networks offered when neither the request nor the merchant names any
pub const DEFAULT_SUPPORTED_NETWORKS: &[&str] = &["amex", "discover", "masterCard", "visa"];

/// First platform API version that accepts `requiredShippingContactFields`
/// as a list of field names
pub const MIN_SHIPPING_CONTACT_FIELDS_VERSION: u32 = 3;

/// Build the payment request for a session.
///
/// Precedence for the amount due: `quote` > `config.total` >
/// `config.payment_request.total`.
pub fn build_payment_request(
    config: &ApplePayConfig,
    quote: Option<&PriceQuote>,
    merchant: Option<&MerchantInfo>,
) -> ApplePayResult<PaymentRequest> {
    config.i18n.validate()?;
    let base = config.payment_request.clone().unwrap_or_default();

    let country = config
        .country
        .clone()
        .or_else(|| base.country_code.clone())
        .ok_or_else(|| ApplePayError::missing("country"))?;
    let currency = config
        .currency
        .clone()
        .or_else(|| base.currency_code.clone())
        .ok_or_else(|| ApplePayError::missing("currency"))?;

    if let Some(info) = merchant {
        if !info.supports_country(&country) {
            return Err(ApplePayError::invalid(
                "country",
                format!("{} is not enabled for Apple Pay", country),
            ));
        }
        if !info.supports_currency(&currency) {
            return Err(ApplePayError::invalid(
                "currency",
                format!("{} is not enabled for Apple Pay", currency),
            ));
        }
    }

    let amount = match quote {
        Some(quote) => quote.total.clone(),
        None => match config.total_amount()? {
            Some(amount) => amount,
            None => base
                .total
                .as_ref()
                .map(|total| total.amount.clone())
                .ok_or_else(|| ApplePayError::missing("total"))?,
        },
    };

    let present = |label: &String| !label.trim().is_empty();
    let label = config
        .label
        .clone()
        .filter(present)
        .or_else(|| {
            base.total
                .as_ref()
                .map(|total| total.label.clone())
                .filter(present)
        })
        .unwrap_or_else(|| config.i18n.total_line_item_label.clone());

    let mut total = match base.total.clone() {
        Some(mut total) => {
            total.label = label;
            total.amount = amount;
            total
        }
        None => LineItem::new(label, amount),
    };
    if config.recurring {
        total = total.monthly();
    }

    let line_items = match quote {
        Some(quote) => pricing_line_items(quote, &config.i18n),
        None => base.line_items.clone(),
    };

    let required_shipping_contact_fields = if config.required_shipping_contact_fields.is_empty() {
        base.required_shipping_contact_fields.clone()
    } else {
        config.required_shipping_contact_fields.clone()
    };

    let required_billing_contact_fields = if base.required_billing_contact_fields.is_empty() {
        vec![ContactField::PostalAddress]
    } else {
        base.required_billing_contact_fields.clone()
    };

    let merchant_capabilities = if !base.merchant_capabilities.is_empty() {
        base.merchant_capabilities.clone()
    } else {
        match merchant {
            Some(info) if !info.merchant_capabilities.is_empty() => {
                info.merchant_capabilities.clone()
            }
            _ => vec![MerchantCapability::Supports3DS],
        }
    };

    let supported_networks = if !base.supported_networks.is_empty() {
        base.supported_networks.clone()
    } else {
        match merchant {
            Some(info) if !info.supported_networks.is_empty() => info.supported_networks.clone(),
            _ => DEFAULT_SUPPORTED_NETWORKS.iter().map(|n| n.to_string()).collect(),
        }
    };

    Ok(PaymentRequest {
        country_code: Some(country),
        currency_code: Some(currency),
        merchant_capabilities,
        supported_networks,
        total: Some(total),
        line_items,
        required_billing_contact_fields,
        required_shipping_contact_fields,
        shipping_methods: base.shipping_methods,
        recurring_payment_request: base.recurring_payment_request,
        application_data: base.application_data,
    })
}

/// Line items for a quote: subtotal, then discount, tax and gift card when
/// they are non-zero. Credits are shown as negative amounts.
pub fn pricing_line_items(quote: &PriceQuote, i18n: &I18n) -> Vec<LineItem> {
    let credit = |amount: &Amount| {
        if amount.is_negative() {
            amount.clone()
        } else {
            amount.negated()
        }
    };

    let mut items = vec![LineItem::new(
        i18n.subtotal_line_item_label.clone(),
        quote.subtotal.clone(),
    )];

    if !quote.discount.is_zero() {
        items.push(LineItem::new(
            i18n.discount_line_item_label.clone(),
            credit(&quote.discount),
        ));
    }
    if !quote.taxes.is_zero() {
        items.push(LineItem::new(
            i18n.tax_line_item_label.clone(),
            quote.taxes.clone(),
        ));
    }
    if !quote.gift_card.is_zero() {
        items.push(LineItem::new(
            i18n.gift_card_line_item_label.clone(),
            credit(&quote.gift_card),
        ));
    }

    items
}
