//! Loading a preview file and rendering the payment request it produces.

use anyhow::Context;
use applepay_core::{build_payment_request, ApplePayConfig, MerchantInfo, PaymentRequest, PriceQuote};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Locations tried when no path is given
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "config/apple-pay.toml",
    "../config/apple-pay.toml",
    "../../config/apple-pay.toml",
];

/// A session config plus an optional price quote standing in for live pricing
#[derive(Debug, Deserialize)]
pub struct PreviewFile {
    #[serde(flatten)]
    pub config: ApplePayConfig,

    #[serde(default)]
    pub quote: Option<PriceQuote>,
}

impl PreviewFile {
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let mut file: PreviewFile = toml::from_str(content)?;
        if let Some(quote) = file.quote.clone() {
            file.config = file.config.with_pricing(quote);
        }
        Ok(file)
    }

    /// Validate the config and build the request the sheet would show
    pub fn payment_request(&self, merchant: Option<&MerchantInfo>) -> anyhow::Result<PaymentRequest> {
        self.config.validate()?;
        let request = build_payment_request(&self.config, self.quote.as_ref(), merchant)?;
        Ok(request)
    }
}

/// Pick the config path: the given one, else the first default location
/// that exists.
pub fn resolve_config_path(given: Option<PathBuf>) -> Option<PathBuf> {
    given.or_else(|| {
        DEFAULT_CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    })
}

pub fn load(path: &Path) -> anyhow::Result<PreviewFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    PreviewFile::from_toml(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use applepay_core::ApplePayError;

    #[test]
    fn test_preview_with_quote() {
        let file = PreviewFile::from_toml(
            r#"
country = "US"
currency = "USD"
label = "Acme Store"
total = "1.00"

[quote]
subtotal = "20.00"
total = "21.60"
taxes = "1.60"
"#,
        )
        .unwrap();

        assert!(file.config.pricing.is_some());
        let request = file.payment_request(None).unwrap();
        assert_eq!(request.total_amount().map(|a| a.as_str()), Some("21.60"));
        assert_eq!(request.line_items.len(), 2);
    }

    #[test]
    fn test_preview_total_only() {
        let file = PreviewFile::from_toml("country = \"US\"\ncurrency = \"USD\"\ntotal = \"19.99\"\n")
            .unwrap();
        let request = file.payment_request(None).unwrap();
        assert_eq!(request.total.unwrap().label, "Total");
    }

    #[test]
    fn test_preview_reports_config_errors() {
        let file = PreviewFile::from_toml("country = \"US\"\ncurrency = \"USD\"\n").unwrap();
        let err = file.payment_request(None).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ApplePayError>(),
            Some(&ApplePayError::missing("total"))
        );
    }

    #[test]
    fn test_sample_config() {
        let file = PreviewFile::from_toml(include_str!("../../../config/apple-pay.toml")).unwrap();
        let request = file.payment_request(None).unwrap();

        assert_eq!(request.total.as_ref().unwrap().label, "Lightning Store");
        let labels: Vec<_> = request.line_items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Subtotal", "Discount", "Tax"]);
        assert_eq!(request.line_items[1].amount.as_str(), "-2.00");
        assert_eq!(request.required_shipping_contact_fields.len(), 2);
    }

    #[test]
    fn test_resolve_config_path_prefers_given() {
        assert_eq!(
            resolve_config_path(Some(PathBuf::from("a.toml"))),
            Some(PathBuf::from("a.toml"))
        );
    }
}
