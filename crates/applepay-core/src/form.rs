//! # Billing Form
//!
//! A caller-owned form whose field values override the billing address
//! gathered by the payment sheet.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Field names read from a billing form, in token-request naming
pub const BILLING_FIELDS: &[&str] = &[
    "first_name",
    "last_name",
    "address1",
    "address2",
    "city",
    "state",
    "postal_code",
    "country",
    "phone",
    "vat_number",
    "tax_identifier",
    "tax_identifier_type",
];

/// Source of billing field values (an HTML form, a map, a UI model)
pub trait BillingForm: Send + Sync {
    /// Current value of a field, if the form has one
    fn value(&self, field: &str) -> Option<String>;
}

impl BillingForm for HashMap<String, String> {
    fn value(&self, field: &str) -> Option<String> {
        self.get(field).cloned()
    }
}

/// Shared reference to a billing form held by a session config
#[derive(Clone)]
pub struct FormRef(Arc<dyn BillingForm>);

impl FormRef {
    pub fn new(form: impl BillingForm + 'static) -> Self {
        Self(Arc::new(form))
    }

    /// Known billing fields that currently hold a non-blank value
    pub fn filled_fields(&self) -> Vec<(&'static str, String)> {
        BILLING_FIELDS
            .iter()
            .filter_map(|&field| {
                self.0
                    .value(field)
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .map(|v| (field, v))
            })
            .collect()
    }
}

impl From<Arc<dyn BillingForm>> for FormRef {
    fn from(form: Arc<dyn BillingForm>) -> Self {
        Self(form)
    }
}

impl fmt::Debug for FormRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FormRef(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_fields_skip_blank_and_unknown() {
        let mut values = HashMap::new();
        values.insert("first_name".to_string(), " Ada ".to_string());
        values.insert("last_name".to_string(), "   ".to_string());
        values.insert("favorite_color".to_string(), "green".to_string());
        values.insert("postal_code".to_string(), "94105".to_string());

        let form = FormRef::new(values);
        assert_eq!(
            form.filled_fields(),
            vec![
                ("first_name", "Ada".to_string()),
                ("postal_code", "94105".to_string())
            ]
        );
    }
}
