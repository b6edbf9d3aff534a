//! Document upload acceptance and normalisation of extraction results.
//!
//! The extraction service returns loosely-typed JSON. Missing or null
//! values never fail the extraction: they default to empty/zero and the
//! usual contract validation decides whether the result is usable.

use serde::Deserialize;
use serde_json::Value;

use crate::contract::{
    clean_text, parse_date, ContractInput, PaymentFrequency, RateValue, DEFAULT_CURRENCY,
};

/// Maximum accepted upload size (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

// ---------------------------------------------------------------------------
// DocumentKind
// ---------------------------------------------------------------------------

/// Document formats the extraction service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Detect the kind from a MIME type or, failing that, the file extension.
    pub fn detect(content_type: Option<&str>, file_name: &str) -> Option<Self> {
        let lower = file_name.to_ascii_lowercase();
        match content_type {
            Some(MIME_PDF) => Some(Self::Pdf),
            Some(MIME_DOCX) => Some(Self::Docx),
            _ if lower.ends_with(".pdf") => Some(Self::Pdf),
            _ if lower.ends_with(".docx") => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => MIME_PDF,
            Self::Docx => MIME_DOCX,
        }
    }
}

// ---------------------------------------------------------------------------
// ExtractedContract
// ---------------------------------------------------------------------------

/// Raw fields as returned by the extraction service.
///
/// Every field is a bare JSON value so that wrong types (a numeric client
/// name, a string rate) degrade to defaults instead of failing to decode.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractedContract {
    #[serde(default)]
    pub client_name: Value,
    #[serde(default)]
    pub contract_title: Value,
    #[serde(default)]
    pub start_date: Value,
    #[serde(default)]
    pub end_date: Value,
    #[serde(default)]
    pub renewal_date: Value,
    #[serde(default)]
    pub rate: Value,
    #[serde(default)]
    pub rate_currency: Value,
    #[serde(default)]
    pub payment_terms: Value,
    #[serde(default)]
    pub payment_frequency: Value,
    #[serde(default)]
    pub notes: Value,
}

impl ExtractedContract {
    /// Normalise into a [`ContractInput`].
    ///
    /// - text fields: non-strings and blanks become `None`
    /// - dates: unparseable values are dropped
    /// - rate: numbers and numeric strings are kept, anything else is `0`
    /// - currency: defaults to `USD`
    /// - frequency: unknown values become `monthly`
    pub fn into_input(self) -> ContractInput {
        ContractInput {
            client_name: text(self.client_name),
            contract_title: text(self.contract_title),
            start_date: date(self.start_date, "start_date"),
            end_date: date(self.end_date, "end_date"),
            renewal_date: date(self.renewal_date, "renewal_date"),
            rate: Some(RateValue::Number(rate(&self.rate))),
            rate_currency: Some(text(self.rate_currency).unwrap_or_else(|| DEFAULT_CURRENCY.into())),
            payment_terms: text(self.payment_terms),
            payment_frequency: Some(
                text(self.payment_frequency)
                    .and_then(|raw| PaymentFrequency::from_name(&raw).ok())
                    .unwrap_or_default()
                    .as_str()
                    .to_string(),
            ),
            notes: text(self.notes),
        }
    }
}

fn text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => clean_text(Some(s)),
        _ => None,
    }
}

fn date(value: Value, field: &str) -> Option<String> {
    text(value)
        .and_then(|raw| parse_date(field, &raw).ok())
        .map(|d| d.to_string())
}

fn rate(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_start_matches('$').replace(',', "").parse().ok(),
        _ => None,
    };
    parsed.filter(|r| r.is_finite() && *r >= 0.0).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extracted(value: Value) -> ExtractedContract {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn complete_result_is_kept() {
        let input = extracted(json!({
            "client_name": "Globex",
            "contract_title": "Consulting",
            "start_date": "2026-01-01",
            "end_date": "2026-06-30",
            "rate": 95.0,
            "rate_currency": "EUR",
            "payment_frequency": "quarterly",
            "notes": "Auto-renews"
        }))
        .into_input();

        let fields = input.validate().unwrap();
        assert_eq!(fields.client_name, "Globex");
        assert_eq!(fields.rate, 95.0);
        assert_eq!(fields.rate_currency, "EUR");
        assert_eq!(fields.payment_frequency, PaymentFrequency::Quarterly);
    }

    #[test]
    fn nulls_and_missing_fields_default() {
        let input = extracted(json!({
            "client_name": "Initech",
            "start_date": "2026-01-01",
            "end_date": "2026-02-01",
            "rate": null,
            "payment_frequency": "sometimes"
        }))
        .into_input();

        assert_eq!(input.rate, Some(RateValue::Number(0.0)));
        assert_eq!(input.rate_currency.as_deref(), Some("USD"));
        assert_eq!(input.payment_frequency.as_deref(), Some("monthly"));
        assert_eq!(input.notes, None);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn string_rates_are_parsed() {
        assert_eq!(rate(&json!("$1,250.00")), 1250.0);
        assert_eq!(rate(&json!("n/a")), 0.0);
        assert_eq!(rate(&json!(-5)), 0.0);
    }

    #[test]
    fn bad_dates_are_dropped_and_fail_validation_later() {
        let input = extracted(json!({
            "client_name": "Umbrella",
            "start_date": "sometime in spring",
            "end_date": "2026-09-01"
        }))
        .into_input();
        assert_eq!(input.start_date, None);
        assert!(input.validate().is_err());
    }

    #[test]
    fn empty_object_decodes() {
        let input = extracted(json!({})).into_input();
        assert_eq!(input.client_name, None);
    }

    #[test]
    fn detect_document_kind() {
        assert_eq!(
            DocumentKind::detect(Some(MIME_PDF), "scan"),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::detect(Some("application/octet-stream"), "Contract.DOCX"),
            Some(DocumentKind::Docx)
        );
        assert_eq!(DocumentKind::detect(None, "contract.txt"), None);
    }
}
