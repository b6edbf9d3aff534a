//! Contract intake validation and field normalisation.
//!
//! Raw input arrives as a [`ContractInput`] (every field optional, so a
//! missing field is reported as a validation error rather than a JSON
//! decoding failure) and is turned into validated [`ContractFields`] by
//! [`ContractInput::validate`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Date;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Currency used when none is supplied.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Maximum length of the client name and contract title.
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum length of free-text notes and payment terms.
pub const MAX_TEXT_LENGTH: usize = 10_000;

pub const FREQUENCY_ONE_TIME: &str = "one-time";
pub const FREQUENCY_MONTHLY: &str = "monthly";
pub const FREQUENCY_QUARTERLY: &str = "quarterly";
pub const FREQUENCY_YEARLY: &str = "yearly";

pub const VALID_FREQUENCIES: &[&str] = &[
    FREQUENCY_ONE_TIME,
    FREQUENCY_MONTHLY,
    FREQUENCY_QUARTERLY,
    FREQUENCY_YEARLY,
];

// ---------------------------------------------------------------------------
// PaymentFrequency
// ---------------------------------------------------------------------------

/// How often a contract is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentFrequency {
    #[serde(rename = "one-time")]
    OneTime,
    #[default]
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "quarterly")]
    Quarterly,
    #[serde(rename = "yearly")]
    Yearly,
}

impl PaymentFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneTime => FREQUENCY_ONE_TIME,
            Self::Monthly => FREQUENCY_MONTHLY,
            Self::Quarterly => FREQUENCY_QUARTERLY,
            Self::Yearly => FREQUENCY_YEARLY,
        }
    }

    /// Parse from the database / wire name. Case-insensitive; `one_time`
    /// and `onetime` are accepted as aliases of `one-time`.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name.trim().to_ascii_lowercase().as_str() {
            FREQUENCY_ONE_TIME | "one_time" | "onetime" => Ok(Self::OneTime),
            FREQUENCY_MONTHLY => Ok(Self::Monthly),
            FREQUENCY_QUARTERLY => Ok(Self::Quarterly),
            FREQUENCY_YEARLY => Ok(Self::Yearly),
            other => Err(CoreError::Validation(format!(
                "Invalid payment frequency '{other}'. Must be one of: {VALID_FREQUENCIES:?}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A rate as submitted by a client: either a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RateValue {
    Number(f64),
    Text(String),
}

impl RateValue {
    fn to_f64(&self) -> Result<f64, CoreError> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                CoreError::Validation(format!("Rate '{s}' is not a number"))
            })?,
        };
        if !value.is_finite() || value < 0.0 {
            return Err(CoreError::Validation(format!(
                "Rate must be a non-negative number, got {value}"
            )));
        }
        Ok(value)
    }
}

/// Unvalidated contract fields from a create/update request or from the
/// extraction service.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContractInput {
    pub client_name: Option<String>,
    pub contract_title: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub renewal_date: Option<String>,
    pub rate: Option<RateValue>,
    pub rate_currency: Option<String>,
    pub payment_terms: Option<String>,
    pub payment_frequency: Option<String>,
    pub notes: Option<String>,
}

/// Validated contract fields ready to persist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractFields {
    pub client_name: String,
    pub contract_title: Option<String>,
    pub start_date: Date,
    pub end_date: Date,
    pub renewal_date: Option<Date>,
    pub rate: f64,
    pub rate_currency: String,
    pub payment_terms: Option<String>,
    pub payment_frequency: PaymentFrequency,
    pub notes: Option<String>,
}

impl ContractInput {
    /// Layer `patch` on top of `self`: every field present in `patch` wins.
    pub fn overlay(self, patch: ContractInput) -> ContractInput {
        ContractInput {
            client_name: patch.client_name.or(self.client_name),
            contract_title: patch.contract_title.or(self.contract_title),
            start_date: patch.start_date.or(self.start_date),
            end_date: patch.end_date.or(self.end_date),
            renewal_date: patch.renewal_date.or(self.renewal_date),
            rate: patch.rate.or(self.rate),
            rate_currency: patch.rate_currency.or(self.rate_currency),
            payment_terms: patch.payment_terms.or(self.payment_terms),
            payment_frequency: patch.payment_frequency.or(self.payment_frequency),
            notes: patch.notes.or(self.notes),
        }
    }

    /// Check required fields and normalise everything else.
    ///
    /// Required: `client_name`, `start_date`, `end_date`, `rate`. All missing
    /// required fields are reported together.
    pub fn validate(self) -> Result<ContractFields, CoreError> {
        let client_name = clean_text(self.client_name);

        let mut missing = Vec::new();
        if client_name.is_none() {
            missing.push("client_name");
        }
        if blank(&self.start_date) {
            missing.push("start_date");
        }
        if blank(&self.end_date) {
            missing.push("end_date");
        }
        if self.rate.is_none() {
            missing.push("rate");
        }
        if !missing.is_empty() {
            return Err(CoreError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let client_name = client_name.unwrap_or_default();
        validate_length("client_name", &client_name, MAX_NAME_LENGTH)?;

        let contract_title = clean_text(self.contract_title);
        if let Some(title) = &contract_title {
            validate_length("contract_title", title, MAX_NAME_LENGTH)?;
        }

        let start_date = parse_date("start_date", self.start_date.as_deref().unwrap_or(""))?;
        let end_date = parse_date("end_date", self.end_date.as_deref().unwrap_or(""))?;
        if end_date < start_date {
            return Err(CoreError::Validation(format!(
                "end_date ({end_date}) must not be before start_date ({start_date})"
            )));
        }

        let renewal_date = match clean_text(self.renewal_date) {
            Some(raw) => Some(parse_date("renewal_date", &raw)?),
            None => None,
        };

        let rate = match &self.rate {
            Some(rate) => rate.to_f64()?,
            None => 0.0,
        };

        let rate_currency = normalize_currency(self.rate_currency.as_deref())?;

        let payment_frequency = match clean_text(self.payment_frequency) {
            Some(raw) => PaymentFrequency::from_name(&raw)?,
            None => PaymentFrequency::default(),
        };

        let payment_terms = clean_text(self.payment_terms);
        if let Some(terms) = &payment_terms {
            validate_length("payment_terms", terms, MAX_TEXT_LENGTH)?;
        }
        let notes = clean_text(self.notes);
        if let Some(n) = &notes {
            validate_length("notes", n, MAX_TEXT_LENGTH)?;
        }

        Ok(ContractFields {
            client_name,
            contract_title,
            start_date,
            end_date,
            renewal_date,
            rate,
            rate_currency,
            payment_terms,
            payment_frequency,
            notes,
        })
    }
}

impl From<&ContractFields> for ContractInput {
    fn from(fields: &ContractFields) -> Self {
        ContractInput {
            client_name: Some(fields.client_name.clone()),
            contract_title: fields.contract_title.clone(),
            start_date: Some(fields.start_date.to_string()),
            end_date: Some(fields.end_date.to_string()),
            renewal_date: fields.renewal_date.map(|d| d.to_string()),
            rate: Some(RateValue::Number(fields.rate)),
            rate_currency: Some(fields.rate_currency.clone()),
            payment_terms: fields.payment_terms.clone(),
            payment_frequency: Some(fields.payment_frequency.as_str().to_string()),
            notes: fields.notes.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// Trim a free-text field; blank becomes `None`.
pub fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

fn validate_length(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {max} characters"
        )));
    }
    Ok(())
}

/// Parse a calendar date. Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp,
/// in which case only the date part is kept.
pub fn parse_date(field: &str, raw: &str) -> Result<Date, CoreError> {
    let raw = raw.trim();
    if let Ok(date) = Date::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.date_naive());
    }
    Err(CoreError::Validation(format!(
        "{field} '{raw}' is not a valid date (expected YYYY-MM-DD)"
    )))
}

/// Upper-case a three-letter currency code, defaulting to [`DEFAULT_CURRENCY`].
pub fn normalize_currency(raw: Option<&str>) -> Result<String, CoreError> {
    let code = raw.map(str::trim).filter(|s| !s.is_empty());
    match code {
        None => Ok(DEFAULT_CURRENCY.to_string()),
        Some(code) if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) => {
            Ok(code.to_ascii_uppercase())
        }
        Some(code) => Err(CoreError::Validation(format!(
            "Invalid currency code '{code}'. Expected a 3-letter ISO 4217 code"
        ))),
    }
}
