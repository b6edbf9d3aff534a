//! Contract entity model and DTOs.

use dealping_core::contract::{ContractFields, ContractInput, RateValue};
use dealping_core::lifecycle::{effective_status, ContractStatus};
use dealping_core::types::{Date, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `contracts` table.
///
/// `status` is only a snapshot; use [`Contract::current_status`] (or
/// [`Contract::with_current_status`]) before exposing it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contract {
    pub id: DbId,
    pub user_id: DbId,
    pub client_name: String,
    pub contract_title: Option<String>,
    pub start_date: Date,
    pub end_date: Date,
    pub renewal_date: Option<Date>,
    pub rate: f64,
    pub rate_currency: String,
    pub payment_terms: Option<String>,
    pub payment_frequency: String,
    pub status: String,
    pub renewed_at: Option<Timestamp>,
    #[serde(skip_serializing)]
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub extracted_data: Option<serde_json::Value>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Contract {
    /// Status derived from the end date as of `today`.
    pub fn current_status(&self, today: Date) -> ContractStatus {
        effective_status(self.end_date, self.renewed_at.is_some(), today)
    }

    /// Whether the stored snapshot disagrees with the derived status.
    pub fn status_is_stale(&self, today: Date) -> bool {
        self.status != self.current_status(today).as_str()
    }

    /// Replace the stored snapshot with the derived status.
    pub fn with_current_status(mut self, today: Date) -> Self {
        self.status = self.current_status(today).as_str().to_string();
        self
    }

    /// The row's editable fields as unvalidated input, for merging updates.
    pub fn to_input(&self) -> ContractInput {
        ContractInput {
            client_name: Some(self.client_name.clone()),
            contract_title: self.contract_title.clone(),
            start_date: Some(self.start_date.to_string()),
            end_date: Some(self.end_date.to_string()),
            renewal_date: self.renewal_date.map(|d| d.to_string()),
            rate: Some(RateValue::Number(self.rate)),
            rate_currency: Some(self.rate_currency.clone()),
            payment_terms: self.payment_terms.clone(),
            payment_frequency: Some(self.payment_frequency.clone()),
            notes: self.notes.clone(),
        }
    }
}

/// A stored upload attached to a contract at creation time.
#[derive(Debug, Clone)]
pub struct ContractAttachment {
    /// Storage path of the uploaded document.
    pub file_path: String,
    /// Original file name as uploaded.
    pub file_name: String,
    /// Raw extraction-service response.
    pub extracted_data: serde_json::Value,
}

/// Everything needed to insert a contract row.
#[derive(Debug, Clone)]
pub struct NewContract<'a> {
    pub user_id: DbId,
    pub fields: &'a ContractFields,
    pub status: ContractStatus,
    pub attachment: Option<&'a ContractAttachment>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Utc};

    fn row(end_date: Date) -> Contract {
        let now = Utc::now();
        Contract {
            id: 1,
            user_id: 1,
            client_name: "Acme".into(),
            contract_title: None,
            start_date: end_date - Duration::days(365),
            end_date,
            renewal_date: None,
            rate: 100.0,
            rate_currency: "USD".into(),
            payment_terms: None,
            payment_frequency: "monthly".into(),
            status: "active".into(),
            renewed_at: None,
            file_path: None,
            file_name: None,
            extracted_data: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn stale_snapshot_is_detected_and_replaced() {
        let today = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let contract = row(today - Duration::days(2));
        assert!(contract.status_is_stale(today));

        let refreshed = contract.with_current_status(today);
        assert_eq!(refreshed.status, "expired");
        assert!(!refreshed.status_is_stale(today));
    }

    #[test]
    fn renewed_contract_reports_renewed() {
        let today = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let mut contract = row(today - Duration::days(2));
        contract.renewed_at = Some(Utc::now());
        assert_eq!(contract.current_status(today), ContractStatus::Renewed);
    }

    #[test]
    fn to_input_round_trips_through_validation() {
        let contract = row(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
        let fields = contract.to_input().validate().unwrap();
        assert_eq!(fields.end_date, contract.end_date);
        assert_eq!(fields.rate, contract.rate);
    }
}
