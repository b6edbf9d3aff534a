//! Contract lifecycle status.
//!
//! Status is always derived from a contract's end date and the current
//! date. The stored `status` column on `contracts` is a snapshot for
//! filtering only and is recomputed on every read and write.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Date, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// A contract ending within this many days (inclusive) is "ending soon".
pub const ENDING_SOON_WINDOW_DAYS: i64 = 30;

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_ENDING_SOON: &str = "ending_soon";
pub const STATUS_EXPIRED: &str = "expired";
pub const STATUS_RENEWED: &str = "renewed";

// ---------------------------------------------------------------------------
// ContractStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a contract.
///
/// `Renewed` is terminal and only reachable through an explicit renew
/// action; [`classify_status`] never returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Active,
    EndingSoon,
    Expired,
    Renewed,
}

impl ContractStatus {
    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => STATUS_ACTIVE,
            Self::EndingSoon => STATUS_ENDING_SOON,
            Self::Expired => STATUS_EXPIRED,
            Self::Renewed => STATUS_RENEWED,
        }
    }

    /// Parse from the database `status` column.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            STATUS_ACTIVE => Ok(Self::Active),
            STATUS_ENDING_SOON => Ok(Self::EndingSoon),
            STATUS_EXPIRED => Ok(Self::Expired),
            STATUS_RENEWED => Ok(Self::Renewed),
            other => Err(CoreError::Validation(format!(
                "Unknown contract status '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Signed number of whole days from `today` until `end_date`.
///
/// Negative once the end date has passed.
pub fn days_until(end_date: Date, today: Date) -> i64 {
    (end_date - today).num_days()
}

/// Truncate a UTC timestamp to its calendar date.
pub fn today_from(now: Timestamp) -> Date {
    now.date_naive()
}

/// Classify a contract from its end date.
///
/// - end date before today: `Expired`
/// - 0..=30 days left: `EndingSoon` (ending today is still ending soon)
/// - otherwise: `Active`
pub fn classify_status(end_date: Date, today: Date) -> ContractStatus {
    if end_date < today {
        return ContractStatus::Expired;
    }
    if days_until(end_date, today) <= ENDING_SOON_WINDOW_DAYS {
        ContractStatus::EndingSoon
    } else {
        ContractStatus::Active
    }
}

/// Status shown for a stored contract: `Renewed` once the contract has been
/// explicitly renewed, otherwise whatever the end date says.
pub fn effective_status(end_date: Date, renewed: bool, today: Date) -> ContractStatus {
    if renewed {
        ContractStatus::Renewed
    } else {
        classify_status(end_date, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn today() -> Date {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn ending_today_is_ending_soon_not_expired() {
        assert_eq!(classify_status(today(), today()), ContractStatus::EndingSoon);
    }

    #[test]
    fn yesterday_is_expired() {
        let end = today() - Duration::days(1);
        assert_eq!(classify_status(end, today()), ContractStatus::Expired);
    }

    #[test]
    fn thirty_days_out_is_ending_soon() {
        let end = today() + Duration::days(30);
        assert_eq!(classify_status(end, today()), ContractStatus::EndingSoon);
    }

    #[test]
    fn thirty_one_days_out_is_active() {
        let end = today() + Duration::days(31);
        assert_eq!(classify_status(end, today()), ContractStatus::Active);
    }

    #[test]
    fn far_past_is_expired() {
        let end = today() - Duration::days(400);
        assert_eq!(classify_status(end, today()), ContractStatus::Expired);
    }

    #[test]
    fn renewed_overrides_dates() {
        let end = today() - Duration::days(3);
        assert_eq!(
            effective_status(end, true, today()),
            ContractStatus::Renewed
        );
        assert_eq!(
            effective_status(end, false, today()),
            ContractStatus::Expired
        );
    }

    #[test]
    fn days_until_is_signed() {
        assert_eq!(days_until(today() + Duration::days(5), today()), 5);
        assert_eq!(days_until(today() - Duration::days(5), today()), -5);
        assert_eq!(days_until(today(), today()), 0);
    }

    #[test]
    fn today_from_ignores_time_of_day() {
        let late = Utc.with_ymd_and_hms(2026, 3, 14, 23, 59, 59).unwrap();
        let early = Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 1).unwrap();
        assert_eq!(today_from(late), today());
        assert_eq!(today_from(early), today());
    }

    #[test]
    fn status_names_round_trip() {
        for status in [
            ContractStatus::Active,
            ContractStatus::EndingSoon,
            ContractStatus::Expired,
            ContractStatus::Renewed,
        ] {
            assert_eq!(ContractStatus::from_name(status.as_str()).unwrap(), status);
        }
        assert!(ContractStatus::from_name("archived").is_err());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&ContractStatus::EndingSoon).unwrap();
        assert_eq!(json, "\"ending_soon\"");
    }
}
