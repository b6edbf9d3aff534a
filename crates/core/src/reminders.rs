//! Reminder planning.
//!
//! [`plan_reminders`] turns a contract end date into the set of calendar
//! dates on which the owner should be reminded. Two regimes apply:
//!
//! - More than [`DAILY_ESCALATION_DAYS`] days left: one reminder at each of
//!   the [`MILESTONE_DAYS`] offsets before the end date, dropping milestones
//!   that are already in the past.
//! - Between 0 and [`DAILY_ESCALATION_DAYS`] days left: one reminder for every
//!   day from today through the end date inclusive.
//!
//! Contracts that have already ended get no reminders.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::lifecycle::{days_until, today_from};
use crate::types::{Date, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Milestone offsets (days before end date) used when the end is far out.
pub const MILESTONE_DAYS: [i64; 3] = [30, 15, 7];

/// Once this close to the end date, reminders switch to a daily cadence.
pub const DAILY_ESCALATION_DAYS: i64 = 7;

pub const REMINDER_TYPE_RENEWAL: &str = "renewal";
pub const REMINDER_TYPE_RATE_INCREASE: &str = "rate_increase";
pub const REMINDER_TYPE_PAYMENT_TERM: &str = "payment_term";

// ---------------------------------------------------------------------------
// ReminderType
// ---------------------------------------------------------------------------

/// Kind of reminder. Only `Renewal` is produced by the planner; the other
/// two are reserved values accepted by the `reminders` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
    Renewal,
    RateIncrease,
    PaymentTerm,
}

impl ReminderType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Renewal => REMINDER_TYPE_RENEWAL,
            Self::RateIncrease => REMINDER_TYPE_RATE_INCREASE,
            Self::PaymentTerm => REMINDER_TYPE_PAYMENT_TERM,
        }
    }

    /// Parse from the database `reminder_type` column.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            REMINDER_TYPE_RENEWAL => Ok(Self::Renewal),
            REMINDER_TYPE_RATE_INCREASE => Ok(Self::RateIncrease),
            REMINDER_TYPE_PAYMENT_TERM => Ok(Self::PaymentTerm),
            other => Err(CoreError::Validation(format!(
                "Unknown reminder type '{other}'"
            ))),
        }
    }

    /// Human-readable label used in notification subjects.
    pub fn label(self) -> &'static str {
        match self {
            Self::Renewal => "Renewal",
            Self::RateIncrease => "Rate Increase",
            Self::PaymentTerm => "Payment Term",
        }
    }
}

impl std::fmt::Display for ReminderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Output of [`plan_reminders`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderPlan {
    /// `true` iff `dates` is non-empty.
    pub should_remind: bool,
    /// Unique reminder dates in ascending order.
    pub dates: Vec<Date>,
}

impl ReminderPlan {
    fn from_dates(dates: Vec<Date>) -> Self {
        Self {
            should_remind: !dates.is_empty(),
            dates,
        }
    }
}

/// Compute the reminder dates for a contract ending on `end_date`, as seen
/// on `today`.
pub fn plan_reminders(end_date: Date, today: Date) -> ReminderPlan {
    let days_left = days_until(end_date, today);

    if days_left < 0 {
        return ReminderPlan::from_dates(Vec::new());
    }

    if days_left <= DAILY_ESCALATION_DAYS {
        let dates = (0..=days_left)
            .map(|offset| today + Duration::days(offset))
            .collect();
        return ReminderPlan::from_dates(dates);
    }

    // MILESTONE_DAYS is descending, so the surviving dates come out ascending.
    let dates = MILESTONE_DAYS
        .iter()
        .map(|&offset| end_date - Duration::days(offset))
        .filter(|date| *date >= today)
        .collect();
    ReminderPlan::from_dates(dates)
}

/// [`plan_reminders`] for a wall-clock instant; the time of day is discarded
/// before any arithmetic.
pub fn plan_reminders_at(end_date: Date, now: Timestamp) -> ReminderPlan {
    plan_reminders(end_date, today_from(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn today() -> Date {
        NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()
    }

    fn days(n: i64) -> Duration {
        Duration::days(n)
    }

    // -----------------------------------------------------------------------
    // Milestone regime
    // -----------------------------------------------------------------------

    #[test]
    fn far_future_gets_three_milestones() {
        let end = today() + days(45);
        let plan = plan_reminders(end, today());

        assert!(plan.should_remind);
        assert_eq!(
            plan.dates,
            vec![today() + days(15), today() + days(30), today() + days(38)]
        );
        assert!(plan.dates.iter().all(|d| *d >= today()));
    }

    #[test]
    fn elapsed_milestones_are_dropped() {
        let end = today() + days(20);
        let plan = plan_reminders(end, today());
        assert_eq!(plan.dates, vec![end - days(15), end - days(7)]);
    }

    #[test]
    fn milestone_falling_on_today_is_kept() {
        let end = today() + days(30);
        let plan = plan_reminders(end, today());
        assert_eq!(plan.dates.first(), Some(&today()));
        assert_eq!(plan.dates.len(), 3);
    }

    #[test]
    fn eight_days_out_is_still_milestone_regime() {
        let end = today() + days(8);
        let plan = plan_reminders(end, today());
        assert_eq!(plan.dates, vec![today() + days(1)]);
    }

    // -----------------------------------------------------------------------
    // Daily escalation regime
    // -----------------------------------------------------------------------

    #[test]
    fn imminent_end_gets_daily_reminders() {
        let end = today() + days(3);
        let plan = plan_reminders(end, today());
        assert_eq!(
            plan.dates,
            vec![today(), today() + days(1), today() + days(2), today() + days(3)]
        );
    }

    #[test]
    fn seven_days_out_gets_eight_daily_reminders() {
        let end = today() + days(7);
        let plan = plan_reminders(end, today());
        assert_eq!(plan.dates.len(), 8);
        assert_eq!(plan.dates.first(), Some(&today()));
        assert_eq!(plan.dates.last(), Some(&end));
    }

    #[test]
    fn ending_today_gets_one_reminder() {
        let plan = plan_reminders(today(), today());
        assert!(plan.should_remind);
        assert_eq!(plan.dates, vec![today()]);
    }

    // -----------------------------------------------------------------------
    // Past regime
    // -----------------------------------------------------------------------

    #[test]
    fn already_ended_gets_nothing() {
        let plan = plan_reminders(today() - days(1), today());
        assert!(!plan.should_remind);
        assert!(plan.dates.is_empty());
    }

    // -----------------------------------------------------------------------
    // Invariants
    // -----------------------------------------------------------------------

    #[test]
    fn dates_are_unique_and_ascending_across_offsets() {
        for offset in -5..=60 {
            let plan = plan_reminders(today() + days(offset), today());
            assert!(
                plan.dates.windows(2).all(|w| w[0] < w[1]),
                "dates not strictly ascending for offset {offset}: {:?}",
                plan.dates
            );
            assert_eq!(plan.should_remind, !plan.dates.is_empty());
        }
    }

    #[test]
    fn time_of_day_does_not_change_the_plan() {
        let end = today() + days(5);
        let morning = Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 1).unwrap();
        let night = Utc.with_ymd_and_hms(2026, 1, 10, 23, 59, 59).unwrap();
        assert_eq!(plan_reminders_at(end, morning), plan_reminders_at(end, night));
        assert_eq!(plan_reminders_at(end, night).dates.len(), 6);
    }

    #[test]
    fn reminder_type_names() {
        assert_eq!(ReminderType::Renewal.as_str(), "renewal");
        assert_eq!(
            ReminderType::from_name("payment_term").unwrap(),
            ReminderType::PaymentTerm
        );
        assert_eq!(ReminderType::RateIncrease.label(), "Rate Increase");
        assert!(ReminderType::from_name("birthday").is_err());
    }
}
