//! Reminder dispatch batch job.
//!
//! One [`ReminderDispatcher::run_cycle`] call reads every due, unsent
//! reminder from the ledger, delivers each one through the notifier, and
//! marks the delivered ones sent. Nothing runs on a timer: an external
//! scheduler invokes the cycle, and the next invocation retries whatever
//! this one could not deliver.
//!
//! Overlapping cycles are harmless. `mark_sent` only flips an unsent row,
//! and a reminder already marked by another run is never selected again.

use std::time::Duration;

use async_trait::async_trait;
use dealping_core::lifecycle::{days_until, today_from};
use dealping_core::reminders::ReminderType;
use dealping_core::types::{Date, DbId, Timestamp};
use dealping_db::models::reminder::DueReminder;
use dealping_db::repositories::ReminderRepo;
use dealping_db::DbPool;
use serde::Serialize;
use validator::ValidateEmail;

use crate::delivery::{ReminderNotice, ReminderNotifier};

/// Default upper bound on a single notifier call.
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// ReminderLedger
// ---------------------------------------------------------------------------

/// The two ledger operations the dispatcher needs.
#[async_trait]
pub trait ReminderLedger: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Unsent reminders dated on or before `as_of`.
    async fn find_due_unsent(&self, as_of: Date) -> Result<Vec<DueReminder>, Self::Error>;

    /// Flip one reminder to sent. Returns `false` if it was already sent.
    async fn mark_sent(&self, id: DbId, sent_at: Timestamp) -> Result<bool, Self::Error>;
}

/// [`ReminderLedger`] backed by the `reminders` table.
#[derive(Clone)]
pub struct PgReminderLedger {
    pool: DbPool,
}

impl PgReminderLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReminderLedger for PgReminderLedger {
    type Error = sqlx::Error;

    async fn find_due_unsent(&self, as_of: Date) -> Result<Vec<DueReminder>, sqlx::Error> {
        ReminderRepo::find_due_unsent(&self.pool, as_of).await
    }

    async fn mark_sent(&self, id: DbId, sent_at: Timestamp) -> Result<bool, sqlx::Error> {
        ReminderRepo::mark_sent(&self.pool, id, sent_at).await
    }
}

// ---------------------------------------------------------------------------
// DispatchSummary
// ---------------------------------------------------------------------------

/// Outcome counts for one dispatch cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    /// Reminders handed to the notifier.
    pub attempted: usize,
    /// Reminders delivered and marked sent by this cycle.
    pub sent: usize,
    /// Reminders skipped for a missing or invalid address.
    pub skipped: usize,
    /// Reminders left unsent after a delivery, timeout, or ledger failure.
    pub failed: usize,
}

// ---------------------------------------------------------------------------
// ReminderDispatcher
// ---------------------------------------------------------------------------

/// Runs dispatch cycles against a ledger and a notifier.
pub struct ReminderDispatcher<L, N> {
    ledger: L,
    notifier: N,
    notify_timeout: Duration,
}

impl<L, N> ReminderDispatcher<L, N>
where
    L: ReminderLedger,
    N: ReminderNotifier,
{
    pub fn new(ledger: L, notifier: N) -> Self {
        Self {
            ledger,
            notifier,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }

    /// Override the per-call notifier timeout.
    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Run one dispatch cycle as of `now`.
    ///
    /// Only a failure to read the ledger aborts the cycle. Every per-item
    /// problem is logged, counted in the summary, and leaves that reminder
    /// unsent for the next run.
    pub async fn run_cycle(&self, now: Timestamp) -> Result<DispatchSummary, L::Error> {
        let today = today_from(now);
        let due = self.ledger.find_due_unsent(today).await?;
        let mut summary = DispatchSummary::default();

        tracing::info!(due = due.len(), %today, "Starting reminder dispatch cycle");

        for reminder in &due {
            let Some(to) = reminder
                .email
                .as_ref()
                .filter(|addr| addr.validate_email())
            else {
                tracing::warn!(
                    reminder_id = reminder.id,
                    user_id = reminder.user_id,
                    "No valid notification address, skipping reminder"
                );
                summary.skipped += 1;
                continue;
            };

            let notice = match notice_for(reminder, today) {
                Ok(notice) => notice,
                Err(e) => {
                    tracing::error!(reminder_id = reminder.id, error = %e, "Unreadable reminder row");
                    summary.failed += 1;
                    continue;
                }
            };

            summary.attempted += 1;
            match tokio::time::timeout(self.notify_timeout, self.notifier.notify(to, &notice)).await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(reminder_id = reminder.id, error = %e, "Reminder delivery failed");
                    summary.failed += 1;
                    continue;
                }
                Err(_) => {
                    tracing::warn!(
                        reminder_id = reminder.id,
                        timeout_secs = self.notify_timeout.as_secs(),
                        "Reminder delivery timed out"
                    );
                    summary.failed += 1;
                    continue;
                }
            }

            match self.ledger.mark_sent(reminder.id, now).await {
                Ok(true) => summary.sent += 1,
                Ok(false) => {
                    tracing::debug!(reminder_id = reminder.id, "Reminder already marked sent");
                }
                Err(e) => {
                    tracing::error!(
                        reminder_id = reminder.id,
                        error = %e,
                        "Delivered reminder could not be marked sent"
                    );
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            attempted = summary.attempted,
            sent = summary.sent,
            skipped = summary.skipped,
            failed = summary.failed,
            "Reminder dispatch cycle finished"
        );
        Ok(summary)
    }
}

fn notice_for(
    reminder: &DueReminder,
    today: Date,
) -> Result<ReminderNotice, dealping_core::error::CoreError> {
    Ok(ReminderNotice {
        contract_name: reminder
            .contract_title
            .clone()
            .unwrap_or_else(|| reminder.client_name.clone()),
        client_name: reminder.client_name.clone(),
        end_date: reminder.end_date,
        days_until_end: days_until(reminder.end_date, today),
        reminder_type: ReminderType::from_name(&reminder.reminder_type)?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
