//! Reminder delivery channels.
//!
//! The dispatcher only sees the [`ReminderNotifier`] trait. The production
//! channel is SMTP email ([`email::EmailDelivery`]); when no SMTP server is
//! configured the binary falls back to [`LogOnlyNotifier`].

pub mod email;

use std::sync::Arc;

use async_trait::async_trait;
use dealping_core::reminders::ReminderType;
use dealping_core::types::Date;

use self::email::EmailError;

// ---------------------------------------------------------------------------
// ReminderNotice
// ---------------------------------------------------------------------------

/// Everything a channel needs to tell an owner about one due reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderNotice {
    /// Contract title, or the client name when the contract has no title.
    pub contract_name: String,
    pub client_name: String,
    pub end_date: Date,
    /// Days from the dispatch date to the end date; negative once ended.
    pub days_until_end: i64,
    pub reminder_type: ReminderType,
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for a single delivery attempt.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error(transparent)]
    Email(#[from] EmailError),

    /// No delivery channel is configured, so nothing was sent.
    #[error("No notification channel configured")]
    NotConfigured,
}

// ---------------------------------------------------------------------------
// ReminderNotifier
// ---------------------------------------------------------------------------

/// Delivers one reminder notice to one address.
///
/// `Ok(())` means the notice left the process; only then is the reminder
/// marked sent.
#[async_trait]
pub trait ReminderNotifier: Send + Sync {
    async fn notify(&self, to: &str, notice: &ReminderNotice) -> Result<(), NotifyError>;
}

#[async_trait]
impl<T: ReminderNotifier + ?Sized> ReminderNotifier for Arc<T> {
    async fn notify(&self, to: &str, notice: &ReminderNotice) -> Result<(), NotifyError> {
        (**self).notify(to, notice).await
    }
}

/// Notifier used when SMTP is not configured.
///
/// Logs the notice and reports [`NotifyError::NotConfigured`], leaving the
/// reminder unsent so a later, configured run still delivers it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyNotifier;

#[async_trait]
impl ReminderNotifier for LogOnlyNotifier {
    async fn notify(&self, to: &str, notice: &ReminderNotice) -> Result<(), NotifyError> {
        tracing::info!(
            to,
            contract = %notice.contract_name,
            reminder_type = %notice.reminder_type,
            days_until_end = notice.days_until_end,
            "SMTP not configured, reminder not delivered"
        );
        Err(NotifyError::NotConfigured)
    }
}
