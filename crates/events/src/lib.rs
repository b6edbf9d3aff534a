//! Dealping reminder delivery and dispatch.
//!
//! - [`delivery`] -- the [`ReminderNotifier`] seam and its SMTP email
//!   implementation.
//! - [`dispatch`] -- the reminder dispatch batch job: one
//!   [`ReminderDispatcher::run_cycle`] call finds every due, unsent reminder
//!   in the [`ReminderLedger`], delivers it, and marks it sent.

pub mod delivery;
pub mod dispatch;

pub use delivery::email::{EmailConfig, EmailDelivery};
pub use delivery::{LogOnlyNotifier, NotifyError, ReminderNotice, ReminderNotifier};
pub use dispatch::{DispatchSummary, PgReminderLedger, ReminderDispatcher, ReminderLedger};
