//! Reminder ledger models.

use dealping_core::types::{Date, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `reminders` table.
///
/// `sent` only ever goes from `false` to `true`, and `sent_at` is set by the
/// same update.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reminder {
    pub id: DbId,
    pub contract_id: DbId,
    pub user_id: DbId,
    pub reminder_type: String,
    pub reminder_date: Date,
    pub sent: bool,
    pub sent_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A due, unsent reminder joined with its contract and the owner's address.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DueReminder {
    pub id: DbId,
    pub contract_id: DbId,
    pub user_id: DbId,
    pub reminder_type: String,
    pub reminder_date: Date,
    pub client_name: String,
    pub contract_title: Option<String>,
    pub end_date: Date,
    /// Owner's email; `None` when the user has no address on file.
    pub email: Option<String>,
}
