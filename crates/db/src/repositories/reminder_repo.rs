//! Repository for the `reminders` table (the reminder ledger).

use dealping_core::reminders::ReminderType;
use dealping_core::types::{Date, DbId, Timestamp};
use sqlx::PgPool;

use crate::models::reminder::{DueReminder, Reminder};

/// Column list for `reminders` queries.
const COLUMNS: &str = "id, contract_id, user_id, reminder_type, reminder_date, sent, sent_at, \
                       created_at, updated_at";

/// Provides ledger operations for reminders.
pub struct ReminderRepo;

impl ReminderRepo {
    /// Insert one reminder per date inside the caller's transaction.
    ///
    /// A single statement writes the whole batch, so either every row lands
    /// or none do. Dates that already have a reminder of the same type for
    /// this contract are skipped. Returns the number of rows inserted.
    pub async fn create_batch(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        contract_id: DbId,
        user_id: DbId,
        dates: &[Date],
        reminder_type: ReminderType,
    ) -> Result<u64, sqlx::Error> {
        if dates.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "INSERT INTO reminders (contract_id, user_id, reminder_type, reminder_date)
             SELECT $1, $2, $3, d FROM UNNEST($4::date[]) AS d
             ON CONFLICT (contract_id, reminder_date, reminder_type) DO NOTHING",
        )
        .bind(contract_id)
        .bind(user_id)
        .bind(reminder_type.as_str())
        .bind(dates)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Replace a contract's unsent reminders with a new plan.
    ///
    /// Delivered reminders are kept as history; a new date that was already
    /// delivered is not scheduled again. Returns the number of rows inserted.
    pub async fn replace_pending(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        contract_id: DbId,
        user_id: DbId,
        dates: &[Date],
        reminder_type: ReminderType,
    ) -> Result<u64, sqlx::Error> {
        Self::delete_pending(tx, contract_id).await?;
        Self::create_batch(tx, contract_id, user_id, dates, reminder_type).await
    }

    /// Delete a contract's unsent reminders. Returns the number removed.
    pub async fn delete_pending(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        contract_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reminders WHERE contract_id = $1 AND sent = false")
            .bind(contract_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete every reminder of a contract. Returns the number removed.
    pub async fn delete_for_contract(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        contract_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reminders WHERE contract_id = $1")
            .bind(contract_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    /// All unsent reminders dated on or before `as_of`, across all users.
    ///
    /// Uses `<=` so reminders missed by an earlier run are picked up by the
    /// next one.
    pub async fn find_due_unsent(
        pool: &PgPool,
        as_of: Date,
    ) -> Result<Vec<DueReminder>, sqlx::Error> {
        sqlx::query_as::<_, DueReminder>(
            "SELECT r.id, r.contract_id, r.user_id, r.reminder_type, r.reminder_date,
                    c.client_name, c.contract_title, c.end_date,
                    NULLIF(TRIM(u.email), '') AS email
             FROM reminders r
             JOIN contracts c ON c.id = r.contract_id
             JOIN users u ON u.id = r.user_id
             WHERE r.reminder_date <= $1 AND r.sent = false
             ORDER BY r.reminder_date ASC, r.id ASC",
        )
        .bind(as_of)
        .fetch_all(pool)
        .await
    }

    /// Mark a reminder as sent.
    ///
    /// Idempotent: only an unsent row is updated, so a second call leaves the
    /// original `sent_at` untouched. Returns `true` if this call flipped it.
    pub async fn mark_sent(
        pool: &PgPool,
        id: DbId,
        sent_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE reminders SET sent = true, sent_at = $2, updated_at = NOW()
             WHERE id = $1 AND sent = false",
        )
        .bind(id)
        .bind(sent_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a reminder by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Reminder>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reminders WHERE id = $1");
        sqlx::query_as::<_, Reminder>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a contract's reminders by date.
    pub async fn list_for_contract(
        pool: &PgPool,
        contract_id: DbId,
    ) -> Result<Vec<Reminder>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reminders
             WHERE contract_id = $1
             ORDER BY reminder_date ASC, id ASC"
        );
        sqlx::query_as::<_, Reminder>(&query)
            .bind(contract_id)
            .fetch_all(pool)
            .await
    }

    /// List a user's reminders by date.
    ///
    /// When `pending_only` is `true`, only unsent reminders are returned.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        pending_only: bool,
    ) -> Result<Vec<Reminder>, sqlx::Error> {
        let filter = if pending_only { "AND sent = false" } else { "" };
        let query = format!(
            "SELECT {COLUMNS} FROM reminders
             WHERE user_id = $1 {filter}
             ORDER BY reminder_date ASC, id ASC"
        );
        sqlx::query_as::<_, Reminder>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
