//! Repository for the `contracts` table.
//!
//! Every query is scoped by `user_id`: a contract owned by another tenant
//! is indistinguishable from one that does not exist.

use dealping_core::contract::ContractFields;
use dealping_core::lifecycle::ContractStatus;
use dealping_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::contract::{Contract, NewContract};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, client_name, contract_title, start_date, end_date, \
                       renewal_date, rate, rate_currency, payment_terms, payment_frequency, \
                       status, renewed_at, file_path, file_name, extracted_data, notes, \
                       created_at, updated_at";

/// Provides CRUD operations for contracts.
pub struct ContractRepo;

impl ContractRepo {
    /// Insert a contract inside the caller's transaction, returning the row.
    ///
    /// Reminder rows for the new contract should be written in the same
    /// transaction so a failure leaves neither behind.
    pub async fn create(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &NewContract<'_>,
    ) -> Result<Contract, sqlx::Error> {
        let fields = input.fields;
        let query = format!(
            "INSERT INTO contracts (user_id, client_name, contract_title, start_date, end_date,
                renewal_date, rate, rate_currency, payment_terms, payment_frequency, status,
                file_path, file_name, extracted_data, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(input.user_id)
            .bind(&fields.client_name)
            .bind(&fields.contract_title)
            .bind(fields.start_date)
            .bind(fields.end_date)
            .bind(fields.renewal_date)
            .bind(fields.rate)
            .bind(&fields.rate_currency)
            .bind(&fields.payment_terms)
            .bind(fields.payment_frequency.as_str())
            .bind(input.status.as_str())
            .bind(input.attachment.map(|a| a.file_path.as_str()))
            .bind(input.attachment.map(|a| a.file_name.as_str()))
            .bind(input.attachment.map(|a| &a.extracted_data))
            .bind(&fields.notes)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a contract owned by `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Contract>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contracts WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Contract>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's contracts, soonest end date first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Contract>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contracts WHERE user_id = $1 ORDER BY end_date ASC, id ASC"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Count every contract a user owns, regardless of status.
    pub async fn count_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT COUNT(*) FROM contracts WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;
        Ok(count.unwrap_or(0))
    }

    /// Overwrite all editable fields and the status snapshot inside the
    /// caller's transaction.
    ///
    /// Returns `None` if no contract with `id` belongs to `user_id`.
    pub async fn update(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        user_id: DbId,
        fields: &ContractFields,
        status: ContractStatus,
    ) -> Result<Option<Contract>, sqlx::Error> {
        let query = format!(
            "UPDATE contracts SET
                client_name = $3,
                contract_title = $4,
                start_date = $5,
                end_date = $6,
                renewal_date = $7,
                rate = $8,
                rate_currency = $9,
                payment_terms = $10,
                payment_frequency = $11,
                status = $12,
                notes = $13,
                updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&fields.client_name)
            .bind(&fields.contract_title)
            .bind(fields.start_date)
            .bind(fields.end_date)
            .bind(fields.renewal_date)
            .bind(fields.rate)
            .bind(&fields.rate_currency)
            .bind(&fields.payment_terms)
            .bind(fields.payment_frequency.as_str())
            .bind(status.as_str())
            .bind(&fields.notes)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Record an explicit renewal. The first renewal time is kept if the
    /// contract was already renewed.
    pub async fn mark_renewed(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        user_id: DbId,
        renewed_at: Timestamp,
    ) -> Result<Option<Contract>, sqlx::Error> {
        let query = format!(
            "UPDATE contracts SET
                renewed_at = COALESCE(renewed_at, $3),
                status = $4,
                updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(id)
            .bind(user_id)
            .bind(renewed_at)
            .bind(ContractStatus::Renewed.as_str())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Overwrite the stored status snapshot.
    pub async fn update_status_snapshot(
        pool: &PgPool,
        id: DbId,
        status: ContractStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE contracts SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Delete a contract inside the caller's transaction. Returns `true` if
    /// a row was removed.
    pub async fn delete(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contracts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
