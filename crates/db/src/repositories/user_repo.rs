//! Repository for the `users` table.

use sqlx::PgPool;

use crate::models::user::User;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, external_id, email, full_name, created_at, updated_at";

/// Provides lookups and profile upserts for users.
pub struct UserRepo;

impl UserRepo {
    /// Get or create the profile for an auth-provider identity.
    ///
    /// A non-empty `email` or a `full_name` from the provider refreshes the
    /// stored value; absent values never clear what is already there.
    pub async fn upsert_by_external_id(
        pool: &PgPool,
        external_id: &str,
        email: Option<&str>,
        full_name: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (external_id, email, full_name)
             VALUES ($1, COALESCE($2, ''), $3)
             ON CONFLICT (external_id) DO UPDATE SET
                email = CASE WHEN EXCLUDED.email <> '' THEN EXCLUDED.email ELSE users.email END,
                full_name = COALESCE(EXCLUDED.full_name, users.full_name),
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(external_id)
            .bind(email)
            .bind(full_name)
            .fetch_one(pool)
            .await
    }

    /// Find a user by auth-provider identity.
    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE external_id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }
}
