//! Repository for the `subscriptions` table.

use dealping_core::plans::{SubscriptionPlan, SUBSCRIPTION_STATUS_ACTIVE};
use dealping_core::types::DbId;
use sqlx::PgPool;

use crate::models::subscription::{CreateSubscription, Subscription};

/// Column list for `subscriptions` queries.
const COLUMNS: &str = "id, user_id, plan, status, current_period_end, created_at, updated_at";

/// Read access to billing subscriptions. Rows are written by the billing
/// integration; `create` exists for seeding.
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Insert a subscription row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSubscription,
    ) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions (user_id, plan, status, current_period_end)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(input.user_id)
            .bind(&input.plan)
            .bind(&input.status)
            .bind(input.current_period_end)
            .fetch_one(pool)
            .await
    }

    /// The plan granted by the user's most recent active subscription, or
    /// `Free` when there is none.
    pub async fn active_plan(pool: &PgPool, user_id: DbId) -> Result<SubscriptionPlan, sqlx::Error> {
        let plan: Option<String> = sqlx::query_scalar(
            "SELECT plan FROM subscriptions
             WHERE user_id = $1 AND status = $2
             ORDER BY updated_at DESC
             LIMIT 1",
        )
        .bind(user_id)
        .bind(SUBSCRIPTION_STATUS_ACTIVE)
        .fetch_optional(pool)
        .await?;
        Ok(plan
            .as_deref()
            .map(SubscriptionPlan::from_name)
            .unwrap_or_default())
    }
}
