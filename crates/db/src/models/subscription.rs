//! Subscription entity model and DTOs.

use dealping_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `subscriptions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub user_id: DbId,
    pub plan: String,
    pub status: String,
    pub current_period_end: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a subscription.
#[derive(Debug, Deserialize)]
pub struct CreateSubscription {
    pub user_id: DbId,
    pub plan: String,
    pub status: String,
    pub current_period_end: Option<Timestamp>,
}
