//! Handlers for the caller's own account.

use axum::extract::State;
use axum::Json;
use dealping_core::plans::SubscriptionPlan;
use dealping_db::repositories::{ContractRepo, SubscriptionRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// The caller's plan and how much of it is used.
#[derive(Debug, Serialize)]
pub struct SubscriptionInfo {
    pub plan: SubscriptionPlan,
    /// `None` when the plan is unlimited.
    pub max_contracts: Option<i64>,
    pub contract_count: i64,
}

/// GET /api/v1/user/subscription
///
/// Users without an active subscription are reported as `free`.
pub async fn subscription(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<SubscriptionInfo>>> {
    let plan = SubscriptionRepo::active_plan(&state.pool, auth.user_id).await?;
    let contract_count = ContractRepo::count_for_user(&state.pool, auth.user_id).await?;

    Ok(Json(DataResponse {
        data: SubscriptionInfo {
            plan,
            max_contracts: plan.max_contracts(),
            contract_count,
        },
    }))
}
