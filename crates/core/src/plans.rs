//! Subscription plans and their limits.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const PLAN_FREE: &str = "free";
pub const PLAN_PRO: &str = "pro";

/// Subscription row status that grants the plan's features.
pub const SUBSCRIPTION_STATUS_ACTIVE: &str = "active";

/// Contracts a free-plan user may hold in total (not just active ones).
pub const FREE_MAX_CONTRACTS: i64 = 1;

/// A user's billing plan. Users without an active subscription are `Free`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    #[default]
    Free,
    Pro,
}

impl SubscriptionPlan {
    /// Parse from the `subscriptions.plan` column. Unknown values fall back
    /// to `Free` so a bad row never grants extra capacity.
    pub fn from_name(name: &str) -> Self {
        match name {
            PLAN_PRO => Self::Pro,
            _ => Self::Free,
        }
    }

    /// Maximum number of contracts, or `None` for unlimited.
    pub fn max_contracts(self) -> Option<i64> {
        match self {
            Self::Free => Some(FREE_MAX_CONTRACTS),
            Self::Pro => None,
        }
    }
}

/// Check whether a user on `plan` who already owns `existing` contracts may
/// create another one.
pub fn check_contract_limit(plan: SubscriptionPlan, existing: i64) -> Result<(), CoreError> {
    match plan.max_contracts() {
        Some(max) if existing >= max => Err(CoreError::Forbidden(format!(
            "Free plan allows only {max} contract. Upgrade to Pro for unlimited contracts."
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn free_plan_allows_first_contract() {
        assert!(check_contract_limit(SubscriptionPlan::Free, 0).is_ok());
    }

    #[test]
    fn free_plan_blocks_second_contract() {
        assert_matches!(
            check_contract_limit(SubscriptionPlan::Free, 1),
            Err(CoreError::Forbidden(msg)) if msg.contains("Upgrade to Pro")
        );
    }

    #[test]
    fn pro_plan_is_unlimited() {
        assert!(check_contract_limit(SubscriptionPlan::Pro, 10_000).is_ok());
        assert_eq!(SubscriptionPlan::Pro.max_contracts(), None);
    }

    #[test]
    fn unknown_plan_name_is_free() {
        assert_eq!(SubscriptionPlan::from_name("enterprise"), SubscriptionPlan::Free);
        assert_eq!(SubscriptionPlan::from_name("pro"), SubscriptionPlan::Pro);
    }
}
