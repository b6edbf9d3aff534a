//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` (or an open transaction) as the first argument.

pub mod contract_repo;
pub mod reminder_repo;
pub mod subscription_repo;
pub mod user_repo;

pub use contract_repo::ContractRepo;
pub use reminder_repo::ReminderRepo;
pub use subscription_repo::SubscriptionRepo;
pub use user_repo::UserRepo;
