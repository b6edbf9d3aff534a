//! Dealping domain logic.
//!
//! Everything in this crate is free of I/O so it can be shared by the
//! repository layer, the dispatch job, and the HTTP handlers:
//!
//! - [`lifecycle`] -- contract status classification from the end date.
//! - [`reminders`] -- reminder date planning (milestones + daily escalation).
//! - [`contract`] -- intake validation and field normalisation.
//! - [`plans`] -- subscription plan limits.
//! - [`extraction`] -- normalisation of document-extraction results.

pub mod contract;
pub mod error;
pub mod extraction;
pub mod lifecycle;
pub mod plans;
pub mod reminders;
pub mod types;
