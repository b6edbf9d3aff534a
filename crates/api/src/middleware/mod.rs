//! Request extractors that gate handlers.
//!
//! - [`auth::AuthUser`] -- the authenticated account owner, from a JWT Bearer token.
//! - [`scheduler::SchedulerAuth`] -- a trusted scheduler calling the dispatch endpoint.

pub mod auth;
pub mod scheduler;
