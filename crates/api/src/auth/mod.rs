//! Authentication primitives.
//!
//! - [`jwt`] -- HS256 access-token issuing and validation.
//! - [`scheduler`] -- shared-secret and trusted-header checks for the
//!   dispatch endpoint.

pub mod jwt;
pub mod scheduler;
