//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus any insert DTOs the repositories accept.

pub mod contract;
pub mod reminder;
pub mod subscription;
pub mod user;
