//! # TaskNest Shared Library
//!
//! This crate contains the models, access policy, and query logic shared by
//! the TaskNest API server and its tests.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD operations
//! - `auth`: Session-token validation, request auth context, access policy
//! - `query`: Task filter pipeline and sort-key handling
//! - `calendar`: Home-view calendar feed builder
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod calendar;
pub mod db;
pub mod models;
pub mod query;

/// Current version of the TaskNest shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
