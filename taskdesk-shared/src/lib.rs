//! # TaskDesk Shared Library
//!
//! This crate contains shared types, storage and authentication logic used by
//! the TaskDesk API server and the reminder worker.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their store operations (users, tasks)
//! - `auth`: Password hashing, session tokens, credentials and access checks
//! - `db`: Connection pool and embedded migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the TaskDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
