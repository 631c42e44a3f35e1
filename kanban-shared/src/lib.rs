//! # Kanban Shared Library
//!
//! Access control, authentication and persistence for the Kanban API.
//!
//! ## Module Organization
//!
//! - `auth`: permission evaluation, the access gate, JWT and passwords
//! - `db`: connection pool, migrations and the PostgreSQL access store
//! - `models`: users, boards, tasks and comments

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Kanban shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
