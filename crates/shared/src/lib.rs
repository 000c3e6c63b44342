//! Shared infrastructure for the rebill workspace
//!
//! Database pool construction and the embedded migration runner, used by
//! both the API server and the background worker.

pub mod db;

pub use db::{create_migration_pool, create_pool, run_migrations};
