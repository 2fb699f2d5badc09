//! Persistence layer for targets and latency samples.

pub mod migrations;
pub mod models;
pub mod repository;

pub use models::{LatencySample, NewSample, SampleFilter, Target};
pub use repository::{LibsqlStorage, Storage};

use anyhow::Result;

/// Initialize database with schema
pub async fn initialize_database(conn: &libsql::Connection) -> Result<()> {
    migrations::run_migrations(conn).await
}
