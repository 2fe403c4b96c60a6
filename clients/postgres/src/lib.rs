//! Postgres persistence for watched subjects.

mod repository;

pub use repository::{migrate, SubjectRepository};

use anyhow::{Context, Result};
use sqlx::PgPool;

/// Opens a connection pool to `database_url`.
pub async fn connect(database_url: &str) -> Result<PgPool> {
    PgPool::connect(database_url)
        .await
        .context("connect to postgres")
}
