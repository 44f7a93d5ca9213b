//! # SQLite query layer
//!
//! "Low-level" database interactions, written as plain functions taking a
//! `&mut SqliteConnection`. Callers obtain a connection from a pool, or open a transaction and
//! pass `&mut *tx`, without any other changes to these functions.

use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, SqlitePool};

pub mod orders;
pub mod stock;

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}
