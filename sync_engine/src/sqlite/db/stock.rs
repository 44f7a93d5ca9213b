use sqlx::SqliteConnection;

use crate::{db_types::StockRecord, traits::StockLevelUpdate};

/// Insert-or-replace a single stock level, keyed on SKU.
pub async fn upsert_stock_level(update: &StockLevelUpdate, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO stock_levels (sku, quantity, updated_at)
        VALUES ($1, $2, CURRENT_TIMESTAMP)
        ON CONFLICT (sku) DO UPDATE SET
            quantity = excluded.quantity,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(update.sku.as_str())
    .bind(update.quantity)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fetch_stock_level(sku: &str, conn: &mut SqliteConnection) -> Result<Option<StockRecord>, sqlx::Error> {
    let record =
        sqlx::query_as("SELECT * FROM stock_levels WHERE sku = $1").bind(sku).fetch_optional(conn).await?;
    Ok(record)
}

pub async fn stock_level_count(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM stock_levels").fetch_one(conn).await?;
    Ok(count)
}
