mod support;

use support::{prepare_test_db, random_db_url};
use sync_engine::traits::{StockLevelUpdate, StockStore};

#[tokio::test]
async fn upsert_is_idempotent() {
    let url = random_db_url("stock_idem");
    let db = prepare_test_db(&url).await;
    let batch = vec![StockLevelUpdate::new("A1", 12), StockLevelUpdate::new("B2", 3)];

    db.upsert_stock_levels(&batch).await.unwrap();
    db.upsert_stock_levels(&batch).await.unwrap();

    assert_eq!(db.stock_level_count().await.unwrap(), 2, "re-applying a batch must not create rows");
    let a1 = db.fetch_stock_level("A1").await.unwrap().unwrap();
    assert_eq!(a1.quantity, 12);
}

#[tokio::test]
async fn last_write_wins_per_sku() {
    let url = random_db_url("stock_lww");
    let db = prepare_test_db(&url).await;

    db.upsert_stock_levels(&[StockLevelUpdate::new("A1", 5)]).await.unwrap();
    let first = db.fetch_stock_level("A1").await.unwrap().unwrap();

    db.upsert_stock_levels(&[StockLevelUpdate::new("A1", 9)]).await.unwrap();
    let second = db.fetch_stock_level("A1").await.unwrap().unwrap();

    assert_eq!(second.quantity, 9);
    assert!(second.updated_at >= first.updated_at);
    assert_eq!(db.stock_level_count().await.unwrap(), 1);
}

#[tokio::test]
async fn zero_quantity_is_a_valid_level() {
    let url = random_db_url("stock_zero");
    let db = prepare_test_db(&url).await;

    db.upsert_stock_levels(&[StockLevelUpdate::new("A1", 7)]).await.unwrap();
    db.upsert_stock_levels(&[StockLevelUpdate::new("A1", 0)]).await.unwrap();

    let level = db.fetch_stock_level("A1").await.unwrap().unwrap();
    assert_eq!(level.quantity, 0, "an out-of-stock SKU keeps its row at zero");
}

#[tokio::test]
async fn absent_skus_are_never_deleted() {
    let url = random_db_url("stock_keep");
    let db = prepare_test_db(&url).await;

    db.upsert_stock_levels(&[StockLevelUpdate::new("A1", 4), StockLevelUpdate::new("B2", 2)]).await.unwrap();
    // The next pass only sees A1 upstream; B2 must survive locally.
    db.upsert_stock_levels(&[StockLevelUpdate::new("A1", 6)]).await.unwrap();

    assert!(db.fetch_stock_level("B2").await.unwrap().is_some());
    assert_eq!(db.stock_level_count().await.unwrap(), 2);
}
