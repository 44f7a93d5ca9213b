use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};
use sync_engine::SqliteDatabase;

/// Creates a fresh on-disk SQLite database at `url`, applies migrations and returns a handle.
pub async fn prepare_test_db(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    std::fs::create_dir_all("data").expect("Error creating test data directory");
    let path = url.trim_start_matches("sqlite://");
    if let Err(e) = Sqlite::drop_database(path).await {
        warn!("Error dropping database {path}: {e:?}");
    }
    Sqlite::create_database(path).await.expect("Error creating database");
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.run_migrations().await.expect("Error running DB migrations");
    info!("🚀️ Test database ready at {url}");
    db
}

pub fn random_db_url(prefix: &str) -> String {
    format!("sqlite://data/test_{prefix}_{}.db", rand::random::<u64>())
}
