use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use commerce_tools::CommerceApi;
use log::*;
use std::time::Duration;
use sync_engine::SqliteDatabase;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::commerce::CommerceRemoteAdapter,
    routes::{health, order_updated},
    workers::{start_order_worker, start_stock_worker},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let api = CommerceApi::new(config.commerce.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let remote = CommerceRemoteAdapter::new(api);

    start_order_worker(db.clone(), remote.clone(), config.sync.clone());
    start_stock_worker(db.clone(), remote, config.sync.clone());
    info!("⚙️ Reconciliation workers scheduled");

    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("osg::access_log"))
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(config.sync.clone()))
            .service(health)
            .service(order_updated)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
