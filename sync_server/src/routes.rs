use actix_web::{get, post, web, HttpResponse, Responder};
use log::*;
use sync_engine::SqliteDatabase;

use crate::{config::SyncConfig, data_objects::JsonResponse, workers::schedule_requeue};

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

/// Inbound order-updated notification. Acknowledges immediately and schedules a debounced
/// requeue; the caller learns nothing about the eventual submission outcome here.
#[post("/webhook/order_updated/{id}")]
pub async fn order_updated(
    path: web::Path<i64>,
    db: web::Data<SqliteDatabase>,
    config: web::Data<SyncConfig>,
) -> HttpResponse {
    let order_id = path.into_inner();
    debug!("🔔️ Received order update notification for order id {order_id}");
    schedule_requeue(db.get_ref().clone(), order_id, config.requeue_debounce);
    HttpResponse::Ok().json(JsonResponse::success("Order queued for submission"))
}
