//! Liveness and readiness probe

use crate::AppState;
use actix_web::{web, HttpResponse, Responder};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/health").route(web::get().to(health_check)));
}

/// Reports version and whether the request store is reachable
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let database = match state.db.get_user(0) {
        Ok(_) => "ok",
        Err(e) => {
            log::error!("health check could not reach database: {}", e);
            "unreachable"
        }
    };
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": VERSION,
        "database": database,
    }))
}
