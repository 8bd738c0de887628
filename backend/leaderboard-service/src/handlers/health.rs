use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;

use crate::services::LeaderboardService;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    database: String,
    cached_entries: usize,
}

/// Basic health check: database connectivity plus cache occupancy.
pub async fn health_check(
    pool: web::Data<PgPool>,
    service: web::Data<Arc<LeaderboardService>>,
) -> impl Responder {
    let db_status = match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    HttpResponse::Ok().json(HealthResponse {
        status: if db_status == "healthy" {
            "ok"
        } else {
            "degraded"
        }
        .to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status.to_string(),
        cached_entries: service.cached_entries(),
    })
}

/// Liveness probe: process is up, no dependency checks.
pub async fn liveness_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "alive": true }))
}
