/// HTTP handlers
pub mod ai;
pub mod auth;
pub mod users;
pub mod videos;

use actix_web::HttpResponse;

/// Liveness probe
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "ok": true }))
}
