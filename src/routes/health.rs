use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Health check endpoint
///
/// Returns the current status of the API and timestamp. Does not touch storage.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": Utc::now()
    }))
}
