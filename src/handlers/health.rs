use actix_web::{get, HttpResponse};

/// Static status message for uptime checks and the website's reachability
/// probe.
#[get("/")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "club-assistant-api",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
