use actix_web::{get, web, HttpResponse, Responder};
use humantime::format_duration;
use chrono::Utc;
use std::time::Duration;
use serde::Serialize;
use crate::{constants::START_TIME, AppState};

#[derive(Serialize)]
struct HealthCheckResponse {
    status: String,
    uptime: String,
    timestamp: String,
    start_at: String,
    storage: String,
    version: String,
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now_utc = Utc::now();
    let uptime_duration = now_utc.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime_duration.num_seconds().max(0) as u64));

    let storage = match tokio::fs::metadata(state.store.root()).await {
        Ok(meta) if meta.is_dir() => "OK",
        Ok(_) => "Not a directory",
        Err(e) => {
            tracing::warn!(error = %e, "storage root unavailable");
            "Unavailable"
        }
    };

    HttpResponse::Ok().json(HealthCheckResponse {
        status: "healthy".to_string(),
        uptime: human_uptime.to_string(),
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        storage: storage.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
