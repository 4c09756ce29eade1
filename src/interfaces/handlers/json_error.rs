use actix_web::HttpResponse;

/// Fallback for every path no route matches.
pub async fn route_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "code": "PAGE_NOT_FOUND",
        "message": "Page not found"
    }))
}
