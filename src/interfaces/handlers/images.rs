use actix_web::{get, http::header::VARY, web, HttpResponse};
use serde::Deserialize;

use crate::{
    entities::{asset::AssetLocation, derivative::ImageOrigin},
    errors::MediaError,
    middlewares::referer::RefererGuard,
    use_cases::extractors::NegotiatedFormat,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct FetchQuery {
    width: Option<String>,
}

impl FetchQuery {
    /// Anything that is not a plain number counts as no width.
    pub fn width(&self) -> Option<u32> {
        self.width.as_deref().and_then(|w| w.trim().parse().ok())
    }
}

#[get("/{year}/{month}/{day}/{id}", wrap = "RefererGuard")]
pub async fn fetch_image(
    state: web::Data<AppState>,
    path: web::Path<(String, String, String, String)>,
    query: Result<web::Query<FetchQuery>, actix_web::Error>,
    format: NegotiatedFormat,
) -> HttpResponse {
    let (year, month, day, id) = path.into_inner();
    // A query that does not deserialize (e.g. a repeated `width`) means no width.
    let width = match query {
        Ok(query) => query.width(),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unreadable query string");
            None
        }
    };
    let Some(location) = AssetLocation::from_segments(&year, &month, &day, &id) else {
        tracing::debug!(%year, %month, %day, %id, "malformed image path");
        return MediaError::NotFound.to_fetch_response();
    };

    match state
        .derivative_resolver
        .resolve(&location, width, format.0)
        .await
    {
        Ok(image) => {
            if image.origin == ImageOrigin::Synthesized {
                tracing::debug!(%location, format = %image.format, "served fresh derivative");
            }
            HttpResponse::Ok()
                .content_type(image.format.mime_type())
                .insert_header((VARY, "Accept"))
                .body(image.bytes)
        }
        Err(MediaError::NotFound) => MediaError::NotFound.to_fetch_response(),
        Err(e) => {
            tracing::warn!(%location, error = %e, "image fetch failed");
            e.to_fetch_response()
        }
    }
}
