use actix_multipart::form::{MultipartForm, MultipartFormConfig};
use actix_web::{post, web, HttpResponse};

use crate::{
    entities::upload::{UploadForm, UploadRequest, UploadResponse},
    errors::MediaError,
    AppState,
};

#[post("/upload")]
pub async fn upload_image(
    state: web::Data<AppState>,
    form: MultipartForm<UploadForm>,
) -> Result<HttpResponse, MediaError> {
    let request = UploadRequest::from(form.into_inner());

    let asset = state
        .upload_handler
        .upload(request)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "upload failed"))?;

    Ok(HttpResponse::Ok().json(UploadResponse::from(&asset)))
}

/// Caps the whole multipart body and renders extractor failures as JSON.
pub fn multipart_config(limit: usize) -> MultipartFormConfig {
    MultipartFormConfig::default()
        .total_limit(limit)
        .memory_limit(limit)
        .error_handler(|err, _req| MediaError::from(err).into())
}
