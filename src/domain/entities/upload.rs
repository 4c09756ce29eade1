use actix_multipart::form::{bytes::Bytes, text::Text, MultipartForm};
use serde::Serialize;

use crate::entities::asset::AssetLocation;

/// `POST /api/upload` body. Every field is optional at this layer so the
/// token check decides the outcome, not the extractor.
#[derive(Debug, MultipartForm)]
pub struct UploadForm {
    pub token: Option<Text<String>>,

    pub file: Option<Bytes>,

    #[multipart(rename = "process[]")]
    pub process: Vec<Text<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub token: String,
    pub data: Vec<u8>,
    pub directives: Vec<String>,
}

impl From<UploadForm> for UploadRequest {
    fn from(form: UploadForm) -> Self {
        UploadRequest {
            token: form.token.map(|token| token.0).unwrap_or_default(),
            data: form.file.map(|file| file.data.to_vec()).unwrap_or_default(),
            directives: form.process.into_iter().map(|directive| directive.0).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadedAsset {
    pub location: AssetLocation,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub path: String,
}

impl From<&UploadedAsset> for UploadResponse {
    fn from(asset: &UploadedAsset) -> Self {
        UploadResponse {
            path: asset.location.public_path(),
        }
    }
}
