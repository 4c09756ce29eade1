use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use derive_more::Display;

use crate::codec::CodecError;

pub const NOT_FOUND_MESSAGE: &str = "image not found";

#[derive(Debug, Display)]
pub enum MediaError {
    #[display("Token not found")]
    Unauthorized,

    #[display("Invalid image: {_0}")]
    InvalidImage(String),

    #[display("Dimension error: {_0}")]
    DimensionError(String),

    #[display("Decode error: {_0}")]
    DecodeError(String),

    #[display("Encode error: {_0}")]
    EncodeError(String),

    #[display("image not found")]
    NotFound,

    #[display("Bad request: {_0}")]
    BadRequest(String),

    #[display("Storage error: {_0}")]
    Storage(String),

    #[display("Internal server error: {_0}")]
    Internal(String),
}

impl ResponseError for MediaError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(serde_json::json!({"error": self.to_string()}))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            MediaError::Unauthorized => StatusCode::FORBIDDEN,
            MediaError::NotFound => StatusCode::NOT_FOUND,
            MediaError::BadRequest(_) => StatusCode::BAD_REQUEST,
            MediaError::InvalidImage(_)
            | MediaError::DimensionError(_)
            | MediaError::DecodeError(_)
            | MediaError::EncodeError(_)
            | MediaError::Storage(_)
            | MediaError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl MediaError {
    /// Fetch routes never reveal why an image is unavailable.
    pub fn to_fetch_response(&self) -> HttpResponse {
        MediaError::NotFound.error_response()
    }
}

impl From<std::io::Error> for MediaError {
    fn from(err: std::io::Error) -> Self {
        MediaError::Storage(err.to_string())
    }
}

impl From<CodecError> for MediaError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Decode(msg) => MediaError::DecodeError(msg),
            CodecError::Encode(msg) => MediaError::EncodeError(msg),
            CodecError::OutOfBounds(msg) => MediaError::DimensionError(msg),
        }
    }
}

impl From<actix_multipart::MultipartError> for MediaError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        MediaError::BadRequest(err.to_string())
    }
}

impl From<tokio::task::JoinError> for MediaError {
    fn from(err: tokio::task::JoinError) -> Self {
        MediaError::Internal(format!("background task failed: {}", err))
    }
}
