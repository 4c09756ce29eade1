use actix_web::{http::header::ACCEPT, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use std::convert::Infallible;

use crate::entities::format::ImageFormat;

/// Response encoding picked from the `Accept` header.
/// Usage: Add `format: NegotiatedFormat` as a parameter to your handler function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiatedFormat(pub ImageFormat);

impl FromRequest for NegotiatedFormat {
    type Error = Infallible;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let accept = req
            .headers()
            .get(ACCEPT)
            .and_then(|value| value.to_str().ok());

        ready(Ok(NegotiatedFormat(ImageFormat::negotiate(accept))))
    }
}
