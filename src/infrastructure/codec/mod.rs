//! Image codec seam.
//!
//! The upload pipeline and the derivative resolver only talk to
//! [`ImageCodec`]; the production implementation is [`ImageRsCodec`] on top
//! of the `image` crate. Every call owns the image handle it receives and
//! returns a new one, so nothing is shared between requests.
//!
//! | Operation | `ImageRsCodec` |
//! |---|---|
//! | decode | `image::load_from_memory` |
//! | dimensions | `ImageReader::into_dimensions` (header only) |
//! | resize | `resize_exact` with `Lanczos3` |
//! | extract | `crop_imm` after a bounds check |
//! | encode | `JpegEncoder` (quality) / lossless `WebPEncoder` |

mod image_rs;

use derive_more::Display;
use image::DynamicImage;

use crate::entities::{derivative::Renditions, format::ImageFormat};

pub use image_rs::ImageRsCodec;

#[derive(Debug, Display, Clone, PartialEq)]
pub enum CodecError {
    #[display("{_0}")]
    Decode(String),

    #[display("{_0}")]
    Encode(String),

    #[display("{_0}")]
    OutOfBounds(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Rectangle taken out of an image by an extract directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

pub trait ImageCodec: Send + Sync + 'static {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError>;

    /// Reads the size from the header without decoding pixels.
    fn dimensions(&self, bytes: &[u8]) -> Result<Dimensions, CodecError>;

    /// `0` on one side keeps the aspect ratio; `(0, 0)` leaves the image untouched.
    fn resize(&self, image: DynamicImage, width: u32, height: u32) -> Result<DynamicImage, CodecError>;

    fn extract(&self, image: DynamicImage, region: Region) -> Result<DynamicImage, CodecError>;

    fn encode(&self, image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, CodecError>;
}

/// Encodes one image into every stored format.
pub fn encode_renditions<C: ImageCodec + ?Sized>(codec: &C, image: &DynamicImage) -> Result<Renditions, CodecError> {
    Ok(Renditions {
        jpg: codec.encode(image, ImageFormat::Jpg)?,
        webp: codec.encode(image, ImageFormat::Webp)?,
    })
}

/// Resolves a requested `(width, height)` against the source size.
///
/// Returns `None` when no resize is needed.
pub fn scaled_dimensions(source: Dimensions, width: u32, height: u32) -> Option<Dimensions> {
    let scale = |side: u32, from: u32, to: u32| -> u32 {
        ((side as f64 * to as f64 / from.max(1) as f64).round() as u32).max(1)
    };

    let target = match (width, height) {
        (0, 0) => return None,
        (w, 0) => Dimensions { width: w, height: scale(source.height, source.width, w) },
        (0, h) => Dimensions { width: scale(source.width, source.height, h), height: h },
        (w, h) => Dimensions { width: w, height: h },
    };

    (target != source).then_some(target)
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode,
        Dimensions,
        Resize { width: u32, height: u32 },
        Extract(Region),
        Encode(ImageFormat),
    }

    /// Wraps the real codec and records every call. Mutex keeps it `Sync`
    /// so it can be shared across blocking tasks.
    #[derive(Default)]
    pub struct RecordingCodec {
        inner: ImageRsCodec,
        operations: Mutex<Vec<RecordedOp>>,
        fail_encode: Option<ImageFormat>,
    }

    impl RecordingCodec {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_encode(format: ImageFormat) -> Self {
            Self {
                fail_encode: Some(format),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn count(&self, matches: impl Fn(&RecordedOp) -> bool) -> usize {
            self.get_operations().iter().filter(|op| matches(op)).count()
        }

        fn record(&self, op: RecordedOp) {
            self.operations.lock().unwrap().push(op);
        }
    }

    impl ImageCodec for RecordingCodec {
        fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError> {
            self.record(RecordedOp::Decode);
            self.inner.decode(bytes)
        }

        fn dimensions(&self, bytes: &[u8]) -> Result<Dimensions, CodecError> {
            self.record(RecordedOp::Dimensions);
            self.inner.dimensions(bytes)
        }

        fn resize(&self, image: DynamicImage, width: u32, height: u32) -> Result<DynamicImage, CodecError> {
            self.record(RecordedOp::Resize { width, height });
            self.inner.resize(image, width, height)
        }

        fn extract(&self, image: DynamicImage, region: Region) -> Result<DynamicImage, CodecError> {
            self.record(RecordedOp::Extract(region));
            self.inner.extract(image, region)
        }

        fn encode(&self, image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, CodecError> {
            self.record(RecordedOp::Encode(format));
            if self.fail_encode == Some(format) {
                return Err(CodecError::Encode(format!("{} encoder unavailable", format)));
            }
            self.inner.encode(image, format)
        }
    }

    #[test]
    fn scaled_dimensions_keeps_aspect_for_single_side() {
        let source = Dimensions { width: 2000, height: 1000 };
        assert_eq!(
            scaled_dimensions(source, 1000, 0),
            Some(Dimensions { width: 1000, height: 500 })
        );
        assert_eq!(
            scaled_dimensions(source, 0, 250),
            Some(Dimensions { width: 500, height: 250 })
        );
    }

    #[test]
    fn scaled_dimensions_exact_and_noop() {
        let source = Dimensions { width: 10, height: 10 };
        assert_eq!(scaled_dimensions(source, 0, 0), None);
        assert_eq!(scaled_dimensions(source, 10, 10), None);
        assert_eq!(
            scaled_dimensions(source, 20, 5),
            Some(Dimensions { width: 20, height: 5 })
        );
    }

    #[test]
    fn scaled_dimensions_never_collapses_to_zero() {
        let source = Dimensions { width: 1000, height: 1 };
        assert_eq!(
            scaled_dimensions(source, 64, 0),
            Some(Dimensions { width: 64, height: 1 })
        );
    }
}
