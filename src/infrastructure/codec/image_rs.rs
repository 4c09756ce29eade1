use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};

use super::{scaled_dimensions, CodecError, Dimensions, ImageCodec, Region};
use crate::entities::format::ImageFormat;

const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Pure Rust codec backed by the `image` crate.
#[derive(Debug, Clone)]
pub struct ImageRsCodec {
    jpeg_quality: u8,
}

impl ImageRsCodec {
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }
}

impl Default for ImageRsCodec {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl ImageCodec for ImageRsCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError> {
        image::load_from_memory(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }

    fn dimensions(&self, bytes: &[u8]) -> Result<Dimensions, CodecError> {
        let (width, height) = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode(e.to_string()))?
            .into_dimensions()
            .map_err(|e| CodecError::Decode(e.to_string()))?;

        Ok(Dimensions { width, height })
    }

    fn resize(&self, image: DynamicImage, width: u32, height: u32) -> Result<DynamicImage, CodecError> {
        let source = Dimensions {
            width: image.width(),
            height: image.height(),
        };

        match scaled_dimensions(source, width, height) {
            Some(target) => Ok(image.resize_exact(target.width, target.height, FilterType::Lanczos3)),
            None => Ok(image),
        }
    }

    fn extract(&self, image: DynamicImage, region: Region) -> Result<DynamicImage, CodecError> {
        let fits_x = region.x.checked_add(region.width).is_some_and(|end| end <= image.width());
        let fits_y = region.y.checked_add(region.height).is_some_and(|end| end <= image.height());

        if region.width == 0 || region.height == 0 || !fits_x || !fits_y {
            return Err(CodecError::OutOfBounds(format!(
                "region {}x{}+{}+{} does not fit a {}x{} image",
                region.width, region.height, region.x, region.y, image.width(), image.height()
            )));
        }

        Ok(image.crop_imm(region.x, region.y, region.width, region.height))
    }

    fn encode(&self, image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, CodecError> {
        let mut bytes = Vec::new();

        // JPEG has no alpha channel; WebP keeps it.
        let result = match format {
            ImageFormat::Jpg => DynamicImage::ImageRgb8(image.to_rgb8())
                .write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, self.jpeg_quality)),
            ImageFormat::Webp => DynamicImage::ImageRgba8(image.to_rgba8())
                .write_with_encoder(WebPEncoder::new_lossless(&mut bytes)),
        };

        result.map_err(|e| CodecError::Encode(format!("{}: {}", format, e)))?;
        Ok(bytes)
    }
}
