use crate::{constants::WIDTH_BUCKETS, entities::format::ImageFormat};

/// Where the bytes of a fetch response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOrigin {
    Cached,
    Synthesized,
    Canonical,
}

#[derive(Debug, Clone)]
pub struct ResolvedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub origin: ImageOrigin,
}

impl ResolvedImage {
    pub fn new(bytes: Vec<u8>, format: ImageFormat, origin: ImageOrigin) -> Self {
        ResolvedImage { bytes, format, origin }
    }
}

/// Both encodings of one image, ready to be written.
#[derive(Debug, Clone)]
pub struct Renditions {
    pub jpg: Vec<u8>,
    pub webp: Vec<u8>,
}

impl Renditions {
    pub fn get(&self, format: ImageFormat) -> &[u8] {
        match format {
            ImageFormat::Jpg => &self.jpg,
            ImageFormat::Webp => &self.webp,
        }
    }

    pub fn into_format(self, format: ImageFormat) -> Vec<u8> {
        match format {
            ImageFormat::Jpg => self.jpg,
            ImageFormat::Webp => self.webp,
        }
    }
}

/// Returns the width when it is one of the cacheable buckets.
pub fn cacheable_width(width: Option<u32>) -> Option<u32> {
    width.filter(|w| WIDTH_BUCKETS.contains(w))
}
