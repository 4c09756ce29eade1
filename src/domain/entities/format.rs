use std::fmt;

use serde::Serialize;

/// Encodings every asset is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpg,
    Webp,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 2] = [ImageFormat::Jpg, ImageFormat::Webp];

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpg => "jpg",
            ImageFormat::Webp => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpg => "image/jpeg",
            ImageFormat::Webp => "image/webp",
        }
    }

    /// WebP when the client advertises it, JPEG otherwise.
    pub fn negotiate(accept: Option<&str>) -> Self {
        match accept {
            Some(value) if value.contains("image/webp") => ImageFormat::Webp,
            _ => ImageFormat::Jpg,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negotiation_prefers_webp_only_when_advertised() {
        assert_eq!(
            ImageFormat::negotiate(Some("image/avif,image/webp,*/*;q=0.8")),
            ImageFormat::Webp
        );
        assert_eq!(ImageFormat::negotiate(Some("image/png,*/*")), ImageFormat::Jpg);
        assert_eq!(ImageFormat::negotiate(None), ImageFormat::Jpg);
    }
}
