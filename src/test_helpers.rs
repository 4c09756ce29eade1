//! Shared fixtures for unit tests.

use std::{io::Cursor, path::Path};

use image::{Rgb, RgbImage};

use crate::{
    entities::asset::{AssetDate, AssetId, AssetLocation},
    settings::{AppConfig, AppEnvironment},
};

/// A gradient PNG so resized and cropped output is not uniform.
pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, image::ImageFormat::Png)
        .expect("encode sample png");
    buffer.into_inner()
}

pub fn sample_location() -> AssetLocation {
    AssetLocation::new(
        AssetDate { year: 2024, month: 5, day: 9 },
        AssetId::parse("fixture0asset").expect("valid id"),
    )
}

/// Valid config rooted at `storage_root`, with a fixed upload token.
pub fn test_config(storage_root: &Path, referers: &[&str]) -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "media-test".into(),
        port: 0,
        host: "127.0.0.1".into(),
        worker_count: 1,
        upload_token: "test-token".into(),
        referers: referers.iter().map(|r| r.to_string()).collect(),
        storage_root: storage_root.to_path_buf(),
        max_upload_bytes: 1024 * 1024,
        max_edge: 1000,
        max_target_edge: 8192,
        jpeg_quality: 85,
    }
}
