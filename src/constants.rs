use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Widths that get a cached derivative. Any other width serves the canonical image.
pub const WIDTH_BUCKETS: [u32; 4] = [64, 128, 256, 512];

pub const DEFAULT_MAX_EDGE: u32 = 1000;

/// Largest side a resize directive may ask for.
pub const DEFAULT_MAX_TARGET_EDGE: u32 = 8192;

pub const CANONICAL_STEM: &str = "image";
