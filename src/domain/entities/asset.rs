use std::{fmt, path::PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::constants::CANONICAL_STEM;
use crate::entities::format::ImageFormat;

const MAX_ID_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn generate() -> Self {
        AssetId(Uuid::new_v4().simple().to_string())
    }

    /// Accepts ids that are safe to use as a single path segment.
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_ID_LENGTH
            && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        valid.then(|| AssetId(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Upload date. Only used to partition storage paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AssetDate {
    pub year: u32,
    pub month: u32,
    pub day: u32,
}

impl From<NaiveDate> for AssetDate {
    fn from(date: NaiveDate) -> Self {
        AssetDate {
            year: date.year().max(0) as u32,
            month: date.month(),
            day: date.day(),
        }
    }
}

/// Hierarchical address of one canonical asset and its derivatives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AssetLocation {
    pub date: AssetDate,
    pub id: AssetId,
}

impl AssetLocation {
    pub fn new(date: AssetDate, id: AssetId) -> Self {
        AssetLocation { date, id }
    }

    /// Builds a location from the four URL path segments of a fetch request.
    pub fn from_segments(year: &str, month: &str, day: &str, id: &str) -> Option<Self> {
        Some(AssetLocation {
            date: AssetDate {
                year: parse_segment(year)?,
                month: parse_segment(month)?,
                day: parse_segment(day)?,
            },
            id: AssetId::parse(id)?,
        })
    }

    pub fn public_path(&self) -> String {
        format!(
            "/{}/{}/{}/{}",
            self.date.year, self.date.month, self.date.day, self.id
        )
    }

    /// Directory of the asset relative to the storage root.
    pub fn relative_dir(&self) -> PathBuf {
        [
            self.date.year.to_string(),
            self.date.month.to_string(),
            self.date.day.to_string(),
            self.id.to_string(),
        ]
        .iter()
        .collect()
    }

    pub fn canonical_file_name(format: ImageFormat) -> String {
        format!("{}.{}", CANONICAL_STEM, format.extension())
    }

    pub fn derivative_file_name(width: u32, format: ImageFormat) -> String {
        format!("{}.{}", width, format.extension())
    }
}

impl fmt::Display for AssetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.public_path())
    }
}

fn parse_segment(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
