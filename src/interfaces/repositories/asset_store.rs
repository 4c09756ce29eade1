use std::{io::ErrorKind, path::{Path, PathBuf}};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use crate::{
    entities::{asset::AssetLocation, derivative::Renditions, format::ImageFormat},
    errors::MediaError,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetStore: Send + Sync + 'static {
    /// Persists a new canonical asset. Either every encoding lands or the
    /// asset directory is removed again.
    async fn create_asset(&self, location: &AssetLocation, renditions: &Renditions) -> Result<(), MediaError>;

    /// Reads the canonical image; `None` when the asset or format is missing.
    async fn read_canonical(&self, location: &AssetLocation, format: ImageFormat) -> Result<Option<Vec<u8>>, MediaError>;

    async fn read_derivative(&self, location: &AssetLocation, width: u32, format: ImageFormat) -> Result<Option<Vec<u8>>, MediaError>;

    /// Publishes both encodings of a derivative. Each file appears atomically.
    async fn write_derivative(&self, location: &AssetLocation, width: u32, renditions: &Renditions) -> Result<(), MediaError>;
}

/// Local filesystem tree: `{root}/{year}/{month}/{day}/{id}/{image|width}.{ext}`.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsAssetStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn asset_dir(&self, location: &AssetLocation) -> PathBuf {
        self.root.join(location.relative_dir())
    }

    pub fn canonical_path(&self, location: &AssetLocation, format: ImageFormat) -> PathBuf {
        self.asset_dir(location)
            .join(AssetLocation::canonical_file_name(format))
    }

    pub fn derivative_path(&self, location: &AssetLocation, width: u32, format: ImageFormat) -> PathBuf {
        self.asset_dir(location)
            .join(AssetLocation::derivative_file_name(width, format))
    }

    /// Writes the canonical files into `dir`, removing `dir` when any of
    /// them fails.
    async fn populate_asset_dir(&self, location: &AssetLocation, dir: &Path, renditions: &Renditions) -> Result<(), MediaError> {
        let paths = ImageFormat::ALL.map(|format| {
            (self.canonical_path(location, format), renditions.get(format))
        });

        if let Err(e) = self.write_renditions(paths).await {
            tracing::warn!(%location, error = %e, "canonical write failed, removing asset directory");
            if let Err(cleanup) = fs::remove_dir_all(dir).await {
                tracing::error!(path = %dir.display(), error = %cleanup, "failed to remove partial asset");
            }
            return Err(e);
        }

        Ok(())
    }

    async fn write_renditions(&self, paths: [(PathBuf, &[u8]); 2]) -> Result<(), MediaError> {
        for (path, bytes) in paths {
            write_atomic(&path, bytes).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn create_asset(&self, location: &AssetLocation, renditions: &Renditions) -> Result<(), MediaError> {
        let dir = self.asset_dir(location);
        if let Some(parent) = dir.parent() {
            fs::create_dir_all(parent).await?;
        }
        // A fresh directory per asset; an existing one is never written into.
        fs::create_dir(&dir).await?;

        self.populate_asset_dir(location, &dir, renditions).await
    }

    async fn read_canonical(&self, location: &AssetLocation, format: ImageFormat) -> Result<Option<Vec<u8>>, MediaError> {
        read_optional(&self.canonical_path(location, format)).await
    }

    async fn read_derivative(&self, location: &AssetLocation, width: u32, format: ImageFormat) -> Result<Option<Vec<u8>>, MediaError> {
        read_optional(&self.derivative_path(location, width, format)).await
    }

    async fn write_derivative(&self, location: &AssetLocation, width: u32, renditions: &Renditions) -> Result<(), MediaError> {
        let paths = ImageFormat::ALL.map(|format| {
            (self.derivative_path(location, width, format), renditions.get(format))
        });
        self.write_renditions(paths).await
    }
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, MediaError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Writes to a hidden sibling and renames it over `path`, so readers see
/// either nothing or the complete file.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), MediaError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| MediaError::Storage(format!("invalid target path {}", path.display())))?;
    let staging = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

    let published = match fs::write(&staging, bytes).await {
        Ok(()) => fs::rename(&staging, path).await,
        Err(e) => Err(e),
    };

    if let Err(e) = published {
        if let Err(cleanup) = fs::remove_file(&staging).await {
            tracing::debug!(path = %staging.display(), error = %cleanup, "failed to remove staging file");
        }
        return Err(e.into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_location;
    use tempfile::TempDir;

    fn renditions() -> Renditions {
        Renditions {
            jpg: b"jpeg-bytes".to_vec(),
            webp: b"webp-bytes".to_vec(),
        }
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn create_asset_writes_both_formats() {
        let tmp = TempDir::new().unwrap();
        let store = FsAssetStore::new(tmp.path());
        let location = sample_location();

        store.create_asset(&location, &renditions()).await.unwrap();

        assert_eq!(
            file_names(&store.asset_dir(&location)),
            vec!["image.jpg", "image.webp"]
        );
        assert_eq!(
            store.read_canonical(&location, ImageFormat::Webp).await.unwrap(),
            Some(b"webp-bytes".to_vec())
        );
        assert!(store.asset_dir(&location).ends_with("2024/5/9/fixture0asset"));
    }

    #[tokio::test]
    async fn create_asset_refuses_existing_directory() {
        let tmp = TempDir::new().unwrap();
        let store = FsAssetStore::new(tmp.path());
        let location = sample_location();
        store.create_asset(&location, &renditions()).await.unwrap();

        let second = Renditions { jpg: b"other".to_vec(), webp: b"other".to_vec() };
        let result = store.create_asset(&location, &second).await;

        assert!(matches!(result, Err(MediaError::Storage(_))));
        assert_eq!(
            store.read_canonical(&location, ImageFormat::Jpg).await.unwrap(),
            Some(b"jpeg-bytes".to_vec())
        );
    }

    #[tokio::test]
    async fn failed_canonical_write_removes_asset_directory() {
        let tmp = TempDir::new().unwrap();
        let store = FsAssetStore::new(tmp.path());
        let location = sample_location();
        let dir = store.asset_dir(&location);
        // The JPEG lands, then the WebP rename hits a non-empty directory.
        std::fs::create_dir_all(dir.join("image.webp").join("occupied")).unwrap();

        let result = store.populate_asset_dir(&location, &dir, &renditions()).await;

        assert!(matches!(result, Err(MediaError::Storage(_))));
        assert!(!dir.exists());
        assert!(file_names(dir.parent().unwrap()).is_empty());
    }

    #[tokio::test]
    async fn missing_files_read_as_none() {
        let tmp = TempDir::new().unwrap();
        let store = FsAssetStore::new(tmp.path());
        let location = sample_location();

        assert_eq!(store.read_canonical(&location, ImageFormat::Jpg).await.unwrap(), None);
        assert_eq!(store.read_derivative(&location, 64, ImageFormat::Jpg).await.unwrap(), None);
    }

    #[tokio::test]
    async fn derivatives_are_published_without_staging_leftovers() {
        let tmp = TempDir::new().unwrap();
        let store = FsAssetStore::new(tmp.path());
        let location = sample_location();
        store.create_asset(&location, &renditions()).await.unwrap();

        store.write_derivative(&location, 128, &renditions()).await.unwrap();

        assert_eq!(
            file_names(&store.asset_dir(&location)),
            vec!["128.jpg", "128.webp", "image.jpg", "image.webp"]
        );
        assert_eq!(
            store.read_derivative(&location, 128, ImageFormat::Jpg).await.unwrap(),
            Some(b"jpeg-bytes".to_vec())
        );
    }

    #[tokio::test]
    async fn derivative_write_fails_when_asset_is_missing() {
        let tmp = TempDir::new().unwrap();
        let store = FsAssetStore::new(tmp.path());

        let result = store.write_derivative(&sample_location(), 64, &renditions()).await;

        assert!(matches!(result, Err(MediaError::Storage(_))));
        assert!(file_names(tmp.path()).is_empty());
    }
}
