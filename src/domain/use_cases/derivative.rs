use std::sync::Arc;

use crate::{
    codec::{encode_renditions, ImageCodec},
    entities::{
        asset::AssetLocation,
        derivative::{cacheable_width, ImageOrigin, ResolvedImage},
        format::ImageFormat,
    },
    errors::MediaError,
    locks::synthesis_locks::{SynthesisKey, SynthesisLocks},
    repositories::asset_store::AssetStore,
};

/// Serves canonical images and width-bucketed derivatives, synthesizing a
/// derivative the first time it is asked for.
pub struct DerivativeResolver<S, C>
where
    S: AssetStore,
    C: ImageCodec,
{
    store: Arc<S>,
    codec: Arc<C>,
    locks: SynthesisLocks,
}

impl<S, C> Clone for DerivativeResolver<S, C>
where
    S: AssetStore,
    C: ImageCodec,
{
    fn clone(&self) -> Self {
        DerivativeResolver {
            store: Arc::clone(&self.store),
            codec: Arc::clone(&self.codec),
            locks: self.locks.clone(),
        }
    }
}

impl<S, C> DerivativeResolver<S, C>
where
    S: AssetStore,
    C: ImageCodec,
{
    pub fn new(store: Arc<S>, codec: Arc<C>) -> Self {
        DerivativeResolver {
            store,
            codec,
            locks: SynthesisLocks::new(),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.locks.in_flight()
    }

    pub async fn resolve(
        &self,
        location: &AssetLocation,
        width: Option<u32>,
        format: ImageFormat,
    ) -> Result<ResolvedImage, MediaError> {
        let Some(width) = cacheable_width(width) else {
            return self.canonical(location, format).await;
        };

        if let Some(bytes) = self.store.read_derivative(location, width, format).await? {
            return Ok(ResolvedImage::new(bytes, format, ImageOrigin::Cached));
        }

        let key = SynthesisKey {
            location: location.clone(),
            width,
        };
        // Runs to completion even if the requesting client goes away.
        let resolver = self.clone();
        tokio::spawn(async move { resolver.synthesize(key, format).await }).await?
    }

    async fn canonical(&self, location: &AssetLocation, format: ImageFormat) -> Result<ResolvedImage, MediaError> {
        self.store
            .read_canonical(location, format)
            .await?
            .map(|bytes| ResolvedImage::new(bytes, format, ImageOrigin::Canonical))
            .ok_or(MediaError::NotFound)
    }

    async fn synthesize(&self, key: SynthesisKey, format: ImageFormat) -> Result<ResolvedImage, MediaError> {
        let _permit = self.locks.acquire(key.clone()).await;
        let SynthesisKey { location, width } = key;

        // Another task may have finished this width while we waited.
        if let Some(bytes) = self.store.read_derivative(&location, width, format).await? {
            return Ok(ResolvedImage::new(bytes, format, ImageOrigin::Cached));
        }

        let canonical = self.canonical(&location, format).await?;
        let original = self.codec.dimensions(&canonical.bytes)?;
        if width > original.width {
            tracing::debug!(%location, width, original = original.width, "requested width exceeds original");
            return Ok(canonical);
        }

        let source = match format {
            ImageFormat::Jpg => canonical.bytes,
            _ => self
                .store
                .read_canonical(&location, ImageFormat::Jpg)
                .await?
                .ok_or(MediaError::NotFound)?,
        };

        let codec = Arc::clone(&self.codec);
        let renditions = tokio::task::spawn_blocking(move || {
            let image = codec.decode(&source)?;
            let image = codec.resize(image, width, 0)?;
            encode_renditions(codec.as_ref(), &image)
        })
        .await??;

        self.store.write_derivative(&location, width, &renditions).await?;
        tracing::info!(%location, width, "synthesized derivative");

        Ok(ResolvedImage::new(renditions.into_format(format), format, ImageOrigin::Synthesized))
    }
}
