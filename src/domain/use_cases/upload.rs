use std::sync::Arc;

use chrono::Utc;

use crate::{
    codec::{encode_renditions, scaled_dimensions, Dimensions, ImageCodec, Region},
    constants::DEFAULT_MAX_TARGET_EDGE,
    entities::{
        asset::{AssetDate, AssetId, AssetLocation},
        derivative::Renditions,
        directive::Directive,
        upload::{UploadRequest, UploadedAsset},
    },
    errors::MediaError,
    repositories::asset_store::AssetStore,
    utils::image_sniff::looks_like_image,
};

pub struct UploadHandler<S, C>
where
    S: AssetStore,
    C: ImageCodec,
{
    pub store: Arc<S>,
    codec: Arc<C>,
    token: String,
    max_edge: u32,
    max_target_edge: u32,
}

impl<S, C> UploadHandler<S, C>
where
    S: AssetStore,
    C: ImageCodec,
{
    pub fn new(store: Arc<S>, codec: Arc<C>, token: impl Into<String>, max_edge: u32) -> Self {
        UploadHandler {
            store,
            codec,
            token: token.into(),
            max_edge,
            max_target_edge: DEFAULT_MAX_TARGET_EDGE,
        }
    }

    pub fn with_max_target_edge(mut self, max_target_edge: u32) -> Self {
        self.max_target_edge = max_target_edge;
        self
    }

    /// Validates, transforms and stores one uploaded image.
    ///
    /// The token is checked before anything else; a rejected upload never
    /// reaches the codec or the store.
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadedAsset, MediaError> {
        if request.token != self.token {
            tracing::warn!("upload rejected: token mismatch");
            return Err(MediaError::Unauthorized);
        }

        if !looks_like_image(&request.data) {
            return Err(MediaError::InvalidImage("file is empty or not an image".to_string()));
        }

        let directives = Directive::parse_all(&request.directives);
        let codec = Arc::clone(&self.codec);
        let (max_edge, max_target_edge) = (self.max_edge, self.max_target_edge);
        let data = request.data;

        let (renditions, dimensions) = tokio::task::spawn_blocking(move || {
            transform(codec.as_ref(), &data, &directives, max_edge, max_target_edge)
        })
        .await??;

        let location = AssetLocation::new(AssetDate::from(Utc::now().date_naive()), AssetId::generate());

        // Detached so a dropped connection cannot stop the write halfway.
        let store = Arc::clone(&self.store);
        let target = location.clone();
        tokio::spawn(async move { store.create_asset(&target, &renditions).await }).await??;

        tracing::info!(
            %location,
            width = dimensions.width,
            height = dimensions.height,
            "stored uploaded image"
        );

        Ok(UploadedAsset {
            location,
            width: dimensions.width,
            height: dimensions.height,
        })
    }
}

/// Target size before any directive runs. `0` on a side keeps the aspect
/// ratio and `(0, 0)` leaves the image as it is.
pub fn default_target(source: Dimensions, max_edge: u32) -> (u32, u32) {
    if source.width >= source.height && source.width > max_edge {
        (max_edge, 0)
    } else if source.height >= source.width && source.height > max_edge {
        (0, max_edge)
    } else {
        (0, 0)
    }
}

/// Decodes, applies directives in order, resizes once and encodes.
fn transform<C: ImageCodec + ?Sized>(
    codec: &C,
    data: &[u8],
    directives: &[Directive],
    max_edge: u32,
    max_target_edge: u32,
) -> Result<(Renditions, Dimensions), MediaError> {
    let mut image = codec
        .decode(data)
        .map_err(|e| MediaError::InvalidImage(e.to_string()))?;

    let source = Dimensions {
        width: image.width(),
        height: image.height(),
    };
    let (mut width, mut height) = default_target(source, max_edge);

    for directive in directives {
        match *directive {
            Directive::Extract { x, y, width: w, height: h } => {
                if w == 0 || h == 0 {
                    return Err(MediaError::DimensionError(format!(
                        "extract needs a positive size, got {}x{}",
                        w, h
                    )));
                }
                image = codec.extract(image, Region { x, y, width: w, height: h })?;
            }
            Directive::Resize { width: w, height: h } => {
                width = w;
                height = h;
            }
        }
    }

    let current = Dimensions {
        width: image.width(),
        height: image.height(),
    };
    if let Some(target) = scaled_dimensions(current, width, height) {
        if target.width > max_target_edge || target.height > max_target_edge {
            return Err(MediaError::DimensionError(format!(
                "resize target {}x{} exceeds {}px",
                target.width, target.height, max_target_edge
            )));
        }
    }

    let image = codec.resize(image, width, height)?;
    let renditions = encode_renditions(codec, &image)?;

    Ok((
        renditions,
        Dimensions {
            width: image.width(),
            height: image.height(),
        },
    ))
}
