use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;

#[cfg(test)]
mod test_helpers;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{codec, locks, utils};

use codec::ImageRsCodec;
use repositories::asset_store::FsAssetStore;
use use_cases::{access::AccessGuard, derivative::DerivativeResolver, upload::UploadHandler};

pub struct AppState {
    pub upload_handler: AppUploadHandler,
    pub derivative_resolver: AppDerivativeResolver,
    pub access_guard: AccessGuard,
    pub store: Arc<FsAssetStore>,
}

pub type AppUploadHandler = UploadHandler<FsAssetStore, ImageRsCodec>;
pub type AppDerivativeResolver = DerivativeResolver<FsAssetStore, ImageRsCodec>;

impl AppState {
    pub fn new(config: &settings::AppConfig) -> Self {
        let store = Arc::new(FsAssetStore::new(config.storage_root.clone()));
        let codec = Arc::new(ImageRsCodec::new(config.jpeg_quality));

        let upload_handler = UploadHandler::new(
            Arc::clone(&store),
            Arc::clone(&codec),
            config.upload_token.clone(),
            config.max_edge,
        )
        .with_max_target_edge(config.max_target_edge);
        let derivative_resolver = DerivativeResolver::new(Arc::clone(&store), codec);

        AppState {
            upload_handler,
            derivative_resolver,
            access_guard: AccessGuard::new(config.allowed_referers()),
            store,
        }
    }
}
