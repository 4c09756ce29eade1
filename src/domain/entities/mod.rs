pub mod asset;
pub mod derivative;
pub mod directive;
pub mod format;
pub mod upload;
