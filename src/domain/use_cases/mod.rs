pub mod access;
pub mod derivative;
pub mod extractors;
pub mod upload;
