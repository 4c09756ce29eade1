pub mod images;
pub mod json_error;
pub mod system;
pub mod upload;
