pub mod codec;
pub mod locks;
pub mod utils;
