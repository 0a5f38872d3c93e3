pub mod error;
pub mod image_gen;
pub mod media_tools;
pub mod rate_limit;
pub mod youtube;
