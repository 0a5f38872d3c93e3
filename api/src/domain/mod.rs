pub mod currency;
pub mod short_links;
pub mod text_tools;
pub mod transcript;
