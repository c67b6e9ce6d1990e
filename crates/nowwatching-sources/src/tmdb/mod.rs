pub mod api;
pub mod client;

pub use api::{ImageSet, ImageTarget, TmdbImage};
pub use client::TmdbClient;
