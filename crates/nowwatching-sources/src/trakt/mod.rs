pub mod api;
pub mod auth;
pub mod client;

pub use api::UserProfile;
pub use client::{TraktClient, API_URL};
