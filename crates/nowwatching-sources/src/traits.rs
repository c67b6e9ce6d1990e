use crate::error::SourceError;
use crate::tmdb::{ImageSet, ImageTarget};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;

/// A successful API response. `body` is `None` when the server sent no content.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Option<serde_json::Value>) -> Self {
        Self { status, headers, body }
    }

    /// Header value as a string; non-UTF-8 values are treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<Option<T>, SourceError> {
        match &self.body {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }
}

/// Issues requests against the Trakt API with a valid bearer token.
///
/// Implementations keep the token fresh and add the API version and
/// application headers; callers only supply the method and path.
#[async_trait]
pub trait AuthenticatedRequest: Send + Sync {
    async fn request(&self, method: Method, path: &str) -> Result<ApiResponse, SourceError>;
}

/// Artwork lookups against the image catalog.
#[async_trait]
pub trait ImageCatalog: Send + Sync {
    /// Full lookup URL for `target`. Equal URLs identify the same artwork.
    fn lookup_url(&self, target: &ImageTarget) -> String;

    async fn fetch_images(&self, url: &str) -> Result<ImageSet, SourceError>;

    /// Fixed-size display URL for an image `file_path` from the catalog.
    fn display_url(&self, file_path: &str) -> String;
}
