use crate::error::SourceError;
use crate::tmdb::api::{ImageSet, ImageTarget};
use crate::trakt::auth::{create_http_client, USER_AGENT};
use crate::traits::ImageCatalog;
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::time::Duration;
use tracing::debug;

pub const TMDB_API_URL: &str = "https://api.themoviedb.org/3";
/// Display size used for every attached image.
pub const TMDB_IMAGE_URL: &str = "https://image.tmdb.org/t/p/w780";

/// The Movie Database image catalog.
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
    image_base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self {
            client: create_http_client(timeout),
            api_key,
            base_url: TMDB_API_URL.to_string(),
            image_base_url: TMDB_IMAGE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ImageCatalog for TmdbClient {
    fn lookup_url(&self, target: &ImageTarget) -> String {
        format!("{}{}", self.base_url, target.path())
    }

    async fn fetch_images(&self, url: &str) -> Result<ImageSet, SourceError> {
        if self.api_key.trim().is_empty() {
            return Err(SourceError::Config("TMDB api_key is empty".to_string()));
        }

        debug!(operation = "tmdb_images", url, "Fetching TMDB images");
        let response = self
            .client
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                method: Method::GET,
                url: url.to_string(),
                status,
                headers,
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn display_url(&self, file_path: &str) -> String {
        format!("{}{}", self.image_base_url, file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_blank_api_key_is_config_error() {
        let client = TmdbClient::new("  ".to_string(), Duration::from_secs(5)).with_base_url("http://127.0.0.1:9");
        let url = client.lookup_url(&ImageTarget::Show { tmdb_id: 1396 });
        let err = client.fetch_images(&url).await.unwrap_err();
        assert!(matches!(err, SourceError::Config(_)));
    }

    #[tokio::test]
    async fn test_fetch_images_sends_api_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/movie/603/images")
            .match_query(Matcher::UrlEncoded("api_key".into(), "tmdb-key".into()))
            .match_header("user-agent", USER_AGENT)
            .with_status(200)
            .with_body(r#"{"id":603,"backdrops":[],"posters":[{"file_path":"/poster.jpg"}]}"#)
            .create_async()
            .await;

        let client = TmdbClient::new("tmdb-key".to_string(), Duration::from_secs(5)).with_base_url(server.url());
        let url = client.lookup_url(&ImageTarget::Movie { tmdb_id: 603 });
        assert_eq!(url, format!("{}/movie/603/images", server.url()));

        let images = client.fetch_images(&url).await.unwrap();
        mock.assert_async().await;

        let first = images.first().unwrap();
        assert_eq!(
            client.display_url(&first.file_path),
            "https://image.tmdb.org/t/p/w780/poster.jpg"
        );
    }

    #[tokio::test]
    async fn test_fetch_images_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tv/1/images")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"status_code":34}"#)
            .create_async()
            .await;

        let client = TmdbClient::new("tmdb-key".to_string(), Duration::from_secs(5)).with_base_url(server.url());
        let url = client.lookup_url(&ImageTarget::Show { tmdb_id: 1 });
        let err = client.fetch_images(&url).await.unwrap_err();
        assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
    }
}
