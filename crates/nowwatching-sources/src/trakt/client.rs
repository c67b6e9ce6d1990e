use crate::error::SourceError;
use crate::trakt::api::{self, UserProfile};
use crate::trakt::auth;
use crate::traits::{ApiResponse, AuthenticatedRequest};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use nowwatching_config::{CredentialStore, TraktConfig, TraktTokens};
use reqwest::{Client, Method};
use std::path::PathBuf;
use std::time::Duration as StdDuration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const API_URL: &str = "https://api.trakt.tv";

/// Tokens expiring sooner than this are refreshed before the next request.
const REFRESH_WINDOW_MINUTES: i64 = 5;

#[derive(Debug, Default)]
struct TokenState {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl TokenState {
    fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match (&self.access_token, self.expires_at) {
            (None, _) => true,
            (Some(_), Some(expires_at)) => expires_at <= now + Duration::minutes(REFRESH_WINDOW_MINUTES),
            (Some(_), None) => false,
        }
    }
}

/// Trakt API client holding the OAuth tokens of one account.
pub struct TraktClient {
    client: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    tokens: Mutex<TokenState>,
    credentials_file: Option<PathBuf>,
}

impl TraktClient {
    pub fn new(client_id: String, client_secret: String, timeout: StdDuration) -> Self {
        Self {
            client: auth::create_http_client(timeout),
            base_url: API_URL.to_string(),
            client_id,
            client_secret,
            tokens: Mutex::new(TokenState::default()),
            credentials_file: None,
        }
    }

    /// Build a client from configuration and the stored tokens. Refreshed
    /// tokens are written back to the store's file.
    pub fn from_credentials(config: &TraktConfig, store: &CredentialStore, timeout: StdDuration) -> Self {
        let tokens = store.trakt_tokens();
        let mut client = Self::new(config.client_id.clone(), config.client_secret.clone(), timeout).with_tokens(
            tokens.map(|t| t.access_token.clone()),
            tokens.map(|t| t.refresh_token.clone()),
            tokens.map(|t| t.expires_at),
        );
        client.credentials_file = Some(store.path().to_path_buf());
        client
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_tokens(
        mut self,
        access_token: Option<String>,
        refresh_token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.tokens = Mutex::new(TokenState {
            access_token,
            refresh_token,
            expires_at,
        });
        self
    }

    pub async fn has_credentials(&self) -> bool {
        let tokens = self.tokens.lock().await;
        tokens.access_token.is_some() || tokens.refresh_token.is_some()
    }

    /// Current access token, refreshed first when it is missing or about to expire.
    async fn access_token(&self) -> Result<String, SourceError> {
        let mut tokens = self.tokens.lock().await;

        if !tokens.needs_refresh(Utc::now()) {
            if let Some(token) = &tokens.access_token {
                return Ok(token.clone());
            }
        }

        let refresh_token = tokens.refresh_token.clone().ok_or_else(|| {
            SourceError::Auth("no Trakt credentials; run `nowwatching config trakt`".to_string())
        })?;

        info!(
            operation = "trakt_token_refresh",
            expires_at = ?tokens.expires_at,
            "Trakt access token missing or expiring soon, refreshing"
        );
        let fresh = auth::refresh_access_token(
            &self.client,
            &self.base_url,
            &self.client_id,
            &self.client_secret,
            &refresh_token,
        )
        .await
        .map_err(|e| SourceError::Auth(e.to_string()))?;

        tokens.access_token = Some(fresh.access_token.clone());
        tokens.refresh_token = Some(fresh.refresh_token.clone());
        tokens.expires_at = Some(fresh.expires_at);
        let access_token = fresh.access_token.clone();
        self.persist_tokens(fresh);

        Ok(access_token)
    }

    fn persist_tokens(&self, fresh: TraktTokens) {
        let Some(path) = &self.credentials_file else {
            return;
        };

        let mut store = CredentialStore::new(path.clone());
        let result = store.load().and_then(|_| {
            store.set_trakt_tokens(fresh);
            store.save()
        });

        match result {
            Ok(()) => debug!("Saved refreshed Trakt tokens to {}", path.display()),
            Err(e) => warn!("Failed to save refreshed Trakt tokens to {}: {}", path.display(), e),
        }
    }

    pub async fn user_profile(&self) -> Result<UserProfile, SourceError> {
        let response = self.request(Method::GET, api::PROFILE_PATH).await?;
        response
            .json::<UserProfile>()?
            .ok_or_else(|| SourceError::Parse("Empty user profile response".to_string()))
    }
}

#[async_trait]
impl AuthenticatedRequest for TraktClient {
    async fn request(&self, method: Method, path: &str) -> Result<ApiResponse, SourceError> {
        let access_token = self.access_token().await?;
        let url = format!("{}{}", self.base_url, path);

        debug!(operation = "trakt_request", %method, path, "Sending Trakt request");
        let response = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(&access_token)
            .header("trakt-api-version", "2")
            .header("trakt-api-key", &self.client_id)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                method,
                url,
                status,
                headers,
                body,
            });
        }

        let bytes = response.bytes().await?;
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(serde_json::from_slice(&bytes)?)
        };

        Ok(ApiResponse::new(status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> TraktClient {
        TraktClient::new("client-id".to_string(), "client-secret".to_string(), StdDuration::from_secs(5))
            .with_base_url(server.url())
            .with_tokens(
                Some("access".to_string()),
                Some("refresh".to_string()),
                Some(Utc::now() + Duration::days(30)),
            )
    }

    #[tokio::test]
    async fn test_request_sends_trakt_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/movies/42")
            .match_query(Matcher::UrlEncoded("extended".into(), "full".into()))
            .match_header("authorization", "Bearer access")
            .match_header("trakt-api-version", "2")
            .match_header("trakt-api-key", "client-id")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("x-ratelimit", r#"{"period":300,"limit":1000,"remaining":999}"#)
            .with_body(r#"{"title":"The Matrix","ids":{"trakt":42}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let response = client.request(Method::GET, "/movies/42?extended=full").await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, reqwest::StatusCode::OK);
        assert!(response.header("x-ratelimit").is_some());
        assert_eq!(response.body.unwrap()["title"], "The Matrix");
    }

    #[tokio::test]
    async fn test_no_content_yields_empty_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/me/watching")
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server);
        let response = client.request(Method::GET, api::WATCHING_PATH).await.unwrap();
        assert_eq!(response.status, reqwest::StatusCode::NO_CONTENT);
        assert!(response.body.is_none());
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/me/watching")
            .with_status(503)
            .with_body("down for maintenance")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.request(Method::GET, api::WATCHING_PATH).await.unwrap_err();
        assert_eq!(err.status(), Some(reqwest::StatusCode::SERVICE_UNAVAILABLE));
        assert!(err.to_string().contains("down for maintenance"));
    }

    #[tokio::test]
    async fn test_rate_limited_reply_keeps_headers() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/me/watching")
            .with_status(429)
            .with_header("x-ratelimit", r#"{"period":300,"limit":1000,"remaining":0}"#)
            .with_header("retry-after", "30")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.request(Method::GET, api::WATCHING_PATH).await.unwrap_err();
        assert_eq!(err.status(), Some(reqwest::StatusCode::TOO_MANY_REQUESTS));
        let headers = err.headers().unwrap();
        assert!(headers.get(api::RATE_LIMIT_HEADER).is_some());
        assert_eq!(headers.get("retry-after").unwrap(), "30");
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/me/watching")
            .with_status(200)
            .with_body("{not json")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.request(Method::GET, api::WATCHING_PATH).await.unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }

    #[tokio::test]
    async fn test_expiring_token_is_refreshed_and_persisted() {
        let mut server = mockito::Server::new_async().await;
        let refresh = server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"fresh","refresh_token":"fresh-refresh","expires_in":7776000}"#)
            .expect(1)
            .create_async()
            .await;
        let watching = server
            .mock("GET", "/users/me/watching")
            .match_header("authorization", "Bearer fresh")
            .with_status(204)
            .expect(2)
            .create_async()
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let mut store = CredentialStore::new(dir.path().join("credentials.toml"));
        store.set_trakt_tokens(TraktTokens {
            access_token: "stale".to_string(),
            refresh_token: "old-refresh".to_string(),
            expires_at: Utc::now() + Duration::minutes(1),
        });
        store.save().unwrap();

        let config = TraktConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            username: None,
        };
        let client = TraktClient::from_credentials(&config, &store, StdDuration::from_secs(5))
            .with_base_url(server.url());

        client.request(Method::GET, api::WATCHING_PATH).await.unwrap();
        client.request(Method::GET, api::WATCHING_PATH).await.unwrap();

        refresh.assert_async().await;
        watching.assert_async().await;

        let mut reloaded = CredentialStore::new(dir.path().join("credentials.toml"));
        reloaded.load().unwrap();
        let saved = reloaded.trakt_tokens().unwrap();
        assert_eq!(saved.access_token, "fresh");
        assert_eq!(saved.refresh_token, "fresh-refresh");
    }

    #[tokio::test]
    async fn test_missing_credentials_is_auth_error() {
        let client = TraktClient::new("id".to_string(), "secret".to_string(), StdDuration::from_secs(5))
            .with_base_url("http://127.0.0.1:9");
        assert!(!client.has_credentials().await);
        let err = client.request(Method::GET, api::WATCHING_PATH).await.unwrap_err();
        assert!(matches!(err, SourceError::Auth(_)));
    }

    #[tokio::test]
    async fn test_user_profile() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/me")
            .with_status(200)
            .with_body(r#"{"username":"sean","name":"Sean Rudford","ids":{"slug":"sean"}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let profile = client.user_profile().await.unwrap();
        assert_eq!(profile.username, "sean");
        assert_eq!(profile.ids.slug, "sean");
    }
}
