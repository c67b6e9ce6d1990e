//! Trakt OAuth: the out-of-band authorization-code exchange and token refresh.

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use nowwatching_config::TraktTokens;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration as StdDuration;
use tracing::debug;

const REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
const AUTHORIZE_URL: &str = "https://trakt.tv/oauth/authorize";

/// Seconds shaved off the server-reported lifetime so tokens are renewed early.
const EXPIRY_MARGIN_SECS: i64 = 120;

pub const USER_AGENT: &str = concat!("nowwatching/", env!("CARGO_PKG_VERSION"));

/// HTTP client shared by the Trakt and image catalog clients. Every request
/// carries `timeout`; hitting it is reported as a transport error.
pub fn create_http_client(timeout: StdDuration) -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: u64,
}

impl From<TokenResponse> for TraktTokens {
    fn from(token: TokenResponse) -> Self {
        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in as i64 - EXPIRY_MARGIN_SECS),
        }
    }
}

/// Page the account owner opens to obtain an authorization code.
pub fn authorization_url(client_id: &str) -> String {
    format!(
        "{}?response_type=code&client_id={}&redirect_uri={}",
        AUTHORIZE_URL,
        urlencoding::encode(client_id),
        urlencoding::encode(REDIRECT_URI)
    )
}

/// Trade an authorization code for a token pair.
pub async fn exchange_code(
    client: &Client,
    base_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
) -> Result<TraktTokens> {
    let code = code.trim();
    if code.is_empty() {
        return Err(anyhow!("Authorization code cannot be empty"));
    }

    debug!(operation = "trakt_code_exchange", "Exchanging Trakt authorization code");
    request_tokens(
        client,
        base_url,
        json!({
            "code": code,
            "client_id": client_id,
            "client_secret": client_secret,
            "redirect_uri": REDIRECT_URI,
            "grant_type": "authorization_code"
        }),
    )
    .await
}

pub async fn refresh_access_token(
    client: &Client,
    base_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TraktTokens> {
    debug!(operation = "trakt_token_refresh", "Refreshing Trakt access token");
    request_tokens(
        client,
        base_url,
        json!({
            "refresh_token": refresh_token,
            "client_id": client_id,
            "client_secret": client_secret,
            "redirect_uri": REDIRECT_URI,
            "grant_type": "refresh_token"
        }),
    )
    .await
}

async fn request_tokens(client: &Client, base_url: &str, payload: Value) -> Result<TraktTokens> {
    let response = client
        .post(format!("{}/oauth/token", base_url))
        .header("Accept", "application/json")
        .json(&payload)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow!("Trakt token request failed: {} {}", status, body));
    }

    let token: TokenResponse = response.json().await?;
    Ok(token.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_authorization_url() {
        assert_eq!(
            authorization_url("abc123"),
            "https://trakt.tv/oauth/authorize?response_type=code&client_id=abc123\
             &redirect_uri=urn%3Aietf%3Awg%3Aoauth%3A2.0%3Aoob"
        );
    }

    #[tokio::test]
    async fn test_refresh_access_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            .match_body(Matcher::PartialJson(json!({
                "grant_type": "refresh_token",
                "refresh_token": "old-refresh"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"new-access","refresh_token":"new-refresh","expires_in":7776000}"#)
            .create_async()
            .await;

        let client = create_http_client(StdDuration::from_secs(5));
        let tokens = refresh_access_token(&client, &server.url(), "id", "secret", "old-refresh")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(tokens.access_token, "new-access");
        assert_eq!(tokens.refresh_token, "new-refresh");
        assert!(tokens.expires_at > Utc::now() + Duration::days(89));
        assert!(tokens.expires_at < Utc::now() + Duration::days(90));
    }

    #[tokio::test]
    async fn test_exchange_code() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            .match_body(Matcher::PartialJson(json!({
                "grant_type": "authorization_code",
                "code": "XYZ",
                "redirect_uri": REDIRECT_URI
            })))
            .with_status(200)
            .with_body(r#"{"access_token":"a","refresh_token":"r","expires_in":3600}"#)
            .create_async()
            .await;

        let client = create_http_client(StdDuration::from_secs(5));
        let tokens = exchange_code(&client, &server.url(), "id", "secret", "  XYZ\n").await.unwrap();

        mock.assert_async().await;
        assert_eq!(tokens.access_token, "a");
    }

    #[tokio::test]
    async fn test_empty_code_is_rejected_without_request() {
        let client = create_http_client(StdDuration::from_secs(5));
        let result = exchange_code(&client, "http://127.0.0.1:9", "id", "secret", "   ").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_rejected_token_request() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/token")
            .with_status(401)
            .with_body("invalid_grant")
            .create_async()
            .await;

        let client = create_http_client(StdDuration::from_secs(5));
        let err = refresh_access_token(&client, &server.url(), "id", "secret", "bad")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid_grant"));
    }
}
