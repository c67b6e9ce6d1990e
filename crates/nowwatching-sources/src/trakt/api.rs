use crate::error::SourceError;
use chrono::{DateTime, Utc};
use nowwatching_models::{MediaKind, MediaReference, Watching, WatchingMedia, WatchingStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const WATCHING_PATH: &str = "/users/me/watching";
pub const PROFILE_PATH: &str = "/users/me";

/// Response header carrying rate limit data as JSON.
pub const RATE_LIMIT_HEADER: &str = "x-ratelimit";

/// `/episodes/{id}?extended=full`, `/shows/{id}?extended=full` or `/movies/{id}?extended=full`.
pub fn extended_info_path(kind: MediaKind, id: &str) -> String {
    format!("/{}/{}?extended=full", kind.collection(), urlencoding::encode(id))
}

#[derive(Debug, Deserialize)]
struct TraktWatchingItem {
    #[serde(rename = "type")]
    item_type: String,
    started_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    movie: Option<MediaReference>,
    #[serde(default)]
    show: Option<MediaReference>,
    #[serde(default)]
    episode: Option<MediaReference>,
}

impl TryFrom<TraktWatchingItem> for Watching {
    type Error = SourceError;

    fn try_from(item: TraktWatchingItem) -> Result<Self, Self::Error> {
        let media = match item.item_type.as_str() {
            "episode" => WatchingMedia::Episode {
                show: item
                    .show
                    .ok_or_else(|| SourceError::Parse("Missing show data for episode".to_string()))?,
                episode: item
                    .episode
                    .ok_or_else(|| SourceError::Parse("Missing episode data".to_string()))?,
            },
            "movie" => WatchingMedia::Movie {
                movie: item
                    .movie
                    .ok_or_else(|| SourceError::Parse("Missing movie data".to_string()))?,
            },
            other => {
                return Err(SourceError::Parse(format!("Unsupported watching type: {}", other)));
            }
        };

        Ok(Watching {
            started_at: item.started_at,
            expires_at: item.expires_at,
            action: item.action,
            media,
        })
    }
}

/// Interpret a `/users/me/watching` body. No content means nothing is playing.
pub fn parse_watching(body: Option<&Value>) -> Result<WatchingStatus, SourceError> {
    match body {
        None | Some(Value::Null) => Ok(WatchingStatus::NothingPlaying),
        Some(value) => {
            let item: TraktWatchingItem = serde_json::from_value(value.clone())?;
            Ok(WatchingStatus::Playing(item.try_into()?))
        }
    }
}

/// Interpret an `extended=full` summary body.
pub fn parse_extended(kind: MediaKind, body: Option<&Value>) -> Result<MediaReference, SourceError> {
    match body {
        Some(value) if !value.is_null() => Ok(serde_json::from_value(value.clone())?),
        _ => Err(SourceError::Parse(format!("Empty {} summary response", kind))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserIds {
    pub slug: String,
}

/// `/users/me` profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    pub ids: UserIds,
}

impl UserProfile {
    /// Preferred display name: the full name when set, else the username.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.username)
    }
}
