use crate::{MediaKind, MediaReference};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the tracked account is watching right now.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WatchingStatus {
    NothingPlaying,
    Playing(Watching),
}

impl WatchingStatus {
    pub fn is_playing(&self) -> bool {
        matches!(self, WatchingStatus::Playing(_))
    }

    pub fn watching(&self) -> Option<&Watching> {
        match self {
            WatchingStatus::Playing(watching) => Some(watching),
            WatchingStatus::NothingPlaying => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Watching {
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// `scrobble` or `checkin`.
    #[serde(default)]
    pub action: Option<String>,
    pub media: WatchingMedia,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WatchingMedia {
    Episode {
        show: MediaReference,
        episode: MediaReference,
    },
    Movie {
        movie: MediaReference,
    },
}

impl WatchingMedia {
    pub fn kind(&self) -> MediaKind {
        match self {
            WatchingMedia::Episode { .. } => MediaKind::Episode,
            WatchingMedia::Movie { .. } => MediaKind::Movie,
        }
    }

    /// The reference that identifies what is playing (the episode, or the movie).
    pub fn primary(&self) -> &MediaReference {
        match self {
            WatchingMedia::Episode { episode, .. } => episode,
            WatchingMedia::Movie { movie } => movie,
        }
    }
}
