use crate::TraktIds;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of item the watching endpoint can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Episode,
    Show,
    Movie,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Episode => "episode",
            MediaKind::Show => "show",
            MediaKind::Movie => "movie",
        }
    }

    /// Path segment of the Trakt summary endpoint (`/episodes`, `/shows`, `/movies`).
    pub fn collection(&self) -> &'static str {
        match self {
            MediaKind::Episode => "episodes",
            MediaKind::Show => "shows",
            MediaKind::Movie => "movies",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A show, episode or movie as returned by Trakt.
///
/// The watching endpoint returns a minimal record (ids and title); the
/// `extended=full` lookup fills in the remaining fields. `image_url` is never
/// sent by Trakt and is attached from the image catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaReference {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub ids: TraktIds,
    /// Episodes only.
    #[serde(default)]
    pub season: Option<u32>,
    /// Episodes only.
    #[serde(default)]
    pub number: Option<u32>,
    /// Runtime in minutes.
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl MediaReference {
    /// Runtime converted to seconds.
    pub fn duration_secs(&self) -> Option<u64> {
        self.runtime.map(|minutes| u64::from(minutes) * 60)
    }
}
