use chrono::{DateTime, Utc};
use nowwatching_models::{WatchingMedia, WatchingStatus};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    Playing,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    TvShow,
    Movie,
}

/// Media-player shaped view of a watching status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaPlayerView {
    pub name: String,
    pub state: PlayerState,
    pub content_type: Option<ContentType>,
    pub title: Option<String>,
    pub series_title: Option<String>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub year: Option<u32>,
    pub image_url: Option<String>,
    pub duration_secs: Option<u64>,
    pub position_secs: Option<u64>,
    pub started_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl MediaPlayerView {
    fn off(name: String) -> Self {
        Self {
            name,
            state: PlayerState::Off,
            content_type: None,
            title: None,
            series_title: None,
            season: None,
            episode: None,
            year: None,
            image_url: None,
            duration_secs: None,
            position_secs: None,
            started_at: None,
            expires_at: None,
        }
    }

    pub fn from_status(status: &WatchingStatus, username: &str, now: DateTime<Utc>) -> Self {
        let name = format!("Trakt {}", username);
        let watching = match status {
            WatchingStatus::NothingPlaying => return Self::off(name),
            WatchingStatus::Playing(watching) => watching,
        };

        let mut view = Self {
            state: PlayerState::Playing,
            started_at: Some(watching.started_at),
            expires_at: Some(watching.expires_at),
            ..Self::off(name)
        };

        match &watching.media {
            WatchingMedia::Episode { show, episode } => {
                view.content_type = Some(ContentType::TvShow);
                view.title = episode.title.clone();
                view.series_title = show.title.clone();
                view.season = episode.season;
                view.episode = episode.number;
                view.year = show.year;
                view.image_url = episode.image_url.clone().or_else(|| show.image_url.clone());
                view.duration_secs = episode.duration_secs().or_else(|| show.duration_secs());
            }
            WatchingMedia::Movie { movie } => {
                view.content_type = Some(ContentType::Movie);
                view.title = movie.title.clone();
                view.year = movie.year;
                view.image_url = movie.image_url.clone();
                view.duration_secs = movie.duration_secs();
            }
        }

        let elapsed = (now - watching.started_at).num_seconds().max(0) as u64;
        view.position_secs = Some(match view.duration_secs {
            Some(duration) => elapsed.min(duration),
            None => elapsed,
        });

        view
    }
}
