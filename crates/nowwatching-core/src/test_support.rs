//! Scripted stand-ins for the Trakt and image catalog clients.

use async_trait::async_trait;
use nowwatching_sources::trakt::api::{RATE_LIMIT_HEADER, WATCHING_PATH};
use nowwatching_sources::{ApiResponse, AuthenticatedRequest, ImageCatalog, ImageSet, ImageTarget, SourceError};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

pub enum FakeResponse {
    /// 204 No Content.
    Empty,
    /// 200 with a JSON body and an optional `x-ratelimit` header.
    Json(Value, Option<&'static str>),
    /// 429 carrying the given `x-ratelimit` header.
    RateLimited(&'static str),
    Fail,
}

fn not_found(url: &str) -> SourceError {
    SourceError::Status {
        method: Method::GET,
        url: url.to_string(),
        status: StatusCode::NOT_FOUND,
        headers: HeaderMap::new(),
        body: String::new(),
    }
}

#[derive(Default)]
pub struct FakeApi {
    watching: Mutex<VecDeque<FakeResponse>>,
    records: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request sleeps for `delay` before answering.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Queue responses for `/users/me/watching`. Once drained the endpoint answers empty.
    pub fn push_watching(&self, responses: impl IntoIterator<Item = FakeResponse>) {
        self.watching.lock().unwrap().extend(responses);
    }

    pub fn set_record(&self, path: &str, body: Value) {
        self.records.lock().unwrap().insert(path.to_string(), body);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|p| *p == path).count()
    }
}

#[async_trait]
impl AuthenticatedRequest for FakeApi {
    async fn request(&self, _method: Method, path: &str) -> Result<ApiResponse, SourceError> {
        self.calls.lock().unwrap().push(path.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if path == WATCHING_PATH {
            let next = self.watching.lock().unwrap().pop_front().unwrap_or(FakeResponse::Empty);
            return match next {
                FakeResponse::Empty => Ok(ApiResponse::new(StatusCode::NO_CONTENT, HeaderMap::new(), None)),
                FakeResponse::Json(body, rate_limit) => {
                    let mut headers = HeaderMap::new();
                    if let Some(value) = rate_limit {
                        headers.insert(RATE_LIMIT_HEADER, HeaderValue::from_static(value));
                    }
                    Ok(ApiResponse::new(StatusCode::OK, headers, Some(body)))
                }
                FakeResponse::RateLimited(rate_limit) => {
                    let mut headers = HeaderMap::new();
                    headers.insert(RATE_LIMIT_HEADER, HeaderValue::from_static(rate_limit));
                    Err(SourceError::Status {
                        method: Method::GET,
                        url: path.to_string(),
                        status: StatusCode::TOO_MANY_REQUESTS,
                        headers,
                        body: String::new(),
                    })
                }
                FakeResponse::Fail => Err(SourceError::Parse("scripted failure".to_string())),
            };
        }

        match self.records.lock().unwrap().get(path) {
            Some(body) => Ok(ApiResponse::new(StatusCode::OK, HeaderMap::new(), Some(body.clone()))),
            None => Err(not_found(path)),
        }
    }
}

/// Image catalog answering from a map of endpoint paths. Unknown paths fail.
#[derive(Default)]
pub struct FakeCatalog {
    images: Mutex<HashMap<String, ImageSet>>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_images(&self, path: &str, images: ImageSet) {
        self.images.lock().unwrap().insert(path.to_string(), images);
    }

    pub fn count(&self, path: &str) -> usize {
        let url = format!("tmdb:{}", path);
        self.calls.lock().unwrap().iter().filter(|u| **u == url).count()
    }
}

#[async_trait]
impl ImageCatalog for FakeCatalog {
    fn lookup_url(&self, target: &ImageTarget) -> String {
        format!("tmdb:{}", target.path())
    }

    async fn fetch_images(&self, url: &str) -> Result<ImageSet, SourceError> {
        self.calls.lock().unwrap().push(url.to_string());
        let path = url.trim_start_matches("tmdb:");
        self.images
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(url))
    }

    fn display_url(&self, file_path: &str) -> String {
        format!("img:{}", file_path)
    }
}

pub fn movie_body(trakt_id: u64, tmdb_id: Option<u32>) -> Value {
    json!({
        "type": "movie",
        "action": "scrobble",
        "movie": { "ids": { "trakt": trakt_id, "tmdb": tmdb_id } },
        "started_at": "2024-01-01T20:00:00.000Z",
        "expires_at": "2024-01-01T22:16:00.000Z"
    })
}

pub fn episode_body(show_id: u64, episode_id: u64, season: u32, number: u32) -> Value {
    json!({
        "type": "episode",
        "action": "checkin",
        "show": { "ids": { "trakt": show_id } },
        "episode": { "season": season, "number": number, "ids": { "trakt": episode_id } },
        "started_at": "2024-01-01T20:00:00.000Z",
        "expires_at": "2024-01-01T20:47:00.000Z"
    })
}

/// An `extended=full` summary body.
pub fn summary(title: &str, trakt_id: u64, tmdb_id: Option<u32>, runtime: Option<u32>) -> Value {
    json!({
        "title": title,
        "year": 2008,
        "ids": { "trakt": trakt_id, "tmdb": tmdb_id },
        "runtime": runtime,
        "overview": format!("{} overview", title)
    })
}

/// Layer keeping the level and message of every event from this crate.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl EventLog {
    /// Record events on the current thread until the guard drops.
    pub fn capture() -> (Self, tracing::subscriber::DefaultGuard) {
        let log = Self::default();
        let subscriber = tracing_subscriber::registry().with(log.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (log, guard)
    }

    pub fn messages(&self, level: Level) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for EventLog {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !event.metadata().target().starts_with("nowwatching_core") {
            return;
        }
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push((*event.metadata().level(), visitor.0));
    }
}
