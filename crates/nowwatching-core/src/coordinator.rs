use crate::extended_info::ExtendedInfoResolver;
use crate::image::ImageResolver;
use crate::interval::{IntervalPolicy, IntervalState, PollInterval};
use crate::rate_limit;
use chrono::{DateTime, Utc};
use nowwatching_models::{MediaKind, MediaReference, RateLimitInfo, WatchingMedia, WatchingStatus};
use nowwatching_sources::trakt::api::{parse_watching, WATCHING_PATH};
use nowwatching_sources::{AuthenticatedRequest, ImageCatalog, ImageTarget, SourceError};
use reqwest::Method;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// State published after every successful refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchingSnapshot {
    pub status: WatchingStatus,
    pub updated_at: DateTime<Utc>,
    pub interval: PollInterval,
    pub rate_limit: Option<RateLimitInfo>,
}

/// Polls `/users/me/watching`, enriches what is playing and publishes it.
///
/// Caches and the poll interval are owned here and only change through
/// [`WatchingCoordinator::refresh`]. Readers go through [`subscribe`](Self::subscribe).
pub struct WatchingCoordinator {
    api: Arc<dyn AuthenticatedRequest>,
    extended: ExtendedInfoResolver,
    images: Option<ImageResolver>,
    interval: IntervalState,
    state: watch::Sender<Option<WatchingSnapshot>>,
    shutdown: CancellationToken,
}

impl WatchingCoordinator {
    pub fn new(api: Arc<dyn AuthenticatedRequest>, policy: IntervalPolicy) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            api,
            extended: ExtendedInfoResolver::new(),
            images: None,
            interval: IntervalState::new(policy),
            state,
            shutdown: CancellationToken::new(),
        }
    }

    /// Attach artwork from `catalog` to resolved references.
    pub fn with_image_catalog(mut self, catalog: Arc<dyn ImageCatalog>) -> Self {
        self.images = Some(ImageResolver::new(catalog));
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<WatchingSnapshot>> {
        self.state.subscribe()
    }

    pub fn latest(&self) -> Option<WatchingSnapshot> {
        self.state.borrow().clone()
    }

    pub fn interval(&self) -> PollInterval {
        self.interval.current()
    }

    pub fn interval_duration(&self) -> Duration {
        self.interval.duration()
    }

    pub fn extended_info(&self) -> &ExtendedInfoResolver {
        &self.extended
    }

    pub fn image_resolver(&self) -> Option<&ImageResolver> {
        self.images.as_ref()
    }

    /// Cancelling this token stops publishing; results of in-flight refreshes are dropped.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run one poll cycle.
    ///
    /// A failure fetching the watching status or resolving extended info aborts
    /// the cycle: nothing is published and the interval stays as it was. Image
    /// lookup failures only leave that image unset.
    pub async fn refresh(&mut self) -> Result<WatchingStatus, SourceError> {
        let response = match self.api.request(Method::GET, WATCHING_PATH).await {
            Ok(response) => response,
            Err(e) => {
                // A 429 still carries the quota header
                if let Some(headers) = e.headers() {
                    rate_limit::inspect_headers(headers);
                }
                return Err(e);
            }
        };
        let rate_limit = rate_limit::inspect(&response);
        let mut status = parse_watching(response.body.as_ref())?;

        let target = match &mut status {
            WatchingStatus::NothingPlaying => PollInterval::Slow,
            WatchingStatus::Playing(watching) => {
                self.enrich(&mut watching.media).await?;
                debug!(
                    operation = "refresh",
                    kind = %watching.media.kind(),
                    title = watching.media.primary().title.as_deref().unwrap_or("?"),
                    "Resolved watching item"
                );
                PollInterval::Fast
            }
        };
        self.apply_interval(target);

        self.publish(status.clone(), rate_limit);
        Ok(status)
    }

    fn apply_interval(&mut self, target: PollInterval) {
        if !self.interval.switch_to(target) {
            return;
        }
        let secs = self.interval.duration().as_secs();
        match target {
            PollInterval::Fast => info!(
                operation = "poll_interval",
                interval_secs = secs,
                "Something is playing, polling faster"
            ),
            PollInterval::Slow => info!(
                operation = "poll_interval",
                interval_secs = secs,
                "Nothing is playing, slowing down polling"
            ),
        }
    }

    async fn enrich(&mut self, media: &mut WatchingMedia) -> Result<(), SourceError> {
        match media {
            WatchingMedia::Episode { show, episode } => {
                self.resolve_extended(MediaKind::Episode, episode).await?;
                self.resolve_extended(MediaKind::Show, show).await?;

                if let Some(images) = self.images.as_mut() {
                    if let Some(show_tmdb_id) = show.ids.tmdb {
                        attach_image(images, MediaKind::Show, ImageTarget::Show { tmdb_id: show_tmdb_id }, show).await;

                        if let (Some(season), Some(number)) = (episode.season, episode.number) {
                            let target = ImageTarget::Episode {
                                show_tmdb_id,
                                season,
                                number,
                            };
                            attach_image(images, MediaKind::Episode, target, episode).await;
                        }
                    }
                }
            }
            WatchingMedia::Movie { movie } => {
                self.resolve_extended(MediaKind::Movie, movie).await?;

                if let Some(images) = self.images.as_mut() {
                    if let Some(tmdb_id) = movie.ids.tmdb {
                        attach_image(images, MediaKind::Movie, ImageTarget::Movie { tmdb_id }, movie).await;
                    }
                }
            }
        }
        Ok(())
    }

    /// Replace `reference` with its full record.
    async fn resolve_extended(&mut self, kind: MediaKind, reference: &mut MediaReference) -> Result<(), SourceError> {
        let Some(id) = reference.ids.lookup_key() else {
            warn!(operation = "extended_info", %kind, "Watching item has no Trakt id or slug, skipping lookup");
            return Ok(());
        };

        let record = self.extended.resolve(self.api.as_ref(), kind, &id).await?;
        *reference = record;
        Ok(())
    }

    fn publish(&self, status: WatchingStatus, rate_limit: Option<RateLimitInfo>) {
        if self.shutdown.is_cancelled() {
            debug!(operation = "publish", "Coordinator shut down, dropping refresh result");
            return;
        }

        self.state.send_replace(Some(WatchingSnapshot {
            status,
            updated_at: Utc::now(),
            interval: self.interval.current(),
            rate_limit,
        }));
    }
}

async fn attach_image(images: &mut ImageResolver, kind: MediaKind, target: ImageTarget, reference: &mut MediaReference) {
    match images.resolve(kind, &target).await {
        Ok(image_url) => reference.image_url = image_url,
        Err(e) => warn!(operation = "image_lookup", %kind, error = %e, "Image lookup failed"),
    }
}
