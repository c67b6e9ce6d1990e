pub mod coordinator;
pub mod extended_info;
pub mod image;
pub mod interval;
pub mod player;
pub mod poller;
pub mod rate_limit;

pub use coordinator::{WatchingCoordinator, WatchingSnapshot};
pub use extended_info::{ExtendedInfoCache, ExtendedInfoResolver};
pub use image::{ImageCache, ImageResolver};
pub use interval::{IntervalPolicy, IntervalState, PollInterval};
pub use player::{ContentType, MediaPlayerView, PlayerState};
pub use poller::PollerHandle;
pub use rate_limit::RateLimitLevel;

#[cfg(test)]
mod test_support;
