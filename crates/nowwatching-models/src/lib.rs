pub mod media;
pub mod media_ids;
pub mod rate_limit;
pub mod watching;

pub use media::{MediaKind, MediaReference};
pub use media_ids::TraktIds;
pub use rate_limit::RateLimitInfo;
pub use watching::{Watching, WatchingMedia, WatchingStatus};
