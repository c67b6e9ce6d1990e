use nowwatching_models::RateLimitInfo;
use nowwatching_sources::trakt::api::RATE_LIMIT_HEADER;
use nowwatching_sources::ApiResponse;
use reqwest::header::HeaderMap;
use tracing::{error, warn};

/// Remaining quota below which a warning is logged.
pub const RATE_LIMIT_WARNING_THRESHOLD: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitLevel {
    Normal,
    Low,
    Exhausted,
}

pub fn assess(info: &RateLimitInfo) -> RateLimitLevel {
    if info.is_exhausted() {
        RateLimitLevel::Exhausted
    } else if info.remaining < RATE_LIMIT_WARNING_THRESHOLD {
        RateLimitLevel::Low
    } else {
        RateLimitLevel::Normal
    }
}

/// Read the rate limit header of `response` and log when quota runs low.
/// Advisory only: nothing is throttled.
pub fn inspect(response: &ApiResponse) -> Option<RateLimitInfo> {
    inspect_headers(&response.headers)
}

/// Same as [`inspect`] for the headers of a rejected reply.
pub fn inspect_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let value = headers.get(RATE_LIMIT_HEADER)?.to_str().ok()?;
    let info = RateLimitInfo::from_header(value)?;

    match assess(&info) {
        RateLimitLevel::Exhausted => error!(
            operation = "rate_limit",
            limit = info.limit,
            period = info.period,
            until = ?info.until,
            "Trakt rate limit exhausted"
        ),
        RateLimitLevel::Low => warn!(
            operation = "rate_limit",
            remaining = info.remaining,
            limit = info.limit,
            period = info.period,
            "Trakt rate limit running low"
        ),
        RateLimitLevel::Normal => {}
    }

    Some(info)
}
