use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Quota information Trakt returns in the `x-ratelimit` response header.
///
/// The header value is a JSON object, e.g.
/// `{"name":"AUTHED_API_GET_LIMIT","period":300,"limit":1000,"remaining":998,"until":"2024-01-01T00:05:00Z"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimitInfo {
    #[serde(default)]
    pub name: Option<String>,
    /// Window length in seconds.
    pub period: u64,
    pub limit: u64,
    pub remaining: u64,
    #[serde(default)]
    pub until: Option<DateTime<Utc>>,
}

impl RateLimitInfo {
    /// Parse the header value. A malformed value yields `None`: missing rate
    /// limit data is not an error.
    pub fn from_header(value: &str) -> Option<Self> {
        serde_json::from_str(value.trim()).ok()
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_header() {
        let header = r#"{"name":"AUTHED_API_GET_LIMIT","period":300,"limit":1000,"remaining":998,"until":"2024-01-01T00:05:00Z"}"#;
        let info = RateLimitInfo::from_header(header).unwrap();
        assert_eq!(info.name.as_deref(), Some("AUTHED_API_GET_LIMIT"));
        assert_eq!(info.period, 300);
        assert_eq!(info.limit, 1000);
        assert_eq!(info.remaining, 998);
        assert!(info.until.is_some());
        assert!(!info.is_exhausted());
    }

    #[test]
    fn test_parse_minimal_header() {
        let info = RateLimitInfo::from_header(r#"{"period":300,"limit":1000,"remaining":0}"#).unwrap();
        assert!(info.is_exhausted());
        assert_eq!(info.until, None);
    }

    #[test]
    fn test_malformed_header_is_none() {
        assert_eq!(RateLimitInfo::from_header("not json"), None);
        assert_eq!(RateLimitInfo::from_header(r#"{"remaining":"lots"}"#), None);
        assert_eq!(RateLimitInfo::from_header(""), None);
    }
}
