use serde::{Deserialize, Serialize};

/// Identifiers Trakt attaches to every show, episode and movie.
///
/// `trakt` and `slug` address the item on Trakt itself; `tmdb` is the
/// cross-reference used to look up artwork in the image catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraktIds {
    #[serde(default)]
    pub trakt: Option<u64>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub imdb: Option<String>,
    #[serde(default)]
    pub tmdb: Option<u32>,
    #[serde(default)]
    pub tvdb: Option<u32>,
}

impl TraktIds {
    /// Identifier used in `/{kind}s/{id}` lookups: the numeric Trakt id,
    /// falling back to the slug.
    pub fn lookup_key(&self) -> Option<String> {
        self.trakt
            .map(|id| id.to_string())
            .or_else(|| self.slug.clone().filter(|s| !s.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_key_prefers_trakt_id() {
        let ids = TraktIds {
            trakt: Some(42),
            slug: Some("the-matrix-1999".to_string()),
            ..TraktIds::default()
        };
        assert_eq!(ids.lookup_key(), Some("42".to_string()));
    }

    #[test]
    fn test_lookup_key_falls_back_to_slug() {
        let ids = TraktIds {
            slug: Some("breaking-bad".to_string()),
            ..TraktIds::default()
        };
        assert_eq!(ids.lookup_key(), Some("breaking-bad".to_string()));
    }

    #[test]
    fn test_lookup_key_ignores_empty_slug() {
        let ids = TraktIds {
            slug: Some(String::new()),
            imdb: Some("tt0133093".to_string()),
            ..TraktIds::default()
        };
        assert_eq!(ids.lookup_key(), None);
    }
}
