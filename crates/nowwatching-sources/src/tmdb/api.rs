use serde::{Deserialize, Serialize};

/// What to fetch artwork for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTarget {
    Movie { tmdb_id: u32 },
    Show { tmdb_id: u32 },
    Episode { show_tmdb_id: u32, season: u32, number: u32 },
}

impl ImageTarget {
    /// Path of the TMDB v3 images endpoint for this target.
    pub fn path(&self) -> String {
        match self {
            ImageTarget::Movie { tmdb_id } => format!("/movie/{}/images", tmdb_id),
            ImageTarget::Show { tmdb_id } => format!("/tv/{}/images", tmdb_id),
            ImageTarget::Episode { show_tmdb_id, season, number } => format!(
                "/tv/{}/season/{}/episode/{}/images",
                show_tmdb_id, season, number
            ),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TmdbImage {
    pub file_path: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Body of an images endpoint. Movies and shows return backdrops and
/// posters, episodes return stills.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImageSet {
    #[serde(default)]
    pub backdrops: Vec<TmdbImage>,
    #[serde(default)]
    pub posters: Vec<TmdbImage>,
    #[serde(default)]
    pub stills: Vec<TmdbImage>,
}

impl ImageSet {
    /// First image across backdrops, then posters, then stills.
    pub fn first(&self) -> Option<&TmdbImage> {
        self.backdrops
            .iter()
            .chain(self.posters.iter())
            .chain(self.stills.iter())
            .next()
    }
}
