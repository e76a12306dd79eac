use serde::{Deserialize, Serialize};

/// A list entry reduced to the identifiers downstream importers need.
///
/// Serialized with camelCase keys (`tmdbId`, `tvdbId`, `imdbId`), the shape
/// Radarr/Sonarr custom list importers expect. `id` mirrors `tmdbId`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedItem {
    pub id: u64,
    pub title: Option<String>,
    pub tmdb_id: u64,
    pub tvdb_id: u64,
    pub imdb_id: Option<String>,
}

impl NormalizedItem {
    pub fn new(tmdb_id: u64, tvdb_id: u64, imdb_id: Option<String>, title: Option<String>) -> Self {
        Self {
            id: tmdb_id,
            title,
            tmdb_id,
            tvdb_id,
            imdb_id,
        }
    }
}
