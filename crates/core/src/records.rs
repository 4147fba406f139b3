//! Normalized record batches handed to the load stage.
//!
//! These are the typed outputs of the record normalizer. Every record is
//! keyed by the upstream catalog's external identifiers; surrogate ids are
//! only known after the rows have been persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::ExternalId;

/// A movie genre as published by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub external_genre_id: ExternalId,
    pub name: String,
}

/// Descriptive movie data. Every non-key field is replaced on re-ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub external_movie_id: ExternalId,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub runtime: Option<i32>,
    #[serde(default)]
    pub budget: i64,
    #[serde(default)]
    pub revenue: i64,
}

/// Association between a movie and a genre, both by external id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovieGenreLink {
    pub movie_external_id: ExternalId,
    pub genre_external_id: ExternalId,
}

/// One day's popularity snapshot for a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStat {
    pub movie_external_id: ExternalId,
    pub date: NaiveDate,
    pub popularity: f64,
    pub vote_average: f64,
    pub vote_count: i64,
}

/// The four batches produced by one normalization pass.
///
/// Missing sections deserialize as empty batches, which the loader treats
/// as no-ops.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBatches {
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub movies: Vec<Movie>,
    #[serde(default)]
    pub movie_genres: Vec<MovieGenreLink>,
    #[serde(default)]
    pub daily_stats: Vec<DailyStat>,
}

impl NormalizedBatches {
    /// Total number of records across all four batches.
    pub fn total_records(&self) -> usize {
        self.genres.len() + self.movies.len() + self.movie_genres.len() + self.daily_stats.len()
    }
}
