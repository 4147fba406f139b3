//! Natural-key reconciliation of one normalized batch against the store.
//!
//! Each operation collapses repeated keys, resolves external ids to
//! surrogate ids where needed, validates the records it will write, and
//! writes the batch with a single set-based statement. Records whose
//! references cannot be resolved are skipped and counted, never treated as
//! failures.

use std::collections::{HashMap, HashSet};

use reelstats_core::dedupe::{dedupe_daily_stats, dedupe_genres, dedupe_links, dedupe_movies};
use reelstats_core::records::{DailyStat, Genre, Movie, MovieGenreLink};
use reelstats_core::types::{DbId, ExternalId};
use reelstats_core::validation::{
    validate_all, validate_daily_stat, validate_genre, validate_movie,
};
use reelstats_db::models::daily_stat::UpsertDailyStat;
use reelstats_db::models::movie_genre::NewMovieGenre;
use reelstats_db::repositories::{DailyStatRepo, GenreRepo, MovieGenreRepo, MovieRepo};
use serde::Serialize;
use sqlx::PgConnection;

use crate::error::StageError;

/// Outcome of one batch.
///
/// `attempted` is the number of input records, `skipped` those dropped for
/// an unresolved reference and `applied` the rest. `rows_written` is what
/// the store reported: for links it counts only newly created pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub attempted: usize,
    pub applied: usize,
    pub skipped: usize,
    pub rows_written: u64,
}

impl BatchReport {
    fn new(attempted: usize, skipped: usize, rows_written: u64) -> Self {
        Self {
            attempted,
            applied: attempted - skipped,
            skipped,
            rows_written,
        }
    }
}

/// Batch upserts keyed by catalog ids.
pub struct UpsertEngine;

impl UpsertEngine {
    /// Insert genres, overwriting the name of any genre already stored.
    pub async fn upsert_genres(
        conn: &mut PgConnection,
        genres: &[Genre],
    ) -> Result<BatchReport, StageError> {
        if genres.is_empty() {
            return Ok(BatchReport::default());
        }
        validate_all(genres, validate_genre)?;

        let rows = GenreRepo::upsert_batch(conn, &dedupe_genres(genres)).await?;
        Ok(BatchReport::new(genres.len(), 0, rows))
    }

    /// Insert movies, replacing every mutable field of movies already
    /// stored and refreshing their `updated_at`.
    pub async fn upsert_movies(
        conn: &mut PgConnection,
        movies: &[Movie],
    ) -> Result<BatchReport, StageError> {
        if movies.is_empty() {
            return Ok(BatchReport::default());
        }
        validate_all(movies, validate_movie)?;

        let rows = MovieRepo::upsert_batch(conn, &dedupe_movies(movies)).await?;
        Ok(BatchReport::new(movies.len(), 0, rows))
    }

    /// Link movies to genres.
    ///
    /// Both sides are resolved with one lookup query each. A link whose
    /// movie or genre is not stored is skipped. Pairs that already exist are
    /// left alone.
    pub async fn link_movie_genres(
        conn: &mut PgConnection,
        links: &[MovieGenreLink],
    ) -> Result<BatchReport, StageError> {
        if links.is_empty() {
            return Ok(BatchReport::default());
        }

        let movie_ids = MovieRepo::resolve_ids(
            &mut *conn,
            &distinct(links.iter().map(|l| l.movie_external_id)),
        )
        .await?;
        let genre_ids = GenreRepo::resolve_ids(
            &mut *conn,
            &distinct(links.iter().map(|l| l.genre_external_id)),
        )
        .await?;

        let mut skipped = 0;
        for link in links {
            let movie_resolved = movie_ids.contains_key(&link.movie_external_id);
            let genre_resolved = genre_ids.contains_key(&link.genre_external_id);
            if !(movie_resolved && genre_resolved) {
                skipped += 1;
                tracing::warn!(
                    movie_external_id = link.movie_external_id,
                    genre_external_id = link.genre_external_id,
                    movie_resolved,
                    genre_resolved,
                    "Skipping movie-genre link with unresolved reference"
                );
            }
        }

        let pairs: Vec<NewMovieGenre> = dedupe_links(links)
            .iter()
            .filter_map(|link| {
                let movie_id = *movie_ids.get(&link.movie_external_id)?;
                let genre_id = *genre_ids.get(&link.genre_external_id)?;
                Some(NewMovieGenre { movie_id, genre_id })
            })
            .collect();

        let rows = MovieGenreRepo::insert_pairs(conn, &pairs).await?;
        Ok(BatchReport::new(links.len(), skipped, rows))
    }

    /// Record daily popularity stats.
    ///
    /// Stats for movies that are not stored are skipped before validation.
    /// For a movie and day already recorded only the metrics are
    /// overwritten.
    pub async fn upsert_daily_stats(
        conn: &mut PgConnection,
        stats: &[DailyStat],
    ) -> Result<BatchReport, StageError> {
        if stats.is_empty() {
            return Ok(BatchReport::default());
        }

        let movie_ids = MovieRepo::resolve_ids(
            &mut *conn,
            &distinct(stats.iter().map(|s| s.movie_external_id)),
        )
        .await?;

        let skipped = stats
            .iter()
            .filter(|s| !movie_ids.contains_key(&s.movie_external_id))
            .inspect(|s| {
                tracing::warn!(
                    movie_external_id = s.movie_external_id,
                    date = %s.date,
                    "Skipping daily stat for unresolved movie"
                );
            })
            .count();

        // Only records that will be written are held to the value domains.
        let resolved: Vec<DailyStat> = dedupe_daily_stats(stats)
            .into_iter()
            .filter(|s| movie_ids.contains_key(&s.movie_external_id))
            .collect();
        validate_all(&resolved, validate_daily_stat)?;

        let rows_to_write = resolve_stats(&resolved, &movie_ids);
        let rows = DailyStatRepo::upsert_batch(conn, &rows_to_write).await?;
        Ok(BatchReport::new(stats.len(), skipped, rows))
    }
}

/// Unique external ids in first-seen order.
fn distinct(ids: impl Iterator<Item = ExternalId>) -> Vec<ExternalId> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

fn resolve_stats(
    stats: &[DailyStat],
    movie_ids: &HashMap<ExternalId, DbId>,
) -> Vec<UpsertDailyStat> {
    stats
        .iter()
        .filter_map(|s| {
            movie_ids.get(&s.movie_external_id).map(|&movie_id| UpsertDailyStat {
                movie_id,
                date: s.date,
                popularity: s.popularity,
                vote_average: s.vote_average,
                vote_count: s.vote_count,
            })
        })
        .collect()
}
