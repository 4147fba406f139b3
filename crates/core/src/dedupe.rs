//! Collapse repeated natural keys inside one batch.
//!
//! PostgreSQL rejects an `INSERT ... ON CONFLICT DO UPDATE` that touches the
//! same row twice, so each batch is reduced to one record per key before it
//! is written. The last occurrence wins, matching cross-run semantics.

use std::collections::HashMap;
use std::hash::Hash;

use crate::records::{DailyStat, Genre, Movie, MovieGenreLink};

/// Keep the last record for each key, preserving first-seen key order.
pub fn last_wins_by_key<T, K, F>(records: &[T], key: F) -> Vec<T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut slot_by_key: HashMap<K, usize> = HashMap::with_capacity(records.len());
    let mut out: Vec<T> = Vec::with_capacity(records.len());
    for record in records {
        match slot_by_key.get(&key(record)) {
            Some(&slot) => out[slot] = record.clone(),
            None => {
                slot_by_key.insert(key(record), out.len());
                out.push(record.clone());
            }
        }
    }
    out
}

pub fn dedupe_genres(genres: &[Genre]) -> Vec<Genre> {
    last_wins_by_key(genres, |g| g.external_genre_id)
}

pub fn dedupe_movies(movies: &[Movie]) -> Vec<Movie> {
    last_wins_by_key(movies, |m| m.external_movie_id)
}

pub fn dedupe_links(links: &[MovieGenreLink]) -> Vec<MovieGenreLink> {
    last_wins_by_key(links, |l| *l)
}

pub fn dedupe_daily_stats(stats: &[DailyStat]) -> Vec<DailyStat> {
    last_wins_by_key(stats, |s| (s.movie_external_id, s.date))
}
