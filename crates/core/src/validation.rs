//! Value-domain checks applied to every record before a batch is written.
//!
//! A failure here is a constraint violation for the whole batch: nothing
//! from that batch reaches the store.

use crate::error::CoreError;
use crate::records::{DailyStat, Genre, Movie};

/// Upper bound of the catalog's vote scale.
pub const MAX_VOTE_AVERAGE: f64 = 10.0;

/// Validate that an integer quantity is not negative.
pub fn validate_non_negative(value: i64, name: &str) -> Result<(), CoreError> {
    if value < 0 {
        return Err(CoreError::Validation(format!(
            "{name} must be >= 0, got {value}"
        )));
    }
    Ok(())
}

pub fn validate_genre(genre: &Genre) -> Result<(), CoreError> {
    if genre.name.trim().is_empty() {
        return Err(CoreError::Validation(format!(
            "genre {} has an empty name",
            genre.external_genre_id
        )));
    }
    Ok(())
}

pub fn validate_movie(movie: &Movie) -> Result<(), CoreError> {
    let id = movie.external_movie_id;
    validate_non_negative(movie.budget, &format!("movie {id} budget"))?;
    validate_non_negative(movie.revenue, &format!("movie {id} revenue"))?;
    if let Some(runtime) = movie.runtime {
        validate_non_negative(i64::from(runtime), &format!("movie {id} runtime"))?;
    }
    Ok(())
}

pub fn validate_daily_stat(stat: &DailyStat) -> Result<(), CoreError> {
    let id = stat.movie_external_id;
    if !(stat.popularity.is_finite() && stat.popularity >= 0.0) {
        return Err(CoreError::Validation(format!(
            "movie {id} popularity on {} must be a finite value >= 0, got {}",
            stat.date, stat.popularity
        )));
    }
    if !(0.0..=MAX_VOTE_AVERAGE).contains(&stat.vote_average) {
        return Err(CoreError::Validation(format!(
            "movie {id} vote_average on {} must be between 0 and {MAX_VOTE_AVERAGE}, got {}",
            stat.date, stat.vote_average
        )));
    }
    validate_non_negative(stat.vote_count, &format!("movie {id} vote_count"))
}

/// Run `check` over every record, stopping at the first failure.
pub fn validate_all<T>(
    records: &[T],
    check: impl Fn(&T) -> Result<(), CoreError>,
) -> Result<(), CoreError> {
    records.iter().try_for_each(check)
}
