//! Movie-genre junction model and DTOs.

use reelstats_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `movie_genres` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRow, Serialize)]
pub struct MovieGenreRow {
    pub movie_id: DbId,
    pub genre_id: DbId,
}

/// A link whose movie and genre have both been resolved to surrogate ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NewMovieGenre {
    pub movie_id: DbId,
    pub genre_id: DbId,
}
