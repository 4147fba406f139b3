//! Repository for the `movie_genres` junction table.

use reelstats_core::types::DbId;
use sqlx::PgConnection;

use crate::models::movie_genre::{MovieGenreRow, NewMovieGenre};

/// Set-semantics writes and reads for movie/genre associations.
pub struct MovieGenreRepo;

impl MovieGenreRepo {
    /// Insert resolved pairs, ignoring pairs that already exist.
    ///
    /// Returns the number of pairs that were newly inserted.
    pub async fn insert_pairs(
        conn: &mut PgConnection,
        pairs: &[NewMovieGenre],
    ) -> Result<u64, sqlx::Error> {
        if pairs.is_empty() {
            return Ok(0);
        }

        let movie_ids: Vec<DbId> = pairs.iter().map(|p| p.movie_id).collect();
        let genre_ids: Vec<DbId> = pairs.iter().map(|p| p.genre_id).collect();

        let result = sqlx::query(
            "INSERT INTO movie_genres (movie_id, genre_id) \
             SELECT * FROM UNNEST($1::bigint[], $2::bigint[]) \
             ON CONFLICT (movie_id, genre_id) DO NOTHING",
        )
        .bind(&movie_ids)
        .bind(&genre_ids)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// List the genre links of a single movie.
    pub async fn list_by_movie(
        conn: &mut PgConnection,
        movie_id: DbId,
    ) -> Result<Vec<MovieGenreRow>, sqlx::Error> {
        sqlx::query_as::<_, MovieGenreRow>(
            "SELECT movie_id, genre_id FROM movie_genres WHERE movie_id = $1 ORDER BY genre_id",
        )
        .bind(movie_id)
        .fetch_all(conn)
        .await
    }

    pub async fn count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM movie_genres")
            .fetch_one(conn)
            .await?;
        Ok(count.0)
    }

    /// Count links whose movie or genre row does not exist.
    pub async fn count_dangling(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM movie_genres mg \
             LEFT JOIN movies m ON m.id = mg.movie_id \
             LEFT JOIN genres g ON g.id = mg.genre_id \
             WHERE m.id IS NULL OR g.id IS NULL",
        )
        .fetch_one(conn)
        .await?;
        Ok(count.0)
    }
}
