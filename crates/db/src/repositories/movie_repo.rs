//! Repository for the `movies` table.

use std::collections::HashMap;

use chrono::NaiveDate;
use reelstats_core::records::Movie;
use reelstats_core::types::{DbId, ExternalId};
use sqlx::PgConnection;

use crate::models::movie::MovieRow;

/// Column list for `movies` queries.
const COLUMNS: &str = "id, external_movie_id, title, release_date, overview, poster_path, \
    backdrop_path, original_language, runtime, budget, revenue, created_at, updated_at";

/// Upserts and lookups for movies keyed by their catalog id.
pub struct MovieRepo;

impl MovieRepo {
    /// Insert movies, replacing every mutable column and refreshing
    /// `updated_at` when the external id already exists.
    ///
    /// Callers must pass at most one record per `external_movie_id`.
    /// Returns the number of rows inserted or updated.
    pub async fn upsert_batch(
        conn: &mut PgConnection,
        movies: &[Movie],
    ) -> Result<u64, sqlx::Error> {
        if movies.is_empty() {
            return Ok(0);
        }

        let external_ids: Vec<ExternalId> = movies.iter().map(|m| m.external_movie_id).collect();
        let titles: Vec<&str> = movies.iter().map(|m| m.title.as_str()).collect();
        let release_dates: Vec<Option<NaiveDate>> = movies.iter().map(|m| m.release_date).collect();
        let overviews: Vec<&str> = movies.iter().map(|m| m.overview.as_str()).collect();
        let poster_paths: Vec<Option<&str>> =
            movies.iter().map(|m| m.poster_path.as_deref()).collect();
        let backdrop_paths: Vec<Option<&str>> =
            movies.iter().map(|m| m.backdrop_path.as_deref()).collect();
        let languages: Vec<&str> = movies.iter().map(|m| m.original_language.as_str()).collect();
        let runtimes: Vec<Option<i32>> = movies.iter().map(|m| m.runtime).collect();
        let budgets: Vec<i64> = movies.iter().map(|m| m.budget).collect();
        let revenues: Vec<i64> = movies.iter().map(|m| m.revenue).collect();

        let result = sqlx::query(
            "INSERT INTO movies \
                (external_movie_id, title, release_date, overview, poster_path, \
                 backdrop_path, original_language, runtime, budget, revenue) \
             SELECT * FROM UNNEST( \
                $1::bigint[], $2::text[], $3::date[], $4::text[], $5::text[], \
                $6::text[], $7::text[], $8::int4[], $9::bigint[], $10::bigint[]) \
             ON CONFLICT (external_movie_id) DO UPDATE \
             SET title = EXCLUDED.title, \
                 release_date = EXCLUDED.release_date, \
                 overview = EXCLUDED.overview, \
                 poster_path = EXCLUDED.poster_path, \
                 backdrop_path = EXCLUDED.backdrop_path, \
                 original_language = EXCLUDED.original_language, \
                 runtime = EXCLUDED.runtime, \
                 budget = EXCLUDED.budget, \
                 revenue = EXCLUDED.revenue, \
                 updated_at = NOW()",
        )
        .bind(&external_ids)
        .bind(&titles)
        .bind(&release_dates)
        .bind(&overviews)
        .bind(&poster_paths)
        .bind(&backdrop_paths)
        .bind(&languages)
        .bind(&runtimes)
        .bind(&budgets)
        .bind(&revenues)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Map external movie ids to surrogate ids in one query.
    ///
    /// Ids with no persisted movie are simply absent from the result.
    pub async fn resolve_ids(
        conn: &mut PgConnection,
        external_ids: &[ExternalId],
    ) -> Result<HashMap<ExternalId, DbId>, sqlx::Error> {
        if external_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(ExternalId, DbId)> = sqlx::query_as(
            "SELECT external_movie_id, id FROM movies WHERE external_movie_id = ANY($1)",
        )
        .bind(external_ids)
        .fetch_all(conn)
        .await?;
        Ok(rows.into_iter().collect())
    }

    /// Find a movie by its catalog id.
    pub async fn find_by_external_id(
        conn: &mut PgConnection,
        external_movie_id: ExternalId,
    ) -> Result<Option<MovieRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM movies WHERE external_movie_id = $1");
        sqlx::query_as::<_, MovieRow>(&query)
            .bind(external_movie_id)
            .fetch_optional(conn)
            .await
    }

    /// List all movies ordered by catalog id.
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<MovieRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM movies ORDER BY external_movie_id");
        sqlx::query_as::<_, MovieRow>(&query).fetch_all(conn).await
    }

    pub async fn count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM movies")
            .fetch_one(conn)
            .await?;
        Ok(count.0)
    }
}
