//! Repository for the `genres` table.

use std::collections::HashMap;

use reelstats_core::records::Genre;
use reelstats_core::types::{DbId, ExternalId};
use sqlx::PgConnection;

use crate::models::genre::GenreRow;

/// Column list for `genres` queries.
const COLUMNS: &str = "id, external_genre_id, name, created_at";

/// Upserts and lookups for genres keyed by their catalog id.
pub struct GenreRepo;

impl GenreRepo {
    /// Insert genres, overwriting `name` when the external id already exists.
    ///
    /// Callers must pass at most one record per `external_genre_id`.
    /// Returns the number of rows inserted or updated.
    pub async fn upsert_batch(
        conn: &mut PgConnection,
        genres: &[Genre],
    ) -> Result<u64, sqlx::Error> {
        if genres.is_empty() {
            return Ok(0);
        }

        let external_ids: Vec<ExternalId> = genres.iter().map(|g| g.external_genre_id).collect();
        let names: Vec<&str> = genres.iter().map(|g| g.name.as_str()).collect();

        let result = sqlx::query(
            "INSERT INTO genres (external_genre_id, name) \
             SELECT * FROM UNNEST($1::bigint[], $2::text[]) \
             ON CONFLICT (external_genre_id) DO UPDATE \
             SET name = EXCLUDED.name",
        )
        .bind(&external_ids)
        .bind(&names)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Map external genre ids to surrogate ids in one query.
    ///
    /// Ids with no persisted genre are simply absent from the result.
    pub async fn resolve_ids(
        conn: &mut PgConnection,
        external_ids: &[ExternalId],
    ) -> Result<HashMap<ExternalId, DbId>, sqlx::Error> {
        if external_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(ExternalId, DbId)> = sqlx::query_as(
            "SELECT external_genre_id, id FROM genres WHERE external_genre_id = ANY($1)",
        )
        .bind(external_ids)
        .fetch_all(conn)
        .await?;
        Ok(rows.into_iter().collect())
    }

    /// Find a genre by its catalog id.
    pub async fn find_by_external_id(
        conn: &mut PgConnection,
        external_genre_id: ExternalId,
    ) -> Result<Option<GenreRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM genres WHERE external_genre_id = $1");
        sqlx::query_as::<_, GenreRow>(&query)
            .bind(external_genre_id)
            .fetch_optional(conn)
            .await
    }

    /// List all genres ordered by catalog id.
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<GenreRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM genres ORDER BY external_genre_id");
        sqlx::query_as::<_, GenreRow>(&query).fetch_all(conn).await
    }

    pub async fn count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM genres")
            .fetch_one(conn)
            .await?;
        Ok(count.0)
    }
}
