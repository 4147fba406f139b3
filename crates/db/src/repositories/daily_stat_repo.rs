//! Repository for the `daily_stats` table.

use chrono::NaiveDate;
use reelstats_core::types::DbId;
use sqlx::PgConnection;

use crate::models::daily_stat::{DailyStatRow, UpsertDailyStat};

/// Column list for `daily_stats` queries.
const COLUMNS: &str =
    "id, movie_id, date, popularity, vote_average, vote_count, created_at";

/// One row per movie per calendar day.
pub struct DailyStatRepo;

impl DailyStatRepo {
    /// Insert stats, overwriting only the metric columns when a row for the
    /// same `(movie_id, date)` exists.
    ///
    /// Callers must pass at most one record per `(movie_id, date)`.
    /// Returns the number of rows inserted or updated.
    pub async fn upsert_batch(
        conn: &mut PgConnection,
        stats: &[UpsertDailyStat],
    ) -> Result<u64, sqlx::Error> {
        if stats.is_empty() {
            return Ok(0);
        }

        let movie_ids: Vec<DbId> = stats.iter().map(|s| s.movie_id).collect();
        let dates: Vec<NaiveDate> = stats.iter().map(|s| s.date).collect();
        let popularities: Vec<f64> = stats.iter().map(|s| s.popularity).collect();
        let vote_averages: Vec<f64> = stats.iter().map(|s| s.vote_average).collect();
        let vote_counts: Vec<i64> = stats.iter().map(|s| s.vote_count).collect();

        let result = sqlx::query(
            "INSERT INTO daily_stats (movie_id, date, popularity, vote_average, vote_count) \
             SELECT * FROM UNNEST($1::bigint[], $2::date[], $3::float8[], $4::float8[], $5::bigint[]) \
             ON CONFLICT (movie_id, date) DO UPDATE \
             SET popularity = EXCLUDED.popularity, \
                 vote_average = EXCLUDED.vote_average, \
                 vote_count = EXCLUDED.vote_count",
        )
        .bind(&movie_ids)
        .bind(&dates)
        .bind(&popularities)
        .bind(&vote_averages)
        .bind(&vote_counts)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Find the stat row for a movie on a given day.
    pub async fn find(
        conn: &mut PgConnection,
        movie_id: DbId,
        date: NaiveDate,
    ) -> Result<Option<DailyStatRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM daily_stats WHERE movie_id = $1 AND date = $2");
        sqlx::query_as::<_, DailyStatRow>(&query)
            .bind(movie_id)
            .bind(date)
            .fetch_optional(conn)
            .await
    }

    /// List a movie's stats, oldest first.
    pub async fn list_by_movie(
        conn: &mut PgConnection,
        movie_id: DbId,
    ) -> Result<Vec<DailyStatRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM daily_stats WHERE movie_id = $1 ORDER BY date");
        sqlx::query_as::<_, DailyStatRow>(&query)
            .bind(movie_id)
            .fetch_all(conn)
            .await
    }

    pub async fn count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM daily_stats")
            .fetch_one(conn)
            .await?;
        Ok(count.0)
    }
}
