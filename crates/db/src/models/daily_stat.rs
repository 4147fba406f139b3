//! Daily popularity statistics model and DTOs.

use chrono::NaiveDate;
use reelstats_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `daily_stats` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyStatRow {
    pub id: DbId,
    pub movie_id: DbId,
    pub date: NaiveDate,
    pub popularity: f64,
    pub vote_average: f64,
    pub vote_count: i64,
    pub created_at: Timestamp,
}

/// DTO for upserting one day's metrics for a movie already resolved to its
/// surrogate id.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertDailyStat {
    pub movie_id: DbId,
    pub date: NaiveDate,
    pub popularity: f64,
    pub vote_average: f64,
    pub vote_count: i64,
}
