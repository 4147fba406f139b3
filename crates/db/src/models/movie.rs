//! Movie entity model.

use chrono::NaiveDate;
use reelstats_core::types::{DbId, ExternalId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `movies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MovieRow {
    pub id: DbId,
    pub external_movie_id: ExternalId,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub original_language: String,
    pub runtime: Option<i32>,
    pub budget: i64,
    pub revenue: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
