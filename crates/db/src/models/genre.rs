//! Genre entity model.

use reelstats_core::types::{DbId, ExternalId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `genres` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GenreRow {
    pub id: DbId,
    pub external_genre_id: ExternalId,
    pub name: String,
    pub created_at: Timestamp,
}
