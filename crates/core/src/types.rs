/// All surrogate primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Identifiers assigned by the upstream movie catalog (TMDB).
pub type ExternalId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
