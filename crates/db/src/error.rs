use sqlx::migrate::MigrateError;

/// Errors raised while reading database configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },

    #[error("Invalid DATABASE_URL: {0}")]
    InvalidUrl(String),
}

/// Store-level failures surfaced by the session and repositories.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The store is unreachable or rejected the credentials.
    #[error("Connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// An integrity constraint (SQLSTATE class 23) rejected a write.
    #[error("Constraint violation: {message}")]
    ConstraintViolation {
        constraint: Option<String>,
        message: String,
    },

    /// The session was used after `close()`.
    #[error("Session is closed")]
    Closed,

    #[error("Migration error: {0}")]
    Migration(#[from] MigrateError),

    /// Any other database failure (dropped connection, I/O, protocol).
    #[error("Store error: {0}")]
    Store(#[source] sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        classify_sqlx_error(err)
    }
}

/// PostgreSQL SQLSTATE class for integrity constraint violations.
const INTEGRITY_CONSTRAINT_CLASS: &str = "23";

/// Classify a sqlx error into a constraint violation or a generic store error.
///
/// - SQLSTATE `23xxx` (unique, foreign key, check, not-null) maps to
///   [`DbError::ConstraintViolation`].
/// - Everything else maps to [`DbError::Store`].
pub fn classify_sqlx_error(err: sqlx::Error) -> DbError {
    if let sqlx::Error::Database(db_err) = &err {
        let is_integrity = db_err
            .code()
            .is_some_and(|code| code.starts_with(INTEGRITY_CONSTRAINT_CLASS));
        if is_integrity {
            return DbError::ConstraintViolation {
                constraint: db_err.constraint().map(str::to_string),
                message: db_err.message().to_string(),
            };
        }
    }
    DbError::Store(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_store_errors() {
        assert!(matches!(
            classify_sqlx_error(sqlx::Error::RowNotFound),
            DbError::Store(sqlx::Error::RowNotFound)
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::Store(_)
        ));
    }

    #[test]
    fn constraint_violation_display_carries_message() {
        let err = DbError::ConstraintViolation {
            constraint: Some("ck_daily_stats_vote_average".into()),
            message: "new row violates check constraint".into(),
        };
        assert_eq!(
            err.to_string(),
            "Constraint violation: new row violates check constraint"
        );
    }
}
