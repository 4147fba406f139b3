use sqlx::migrate::MigrateError;
use sqlx::PgConnection;

pub mod config;
pub mod error;
pub mod models;
pub mod repositories;
pub mod session;

pub use config::DbConfig;
pub use error::{ConfigError, DbError};
pub use session::{BatchTransaction, LoadSession};

/// Round-trip a trivial query to confirm the connection is usable.
pub async fn health_check(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(conn).await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(conn: &mut PgConnection) -> Result<(), MigrateError> {
    sqlx::migrate!("../../db/migrations").run(conn).await
}
