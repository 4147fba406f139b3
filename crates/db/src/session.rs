//! Single-connection session for one load run.
//!
//! A [`LoadSession`] owns exactly one [`PgConnection`] for the lifetime of a
//! run. Each entity batch runs inside its own [`BatchTransaction`] and is
//! committed on its own, so earlier batches stay durable when a later one
//! fails.

use sqlx::postgres::Postgres;
use sqlx::{Connection, PgConnection, Transaction};

use crate::config::DbConfig;
use crate::error::DbError;

pub struct LoadSession {
    conn: Option<PgConnection>,
}

impl LoadSession {
    /// Connect to the store described by `config`.
    ///
    /// Any failure (bad configuration, unreachable host, rejected
    /// credentials) is reported as [`DbError::Connection`].
    pub async fn open(config: &DbConfig) -> Result<Self, DbError> {
        let options = config.connect_options().map_err(|e| {
            DbError::Connection(sqlx::Error::Configuration(Box::new(e)))
        })?;
        let conn = PgConnection::connect_with(&options)
            .await
            .map_err(DbError::Connection)?;
        tracing::info!(host = %config.host, port = config.port, "Database connection opened");
        Ok(Self { conn: Some(conn) })
    }

    /// Wrap a connection that is already open.
    pub fn from_connection(conn: PgConnection) -> Self {
        Self { conn: Some(conn) }
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Borrow the live connection for statements outside a batch.
    pub fn connection(&mut self) -> Result<&mut PgConnection, DbError> {
        self.conn.as_mut().ok_or(DbError::Closed)
    }

    /// Confirm the connection answers queries.
    pub async fn health_check(&mut self) -> Result<(), DbError> {
        crate::health_check(self.connection()?)
            .await
            .map_err(DbError::Connection)
    }

    /// Start a transaction scoped to one entity batch.
    ///
    /// Dropping the returned transaction without calling
    /// [`BatchTransaction::commit`] rolls the batch back.
    pub async fn begin(&mut self, label: &'static str) -> Result<BatchTransaction<'_>, DbError> {
        let tx = self.connection()?.begin().await?;
        tracing::debug!(batch = label, "Batch transaction started");
        Ok(BatchTransaction { label, tx })
    }

    /// Release the connection. Calling this on a closed session is a no-op.
    pub async fn close(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        match conn.close().await {
            Ok(()) => tracing::info!("Database connection closed"),
            // The socket is dropped either way; nothing left to release.
            Err(e) => tracing::warn!(error = %e, "Database connection closed uncleanly"),
        }
    }
}

/// An open transaction covering exactly one entity batch.
pub struct BatchTransaction<'s> {
    label: &'static str,
    tx: Transaction<'s, Postgres>,
}

impl BatchTransaction<'_> {
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Connection to issue this batch's statements on.
    pub fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    /// Durably apply every statement issued in this batch.
    pub async fn commit(self) -> Result<(), DbError> {
        self.tx.commit().await?;
        tracing::debug!(batch = self.label, "Batch committed");
        Ok(())
    }

    /// Discard every statement issued in this batch.
    pub async fn rollback(self) -> Result<(), DbError> {
        self.tx.rollback().await?;
        tracing::debug!(batch = self.label, "Batch rolled back");
        Ok(())
    }
}
