use std::str::FromStr;

use sqlx::postgres::PgConnectOptions;

use crate::error::ConfigError;

/// Database connection settings loaded from environment variables.
///
/// `DATABASE_URL` takes precedence. Without it the individual `DB_*`
/// variables are used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl DbConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var        | Default     |
    /// |----------------|-------------|
    /// | `DATABASE_URL` | unset       |
    /// | `DB_HOST`      | `localhost` |
    /// | `DB_PORT`      | `5432`      |
    /// | `DB_NAME`      | unset       |
    /// | `DB_USER`      | unset       |
    /// | `DB_PASSWORD`  | unset       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("DB_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "DB_PORT",
                value: raw,
            })?,
            None => 5432,
        };

        Ok(Self {
            url: non_empty("DATABASE_URL"),
            host: non_empty("DB_HOST").unwrap_or_else(|| "localhost".into()),
            port,
            database: non_empty("DB_NAME"),
            user: non_empty("DB_USER"),
            password: lookup("DB_PASSWORD"),
        })
    }

    /// Convert into sqlx connect options.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url)
                .map_err(|e| ConfigError::InvalidUrl(e.to_string()));
        }

        let mut options = PgConnectOptions::new().host(&self.host).port(self.port);
        if let Some(database) = &self.database {
            options = options.database(database);
        }
        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        Ok(options)
    }
}
