/**
 * Server Configuration
 *
 * This module loads the server configuration from environment variables
 * (a `.env` file is read by `main` through `dotenv`) and opens the SQLite
 * store.
 *
 * # Configuration Sources
 *
 * | Variable                 | Default                    |
 * |--------------------------|----------------------------|
 * | `SERVER_PORT`            | `3000`                     |
 * | `DATABASE_URL`           | `sqlite://chatbloom.db`    |
 * | `JWT_SECRET`             | dev-only fallback          |
 * | `CRON_SECRET`            | unset                      |
 * | `APP_ENV`                | `production`               |
 * | `MEDIA_DIR`              | `./media`                  |
 * | `PUBLIC_BASE_URL`        | `http://127.0.0.1:<port>`  |
 * | `MEMBER_STALE_SECONDS`   | `120`                      |
 * | `SWEEP_INTERVAL_SECONDS` | `60`                       |
 * | `MAX_UPLOAD_BYTES`       | `5242880`                  |
 *
 * Missing values fall back to their defaults with a log line. Values that
 * are present but unparsable are errors.
 */

use std::{fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;

use crate::shared::media::MAX_UPLOAD_BYTES;

/// Secret used when `JWT_SECRET` is unset in development mode
const DEV_JWT_SECRET: &str = "chatbloom-dev-secret-change-me";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}

/// Runtime mode of the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    Development,
    Production,
}

impl FromStr for RuntimeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(RuntimeMode::Development),
            "production" | "prod" => Ok(RuntimeMode::Production),
            other => Err(format!("unknown runtime mode '{}'", other)),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    /// Shared secret for the scheduled cleanup endpoints
    pub cron_secret: Option<String>,
    pub mode: RuntimeMode,
    /// Root directory of stored media
    pub media_dir: PathBuf,
    /// Base of public media URLs, without trailing slash
    pub public_base_url: String,
    /// Memberships older than this are swept
    pub member_stale_after: Duration,
    /// Period of the background maintenance task
    pub sweep_interval: Duration,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for unparsable values and
    /// `ConfigError::MissingValue` when `JWT_SECRET` is unset outside
    /// development mode.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = try_load(&lookup, "SERVER_PORT", "3000")?;
        let mode: RuntimeMode = try_load(&lookup, "APP_ENV", "production")?;

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None if mode == RuntimeMode::Development => {
                tracing::warn!("[Config] JWT_SECRET not set, using development secret");
                DEV_JWT_SECRET.to_string()
            }
            None => return Err(ConfigError::MissingValue("JWT_SECRET")),
        };

        let cron_secret = lookup("CRON_SECRET").filter(|s| !s.is_empty());
        if cron_secret.is_none() && mode == RuntimeMode::Production {
            tracing::warn!("[Config] CRON_SECRET not set, cleanup endpoints will reject all callers");
        }

        let default_base = format!("http://127.0.0.1:{}", port);
        let public_base_url: String = try_load(&lookup, "PUBLIC_BASE_URL", &default_base)?;

        Ok(Self {
            port,
            database_url: try_load(&lookup, "DATABASE_URL", "sqlite://chatbloom.db")?,
            jwt_secret,
            cron_secret,
            mode,
            media_dir: PathBuf::from(try_load::<String, _>(&lookup, "MEDIA_DIR", "./media")?),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            member_stale_after: Duration::from_secs(try_load(&lookup, "MEMBER_STALE_SECONDS", "120")?),
            sweep_interval: Duration::from_secs(try_load(&lookup, "SWEEP_INTERVAL_SECONDS", "60")?),
            max_upload_bytes: try_load(&lookup, "MAX_UPLOAD_BYTES", &MAX_UPLOAD_BYTES.to_string())?,
        })
    }

    /// Configuration for tests and local tooling
    pub fn development(database_url: impl Into<String>, media_dir: impl Into<PathBuf>) -> Self {
        Self {
            port: 3000,
            database_url: database_url.into(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            cron_secret: None,
            mode: RuntimeMode::Development,
            media_dir: media_dir.into(),
            public_base_url: "http://127.0.0.1:3000".to_string(),
            member_stale_after: Duration::from_secs(120),
            sweep_interval: Duration::from_secs(60),
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }

    pub fn is_development(&self) -> bool {
        self.mode == RuntimeMode::Development
    }
}

fn try_load<T, F>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| {
        tracing::info!("[Config] {} not set, using default: {}", key, default);
        default.to_string()
    });
    raw.trim().parse::<T>().map_err(|e| {
        tracing::warn!("[Config] Invalid {} value: {}", key, e);
        ConfigError::InvalidValue {
            key,
            message: e.to_string(),
        }
    })
}

/// Open the SQLite pool and run migrations
///
/// # Arguments
///
/// * `database_url` - `sqlite://` URL; `sqlite::memory:` keeps a single
///   connection alive so every query sees the same in-memory database
///
/// # Errors
///
/// Returns the connection or migration error.
pub async fn load_database(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    tracing::info!("[Database] Connecting to {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let in_memory = database_url.contains(":memory:");
    let pool = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?
    };

    tracing::info!("[Database] Running migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("[Database] Migrations completed successfully");

    Ok(pool)
}
