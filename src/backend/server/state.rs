/**
 * Application State
 *
 * `AppState` is the central state container shared by every handler. It
 * is cheap to clone: the pool, the hub and the media store are handles,
 * and the configuration and keys sit behind `Arc`.
 *
 * The `FromRef` implementations let handlers extract only the part they
 * need, e.g. `State(pool): State<SqlitePool>`.
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::backend::auth::sessions::JwtKeys;
use crate::backend::media::storage::MediaStore;
use crate::backend::realtime::broadcast::RoomFeedHub;
use crate::backend::server::config::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// Loaded server configuration
    pub config: Arc<ServerConfig>,
    /// Session verification keys
    pub jwt: Arc<JwtKeys>,
    /// Per-room change feed channels
    pub feed: RoomFeedHub,
    /// Media object store
    pub media: MediaStore,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: ServerConfig) -> Self {
        let jwt = Arc::new(JwtKeys::from_secret(&config.jwt_secret));
        let media = MediaStore::new(config.media_dir.clone(), config.public_base_url.clone());
        Self {
            pool,
            config: Arc::new(config),
            jwt,
            feed: RoomFeedHub::new(),
            media,
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for RoomFeedHub {
    fn from_ref(state: &AppState) -> Self {
        state.feed.clone()
    }
}

impl FromRef<AppState> for MediaStore {
    fn from_ref(state: &AppState) -> Self {
        state.media.clone()
    }
}
