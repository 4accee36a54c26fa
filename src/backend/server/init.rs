/**
 * Server Initialization
 *
 * # Initialization Process
 *
 * 1. Open the database and run migrations
 * 2. Make sure the media directory exists
 * 3. Build `AppState`
 * 4. Spawn the periodic maintenance sweep
 * 5. Create the router
 */

use axum::Router;

use crate::backend::maintenance;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;

/// Failure while bringing the server up
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Media directory error: {0}")]
    Io(#[from] std::io::Error),
}

/// Create and configure the Axum application
///
/// # Errors
///
/// Returns `InitError` when the database cannot be opened or migrated, or
/// when the media directory cannot be created.
pub async fn create_app(config: ServerConfig) -> Result<Router, InitError> {
    tracing::info!("[Init] Initializing ChatBloom server ({:?} mode)", config.mode);

    let pool = load_database(&config.database_url).await?;
    tracing::info!("[Init] Database ready at {}", config.database_url);

    tokio::fs::create_dir_all(&config.media_dir).await?;
    tracing::info!("[Init] Media directory: {}", config.media_dir.display());

    let app_state = AppState::new(pool, config);

    tokio::spawn(maintenance::run_periodic(app_state.clone()));
    tracing::info!(
        "[Init] Maintenance sweep every {:?}, stale after {:?}",
        app_state.config.sweep_interval,
        app_state.config.member_stale_after
    );

    Ok(create_router(app_state))
}
