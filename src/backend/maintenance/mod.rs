/**
 * Scheduled Cleanup
 *
 * Members that stop sending heartbeats (closed tab, lost network) are
 * swept once their `last_seen` falls behind the stale threshold, and
 * invites that expired or ran out of uses are deactivated.
 *
 * The sweeps run on two paths:
 * - the cron endpoints, guarded by `CronGuard`
 * - the periodic task spawned by `create_app`
 */

use std::time::Duration;

use axum::extract::State;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::backend::error::BackendError;
use crate::backend::middleware::{CronGuard, Json, Query};
use crate::backend::rooms::{db::remove_stale_members, invites::deactivate_unusable};
use crate::backend::server::state::AppState;

/// Query of `POST /api/maintenance/cleanup-members`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CleanupMembersQuery {
    /// Override of the configured stale threshold
    pub threshold_seconds: Option<u64>,
}

/// Response of `POST /api/maintenance/cleanup-members`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CleanupMembersResponse {
    pub removed: u64,
}

/// Response of `POST /api/maintenance/cleanup-invites`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CleanupInvitesResponse {
    pub deactivated: u64,
}

/// Outcome of one periodic sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub removed_members: u64,
    pub deactivated_invites: u64,
    pub pruned_channels: usize,
}

/// Remove memberships idle for longer than `threshold`
pub async fn sweep_stale_members(state: &AppState, threshold: Duration) -> Result<u64, BackendError> {
    let threshold = chrono::Duration::from_std(threshold)
        .map_err(|_| BackendError::bad_request("Threshold is out of range"))?;
    let cutoff = Utc::now() - threshold;
    let removed = remove_stale_members(&state.pool, cutoff).await?;
    if removed > 0 {
        tracing::info!("[Cleanup] Removed {} stale room members", removed);
    }
    Ok(removed)
}

/// Deactivate expired and exhausted invites
pub async fn sweep_invites(state: &AppState) -> Result<u64, BackendError> {
    let deactivated = deactivate_unusable(&state.pool, Utc::now()).await?;
    if deactivated > 0 {
        tracing::info!("[Cleanup] Deactivated {} invites", deactivated);
    }
    Ok(deactivated)
}

/// Run every sweep once with the configured threshold
pub async fn run_sweep(state: &AppState) -> Result<SweepReport, BackendError> {
    let removed_members = sweep_stale_members(state, state.config.member_stale_after).await?;
    let deactivated_invites = sweep_invites(state).await?;
    let pruned_channels = state.feed.prune_idle();
    Ok(SweepReport {
        removed_members,
        deactivated_invites,
        pruned_channels,
    })
}

/// Loop `run_sweep` on the configured interval
///
/// Failures are logged and the loop continues with the next tick.
pub async fn run_periodic(state: AppState) {
    let mut interval = tokio::time::interval(state.config.sweep_interval);
    // The first tick completes immediately.
    interval.tick().await;
    loop {
        interval.tick().await;
        match run_sweep(&state).await {
            Ok(report) => tracing::debug!("[Cleanup] Sweep finished: {:?}", report),
            Err(e) => tracing::error!("[Cleanup] Sweep failed: {}", e),
        }
    }
}

/// Cron endpoint: sweep stale members
///
/// # Errors
/// * `401 Unauthorized` - missing or wrong cron secret outside development
/// * `400 Bad Request` - zero threshold
pub async fn cleanup_members(
    _guard: CronGuard,
    State(state): State<AppState>,
    Query(query): Query<CleanupMembersQuery>,
) -> Result<Json<CleanupMembersResponse>, BackendError> {
    let threshold = match query.threshold_seconds {
        Some(0) => return Err(BackendError::bad_request("threshold_seconds must be at least 1")),
        Some(seconds) => Duration::from_secs(seconds),
        None => state.config.member_stale_after,
    };
    let removed = sweep_stale_members(&state, threshold).await?;
    Ok(Json(CleanupMembersResponse { removed }))
}

/// Cron endpoint: deactivate unusable invites
pub async fn cleanup_invites(
    _guard: CronGuard,
    State(state): State<AppState>,
) -> Result<Json<CleanupInvitesResponse>, BackendError> {
    let deactivated = sweep_invites(&state).await?;
    Ok(Json(CleanupInvitesResponse { deactivated }))
}
