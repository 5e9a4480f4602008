//! The daily refresh scheduler and reconciliation loop.

use crate::checkpoint::RefreshCheckpoint;
use crate::error::RefreshResult;
use crate::events::{RefreshEvent, RefreshEvents};
use archive_api::ApiClient;
use archive_auth::AuthStore;
use archive_storage::KeyValueStore;
use chrono::{NaiveTime, Timelike};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Stat delta applied per daily task outcome.
const STAT_DELTA: i64 = 1;
/// Points awarded when an arc's streak extends.
const STREAK_POINTS: i64 = 1;

/// Scheduling knobs. Defaults match the shipped client: a short startup
/// grace so the session can restore first, then a one-minute poll.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    pub poll_interval: Duration,
    pub startup_delay: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            startup_delay: Duration::from_secs(2),
        }
    }
}

/// Once-per-day reconciliation of arc streaks, stats, and point awards.
///
/// Constructed once at startup and shared by handle; `start` arms the
/// polling task, `stop` cancels it (but not an in-flight run), and
/// `force_refresh` runs immediately, bypassing the day guard.
#[derive(Clone)]
pub struct DailyRefreshService {
    api: ApiClient,
    auth: AuthStore,
    checkpoint: Arc<RefreshCheckpoint>,
    events: RefreshEvents,
    config: RefreshConfig,
    // Serializes scheduled ticks and forced runs; overlapping runs
    // could double-award points.
    run_lock: Arc<tokio::sync::Mutex<()>>,
    poll_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl DailyRefreshService {
    pub fn new(
        api: ApiClient,
        auth: AuthStore,
        storage: Arc<dyn KeyValueStore>,
        events: RefreshEvents,
    ) -> Self {
        Self::with_config(api, auth, storage, events, RefreshConfig::default())
    }

    pub fn with_config(
        api: ApiClient,
        auth: AuthStore,
        storage: Arc<dyn KeyValueStore>,
        events: RefreshEvents,
        config: RefreshConfig,
    ) -> Self {
        let checkpoint = Arc::new(RefreshCheckpoint::new(storage));
        if let Err(e) = checkpoint.load() {
            warn!(error = %e, "Could not load refresh checkpoint, starting unset");
        }
        Self {
            api,
            auth,
            checkpoint,
            events,
            config,
            run_lock: Arc::new(tokio::sync::Mutex::new(())),
            poll_task: Arc::new(Mutex::new(None)),
        }
    }

    /// Arm the polling task. Idempotent: a second call while the task
    /// is alive does nothing.
    pub fn start(&self) {
        let mut task = self.poll_task.lock().expect("poll task lock poisoned");
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            debug!("Daily refresh service already running");
            return;
        }

        // Pick up checkpoint changes written since construction.
        if let Err(e) = self.checkpoint.load() {
            warn!(error = %e, "Could not reload refresh checkpoint");
        }

        info!(
            poll_secs = self.config.poll_interval.as_secs(),
            "Starting daily refresh service"
        );

        let service = self.clone();
        *task = Some(tokio::spawn(async move {
            // Startup check after a short grace, in case the process
            // came up after midnight. The auth restore runs first.
            tokio::time::sleep(service.config.startup_delay).await;
            service.tick().await;

            let mut interval = tokio::time::interval(service.config.poll_interval);
            loop {
                interval.tick().await;
                service.tick().await;
            }
        }));
    }

    /// Cancel the polling task. An in-flight reconciliation is not
    /// interrupted.
    pub fn stop(&self) {
        let mut task = self.poll_task.lock().expect("poll task lock poisoned");
        if let Some(task) = task.take() {
            task.abort();
            info!("Daily refresh service stopped");
        }
    }

    /// Whether the polling task is armed.
    pub fn is_running(&self) -> bool {
        self.poll_task
            .lock()
            .expect("poll task lock poisoned")
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }

    /// One poll step: compare the wall clock against the checkpoint and
    /// reconcile when a day boundary was crossed. The checkpoint only
    /// advances when the run completes, so a failed run retries on the
    /// next tick.
    pub async fn tick(&self) {
        let now = chrono::Local::now();
        let today = now.format("%Y-%m-%d").to_string();
        let last = self.checkpoint.last();

        if !due_for_refresh(last.as_deref(), &today, now.time()) {
            return;
        }

        info!(date = %today, last = ?last, "Day boundary detected, running daily refresh");
        match self.run_reconciliation().await {
            Ok(_) => {
                if let Err(e) = self.checkpoint.advance(&today) {
                    warn!(error = %e, "Failed to persist refresh checkpoint");
                }
            }
            Err(e) => {
                warn!(error = %e, "Daily refresh failed, will retry on a later tick");
            }
        }
    }

    /// Run a reconciliation immediately, bypassing the day guard. The
    /// checkpoint is not advanced, so the next scheduled boundary still
    /// refreshes.
    pub async fn force_refresh(&self) -> RefreshResult<usize> {
        info!("Forcing daily refresh");
        self.run_reconciliation().await
    }

    /// One full pass over the signed-in user's arcs, strictly
    /// sequential. Aborts only when the arc list itself cannot be
    /// fetched; per-arc failures are logged and skipped.
    async fn run_reconciliation(&self) -> RefreshResult<usize> {
        let _guard = self.run_lock.lock().await;

        let Some(user) = self.auth.current_user() else {
            debug!("No user signed in, skipping daily refresh");
            return Ok(0);
        };
        let user_key = user.backend_key();
        let run_id = Uuid::new_v4();

        let arcs = self.api.get_arcs(user_key).await?;
        info!(run_id = %run_id, user = %user_key, arcs = arcs.len(), "Reconciling arcs");

        for arc_id in &arcs {
            if let Err(e) = self.process_arc(run_id, user_key, arc_id).await {
                warn!(run_id = %run_id, arc = %arc_id, error = %e, "Arc reconciliation failed, continuing");
            }
        }

        self.events.emit(RefreshEvent::DailyRefreshCompleted {
            run_id,
            arcs_processed: arcs.len(),
        });
        info!(run_id = %run_id, "Daily refresh complete");
        Ok(arcs.len())
    }

    async fn process_arc(&self, run_id: Uuid, user_key: &str, arc_id: &str) -> RefreshResult<()> {
        let Some(arc) = self.api.get_arc(arc_id).await? else {
            warn!(run_id = %run_id, arc = %arc_id, "Arc detail unavailable, skipping");
            return Ok(());
        };
        let old_streak = arc.streak;

        // Progress must be read before the streak update resets the
        // per-member flags.
        let progress = self.api.get_arc_status(arc_id).await?;
        let completed = progress
            .iter()
            .find(|entry| entry.user.matches(user_key))
            .map(|entry| entry.daily_progress)
            .unwrap_or(false);

        // The backend owns the streak logic: this call advances or
        // resets the streak and clears daily progress.
        let new_streak = self.api.update_arc_streak(arc_id).await?;
        let streak_extended = new_streak > old_streak;

        info!(
            run_id = %run_id,
            arc = %arc.name,
            completed,
            old_streak,
            new_streak,
            streak_extended,
            "Processed arc"
        );

        if completed {
            self.api
                .update_stat_completed(user_key, &arc.stat, STAT_DELTA)
                .await?;
        } else {
            self.api
                .update_stat_incomplete(user_key, &arc.stat, STAT_DELTA)
                .await?;
        }

        if streak_extended {
            self.api.earn_points(user_key, STREAK_POINTS).await?;
        }

        Ok(())
    }
}

/// Day-boundary decision.
///
/// A matching checkpoint means we already ran today. A differing one
/// means a boundary was crossed while we were away. An unset checkpoint
/// only triggers within the first minute after midnight, so a fresh
/// install does not immediately replay a day that mostly happened
/// without it.
fn due_for_refresh(last: Option<&str>, today: &str, now: NaiveTime) -> bool {
    match last {
        Some(last) if last == today => false,
        Some(_) => true,
        None => now.hour() == 0 && now.minute() < 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn same_day_checkpoint_is_a_noop() {
        assert!(!due_for_refresh(
            Some("2026-08-29"),
            "2026-08-29",
            time(12, 0, 0)
        ));
    }

    #[test]
    fn crossed_boundary_triggers_at_any_time() {
        assert!(due_for_refresh(
            Some("2026-08-28"),
            "2026-08-29",
            time(17, 45, 0)
        ));
    }

    #[test]
    fn unset_checkpoint_triggers_only_just_after_midnight() {
        assert!(due_for_refresh(None, "2026-08-29", time(0, 0, 30)));
        assert!(!due_for_refresh(None, "2026-08-29", time(0, 1, 0)));
        assert!(!due_for_refresh(None, "2026-08-29", time(9, 30, 0)));
    }
}
