//! Daily refresh reconciliation for the ArcHive client.
//!
//! The backend keeps per-arc streaks and per-member daily-progress flags
//! but runs no cron of its own; the client reconciles them once per
//! calendar day. [`DailyRefreshService`] polls the wall clock, detects a
//! day boundary, and walks every arc the signed-in user belongs to:
//! streak update, stat credit/debit, and a point award when the streak
//! extended. A completion event goes out on the local bus afterwards.
//!
//! # Core Invariants
//!
//! 1. **At most one run per calendar day**: the persisted checkpoint is
//!    compared against the current date on every tick.
//! 2. **Checkpoint advances only on structural success**: a failed
//!    arc-list fetch leaves the checkpoint untouched so the next tick
//!    retries; an empty arc list still counts as a completed run.
//! 3. **Strictly sequential arcs**: one arc's remote side effects finish
//!    before the next arc starts, so overlapping updates can never
//!    double-award points.
//! 4. **Per-arc fault isolation**: one unreachable arc is logged and
//!    skipped, never aborting the batch.

mod checkpoint;
mod error;
mod events;
mod server_events;
mod service;

pub use error::{RefreshError, RefreshResult};
pub use events::{RefreshEvent, RefreshEvents};
pub use server_events::ServerEventListener;
pub use service::{DailyRefreshService, RefreshConfig};
