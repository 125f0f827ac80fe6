//! # Snapshot State
//!
//! The dashboard's local copy of both collections, plus readiness and the
//! last reported error.
//!
//! ## Who Writes What
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Snapshot State Updates                               │
//! │                                                                         │
//! │  Source                    Method                 Field changed         │
//! │  ──────                    ──────                 ─────────────         │
//! │                                                                         │
//! │  details subscription ───► apply_details() ─────► snapshot.details     │
//! │                                                   details loaded        │
//! │                                                                         │
//! │  allocations subscription► apply_allocations() ─► snapshot.allocations │
//! │                                                                         │
//! │  subscription error ─────► record_feed_error() ─► last_error           │
//! │  startup failure ────────► record_init_error() ─► last_error,          │
//! │                                                   init failed           │
//! │                                                                         │
//! │  command failure ────────► record_error() ──────► last_error           │
//! │  command success ────────► clear_error() ───────► last_error = None    │
//! │                                                                         │
//! │  ready = details loaded && !init failed                                │
//! │                                                                         │
//! │  NOTE: commands never write the snapshot. A failed write leaves the    │
//! │        last good snapshot in place.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! State sits behind `Arc<RwLock<_>>`: listener tasks write, commands and
//! views read. A `watch` revision counter lets callers await the next change.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use farm_core::capacity::detail_name_history;
use farm_core::rules::audit_snapshot;
use farm_core::{Detail, FarmSnapshot, RoomAllocation};
use farm_db::Collection;

use crate::error::AppError;

#[derive(Debug)]
struct Inner {
    snapshot: FarmSnapshot,
    details_loaded: bool,
    init_failed: bool,
    loading: bool,
    last_error: Option<AppError>,
    synced_at: Option<DateTime<Utc>>,
}

impl Default for Inner {
    fn default() -> Self {
        Inner {
            snapshot: FarmSnapshot::default(),
            details_loaded: false,
            init_failed: false,
            loading: true,
            last_error: None,
            synced_at: None,
        }
    }
}

impl Inner {
    fn is_ready(&self) -> bool {
        self.details_loaded && !self.init_failed
    }
}

/// Readiness and error flags as shown in the dashboard header.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatus {
    /// First details snapshot has arrived and startup did not fail.
    pub ready: bool,
    /// Still waiting for the first snapshot and nothing has failed yet.
    pub loading: bool,
    pub last_error: Option<AppError>,
    pub synced_at: Option<DateTime<Utc>>,
    pub details: usize,
    pub allocations: usize,
}

/// Shared snapshot state.
#[derive(Debug, Clone)]
pub struct SnapshotState {
    inner: Arc<RwLock<Inner>>,
    revision: Arc<watch::Sender<u64>>,
}

impl Default for SnapshotState {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotState {
    /// Creates an empty, loading state.
    pub fn new() -> Self {
        let (revision, _rx) = watch::channel(0);
        SnapshotState {
            inner: Arc::new(RwLock::new(Inner::default())),
            revision: Arc::new(revision),
        }
    }

    // A panicking writer cannot leave the snapshot half-replaced, so a
    // poisoned lock still holds a consistent value.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    // =========================================================================
    // Readers
    // =========================================================================

    /// Clone of the current snapshot.
    pub fn snapshot(&self) -> FarmSnapshot {
        self.read().snapshot.clone()
    }

    /// Runs `f` against the current snapshot without cloning it.
    pub fn with_snapshot<R>(&self, f: impl FnOnce(&FarmSnapshot) -> R) -> R {
        f(&self.read().snapshot)
    }

    /// True once the first details snapshot has arrived, unless seeding or
    /// an initial subscription failed.
    pub fn is_ready(&self) -> bool {
        self.read().is_ready()
    }

    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    pub fn last_error(&self) -> Option<AppError> {
        self.read().last_error.clone()
    }

    /// Distinct detail names in first-seen order.
    pub fn name_history(&self) -> Vec<String> {
        self.with_snapshot(|s| detail_name_history(&s.details))
    }

    pub fn status(&self) -> DashboardStatus {
        let inner = self.read();
        DashboardStatus {
            ready: inner.is_ready(),
            loading: inner.loading,
            last_error: inner.last_error.clone(),
            synced_at: inner.synced_at,
            details: inner.snapshot.details.len(),
            allocations: inner.snapshot.allocations.len(),
        }
    }

    /// Waits until `pred` holds for the snapshot.
    pub async fn wait_until(&self, pred: impl Fn(&FarmSnapshot) -> bool) {
        let mut rx = self.revision.subscribe();
        loop {
            if self.with_snapshot(&pred) {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    // =========================================================================
    // Writers
    // =========================================================================

    /// Replaces the details collection.
    pub fn apply_details(&self, details: &[Detail]) {
        {
            let mut inner = self.write();
            inner.snapshot.details = details.to_vec();
            inner.details_loaded = true;
            inner.loading = false;
            inner.synced_at = Some(Utc::now());
            audit(&inner.snapshot);
        }
        debug!(count = details.len(), "Details snapshot applied");
        self.bump();
    }

    /// Replaces the allocations collection.
    pub fn apply_allocations(&self, allocations: &[RoomAllocation]) {
        {
            let mut inner = self.write();
            inner.snapshot.allocations = allocations.to_vec();
            inner.synced_at = Some(Utc::now());
            audit(&inner.snapshot);
        }
        debug!(count = allocations.len(), "Allocations snapshot applied");
        self.bump();
    }

    /// Records a subscription failure. The snapshot is kept.
    ///
    /// A details failure also ends the loading phase.
    pub fn record_feed_error(&self, collection: Collection, err: AppError) {
        {
            let mut inner = self.write();
            if collection == Collection::Details {
                inner.loading = false;
            }
            inner.last_error = Some(err);
        }
        self.bump();
    }

    /// Records a startup failure: loading ends, readiness stays blocked.
    pub fn record_init_error(&self, err: AppError) {
        {
            let mut inner = self.write();
            inner.init_failed = true;
            inner.loading = false;
            inner.last_error = Some(err);
        }
        self.bump();
    }

    /// Records a failed command.
    pub fn record_error(&self, err: AppError) {
        self.write().last_error = Some(err);
        self.bump();
    }

    /// Clears the last error after a successful command.
    pub fn clear_error(&self) {
        let cleared = self.write().last_error.take().is_some();
        if cleared {
            self.bump();
        }
    }
}

/// Logs broken invariants. Other clients may write anything.
fn audit(snapshot: &FarmSnapshot) {
    for violation in audit_snapshot(snapshot) {
        warn!(%violation, "Snapshot violates allocation invariant");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_core::RoomName;

    fn detail(id: &str, name: &str) -> Detail {
        Detail {
            id: id.to_string(),
            name: name.to_string(),
            plan: 10,
        }
    }

    #[test]
    fn test_starts_loading_not_ready() {
        let state = SnapshotState::new();
        assert!(state.is_loading());
        assert!(!state.is_ready());
        assert!(state.snapshot().details.is_empty());
    }

    #[test]
    fn test_details_make_ready() {
        let state = SnapshotState::new();
        state.apply_allocations(&[]);
        assert!(!state.is_ready());

        state.apply_details(&[detail("d1", "Кришка")]);
        assert!(state.is_ready());
        assert!(!state.is_loading());
        assert!(state.status().synced_at.is_some());
    }

    #[test]
    fn test_feed_error_keeps_snapshot() {
        let state = SnapshotState::new();
        state.apply_details(&[detail("d1", "Кришка")]);

        state.record_feed_error(
            Collection::Allocations,
            AppError::validation("allocations unavailable"),
        );

        assert_eq!(state.snapshot().details.len(), 1);
        assert!(state.last_error().is_some());
        assert!(state.is_ready());
    }

    #[test]
    fn test_init_error_blocks_readiness() {
        let state = SnapshotState::new();
        state.record_init_error(AppError::validation("seed failed"));

        let status = state.status();
        assert!(!status.ready);
        assert!(!status.loading);
        assert!(status.last_error.is_some());
    }

    #[test]
    fn test_init_error_after_details_still_blocks_readiness() {
        let state = SnapshotState::new();
        state.apply_details(&[detail("d1", "Кришка")]);
        assert!(state.is_ready());

        state.record_init_error(AppError::validation("allocations unavailable"));
        state.apply_details(&[detail("d1", "Кришка")]);

        assert!(!state.is_ready());
        assert!(!state.status().ready);
        assert_eq!(state.snapshot().details.len(), 1);
    }

    #[test]
    fn test_clear_error() {
        let state = SnapshotState::new();
        state.record_error(AppError::validation("nope"));
        state.clear_error();
        assert!(state.last_error().is_none());
    }

    #[test]
    fn test_name_history_dedups() {
        let state = SnapshotState::new();
        state.apply_details(&[
            detail("d1", "Кришка"),
            detail("d2", "Корпус"),
            detail("d3", "Кришка"),
        ]);

        assert_eq!(state.name_history(), vec!["Кришка", "Корпус"]);
    }

    #[tokio::test]
    async fn test_wait_until_wakes_on_apply() {
        let state = SnapshotState::new();
        let writer = state.clone();

        let handle = tokio::spawn(async move {
            writer.apply_allocations(&[RoomAllocation {
                id: "a1".into(),
                room: RoomName::Krylo,
                detail_id: "d1".into(),
                printers: 5,
                started: 0,
            }]);
        });

        tokio::time::timeout(
            std::time::Duration::from_secs(5),
            state.wait_until(|s| s.allocations.len() == 1),
        )
        .await
        .unwrap();
        handle.await.unwrap();
    }
}
