//! # Commands Module
//!
//! Every operation an operator can trigger from the dashboard.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs         ◄─── You are here (shared outcome handling)
//! ├── detail.rs      ◄─── add_detail, update_detail, delete_detail
//! ├── allocation.rs  ◄─── add_allocation, set_started, delete_allocation
//! └── view.rs        ◄─── room_summaries, detail_progress, name_history
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  add_allocation(db, state, Kurilka, "d2", 1)                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  state.with_snapshot(..) ──► farm_core::rules::create_allocation       │
//! │         │                          │                                    │
//! │         │                          └── Err ──► reject() ──► AppError   │
//! │         ▼                                                               │
//! │  db.create_allocation(payload)                                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  finish(state, Operation::AddAllocation, result)                       │
//! │         │                                                               │
//! │         ├── Ok  ──► last_error cleared                                 │
//! │         └── Err ──► last_error = "Failed to add allocation: ..."       │
//! │                                                                         │
//! │  The new allocation shows up in the snapshot once the allocations      │
//! │  subscription delivers it.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod allocation;
pub mod detail;
pub mod view;

use tracing::{error, warn};

use farm_db::DbResult;

use crate::error::{AppError, AppResult, Operation};
use crate::state::SnapshotState;

/// Turns a store result into a command result, updating `last_error`.
pub(crate) fn finish<T>(
    state: &SnapshotState,
    operation: Operation,
    result: DbResult<T>,
) -> AppResult<T> {
    match result {
        Ok(value) => {
            state.clear_error();
            Ok(value)
        }
        Err(err) => {
            let app_err = AppError::persistence(operation, err);
            error!(operation = %operation, error = %app_err, "Store write failed");
            state.record_error(app_err.clone());
            Err(app_err)
        }
    }
}

/// Refuses `operation` until both collections are loaded.
///
/// Capacity checks and cascade plans read the snapshot, so they cannot run
/// against a partial one. `last_error` keeps the startup failure.
pub(crate) fn ensure_ready(state: &SnapshotState, operation: Operation) -> AppResult<()> {
    if state.is_ready() {
        return Ok(());
    }
    let app_err = AppError::not_ready(operation);
    warn!(operation = %operation, "Request refused, snapshot not ready");
    Err(app_err)
}

/// Records a request the rules refused. Nothing was written.
pub(crate) fn reject(state: &SnapshotState, operation: Operation, err: impl Into<AppError>) -> AppError {
    let app_err = err.into();
    warn!(operation = %operation, error = %app_err, "Request rejected");
    state.record_error(app_err.clone());
    app_err
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use farm_core::FarmSnapshot;
    use farm_db::{Database, DbConfig};

    use crate::Dashboard;

    /// Dashboard on a fresh in-memory store, seeded.
    pub async fn seeded_dashboard() -> Dashboard {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Dashboard::start(db, true).await
    }

    /// Waits (bounded) for the snapshot to reach a state.
    pub async fn settle(dashboard: &Dashboard, pred: impl Fn(&FarmSnapshot) -> bool) {
        tokio::time::timeout(Duration::from_secs(5), dashboard.state().wait_until(pred))
            .await
            .expect("snapshot never reached the expected state");
    }
}
