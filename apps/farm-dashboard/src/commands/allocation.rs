//! # Allocation Commands
//!
//! Assign printers in a room to a detail, track how many have started,
//! and release the assignment.
//!
//! ## Started Counter Controls
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Room card row: Деталь 2   printers 40                                 │
//! │                                                                         │
//! │     [-]   started: [ 12 ]   [+]                                        │
//! │      │              │        │                                          │
//! │      │              │        └─ Step(Increment)  13 or no-op at 40     │
//! │      │              └────────── Entry("150")     clamped to 40         │
//! │      └───────────────────────── Step(Decrement)  11 or no-op at 0      │
//! │                                                                         │
//! │  A no-op makes no store call at all.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;

use farm_core::rules::{self, StartedInput};
use farm_core::{RoomAllocation, RoomName};
use farm_db::Database;

use super::{ensure_ready, finish, reject};
use crate::error::{AppResult, Operation};
use crate::state::SnapshotState;

/// Assigns `printers` printers in `room` to a detail.
///
/// ## Rules
/// - The dashboard must be ready
/// - The detail must be in the current snapshot
/// - `printers` must be at least 1 and fit the room's free capacity
/// - `started` begins at 0
pub async fn add_allocation(
    db: &Database,
    state: &SnapshotState,
    room: RoomName,
    detail_id: &str,
    printers: i64,
) -> AppResult<RoomAllocation> {
    debug!(room = %room, detail_id = %detail_id, printers, "add_allocation command");
    ensure_ready(state, Operation::AddAllocation)?;

    let payload = state
        .with_snapshot(|s| rules::create_allocation(room, detail_id, printers, s))
        .map_err(|e| reject(state, Operation::AddAllocation, e))?;

    finish(state, Operation::AddAllocation, db.create_allocation(payload).await)
}

/// Changes the started counter of an allocation.
///
/// ## Returns
/// * `Ok(Some(value))` - `value` was written
/// * `Ok(None)` - Out-of-range step, nothing written
/// * `Err(AppError)` - Unknown allocation, or the write failed
pub async fn set_started(
    db: &Database,
    state: &SnapshotState,
    allocation_id: &str,
    input: &StartedInput,
) -> AppResult<Option<i64>> {
    debug!(id = %allocation_id, input = ?input, "set_started command");
    ensure_ready(state, Operation::UpdateAllocation)?;

    let next = state
        .with_snapshot(|s| rules::set_started_by_id(s, allocation_id, input))
        .map_err(|e| reject(state, Operation::UpdateAllocation, e))?;

    let Some(started) = next else {
        debug!(id = %allocation_id, "Step out of range, ignored");
        return Ok(None);
    };

    finish(
        state,
        Operation::UpdateAllocation,
        db.update_allocation_started(allocation_id, started).await,
    )?;
    Ok(Some(started))
}

/// Releases an allocation. Its detail stays.
pub async fn delete_allocation(
    db: &Database,
    state: &SnapshotState,
    allocation_id: &str,
) -> AppResult<()> {
    debug!(id = %allocation_id, "delete_allocation command");

    let delete = rules::delete_allocation(allocation_id);

    finish(state, Operation::DeleteAllocation, db.delete_allocation(&delete).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{seeded_dashboard, settle};
    use crate::error::ErrorCode;
    use farm_core::rules::StartedStep;

    #[tokio::test]
    async fn test_add_allocation_fits() {
        let dash = seeded_dashboard().await;

        let created = dash.add_allocation(RoomName::Chetvirka, "d2", 60).await.unwrap();
        assert_eq!(created.started, 0);

        settle(&dash, |s| s.allocation(&created.id).is_some()).await;
        let summaries = dash.room_summaries();
        let chetvirka = summaries
            .iter()
            .find(|r| r.room.name == RoomName::Chetvirka)
            .unwrap();
        assert_eq!(chetvirka.used, 90);
        assert_eq!(chetvirka.available, 0);
    }

    #[tokio::test]
    async fn test_full_room_rejects_without_write() {
        let dash = seeded_dashboard().await;

        let err = dash.add_allocation(RoomName::Kurilka, "d1", 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientCapacity);
        assert!(err.message.contains("available 0"));

        assert_eq!(dash.db().allocations().count().await.unwrap(), 2);
        assert_eq!(dash.state().last_error(), Some(err));
    }

    #[tokio::test]
    async fn test_unknown_detail_rejected() {
        let dash = seeded_dashboard().await;

        let err = dash.add_allocation(RoomName::Krylo, "d9", 5).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(dash.db().allocations().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_step_within_range_writes() {
        let dash = seeded_dashboard().await;

        let written = dash
            .set_started("a1", &StartedInput::Step(StartedStep::Increment))
            .await
            .unwrap();
        assert_eq!(written, Some(11));

        settle(&dash, |s| s.allocation("a1").map(|a| a.started) == Some(11)).await;
    }

    #[tokio::test]
    async fn test_out_of_range_step_is_noop() {
        let dash = seeded_dashboard().await;

        // a2 starts at 0.
        let written = dash
            .set_started("a2", &StartedInput::Step(StartedStep::Decrement))
            .await
            .unwrap();

        assert_eq!(written, None);
        let stored = dash.db().allocations().get_by_id("a2").await.unwrap().unwrap();
        assert_eq!(stored.started, 0);
        assert!(dash.state().last_error().is_none());
    }

    #[tokio::test]
    async fn test_entry_is_clamped() {
        let dash = seeded_dashboard().await;

        let written = dash
            .set_started("a2", &StartedInput::Entry("150".into()))
            .await
            .unwrap();
        assert_eq!(written, Some(40));

        let written = dash
            .set_started("a2", &StartedInput::Entry("abc".into()))
            .await
            .unwrap();
        assert_eq!(written, Some(0));

        let written = dash
            .set_started("a2", &StartedInput::Entry("12.0".into()))
            .await
            .unwrap();
        assert_eq!(written, Some(12));

        let written = dash
            .set_started("a2", &StartedInput::Entry("1e2".into()))
            .await
            .unwrap();
        assert_eq!(written, Some(40));
    }

    #[tokio::test]
    async fn test_set_started_unknown_allocation() {
        let dash = seeded_dashboard().await;

        let err = dash
            .set_started("missing", &StartedInput::Entry("3".into()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_delete_allocation_keeps_detail() {
        let dash = seeded_dashboard().await;

        dash.delete_allocation("a2").await.unwrap();

        settle(&dash, |s| s.allocation("a2").is_none()).await;
        assert!(dash.state().snapshot().detail("d2").is_some());
    }
}
