//! # View Commands
//!
//! Read-only projections of the current snapshot.

use farm_core::capacity::{self, DetailProgress, RoomSummary};

use crate::state::{DashboardStatus, SnapshotState};

/// Capacity and allocation rows for every room, in dashboard order.
pub fn room_summaries(state: &SnapshotState) -> Vec<RoomSummary> {
    state.with_snapshot(capacity::room_summaries)
}

/// Plan vs. allocated vs. started for every detail.
pub fn detail_progress(state: &SnapshotState) -> Vec<DetailProgress> {
    state.with_snapshot(capacity::detail_progress)
}

/// Previously used detail names, for autocomplete.
pub fn name_history(state: &SnapshotState) -> Vec<String> {
    state.name_history()
}

/// Readiness and last error.
pub fn status(state: &SnapshotState) -> DashboardStatus {
    state.status()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::seeded_dashboard;
    use farm_core::RoomName;

    #[tokio::test]
    async fn test_seeded_views() {
        let dash = seeded_dashboard().await;
        let state = dash.state();

        let rooms = room_summaries(state);
        assert_eq!(rooms.len(), 5);
        let kurilka = rooms.iter().find(|r| r.room.name == RoomName::Kurilka).unwrap();
        assert_eq!(kurilka.used, 40);
        assert!(!kurilka.can_allocate());
        assert_eq!(kurilka.lines[0].detail_name, "Деталь 2");
        assert_eq!(kurilka.lines[0].remaining, 40);

        let progress = detail_progress(state);
        assert_eq!(progress[0].allocated, 30);
        assert_eq!(progress[0].started, 10);

        assert_eq!(name_history(state), vec!["Деталь 1", "Деталь 2"]);

        let status = status(state);
        assert!(status.ready);
        assert_eq!((status.details, status.allocations), (2, 2));
    }
}
