//! # Capacity Module
//!
//! Derived quantities computed from a snapshot. Nothing here is ever stored:
//! every figure is recomputed from the current collections.
//!
//! ## Where The Numbers Come From
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Room.capacity ─────────────────────┐                                   │
//! │                                     ▼                                   │
//! │  Σ allocation.printers (same room) ─► used ──► available = cap - used  │
//! │                                                                         │
//! │  allocation.printers - allocation.started ──► remaining                │
//! │                                                                         │
//! │  Σ allocation.started  (same detail) ──► started for detail            │
//! │  Σ allocation.printers (same detail) ──► allocated for detail          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use farm_core::capacity::{available_capacity, used_capacity};
//! use farm_core::{RoomAllocation, RoomName};
//!
//! let allocations = vec![RoomAllocation {
//!     id: "a2".into(),
//!     room: RoomName::Kurilka,
//!     detail_id: "d2".into(),
//!     printers: 40,
//!     started: 0,
//! }];
//!
//! let room = RoomName::Kurilka.room();
//! assert_eq!(used_capacity(&room, &allocations), 40);
//! assert_eq!(available_capacity(&room, &allocations), 0);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{Detail, FarmSnapshot, Room, RoomAllocation};
use crate::ROOMS;

// =============================================================================
// Room Figures
// =============================================================================

/// Sum of printers allocated in `room`.
pub fn used_capacity(room: &Room, allocations: &[RoomAllocation]) -> i64 {
    allocations
        .iter()
        .filter(|a| a.room == room.name)
        .map(|a| a.printers)
        .sum()
}

/// Printers of `room` not yet bound to any allocation.
///
/// Can go negative only if the store holds data written around the rules
/// engine; callers treat anything `<= 0` as full.
pub fn available_capacity(room: &Room, allocations: &[RoomAllocation]) -> i64 {
    room.capacity - used_capacity(room, allocations)
}

/// Printers allocated but not yet started.
#[inline]
pub fn remaining(allocation: &RoomAllocation) -> i64 {
    allocation.remaining()
}

// =============================================================================
// Detail Figures
// =============================================================================

/// Sum of `started` over every allocation of a detail, across rooms.
pub fn total_started_for_detail(detail_id: &str, allocations: &[RoomAllocation]) -> i64 {
    allocations
        .iter()
        .filter(|a| a.detail_id == detail_id)
        .map(|a| a.started)
        .sum()
}

/// Sum of `printers` over every allocation of a detail, across rooms.
pub fn total_allocated_for_detail(detail_id: &str, allocations: &[RoomAllocation]) -> i64 {
    allocations
        .iter()
        .filter(|a| a.detail_id == detail_id)
        .map(|a| a.printers)
        .sum()
}

/// Distinct detail names in first-seen order.
///
/// Feeds the name suggestions offered when a new detail is entered.
pub fn detail_name_history(details: &[Detail]) -> Vec<String> {
    let mut seen = HashSet::new();
    details
        .iter()
        .filter(|d| seen.insert(d.name.as_str()))
        .map(|d| d.name.clone())
        .collect()
}

// =============================================================================
// Views
// =============================================================================

/// One allocation row as shown inside a room card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AllocationLine {
    pub allocation_id: String,
    pub detail_id: String,
    pub detail_name: String,
    pub printers: i64,
    pub started: i64,
    pub remaining: i64,
}

/// Capacity figures and allocation rows for one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoomSummary {
    pub room: Room,
    pub used: i64,
    pub available: i64,
    /// Rows whose detail resolves in the snapshot. Unresolved allocations
    /// still count toward `used`.
    pub lines: Vec<AllocationLine>,
}

impl RoomSummary {
    /// Builds the summary of `room` from a snapshot.
    pub fn build(room: Room, snapshot: &FarmSnapshot) -> Self {
        let used = used_capacity(&room, &snapshot.allocations);

        let lines = snapshot
            .allocations_in(room.name)
            .filter_map(|alloc| {
                let detail = snapshot.detail(&alloc.detail_id)?;
                Some(AllocationLine {
                    allocation_id: alloc.id.clone(),
                    detail_id: detail.id.clone(),
                    detail_name: detail.name.clone(),
                    printers: alloc.printers,
                    started: alloc.started,
                    remaining: alloc.remaining(),
                })
            })
            .collect();

        RoomSummary {
            room,
            used,
            available: room.capacity - used,
            lines,
        }
    }

    /// Fraction of the room in use, for progress bars.
    pub fn utilisation(&self) -> f64 {
        if self.room.capacity > 0 {
            self.used as f64 / self.room.capacity as f64
        } else {
            0.0
        }
    }

    /// Whether a new allocation could fit at all.
    #[inline]
    pub fn can_allocate(&self) -> bool {
        self.available > 0
    }
}

/// Summaries of every configured room, in dashboard order.
pub fn room_summaries(snapshot: &FarmSnapshot) -> Vec<RoomSummary> {
    ROOMS
        .iter()
        .map(|room| RoomSummary::build(*room, snapshot))
        .collect()
}

/// Plan versus allocation progress for one detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DetailProgress {
    pub detail_id: String,
    pub name: String,
    pub plan: i64,
    pub allocated: i64,
    pub started: i64,
}

/// Progress rows for every detail, in collection order.
pub fn detail_progress(snapshot: &FarmSnapshot) -> Vec<DetailProgress> {
    snapshot
        .details
        .iter()
        .map(|d| DetailProgress {
            detail_id: d.id.clone(),
            name: d.name.clone(),
            plan: d.plan,
            allocated: total_allocated_for_detail(&d.id, &snapshot.allocations),
            started: total_started_for_detail(&d.id, &snapshot.allocations),
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RoomName;

    fn alloc(id: &str, room: RoomName, detail_id: &str, printers: i64, started: i64) -> RoomAllocation {
        RoomAllocation {
            id: id.to_string(),
            room,
            detail_id: detail_id.to_string(),
            printers,
            started,
        }
    }

    fn detail(id: &str, name: &str, plan: i64) -> Detail {
        Detail {
            id: id.to_string(),
            name: name.to_string(),
            plan,
        }
    }

    fn sample() -> FarmSnapshot {
        FarmSnapshot {
            details: vec![detail("d1", "Деталь 1", 100), detail("d2", "Деталь 2", 200)],
            allocations: vec![
                alloc("a1", RoomName::Chetvirka, "d1", 30, 10),
                alloc("a2", RoomName::Kurilka, "d2", 40, 0),
                alloc("a3", RoomName::Chetvirka, "d2", 15, 15),
            ],
        }
    }

    #[test]
    fn test_used_and_available_capacity() {
        let snapshot = sample();
        let chetvirka = RoomName::Chetvirka.room();
        assert_eq!(used_capacity(&chetvirka, &snapshot.allocations), 45);
        assert_eq!(available_capacity(&chetvirka, &snapshot.allocations), 45);

        let krylo = RoomName::Krylo.room();
        assert_eq!(used_capacity(&krylo, &snapshot.allocations), 0);
        assert_eq!(available_capacity(&krylo, &snapshot.allocations), 150);
    }

    #[test]
    fn test_detail_totals_span_rooms() {
        let snapshot = sample();
        assert_eq!(total_allocated_for_detail("d2", &snapshot.allocations), 55);
        assert_eq!(total_started_for_detail("d2", &snapshot.allocations), 15);
        assert_eq!(total_started_for_detail("missing", &snapshot.allocations), 0);
    }

    #[test]
    fn test_room_summary_hides_unresolved_lines_but_counts_them() {
        let mut snapshot = sample();
        snapshot
            .allocations
            .push(alloc("orphan", RoomName::Chetvirka, "gone", 5, 0));

        let summary = RoomSummary::build(RoomName::Chetvirka.room(), &snapshot);
        assert_eq!(summary.used, 50);
        assert_eq!(summary.available, 40);
        assert_eq!(summary.lines.len(), 2);
        assert!(summary.lines.iter().all(|l| l.allocation_id != "orphan"));
        assert_eq!(summary.lines[0].detail_name, "Деталь 1");
        assert_eq!(summary.lines[0].remaining, 20);
    }

    #[test]
    fn test_full_room_cannot_allocate() {
        let summary = RoomSummary::build(RoomName::Kurilka.room(), &sample());
        assert_eq!(summary.available, 0);
        assert!(!summary.can_allocate());
        assert!((summary.utilisation() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_room_summaries_cover_every_room() {
        let summaries = room_summaries(&sample());
        let names: Vec<RoomName> = summaries.iter().map(|s| s.room.name).collect();
        assert_eq!(names, RoomName::ALL.to_vec());
    }

    #[test]
    fn test_detail_progress() {
        let rows = detail_progress(&sample());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].allocated, 30);
        assert_eq!(rows[0].started, 10);
        assert_eq!(rows[1].plan, 200);
        assert_eq!(rows[1].allocated, 55);
    }

    #[test]
    fn test_name_history_is_distinct_in_first_seen_order() {
        let details = vec![
            detail("1", "Кронштейн", 10),
            detail("2", "Корпус", 5),
            detail("3", "Кронштейн", 7),
        ];
        assert_eq!(detail_name_history(&details), vec!["Кронштейн", "Корпус"]);
    }
}
