//! # Domain Types
//!
//! Core domain types used throughout the print farm.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Detail      │   │ RoomAllocation  │   │      Room       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (store)     │◄──│  detail_id      │   │  name           │       │
//! │  │  name           │   │  room ──────────┼──►│  capacity       │       │
//! │  │  plan           │   │  printers       │   └─────────────────┘       │
//! │  └─────────────────┘   │  started        │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `detail_id` is a weak reference: it is resolved by lookup in the current
//! snapshot and kept valid by cascade deletion, not by ownership.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::ROOMS;

// =============================================================================
// Room Name
// =============================================================================

/// One of the five physical rooms of the farm.
///
/// Serialized (JSON and store) as the room's Ukrainian identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RoomName {
    #[serde(rename = "четвірка")]
    Chetvirka,
    #[serde(rename = "основа_1")]
    Osnova1,
    #[serde(rename = "основа_2")]
    Osnova2,
    #[serde(rename = "курілка")]
    Kurilka,
    #[serde(rename = "крило")]
    Krylo,
}

impl RoomName {
    /// All rooms, in dashboard order.
    pub const ALL: [RoomName; 5] = [
        RoomName::Chetvirka,
        RoomName::Osnova1,
        RoomName::Osnova2,
        RoomName::Kurilka,
        RoomName::Krylo,
    ];

    /// Returns the stored identifier of the room.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RoomName::Chetvirka => "четвірка",
            RoomName::Osnova1 => "основа_1",
            RoomName::Osnova2 => "основа_2",
            RoomName::Kurilka => "курілка",
            RoomName::Krylo => "крило",
        }
    }

    /// Returns the configured room (name + capacity).
    pub fn room(&self) -> Room {
        ROOMS
            .iter()
            .copied()
            .find(|r| r.name == *self)
            .unwrap_or(Room {
                name: *self,
                capacity: 0,
            })
    }

    /// Total printers physically available in this room.
    #[inline]
    pub fn capacity(&self) -> i64 {
        self.room().capacity
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoomName::ALL
            .into_iter()
            .find(|room| room.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "room".to_string(),
                allowed: RoomName::ALL.iter().map(|r| r.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Room
// =============================================================================

/// A fixed physical pool of printers.
///
/// Static reference data: defined once in [`crate::ROOMS`], never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Room {
    pub name: RoomName,
    pub capacity: i64,
}

// =============================================================================
// Detail
// =============================================================================

/// A production task with a target quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Detail {
    /// Store-assigned opaque identifier. Immutable.
    pub id: String,

    /// Display name. Not unique.
    pub name: String,

    /// Total units planned. Always >= 1.
    pub plan: i64,
}

// =============================================================================
// Room Allocation
// =============================================================================

/// A binding of some of a room's printers to one detail.
///
/// ## Invariants
/// - `printers >= 1`
/// - `0 <= started <= printers`
/// - `room`, `detail_id` and `printers` never change after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoomAllocation {
    /// Store-assigned opaque identifier.
    pub id: String,

    pub room: RoomName,

    /// Weak reference to [`Detail::id`].
    pub detail_id: String,

    /// Printers of `room` dedicated to this allocation.
    pub printers: i64,

    /// How many of the allocated printers are actually running.
    pub started: i64,
}

impl RoomAllocation {
    /// Printers allocated but not yet started.
    #[inline]
    pub fn remaining(&self) -> i64 {
        self.printers - self.started
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// The full in-memory view of both collections.
///
/// Replaced wholesale whenever a subscription pushes a new collection;
/// never patched locally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FarmSnapshot {
    pub details: Vec<Detail>,
    pub allocations: Vec<RoomAllocation>,
}

impl FarmSnapshot {
    /// Looks up a detail by id.
    pub fn detail(&self, id: &str) -> Option<&Detail> {
        self.details.iter().find(|d| d.id == id)
    }

    /// Looks up an allocation by id.
    pub fn allocation(&self, id: &str) -> Option<&RoomAllocation> {
        self.allocations.iter().find(|a| a.id == id)
    }

    /// Allocations belonging to `room`, in collection order.
    pub fn allocations_in(&self, room: RoomName) -> impl Iterator<Item = &RoomAllocation> {
        self.allocations.iter().filter(move |a| a.room == room)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_name_round_trips_through_identifier() {
        for room in RoomName::ALL {
            assert_eq!(room.as_str().parse::<RoomName>().unwrap(), room);
        }
        assert!("кухня".parse::<RoomName>().is_err());
    }

    #[test]
    fn test_room_capacities() {
        assert_eq!(RoomName::Chetvirka.capacity(), 90);
        assert_eq!(RoomName::Osnova1.capacity(), 130);
        assert_eq!(RoomName::Osnova2.capacity(), 60);
        assert_eq!(RoomName::Kurilka.capacity(), 40);
        assert_eq!(RoomName::Krylo.capacity(), 150);
    }

    #[test]
    fn test_allocation_serializes_with_room_identifier() {
        let alloc = RoomAllocation {
            id: "a2".to_string(),
            room: RoomName::Kurilka,
            detail_id: "d2".to_string(),
            printers: 40,
            started: 0,
        };
        let json = serde_json::to_value(&alloc).unwrap();
        assert_eq!(json["room"], "курілка");
        assert_eq!(json["detail_id"], "d2");
    }

    #[test]
    fn test_remaining() {
        let alloc = RoomAllocation {
            id: "a1".to_string(),
            room: RoomName::Chetvirka,
            detail_id: "d1".to_string(),
            printers: 30,
            started: 10,
        };
        assert_eq!(alloc.remaining(), 20);
    }
}
