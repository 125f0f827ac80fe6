//! # farm-core: Pure Allocation Rules for the Print Farm
//!
//! This crate is the **heart** of the print farm dashboard. It holds the
//! domain model and the rules that keep printer counts, room capacity and
//! task progress consistent, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Print Farm Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 farm-dashboard (commands)                       │   │
//! │  │   add_detail, add_allocation, set_started, delete_detail ...   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ farm-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ capacity  │  │   rules   │  │ validation│  │   │
//! │  │   │  Detail   │  │ used/avail│  │  create   │  │   field   │  │   │
//! │  │   │  Room     │  │ remaining │  │  delete   │  │   checks  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    farm-db (Document Store)                     │   │
//! │  │        collections, live subscriptions, atomic batches          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Detail, Room, RoomAllocation, FarmSnapshot)
//! - [`capacity`] - Derived quantities and dashboard views
//! - [`rules`] - Mutation validation (the allocation rules engine)
//! - [`validation`] - Field-level validators
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use farm_core::rules::create_allocation;
//! use farm_core::{Detail, FarmSnapshot, RoomName};
//!
//! let snapshot = FarmSnapshot {
//!     details: vec![Detail { id: "d1".into(), name: "Корпус".into(), plan: 10 }],
//!     allocations: vec![],
//! };
//!
//! let payload = create_allocation(RoomName::Kurilka, "d1", 40, &snapshot).unwrap();
//! assert_eq!(payload.started, 0);
//! assert!(create_allocation(RoomName::Kurilka, "d1", 41, &snapshot).is_err());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod capacity;
pub mod error;
pub mod rules;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// The physical rooms of the farm and their printer capacity.
///
/// Static reference data: not persisted, not editable at runtime.
pub const ROOMS: [Room; 5] = [
    Room {
        name: RoomName::Chetvirka,
        capacity: 90,
    },
    Room {
        name: RoomName::Osnova1,
        capacity: 130,
    },
    Room {
        name: RoomName::Osnova2,
        capacity: 60,
    },
    Room {
        name: RoomName::Kurilka,
        capacity: 40,
    },
    Room {
        name: RoomName::Krylo,
        capacity: 150,
    },
];

/// Total printers across all rooms.
pub fn total_capacity() -> i64 {
    ROOMS.iter().map(|r| r.capacity).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rooms_cover_every_room_name_once() {
        let names: Vec<RoomName> = ROOMS.iter().map(|r| r.name).collect();
        assert_eq!(names, RoomName::ALL.to_vec());
        assert!(ROOMS.iter().all(|r| r.capacity > 0));
        assert_eq!(total_capacity(), 470);
    }
}
