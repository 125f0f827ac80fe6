//! # Seed-On-Empty
//!
//! The default dataset written when the `details` collection is empty.
//!
//! ## Startup Check
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Database::seed_if_empty()                                              │
//! │       │                                                                 │
//! │       ├── already checked by this handle? ──► return false             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │  SELECT COUNT(*) FROM details                                          │
//! │       │                                                                 │
//! │       ├── > 0 ──► ROLLBACK, return false                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT d1, d2, a1, a2                                                  │
//! │  COMMIT ──► return true                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use farm_core::{Detail, FarmSnapshot, RoomAllocation, RoomName};

use crate::batch::BatchOp;

/// The fixed default dataset.
pub fn sample_data() -> FarmSnapshot {
    FarmSnapshot {
        details: vec![
            Detail {
                id: "d1".to_string(),
                name: "Деталь 1".to_string(),
                plan: 100,
            },
            Detail {
                id: "d2".to_string(),
                name: "Деталь 2".to_string(),
                plan: 200,
            },
        ],
        allocations: vec![
            RoomAllocation {
                id: "a1".to_string(),
                room: RoomName::Chetvirka,
                detail_id: "d1".to_string(),
                printers: 30,
                started: 10,
            },
            RoomAllocation {
                id: "a2".to_string(),
                room: RoomName::Kurilka,
                detail_id: "d2".to_string(),
                printers: 40,
                started: 0,
            },
        ],
    }
}

/// The writes that create the default dataset.
pub fn sample_ops() -> Vec<BatchOp> {
    let data = sample_data();
    data.details
        .into_iter()
        .map(BatchOp::CreateDetail)
        .chain(data.allocations.into_iter().map(BatchOp::CreateAllocation))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_core::rules::audit_snapshot;

    #[test]
    fn test_sample_data_satisfies_invariants() {
        assert!(audit_snapshot(&sample_data()).is_empty());
    }

    #[test]
    fn test_sample_ops_create_details_first() {
        let ops = sample_ops();
        assert_eq!(ops.len(), 4);
        assert!(matches!(ops[0], BatchOp::CreateDetail(_)));
        assert!(matches!(ops[3], BatchOp::CreateAllocation(_)));
    }
}
