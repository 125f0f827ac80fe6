//! # Atomic Batches
//!
//! All-or-nothing application of several document writes.
//!
//! ## Cascade Delete As One Batch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   SINGLE TRANSACTION                                    │
//! │                                                                         │
//! │  1. DELETE FROM allocations WHERE id = ?          (each known id)       │
//! │  2. DELETE FROM allocations WHERE detail_id = ?   (written since the    │
//! │                                                    snapshot was taken)  │
//! │  3. DELETE FROM details WHERE id = ?                                    │
//! │                                                                         │
//! │  COMMIT ← all three or none                                            │
//! │                                                                         │
//! │  Any failing op drops the transaction, which rolls everything back:    │
//! │  the detail is never gone while its allocations survive.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeSet;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{allocation, detail};
use farm_core::rules::CascadeDelete;
use farm_core::{Detail, RoomAllocation};

/// Which collection a write touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Details,
    Allocations,
}

impl Collection {
    /// Collection name as used in logs and errors.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Collection::Details => "details",
            Collection::Allocations => "allocations",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One write inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    /// Create a detail document with a pre-assigned id.
    CreateDetail(Detail),
    /// Replace name and plan. Fails if the detail is missing.
    UpdateDetail { id: String, name: String, plan: i64 },
    /// Remove a detail document. Missing is fine.
    DeleteDetail { id: String },
    /// Create an allocation document with a pre-assigned id.
    CreateAllocation(RoomAllocation),
    /// Set `started`. Fails if the allocation is missing.
    UpdateAllocationStarted { id: String, started: i64 },
    /// Remove an allocation document. Missing is fine.
    DeleteAllocation { id: String },
    /// Remove every allocation referencing a detail.
    DeleteAllocationsOfDetail { detail_id: String },
}

impl BatchOp {
    /// The collection this op writes to.
    pub fn collection(&self) -> Collection {
        match self {
            BatchOp::CreateDetail(_) | BatchOp::UpdateDetail { .. } | BatchOp::DeleteDetail { .. } => {
                Collection::Details
            }
            BatchOp::CreateAllocation(_)
            | BatchOp::UpdateAllocationStarted { .. }
            | BatchOp::DeleteAllocation { .. }
            | BatchOp::DeleteAllocationsOfDetail { .. } => Collection::Allocations,
        }
    }
}

/// Builds the ops deleting a detail together with its allocations.
pub fn cascade_ops(plan: &CascadeDelete) -> Vec<BatchOp> {
    let mut ops: Vec<BatchOp> = plan
        .allocation_ids
        .iter()
        .map(|id| BatchOp::DeleteAllocation { id: id.clone() })
        .collect();

    ops.push(BatchOp::DeleteAllocationsOfDetail {
        detail_id: plan.detail_id.clone(),
    });
    ops.push(BatchOp::DeleteDetail {
        id: plan.detail_id.clone(),
    });
    ops
}

/// Applies one op on a connection that is already inside a transaction.
pub(crate) async fn apply_op(conn: &mut SqliteConnection, op: &BatchOp) -> DbResult<()> {
    match op {
        BatchOp::CreateDetail(d) => detail::insert(conn, d).await,
        BatchOp::UpdateDetail { id, name, plan } => detail::update(conn, id, name, *plan).await,
        BatchOp::DeleteDetail { id } => detail::delete(conn, id).await.map(|_| ()),
        BatchOp::CreateAllocation(a) => allocation::insert(conn, a).await,
        BatchOp::UpdateAllocationStarted { id, started } => {
            allocation::update_started(conn, id, *started).await
        }
        BatchOp::DeleteAllocation { id } => allocation::delete(conn, id).await.map(|_| ()),
        BatchOp::DeleteAllocationsOfDetail { detail_id } => {
            allocation::delete_for_detail(conn, detail_id).await.map(|_| ())
        }
    }
}

/// Applies `ops` in one transaction.
///
/// ## Returns
/// The set of collections that were written, so the caller can refresh
/// exactly those feeds.
pub(crate) async fn apply(pool: &SqlitePool, ops: &[BatchOp]) -> DbResult<BTreeSet<Collection>> {
    let mut touched = BTreeSet::new();
    if ops.is_empty() {
        return Ok(touched);
    }

    debug!(ops = ops.len(), "Applying batch");

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

    for op in ops {
        // Dropping `tx` without commit rolls back every op applied so far.
        if let Err(err) = apply_op(&mut tx, op).await {
            warn!(error = %err, op = ?op, "Batch op failed, rolling back");
            return Err(err);
        }
        touched.insert(op.collection());
    }

    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

    debug!(collections = ?touched, "Batch committed");
    Ok(touched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cascade_ops_delete_detail_last() {
        let ops = cascade_ops(&CascadeDelete {
            detail_id: "d1".to_string(),
            allocation_ids: vec!["a1".to_string(), "a3".to_string()],
        });

        assert_eq!(ops.len(), 4);
        assert_eq!(ops[0], BatchOp::DeleteAllocation { id: "a1".to_string() });
        assert_eq!(
            ops[2],
            BatchOp::DeleteAllocationsOfDetail {
                detail_id: "d1".to_string()
            }
        );
        assert_eq!(ops[3], BatchOp::DeleteDetail { id: "d1".to_string() });
    }

    #[test]
    fn test_op_collections() {
        assert_eq!(
            BatchOp::DeleteDetail { id: "d".into() }.collection(),
            Collection::Details
        );
        assert_eq!(
            BatchOp::DeleteAllocationsOfDetail { detail_id: "d".into() }.collection(),
            Collection::Allocations
        );
    }
}
