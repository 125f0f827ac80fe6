//! # Allocation Repository
//!
//! Reads and row-level writes for the `allocations` collection.
//!
//! ## Unknown Rooms
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  row.room = "основа_1"  ──► RoomName::Osnova1  ──► kept                │
//! │  row.room = "підвал"    ──► not a known room   ──► dropped + warn!     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! A document written by some other client with a room name outside the
//! fixed set is left out of the collection rather than failing every
//! snapshot.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use farm_core::{RoomAllocation, RoomName};

/// Raw `allocations` row; `room` is still text here.
#[derive(Debug, sqlx::FromRow)]
struct AllocationRow {
    id: String,
    room: String,
    detail_id: String,
    printers: i64,
    started: i64,
}

impl AllocationRow {
    fn into_allocation(self) -> Option<RoomAllocation> {
        match self.room.parse::<RoomName>() {
            Ok(room) => Some(RoomAllocation {
                id: self.id,
                room,
                detail_id: self.detail_id,
                printers: self.printers,
                started: self.started,
            }),
            Err(_) => {
                warn!(id = %self.id, room = %self.room, "Skipping allocation with unknown room");
                None
            }
        }
    }
}

/// Read access to the `allocations` collection.
#[derive(Debug, Clone)]
pub struct AllocationRepository {
    pool: SqlitePool,
}

impl AllocationRepository {
    /// Creates a new AllocationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AllocationRepository { pool }
    }

    /// Returns the whole collection in insertion order.
    pub async fn list(&self) -> DbResult<Vec<RoomAllocation>> {
        let rows = sqlx::query_as::<_, AllocationRow>(
            "SELECT id, room, detail_id, printers, started FROM allocations ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        let allocations: Vec<RoomAllocation> = rows
            .into_iter()
            .filter_map(AllocationRow::into_allocation)
            .collect();

        debug!(count = allocations.len(), "Loaded allocations");
        Ok(allocations)
    }

    /// Gets an allocation by its id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<RoomAllocation>> {
        let row = sqlx::query_as::<_, AllocationRow>(
            "SELECT id, room, detail_id, printers, started FROM allocations WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(AllocationRow::into_allocation))
    }

    /// Counts documents (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM allocations")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Row Writes (used inside batch transactions)
// =============================================================================

/// Writes a new allocation document with its id already assigned.
pub(crate) async fn insert(conn: &mut SqliteConnection, alloc: &RoomAllocation) -> DbResult<()> {
    debug!(
        id = %alloc.id,
        room = %alloc.room,
        detail_id = %alloc.detail_id,
        printers = alloc.printers,
        "Inserting allocation"
    );

    sqlx::query(
        r#"
        INSERT INTO allocations (id, room, detail_id, printers, started)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&alloc.id)
    .bind(alloc.room.as_str())
    .bind(&alloc.detail_id)
    .bind(alloc.printers)
    .bind(alloc.started)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Sets the started counter of an existing allocation.
///
/// ## Returns
/// * `Err(DbError::NotFound)` - Allocation doesn't exist
pub(crate) async fn update_started(
    conn: &mut SqliteConnection,
    id: &str,
    started: i64,
) -> DbResult<()> {
    debug!(id = %id, started, "Updating allocation");

    let result = sqlx::query("UPDATE allocations SET started = ?2 WHERE id = ?1")
        .bind(id)
        .bind(started)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Allocation", id));
    }

    Ok(())
}

/// Deletes one allocation. Deleting a missing document is not an error.
pub(crate) async fn delete(conn: &mut SqliteConnection, id: &str) -> DbResult<u64> {
    debug!(id = %id, "Deleting allocation");

    let result = sqlx::query("DELETE FROM allocations WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Deletes every allocation referencing a detail.
pub(crate) async fn delete_for_detail(conn: &mut SqliteConnection, detail_id: &str) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM allocations WHERE detail_id = ?1")
        .bind(detail_id)
        .execute(&mut *conn)
        .await?;

    debug!(detail_id = %detail_id, removed = result.rows_affected(), "Deleted allocations of detail");
    Ok(result.rows_affected())
}
