//! # Detail Repository
//!
//! Reads and row-level writes for the `details` collection.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use farm_core::Detail;

/// Read access to the `details` collection.
///
/// ## Usage
/// ```rust,ignore
/// let details = db.details().list().await?;
/// let detail = db.details().get_by_id("d1").await?;
/// ```
#[derive(Debug, Clone)]
pub struct DetailRepository {
    pool: SqlitePool,
}

impl DetailRepository {
    /// Creates a new DetailRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DetailRepository { pool }
    }

    /// Returns the whole collection in insertion order.
    pub async fn list(&self) -> DbResult<Vec<Detail>> {
        let details = sqlx::query_as::<_, Detail>(
            "SELECT id, name, plan FROM details ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = details.len(), "Loaded details");
        Ok(details)
    }

    /// Gets a detail by its id.
    ///
    /// ## Returns
    /// * `Ok(Some(Detail))` - Detail found
    /// * `Ok(None)` - Detail not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Detail>> {
        let detail = sqlx::query_as::<_, Detail>(
            "SELECT id, name, plan FROM details WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(detail)
    }

    /// Counts documents (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM details")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Row Writes (used inside batch transactions)
// =============================================================================

/// Counts details on the given connection.
pub(crate) async fn count(conn: &mut SqliteConnection) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM details")
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

/// Writes a new detail document with its id already assigned.
pub(crate) async fn insert(conn: &mut SqliteConnection, detail: &Detail) -> DbResult<()> {
    debug!(id = %detail.id, name = %detail.name, plan = detail.plan, "Inserting detail");

    sqlx::query("INSERT INTO details (id, name, plan) VALUES (?1, ?2, ?3)")
        .bind(&detail.id)
        .bind(&detail.name)
        .bind(detail.plan)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Replaces name and plan of an existing detail.
///
/// ## Returns
/// * `Err(DbError::NotFound)` - Detail doesn't exist
pub(crate) async fn update(
    conn: &mut SqliteConnection,
    id: &str,
    name: &str,
    plan: i64,
) -> DbResult<()> {
    debug!(id = %id, plan, "Updating detail");

    let result = sqlx::query("UPDATE details SET name = ?2, plan = ?3 WHERE id = ?1")
        .bind(id)
        .bind(name)
        .bind(plan)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Detail", id));
    }

    Ok(())
}

/// Deletes a detail. Deleting a missing document is not an error.
pub(crate) async fn delete(conn: &mut SqliteConnection, id: &str) -> DbResult<u64> {
    debug!(id = %id, "Deleting detail");

    let result = sqlx::query("DELETE FROM details WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
