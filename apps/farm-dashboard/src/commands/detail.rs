//! # Detail Commands
//!
//! Create, edit and remove the parts the farm is printing.
//!
//! ## Detail Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add_detail("Корпус", 50) ──► details: + {id, "Корпус", 50}            │
//! │                                                                         │
//! │  update_detail({id, "Корпус v2", 60}) ──► name + plan replaced         │
//! │                                                                         │
//! │  delete_detail(id) ──► one batch:                                      │
//! │                          allocations of id  ──► removed                │
//! │                          detail id          ──► removed                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;

use farm_core::{rules, Detail};
use farm_db::Database;

use super::{ensure_ready, finish, reject};
use crate::error::{AppResult, Operation};
use crate::state::SnapshotState;

/// Adds a detail.
///
/// ## Arguments
/// * `name` - Display name, trimmed; must not be blank
/// * `plan` - Target count, at least 1
///
/// ## Returns
/// The stored detail with its store-assigned id.
pub async fn add_detail(
    db: &Database,
    state: &SnapshotState,
    name: &str,
    plan: i64,
) -> AppResult<Detail> {
    debug!(name = %name, plan, "add_detail command");

    let payload =
        rules::create_detail(name, plan).map_err(|e| reject(state, Operation::AddDetail, e))?;

    finish(state, Operation::AddDetail, db.create_detail(payload).await)
}

/// Replaces name and plan of an existing detail.
pub async fn update_detail(db: &Database, state: &SnapshotState, detail: &Detail) -> AppResult<()> {
    debug!(id = %detail.id, plan = detail.plan, "update_detail command");

    let patch =
        rules::update_detail(detail).map_err(|e| reject(state, Operation::UpdateDetail, e))?;

    finish(state, Operation::UpdateDetail, db.update_detail(patch).await)
}

/// Deletes a detail and every allocation that references it.
///
/// The allocation ids come from the current snapshot. Allocations another
/// client added since are caught by the same batch.
pub async fn delete_detail(db: &Database, state: &SnapshotState, detail_id: &str) -> AppResult<()> {
    debug!(id = %detail_id, "delete_detail command");
    ensure_ready(state, Operation::DeleteDetail)?;

    let plan = state.with_snapshot(|s| rules::delete_detail(detail_id, &s.allocations));

    finish(state, Operation::DeleteDetail, db.delete_detail(&plan).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{seeded_dashboard, settle};
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_add_detail_appears_in_snapshot() {
        let dash = seeded_dashboard().await;

        let created = dash.add_detail("  Кронштейн ", 75).await.unwrap();
        assert_eq!(created.name, "Кронштейн");

        settle(&dash, |s| s.detail(&created.id).is_some()).await;
        assert!(dash.state().last_error().is_none());
    }

    #[tokio::test]
    async fn test_invalid_detail_is_rejected_without_write() {
        let dash = seeded_dashboard().await;

        let err = dash.add_detail("Кронштейн", 0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = dash.add_detail("   ", 10).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        assert_eq!(dash.db().counts().await.unwrap(), (2, 2));
        assert!(dash.state().last_error().is_some());
    }

    #[tokio::test]
    async fn test_update_detail() {
        let dash = seeded_dashboard().await;

        dash.update_detail(&Detail {
            id: "d2".into(),
            name: "Деталь 2Б".into(),
            plan: 250,
        })
        .await
        .unwrap();

        settle(&dash, |s| s.detail("d2").map(|d| d.plan) == Some(250)).await;
    }

    #[tokio::test]
    async fn test_update_vanished_detail_reports_context() {
        let dash = seeded_dashboard().await;

        let err = dash
            .update_detail(&Detail {
                id: "gone".into(),
                name: "x".into(),
                plan: 1,
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.context.as_deref(), Some("update detail"));
        assert_eq!(dash.state().last_error(), Some(err));
    }

    #[tokio::test]
    async fn test_delete_detail_cascades() {
        let dash = seeded_dashboard().await;

        dash.delete_detail("d1").await.unwrap();

        settle(&dash, |s| s.detail("d1").is_none() && s.allocation("a1").is_none()).await;
        let snap = dash.state().snapshot();
        assert_eq!(snap.details.len(), 1);
        assert_eq!(snap.allocations.len(), 1);
        assert_eq!(snap.allocations[0].id, "a2");
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_snapshot() {
        let dash = seeded_dashboard().await;

        drop_allocations_table(&dash).await;

        let err = dash.delete_detail("d1").await.unwrap_err();
        assert_eq!(err.context.as_deref(), Some("delete detail"));
        assert!(err.message.starts_with("Failed to delete detail"));

        let snap = dash.state().snapshot();
        assert!(snap.detail("d1").is_some());
        assert_eq!(snap.allocations.len(), 2);
        assert_eq!(dash.db().details().count().await.unwrap(), 2);
    }

    async fn drop_allocations_table(dash: &crate::Dashboard) {
        sqlx::query("DROP TABLE allocations")
            .execute(dash.db().pool())
            .await
            .unwrap();
    }
}
