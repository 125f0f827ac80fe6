//! # Print Farm Dashboard
//!
//! Host library for the allocation dashboard: opens the store, keeps a live
//! snapshot of both collections, and exposes the operator commands.
//!
//! ## Module Organization
//! ```text
//! farm_dashboard/
//! ├── lib.rs          ◄─── You are here (startup, Dashboard handle)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── snapshot.rs ◄─── Local snapshot, readiness, last error
//! │   └── config.rs   ◄─── Environment / data-dir configuration
//! ├── commands/
//! │   ├── mod.rs      ◄─── Shared outcome handling
//! │   ├── detail.rs   ◄─── Detail commands
//! │   ├── allocation.rs ◄─ Allocation commands
//! │   └── view.rs     ◄─── Read-only projections
//! ├── render.rs       ◄─── Text rendition
//! └── error.rs        ◄─── AppError for commands
//! ```
//!
//! ## Snapshot Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Database ──► Subscription<Detail> ──► listener task ──┐               │
//! │     ▲                                                   ▼               │
//! │     │     Subscription<RoomAllocation> ──► task ──► SnapshotState      │
//! │     │                                                   │               │
//! │     │                                                   ▼               │
//! │  commands ◄──────────── rules read the snapshot ────────┘               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod render;
pub mod state;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use farm_core::capacity::{DetailProgress, RoomSummary};
use farm_core::rules::StartedInput;
use farm_core::{Detail, RoomAllocation, RoomName};
use farm_db::{Database, DbError, Subscription};

use error::{AppError, AppResult};
use render::DashboardView;
use state::{AppConfig, DashboardStatus, SnapshotState};

/// Running dashboard: store handle, local snapshot and listener tasks.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Dashboard Startup                                 │
/// │                                                                         │
/// │  1. Open Store ───────────────────────────────────────────────────────► │
/// │     • SQLite with WAL mode, pending migrations                          │
/// │                                                                         │
/// │  2. Seed If Empty (unless FARM_SEED=0) ───────────────────────────────► │
/// │     • failure: last_error set, readiness blocked, stop here             │
/// │                                                                         │
/// │  3. Subscribe To Both Collections ────────────────────────────────────► │
/// │     • first snapshot applied before start() returns                     │
/// │     • failure: last_error set, readiness blocked, the other collection  │
/// │       still subscribes                                                  │
/// │                                                                         │
/// │  4. Spawn Listener Tasks ─────────────────────────────────────────────► │
/// │     • every later snapshot replaces the local copy                      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug)]
pub struct Dashboard {
    db: Database,
    state: SnapshotState,
    listeners: Vec<JoinHandle<()>>,
}

impl Dashboard {
    /// Opens the store described by `config` and starts the dashboard.
    ///
    /// ## Returns
    /// * `Err(AppError)` - The store could not be opened at all
    ///
    /// Seeding and subscription failures do not fail this call; they show
    /// up as `last_error` with readiness blocked.
    pub async fn open(config: &AppConfig) -> AppResult<Self> {
        info!(path = %config.database_path.display(), "Opening store");

        let db = Database::new(config.db_config())
            .await
            .map_err(AppError::initialization)?;

        Ok(Self::start(db, config.seed_on_empty).await)
    }

    /// Starts the dashboard on an already opened store.
    pub async fn start(db: Database, seed_on_empty: bool) -> Self {
        let mut dashboard = Dashboard {
            db,
            state: SnapshotState::new(),
            listeners: Vec::new(),
        };

        if seed_on_empty {
            match dashboard.db.seed_if_empty().await {
                Ok(true) => info!("Store was empty, default dataset written"),
                Ok(false) => debug!("Seed not needed"),
                Err(err) => {
                    dashboard.fail_init(err);
                    return dashboard;
                }
            }
        }

        match dashboard.db.subscribe_details().await {
            Ok(sub) => {
                let handle = listen(sub, dashboard.state.clone(), SnapshotState::apply_details).await;
                dashboard.listeners.push(handle);
            }
            Err(err) => dashboard.fail_init(err),
        }

        match dashboard.db.subscribe_allocations().await {
            Ok(sub) => {
                let handle =
                    listen(sub, dashboard.state.clone(), SnapshotState::apply_allocations).await;
                dashboard.listeners.push(handle);
            }
            Err(err) => dashboard.fail_init(err),
        }

        info!(ready = dashboard.state.is_ready(), "Dashboard started");
        dashboard
    }

    fn fail_init(&self, err: DbError) {
        let app_err = AppError::initialization(err);
        error!(error = %app_err, "Dashboard initialization failed");
        self.state.record_init_error(app_err);
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn state(&self) -> &SnapshotState {
        &self.state
    }

    // =========================================================================
    // Commands
    // =========================================================================

    pub async fn add_detail(&self, name: &str, plan: i64) -> AppResult<Detail> {
        commands::detail::add_detail(&self.db, &self.state, name, plan).await
    }

    pub async fn update_detail(&self, detail: &Detail) -> AppResult<()> {
        commands::detail::update_detail(&self.db, &self.state, detail).await
    }

    pub async fn delete_detail(&self, detail_id: &str) -> AppResult<()> {
        commands::detail::delete_detail(&self.db, &self.state, detail_id).await
    }

    pub async fn add_allocation(
        &self,
        room: RoomName,
        detail_id: &str,
        printers: i64,
    ) -> AppResult<RoomAllocation> {
        commands::allocation::add_allocation(&self.db, &self.state, room, detail_id, printers).await
    }

    pub async fn set_started(
        &self,
        allocation_id: &str,
        input: &StartedInput,
    ) -> AppResult<Option<i64>> {
        commands::allocation::set_started(&self.db, &self.state, allocation_id, input).await
    }

    pub async fn delete_allocation(&self, allocation_id: &str) -> AppResult<()> {
        commands::allocation::delete_allocation(&self.db, &self.state, allocation_id).await
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn room_summaries(&self) -> Vec<RoomSummary> {
        commands::view::room_summaries(&self.state)
    }

    pub fn detail_progress(&self) -> Vec<DetailProgress> {
        commands::view::detail_progress(&self.state)
    }

    pub fn name_history(&self) -> Vec<String> {
        commands::view::name_history(&self.state)
    }

    pub fn status(&self) -> DashboardStatus {
        commands::view::status(&self.state)
    }

    /// Text rendition of rooms and details.
    pub fn render(&self) -> String {
        let snapshot = self.state.snapshot();
        let status = self.state.status();
        DashboardView::new(&snapshot, &status).to_string()
    }

    /// Pulls both collections again, e.g. after another process wrote to
    /// the same database file.
    pub async fn refresh(&self) -> AppResult<()> {
        self.db.refresh_all().await.map_err(AppError::from)
    }

    /// Stops the listeners and closes the store.
    pub async fn shutdown(self) {
        for handle in &self.listeners {
            handle.abort();
        }
        self.db.close().await;
        info!("Dashboard stopped");
    }
}

/// Applies the current collection, then keeps applying every change.
async fn listen<T>(
    mut sub: Subscription<T>,
    state: SnapshotState,
    apply: fn(&SnapshotState, &[T]),
) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
{
    let collection = sub.collection();

    // The store loaded the collection when subscribing, so this is immediate.
    match sub.next().await {
        Some(Ok(items)) => apply(&state, items.as_slice()),
        Some(Err(err)) => state.record_feed_error(collection, AppError::from(err)),
        None => {}
    }

    tokio::spawn(async move {
        info!(collection = %collection, "Listening for snapshots");
        while let Some(update) = sub.next().await {
            match update {
                Ok(items) => apply(&state, items.as_slice()),
                Err(err) => {
                    let app_err = AppError::from(err);
                    error!(collection = %collection, error = %app_err, "Snapshot failed");
                    state.record_feed_error(collection, app_err);
                }
            }
        }
        debug!(collection = %collection, "Feed closed");
    })
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=farm_db=trace` - Trace for the store only
/// - Default: `info,farm=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,farm=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Boots the dashboard from the environment and prints it once.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting Print Farm Dashboard");

    let config = AppConfig::from_env()?;
    let dashboard = Dashboard::open(&config).await?;

    println!("{}", dashboard.render());

    let failed = dashboard.state().last_error();
    dashboard.shutdown().await;

    // Only startup can have failed here; report it through the exit code.
    match failed {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_db::DbConfig;

    #[tokio::test]
    async fn test_start_seeds_and_is_ready() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let dash = Dashboard::start(db, true).await;

        let status = dash.status();
        assert!(status.ready);
        assert!(!status.loading);
        assert_eq!((status.details, status.allocations), (2, 2));
        assert!(status.last_error.is_none());
        assert!(dash.render().contains("Деталь 1"));
    }

    #[tokio::test]
    async fn test_start_without_seed_is_ready_and_empty() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let dash = Dashboard::start(db, false).await;

        assert!(dash.state().is_ready());
        assert!(dash.state().snapshot().details.is_empty());
    }

    #[tokio::test]
    async fn test_seed_failure_blocks_readiness() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("DROP TABLE details")
            .execute(db.pool())
            .await
            .unwrap();

        let dash = Dashboard::start(db, true).await;

        let status = dash.status();
        assert!(!status.ready);
        assert!(!status.loading);
        let err = status.last_error.unwrap();
        assert_eq!(err.code, error::ErrorCode::Initialization);
        assert_eq!(err.context.as_deref(), Some("initialize data"));
    }

    #[tokio::test]
    async fn test_broken_allocations_feed_blocks_snapshot_commands() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.seed_if_empty().await.unwrap();
        // курілка is already full; this row cannot be decoded.
        sqlx::query(
            "INSERT INTO allocations (id, room, detail_id, printers, started) VALUES ('bad', 'курілка', 'd1', 'abc', 0)",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let dash = Dashboard::start(db, false).await;

        let status = dash.status();
        assert!(!status.ready);
        assert_eq!(status.details, 2);
        assert_eq!(status.last_error.unwrap().code, error::ErrorCode::Initialization);

        let err = dash
            .add_allocation(RoomName::Kurilka, "d1", 40)
            .await
            .unwrap_err();
        assert_eq!(err.code, error::ErrorCode::Initialization);
        assert_eq!(err.context.as_deref(), Some("add allocation"));

        let err = dash
            .set_started("a1", &StartedInput::Entry("5".into()))
            .await
            .unwrap_err();
        assert_eq!(err.code, error::ErrorCode::Initialization);
        assert_eq!(dash.delete_detail("d1").await.unwrap_err().code, error::ErrorCode::Initialization);

        assert_eq!(dash.db().counts().await.unwrap(), (2, 3));
        let a1 = sqlx::query_scalar::<_, i64>("SELECT started FROM allocations WHERE id = 'a1'")
            .fetch_one(dash.db().pool())
            .await
            .unwrap();
        assert_eq!(a1, 10);

        // The startup failure stays visible.
        assert_eq!(
            dash.state().last_error().unwrap().context.as_deref(),
            Some("initialize data")
        );
    }

    #[tokio::test]
    async fn test_open_in_memory_from_config() {
        let config = AppConfig::new(":memory:");
        let dash = Dashboard::open(&config).await.unwrap();
        assert_eq!(dash.status().details, 2);
        dash.shutdown().await;
    }

    #[tokio::test]
    async fn test_two_clients_share_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let first = Dashboard::start(db.clone(), true).await;
        let second = Dashboard::start(db, true).await;

        let created = first.add_detail("Шестерня", 30).await.unwrap();

        commands::test_support::settle(&second, |s| s.detail(&created.id).is_some()).await;
        assert_eq!(second.name_history().len(), 3);
    }
}
