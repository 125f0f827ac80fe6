//! # Store Handle
//!
//! Connection pool, live feeds and the write API for both collections.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database (cheap to clone)                          │
//! │                                                                         │
//! │  Dashboard Startup                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) ← Configure pool settings                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ├──► seed_if_empty()            (once per handle)                │
//! │       ├──► subscribe_details()        ──► Subscription<Detail>         │
//! │       └──► subscribe_allocations()    ──► Subscription<RoomAllocation> │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │  SqlitePool           Feeds (shared)    │                           │
//! │  │  ┌─────┐ ┌─────┐      details     ◄──┐  │                           │
//! │  │  │Conn1│ │Conn2│ ...  allocations ◄──┤  │                           │
//! │  │  └─────┘ └─────┘                    │  │                           │
//! │  └─────────────────────────────────────┼──┘                           │
//! │                                        │                               │
//! │  create / update / delete ──► batch ───┘ refresh touched collections   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! File databases run in WAL mode so subscribers reloading a collection
//! never block a writer. In-memory databases keep the default journal.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::batch::{self, BatchOp, Collection};
use crate::error::{DbError, DbResult};
use crate::feed::{CollectionFeed, Subscription};
use crate::migrations;
use crate::repository::{detail, generate_document_id, AllocationRepository, DetailRepository};
use crate::seed;
use farm_core::rules::{AllocationDelete, CascadeDelete, DetailPatch, NewAllocation, NewDetail};
use farm_core::{Detail, RoomAllocation};

const IN_MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/farm.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long to wait for a free connection.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a configuration for the database file at `path`.
    ///
    /// The file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::in_memory()).await?;
    /// // Isolated store, gone when the handle is dropped
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY),
            max_connections: 1, // every connection would see its own empty database
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    /// True for the `:memory:` configuration.
    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }
}

// =============================================================================
// Database
// =============================================================================

#[derive(Debug)]
struct Feeds {
    details: CollectionFeed<Detail>,
    allocations: CollectionFeed<RoomAllocation>,
}

/// Shared handle to the document store.
///
/// Clones share the pool, the live feeds and the seed guard, so a write made
/// through one clone reaches subscribers of every other clone.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::in_memory()).await?;
/// db.seed_if_empty().await?;
///
/// let mut details = db.subscribe_details().await?;
/// let current = details.next().await;
///
/// let payload = farm_core::rules::create_detail("Кронштейн", 50)?;
/// db.create_detail(payload).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,

    /// Live snapshots of both collections.
    feeds: Arc<Feeds>,

    /// Set once seed-on-empty has run to completion for this handle.
    seed_checked: Arc<Mutex<bool>>,
}

impl Database {
    /// Opens the store.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Enables WAL + NORMAL synchronous for file databases
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    ///
    /// ## Returns
    /// * `Ok(Database)` - Ready-to-use handle
    /// * `Err(DbError)` - Connection or migration failed
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let in_memory = config.is_in_memory();

        let connect_options = if in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&config.database_path)
                .create_if_missing(true)
                // Readers don't block writers, writers don't block readers
                .journal_mode(SqliteJournalMode::Wal)
                // May lose the last transaction on power loss, never corrupts
                .synchronous(SqliteSynchronous::Normal)
        };

        debug!(in_memory, "Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout);

        // Closing the only connection would throw the in-memory database away.
        pool_options = if in_memory {
            pool_options.idle_timeout(None).max_lifetime(None)
        } else {
            pool_options.idle_timeout(Some(config.idle_timeout))
        };

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database {
            pool,
            feeds: Arc::new(Feeds {
                details: CollectionFeed::new(Collection::Details),
                allocations: CollectionFeed::new(Collection::Allocations),
            }),
            seed_checked: Arc::new(Mutex::new(false)),
        };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations.
    ///
    /// Idempotent. Called by `new()` unless disabled in the config.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Read access to the details collection.
    pub fn details(&self) -> DetailRepository {
        DetailRepository::new(self.pool.clone())
    }

    /// Read access to the allocations collection.
    pub fn allocations(&self) -> AllocationRepository {
        AllocationRepository::new(self.pool.clone())
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Subscribes to the details collection.
    ///
    /// The collection is reloaded first, so the first `next()` yields what
    /// is in the store right now.
    ///
    /// ## Returns
    /// * `Err(DbError)` - The initial load failed; no subscription was made
    pub async fn subscribe_details(&self) -> DbResult<Subscription<Detail>> {
        self.refresh(Collection::Details).await?;
        info!(
            subscribers = self.feeds.details.subscriber_count() + 1,
            "Subscribed to details"
        );
        Ok(self.feeds.details.subscribe())
    }

    /// Subscribes to the allocations collection.
    pub async fn subscribe_allocations(&self) -> DbResult<Subscription<RoomAllocation>> {
        self.refresh(Collection::Allocations).await?;
        info!(
            subscribers = self.feeds.allocations.subscriber_count() + 1,
            "Subscribed to allocations"
        );
        Ok(self.feeds.allocations.subscribe())
    }

    /// Reloads one collection and pushes it to its subscribers.
    ///
    /// Use after another process wrote to the same database file. Writes
    /// made through this handle refresh automatically.
    ///
    /// On failure subscribers receive the error and the error is returned.
    pub async fn refresh(&self, collection: Collection) -> DbResult<()> {
        let result = match collection {
            Collection::Details => self
                .details()
                .list()
                .await
                .map(|items| self.feeds.details.publish(items)),
            Collection::Allocations => self
                .allocations()
                .list()
                .await
                .map(|items| self.feeds.allocations.publish(items)),
        };

        if let Err(err) = &result {
            match collection {
                Collection::Details => self.feeds.details.publish_error(err),
                Collection::Allocations => self.feeds.allocations.publish_error(err),
            }
        }

        result
    }

    /// Reloads both collections.
    pub async fn refresh_all(&self) -> DbResult<()> {
        self.refresh(Collection::Details).await?;
        self.refresh(Collection::Allocations).await
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Applies `ops` all-or-nothing, then refreshes the touched collections.
    ///
    /// ## Returns
    /// * `Ok(())` - Every op was committed
    /// * `Err(DbError)` - Nothing was committed
    ///
    /// A refresh failure after a successful commit is not an error of the
    /// write: it is logged and delivered to subscribers instead.
    pub async fn run_atomic_batch(&self, ops: &[BatchOp]) -> DbResult<()> {
        let touched = match batch::apply(&self.pool, ops).await {
            Ok(touched) => touched,
            Err(err) => {
                error!(error = %err, ops = ops.len(), "Batch failed");
                return Err(err);
            }
        };

        for collection in touched {
            if let Err(err) = self.refresh(collection).await {
                warn!(collection = %collection, error = %err, "Committed, but refresh failed");
            }
        }

        Ok(())
    }

    /// Creates a detail. The store assigns the id.
    pub async fn create_detail(&self, new: NewDetail) -> DbResult<Detail> {
        let detail = Detail {
            id: generate_document_id(),
            name: new.name,
            plan: new.plan,
        };

        self.run_atomic_batch(&[BatchOp::CreateDetail(detail.clone())])
            .await?;

        info!(id = %detail.id, name = %detail.name, plan = detail.plan, "Detail created");
        Ok(detail)
    }

    /// Replaces name and plan of an existing detail.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - The detail is gone
    pub async fn update_detail(&self, patch: DetailPatch) -> DbResult<()> {
        self.run_atomic_batch(&[BatchOp::UpdateDetail {
            id: patch.id,
            name: patch.name,
            plan: patch.plan,
        }])
        .await
    }

    /// Deletes a detail together with its allocations in one batch.
    pub async fn delete_detail(&self, plan: &CascadeDelete) -> DbResult<()> {
        self.run_atomic_batch(&batch::cascade_ops(plan)).await?;

        info!(
            id = %plan.detail_id,
            allocations = plan.allocation_ids.len(),
            "Detail deleted"
        );
        Ok(())
    }

    /// Creates an allocation. The store assigns the id.
    pub async fn create_allocation(&self, new: NewAllocation) -> DbResult<RoomAllocation> {
        let allocation = RoomAllocation {
            id: generate_document_id(),
            room: new.room,
            detail_id: new.detail_id,
            printers: new.printers,
            started: new.started,
        };

        self.run_atomic_batch(&[BatchOp::CreateAllocation(allocation.clone())])
            .await?;

        info!(
            id = %allocation.id,
            room = %allocation.room,
            printers = allocation.printers,
            "Allocation created"
        );
        Ok(allocation)
    }

    /// Sets `started` on an existing allocation.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - The allocation is gone
    pub async fn update_allocation_started(&self, id: &str, started: i64) -> DbResult<()> {
        self.run_atomic_batch(&[BatchOp::UpdateAllocationStarted {
            id: id.to_string(),
            started,
        }])
        .await
    }

    /// Deletes one allocation.
    pub async fn delete_allocation(&self, delete: &AllocationDelete) -> DbResult<()> {
        self.run_atomic_batch(&[BatchOp::DeleteAllocation {
            id: delete.allocation_id.clone(),
        }])
        .await
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Writes the default dataset when the details collection is empty.
    ///
    /// The emptiness check and the inserts share one transaction. Runs at
    /// most once per handle (and its clones); a failed attempt may be retried.
    ///
    /// ## Returns
    /// * `Ok(true)` - The dataset was written
    /// * `Ok(false)` - Store already had details, or this handle already checked
    pub async fn seed_if_empty(&self) -> DbResult<bool> {
        let mut checked = self.seed_checked.lock().await;
        if *checked {
            debug!("Seed already checked by this handle");
            return Ok(false);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let existing = detail::count(&mut tx).await?;
        if existing > 0 {
            *checked = true;
            debug!(existing, "Store not empty, skipping seed");
            return Ok(false);
        }

        for op in seed::sample_ops() {
            batch::apply_op(&mut tx, &op).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        *checked = true;

        info!("Seeded default dataset");

        if let Err(err) = self.refresh_all().await {
            warn!(error = %err, "Seeded, but refresh failed");
        }

        Ok(true)
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Document counts as `(details, allocations)`.
    pub async fn counts(&self) -> DbResult<(i64, i64)> {
        Ok((self.details().count().await?, self.allocations().count().await?))
    }

    /// Closes the connection pool.
    ///
    /// Every later operation fails. Subscriptions end once the last handle
    /// is dropped.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use farm_core::rules;
    use farm_core::{FarmSnapshot, RoomName};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seeded_db() -> Database {
        let db = test_db().await;
        assert!(db.seed_if_empty().await.unwrap());
        db
    }

    async fn snapshot(db: &Database) -> FarmSnapshot {
        FarmSnapshot {
            details: db.details().list().await.unwrap(),
            allocations: db.allocations().list().await.unwrap(),
        }
    }

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = test_db().await;
        assert!(db.health_check().await);
        assert_eq!(db.counts().await.unwrap(), (0, 0));
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/farm.db")
            .max_connections(10)
            .min_connections(2)
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_seed_writes_exact_dataset_once() {
        let db = seeded_db().await;

        let snap = snapshot(&db).await;
        assert_eq!(snap, seed::sample_data());
        assert!(rules::audit_snapshot(&snap).is_empty());

        // Guarded per handle, and a clone shares the guard.
        assert!(!db.seed_if_empty().await.unwrap());
        assert!(!db.clone().seed_if_empty().await.unwrap());
        assert_eq!(db.counts().await.unwrap(), (2, 2));
    }

    #[tokio::test]
    async fn test_seed_skips_non_empty_store() {
        let db = test_db().await;
        db.create_detail(rules::create_detail("Кришка", 5).unwrap())
            .await
            .unwrap();

        assert!(!db.seed_if_empty().await.unwrap());
        assert_eq!(db.counts().await.unwrap(), (1, 0));
    }

    #[tokio::test]
    async fn test_create_detail_assigns_id() {
        let db = test_db().await;
        let detail = db
            .create_detail(rules::create_detail("Корпус", 50).unwrap())
            .await
            .unwrap();

        assert_eq!(detail.id.len(), 36);
        let stored = db.details().get_by_id(&detail.id).await.unwrap().unwrap();
        assert_eq!(stored, detail);
    }

    #[tokio::test]
    async fn test_update_detail() {
        let db = seeded_db().await;
        let patch = rules::update_detail(&Detail {
            id: "d1".to_string(),
            name: "Деталь 1Б".to_string(),
            plan: 120,
        })
        .unwrap();

        db.update_detail(patch).await.unwrap();

        let stored = db.details().get_by_id("d1").await.unwrap().unwrap();
        assert_eq!(stored.name, "Деталь 1Б");
        assert_eq!(stored.plan, 120);
    }

    #[tokio::test]
    async fn test_update_missing_detail_is_not_found() {
        let db = test_db().await;
        let err = db
            .update_detail(DetailPatch {
                id: "ghost".to_string(),
                name: "x".to_string(),
                plan: 1,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_detail_cascades() {
        let db = seeded_db().await;
        let snap = snapshot(&db).await;
        let plan = rules::delete_detail("d1", &snap.allocations);

        db.delete_detail(&plan).await.unwrap();

        let after = snapshot(&db).await;
        assert!(after.detail("d1").is_none());
        assert!(after.allocations.iter().all(|a| a.detail_id != "d1"));
        assert_eq!(after.allocations.len(), 1);
    }

    #[tokio::test]
    async fn test_cascade_catches_allocations_missing_from_plan() {
        let db = seeded_db().await;
        // Written after the caller's snapshot was taken.
        let late = db
            .create_allocation(NewAllocation {
                room: RoomName::Krylo,
                detail_id: "d1".to_string(),
                printers: 5,
                started: 0,
            })
            .await
            .unwrap();

        let stale = CascadeDelete {
            detail_id: "d1".to_string(),
            allocation_ids: vec!["a1".to_string()],
        };
        db.delete_detail(&stale).await.unwrap();

        assert!(db.allocations().get_by_id(&late.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failing_batch_applies_nothing() {
        let db = seeded_db().await;
        let mut ops = batch::cascade_ops(&CascadeDelete {
            detail_id: "d1".to_string(),
            allocation_ids: vec!["a1".to_string()],
        });
        ops.push(BatchOp::UpdateDetail {
            id: "missing".to_string(),
            name: "x".to_string(),
            plan: 1,
        });

        assert!(db.run_atomic_batch(&ops).await.is_err());

        let snap = snapshot(&db).await;
        assert!(snap.detail("d1").is_some());
        assert!(snap.allocation("a1").is_some());
    }

    #[tokio::test]
    async fn test_update_allocation_started() {
        let db = seeded_db().await;
        db.update_allocation_started("a1", 11).await.unwrap();

        let a1 = db.allocations().get_by_id("a1").await.unwrap().unwrap();
        assert_eq!(a1.started, 11);

        let err = db.update_allocation_started("nope", 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_allocation_is_idempotent() {
        let db = seeded_db().await;
        let delete = rules::delete_allocation("a2");

        db.delete_allocation(&delete).await.unwrap();
        db.delete_allocation(&delete).await.unwrap();

        assert_eq!(db.counts().await.unwrap(), (2, 1));
    }

    #[tokio::test]
    async fn test_subscription_sees_own_write() {
        let db = seeded_db().await;
        let mut sub = db.subscribe_allocations().await.unwrap();
        assert_eq!(sub.next().await.unwrap().unwrap().len(), 2);

        let created = db
            .create_allocation(NewAllocation {
                room: RoomName::Osnova1,
                detail_id: "d2".to_string(),
                printers: 12,
                started: 0,
            })
            .await
            .unwrap();

        let items = sub.next().await.unwrap().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2], created);
    }

    #[tokio::test]
    async fn test_clone_shares_feeds() {
        let db = seeded_db().await;
        let other = db.clone();
        let mut sub = db.subscribe_details().await.unwrap();
        sub.next().await.unwrap().unwrap();

        other
            .create_detail(rules::create_detail("Ручка", 10).unwrap())
            .await
            .unwrap();

        let items = sub.next().await.unwrap().unwrap();
        assert!(items.iter().any(|d| d.name == "Ручка"));
    }

    #[tokio::test]
    async fn test_subscribe_fails_when_collection_unreadable() {
        let db = test_db().await;
        sqlx::query("DROP TABLE details")
            .execute(db.pool())
            .await
            .unwrap();

        assert!(db.subscribe_details().await.is_err());
    }

    #[tokio::test]
    async fn test_refresh_failure_reaches_subscribers() {
        let db = seeded_db().await;
        let mut sub = db.subscribe_details().await.unwrap();
        sub.next().await.unwrap().unwrap();

        sqlx::query("DROP TABLE details")
            .execute(db.pool())
            .await
            .unwrap();
        assert!(db.refresh(Collection::Details).await.is_err());

        let err = sub.next().await.unwrap().unwrap_err();
        assert!(matches!(err, DbError::SubscriptionFailed { .. }));
    }

    #[tokio::test]
    async fn test_store_keeps_out_of_range_values() {
        let db = seeded_db().await;
        sqlx::query("UPDATE allocations SET started = 99 WHERE id = 'a2'")
            .execute(db.pool())
            .await
            .unwrap();

        let snapshot = snapshot(&db).await;

        assert_eq!(snapshot.allocation("a2").unwrap().started, 99);
        assert_eq!(
            rules::audit_snapshot(&snapshot),
            vec![rules::InvariantViolation::StartedOutOfRange {
                allocation_id: "a2".into(),
                started: 99,
                printers: 40,
            }]
        );
    }

    #[tokio::test]
    async fn test_unknown_room_is_skipped() {
        let db = seeded_db().await;
        sqlx::query(
            "INSERT INTO allocations (id, room, detail_id, printers, started) VALUES ('x', 'підвал', 'd1', 3, 0)",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let allocations = db.allocations().list().await.unwrap();
        assert_eq!(allocations.len(), 2);
        assert!(db.allocations().get_by_id("x").await.unwrap().is_none());
        assert_eq!(db.allocations().count().await.unwrap(), 3);
    }
}
