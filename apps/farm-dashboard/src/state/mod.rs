//! # State Module
//!
//! Application state for the dashboard.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │          ┌──────────────────┬──────────────────┐                       │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌────────────────┐  ┌──────────────────┐            │
//! │  │   Database   │  │ SnapshotState  │  │    AppConfig     │            │
//! │  │  (farm-db)   │  │                │  │                  │            │
//! │  │  SQLite pool │  │ Arc<RwLock<    │  │  database_path   │            │
//! │  │  + feeds     │  │  FarmSnapshot  │  │  seed_on_empty   │            │
//! │  │              │  │ >> + flags     │  │                  │            │
//! │  └──────────────┘  └────────────────┘  └──────────────────┘            │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Database: internal connection pool + watch channels                 │
//! │  • SnapshotState: Arc<RwLock<T>>, written only by listener tasks       │
//! │  • AppConfig: read-only after startup                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod snapshot;

pub use config::{AppConfig, ConfigError, DB_PATH_VAR, SEED_VAR};
pub use snapshot::{DashboardStatus, SnapshotState};
