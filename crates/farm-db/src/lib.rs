//! # farm-db: Document Store for the Print Farm
//!
//! Shared storage for the `details` and `allocations` collections, with
//! live subscriptions so every client sees every committed change.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Print Farm Data Flow                             │
//! │                                                                         │
//! │  Dashboard command (add_allocation)                                    │
//! │       │  validated by farm-core::rules                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     farm-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (detail.rs,   │    │  (embedded)  │  │   │
//! │  │   │               │    │ allocation.rs)│    │              │  │   │
//! │  │   │ writes ──► batch ──► row SQL      │    │ 001_init.sql │  │   │
//! │  │   │ feeds ◄── refresh ◄─ list()       │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                      ▲                          │
//! │       ▼                                      │ Subscription::next()     │
//! │  ┌──────────────────────────────────┐   dashboard snapshot task         │
//! │  │          SQLite Database          │                                 │
//! │  │  <data dir>/farm.db               │                                 │
//! │  └──────────────────────────────────┘                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, write API, subscriptions, seeding
//! - [`batch`] - All-or-nothing multi-document writes
//! - [`feed`] - Live collection snapshots
//! - [`seed`] - Default dataset
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Store error types
//! - [`repository`] - Per-collection SQL
//!
//! ## Usage
//!
//! ```rust,ignore
//! use farm_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("farm.db")).await?;
//! db.seed_if_empty().await?;
//!
//! let mut allocations = db.subscribe_allocations().await?;
//! while let Some(update) = allocations.next().await {
//!     println!("{} allocations", update?.len());
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod batch;
pub mod error;
pub mod feed;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use batch::{BatchOp, Collection};
pub use error::{DbError, DbResult};
pub use feed::{FeedState, Subscription};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::{AllocationRepository, DetailRepository};
