//! # Repository Module
//!
//! SQL for the two document collections.
//!
//! ## Read Path vs Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Reads   db.details().list()            ──► SqlitePool                 │
//! │          db.allocations().list()                                       │
//! │                                                                         │
//! │  Writes  db.create_detail(..)  ─┐                                      │
//! │          db.delete_detail(..)   ├─► Batch ──► Transaction ──► commit   │
//! │          db.run_atomic_batch(..)┘              │                        │
//! │                                                ▼                        │
//! │                               repository::*::insert/update/delete      │
//! │                               (take &mut SqliteConnection)             │
//! │                                                                         │
//! │  Every write commits in a transaction and is followed by a feed        │
//! │  refresh, so subscribers see it.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`DetailRepository`] - `details` collection
//! - [`AllocationRepository`] - `allocations` collection

pub mod allocation;
pub mod detail;

pub use allocation::AllocationRepository;
pub use detail::DetailRepository;

use uuid::Uuid;

/// Generates a new store-assigned document id.
pub fn generate_document_id() -> String {
    Uuid::new_v4().to_string()
}
