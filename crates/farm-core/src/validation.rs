//! # Validation Module
//!
//! Field-level validators used by the rules engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form input                                                   │
//! │  └── Immediate feedback (min/max attributes)                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Rules engine (rules.rs)                                      │
//! │  ├── THIS MODULE: single-field checks                                  │
//! │  └── Snapshot checks: references, room capacity                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Store (SQLite)                                               │
//! │  └── NOT NULL only; ranges are not enforced, other clients may         │
//! │      write anything, so snapshots are audited on arrival               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use farm_core::validation::{validate_detail_name, validate_plan};
//!
//! assert_eq!(validate_detail_name("  Корпус ").unwrap(), "Корпус");
//! assert!(validate_plan(0).is_err());
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a detail name.
///
/// ## Rules
/// - Must not be empty after trimming
///
/// ## Returns
/// The trimmed name, which is what gets persisted.
pub fn validate_detail_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }

    Ok(name.to_string())
}

/// Validates a document id supplied by the caller.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a detail plan.
///
/// ## Rules
/// - Must be >= 1
pub fn validate_plan(plan: i64) -> ValidationResult<()> {
    if plan < 1 {
        return Err(ValidationError::must_be_positive("plan"));
    }

    Ok(())
}

/// Validates the printer count of a new allocation.
///
/// ## Rules
/// - Must be >= 1
pub fn validate_printers(printers: i64) -> ValidationResult<()> {
    if printers < 1 {
        return Err(ValidationError::must_be_positive("printers"));
    }

    Ok(())
}

/// Validates that `requested` printers fit into `available`.
///
/// Filling a room exactly is allowed; only `requested > available` fails.
pub fn validate_fits(room: &str, requested: i64, available: i64) -> ValidationResult<()> {
    if requested > available {
        return Err(ValidationError::InsufficientCapacity {
            room: room.to_string(),
            available: available.max(0),
            requested,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
