//! # Error Types
//!
//! Domain-specific error types for farm-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  farm-core errors (this file)                                          │
//! │  ├── CoreError        - Lookup failures against the snapshot           │
//! │  └── ValidationError  - Rejected mutation requests                     │
//! │                                                                         │
//! │  farm-db errors (separate crate)                                       │
//! │  └── DbError          - Store operation failures                       │
//! │                                                                         │
//! │  Dashboard errors (in app)                                             │
//! │  └── AppError         - What the caller sees (code + context label)    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AppError                          │
//! │        DbError ─────────────────────► AppError                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `ValidationError` is always raised before any store call is attempted,
//! so it never reaches persistence.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Allocation id is not present in the current snapshot.
    ///
    /// ## When This Occurs
    /// - Another client deleted the allocation and our snapshot already
    ///   reflects it
    /// - The caller holds a stale id
    #[error("Allocation not found: {0}")]
    AllocationNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Mutation validation errors.
///
/// Produced by the rules engine. Each variant renders as a message that can
/// be shown to the operator as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be at least one.
    #[error("{field} must be a positive number")]
    MustBePositive { field: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Referenced entity does not exist.
    #[error("{field} '{id}' does not reference an existing record")]
    UnknownReference { field: String, id: String },

    /// Room has fewer free printers than requested.
    ///
    /// ## User Workflow
    /// ```text
    /// Add allocation to "курілка" (printers: 1)
    ///      │
    ///      ▼
    /// used 40 / capacity 40 → available 0
    ///      │
    ///      ▼
    /// InsufficientCapacity { room: "курілка", available: 0, requested: 1 }
    /// ```
    #[error("Not enough printers in {room}: available {available}, requested {requested}")]
    InsufficientCapacity {
        room: String,
        available: i64,
        requested: i64,
    },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::MustBePositive`].
    pub fn must_be_positive(field: impl Into<String>) -> Self {
        ValidationError::MustBePositive {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_message() {
        let err = ValidationError::InsufficientCapacity {
            room: "курілка".to_string(),
            available: 0,
            requested: 1,
        };
        assert_eq!(
            err.to_string(),
            "Not enough printers in курілка: available 0, requested 1"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("name").to_string(), "name is required");
        assert_eq!(
            ValidationError::must_be_positive("plan").to_string(),
            "plan must be a positive number"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("name").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
