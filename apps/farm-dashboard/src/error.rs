//! # Dashboard Error Type
//!
//! Unified error type returned by every dashboard command.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Dashboard                          │
//! │                                                                         │
//! │  add_allocation(room, detail, printers)                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  AppResult<T>                                                    │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Rules reject? ─── ValidationError ───────────────┐             │  │
//! │  │         │  (nothing written)                       │             │  │
//! │  │         ▼                                          ▼             │  │
//! │  │  Store fails? ──── DbError + Operation label ──► AppError ─────►│  │
//! │  │         │                                          │             │  │
//! │  │         ▼                                          ▼             │  │
//! │  │  Success ─► last_error cleared       last_error = AppError       │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  The snapshot is never touched by a command: it only changes when a    │
//! │  subscription delivers, so a failure keeps the last good state.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use serde::Serialize;
use tracing::error;

use farm_core::{CoreError, ValidationError};
use farm_db::DbError;

/// The operation a persistence error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    AddDetail,
    UpdateDetail,
    DeleteDetail,
    AddAllocation,
    UpdateAllocation,
    DeleteAllocation,
    /// Startup: seeding and the initial subscriptions.
    Initialize,
}

impl Operation {
    /// Label shown to the operator, e.g. "Failed to delete detail".
    pub const fn label(&self) -> &'static str {
        match self {
            Operation::AddDetail => "add detail",
            Operation::UpdateDetail => "update detail",
            Operation::DeleteDetail => "delete detail",
            Operation::AddAllocation => "add allocation",
            Operation::UpdateAllocation => "update allocation",
            Operation::DeleteAllocation => "delete allocation",
            Operation::Initialize => "initialize data",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned from dashboard commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "DATABASE_ERROR",
///   "message": "Failed to delete detail: Database transaction failed",
///   "context": "delete detail"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Label of the failed operation, for persistence and startup errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Document not found
    NotFound,

    /// Request rejected by the allocation rules
    ValidationError,

    /// Room has fewer free printers than requested
    InsufficientCapacity,

    /// Store operation failed
    DatabaseError,

    /// A live collection could not be refreshed
    SubscriptionError,

    /// Seeding or initial subscription failed
    Initialization,

    /// Anything else
    Internal,
}

impl AppError {
    /// Creates a new error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    /// Wraps a store failure with the label of the operation that caused it.
    pub fn persistence(operation: Operation, err: DbError) -> Self {
        let base = AppError::from(err);
        AppError {
            code: base.code,
            message: format!("Failed to {}: {}", operation, base.message),
            context: Some(operation.label().to_string()),
        }
    }

    /// Refuses a command that needs the full snapshot before it has loaded.
    pub fn not_ready(operation: Operation) -> Self {
        AppError {
            code: ErrorCode::Initialization,
            message: format!("Cannot {}: data is not loaded", operation),
            context: Some(operation.label().to_string()),
        }
    }

    /// Wraps a startup failure. Readiness stays blocked.
    pub fn initialization(err: DbError) -> Self {
        let base = AppError::from(err);
        AppError {
            code: ErrorCode::Initialization,
            message: format!("Failed to {}: {}", Operation::Initialize, base.message),
            context: Some(Operation::Initialize.label().to_string()),
        }
    }
}

/// Converts store errors.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AppError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => AppError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ConnectionFailed(_) => {
                AppError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                AppError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                error!("Database query failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                error!("Transaction failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::SubscriptionFailed { collection, message } => {
                error!(collection = %collection, "Subscription failed: {}", message);
                AppError::new(
                    ErrorCode::SubscriptionError,
                    format!("Could not load {}", collection),
                )
            }
            DbError::PoolExhausted => {
                AppError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts rule rejections.
impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InsufficientCapacity { .. } => {
                AppError::new(ErrorCode::InsufficientCapacity, err.to_string())
            }
            other => AppError::validation(other.to_string()),
        }
    }
}

/// Converts core lookup errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AllocationNotFound(id) => AppError::not_found("Allocation", &id),
            CoreError::Validation(e) => AppError::from(e),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

/// Result type for dashboard commands.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_error_carries_label() {
        let err = AppError::persistence(
            Operation::DeleteDetail,
            DbError::TransactionFailed("disk full".into()),
        );

        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.context.as_deref(), Some("delete detail"));
        assert_eq!(err.message, "Failed to delete detail: Database transaction failed");
    }

    #[test]
    fn test_capacity_rejection_code() {
        let err = AppError::from(ValidationError::InsufficientCapacity {
            room: "курілка".into(),
            available: 0,
            requested: 1,
        });

        assert_eq!(err.code, ErrorCode::InsufficientCapacity);
        assert!(err.message.contains("available 0"));
        assert!(err.context.is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let err = AppError::persistence(Operation::AddAllocation, DbError::not_found("Detail", "d9"));
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["context"], "add allocation");

        let plain = serde_json::to_value(AppError::validation("plan must be a positive number")).unwrap();
        assert!(plain.get("context").is_none());
    }

    #[test]
    fn test_core_error_conversion() {
        let err = AppError::from(CoreError::AllocationNotFound("a7".into()));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Allocation not found: a7");
    }
}
