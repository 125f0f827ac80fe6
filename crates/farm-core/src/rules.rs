//! # Allocation Rules Engine
//!
//! Validates every state-changing request against the current snapshot
//! before it is handed to the store. Pure: no knowledge of storage.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  request ──► rules::* (this module) ──► payload ──► store write        │
//! │                    │                                                    │
//! │                    └── ValidationError (no store call is made)         │
//! │                                                                         │
//! │  create_detail      → NewDetail                                        │
//! │  update_detail      → DetailPatch                                      │
//! │  delete_detail      → CascadeDelete   (applied as one atomic batch)    │
//! │  create_allocation  → NewAllocation   (started forced to 0)            │
//! │  delete_allocation  → AllocationDelete                                 │
//! │  set_started        → Option<i64>     (None = silent no-op)            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## `started` Updates Are Asymmetric
//! A ±1 step that would leave `[0, printers]` is ignored. A typed value is
//! clamped into `[0, printers]` instead. Both behaviours are intentional and
//! must stay distinct.

use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::capacity::{available_capacity, used_capacity};
use crate::error::{CoreResult, ValidationError};
use crate::types::{Detail, FarmSnapshot, RoomAllocation, RoomName};
use crate::validation::{
    validate_detail_name, validate_fits, validate_id, validate_plan, validate_printers,
    ValidationResult,
};
use crate::ROOMS;

// =============================================================================
// Payloads
// =============================================================================

/// A detail ready to be created. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDetail {
    pub name: String,
    pub plan: i64,
}

/// Validated new values for an existing detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailPatch {
    pub id: String,
    pub name: String,
    pub plan: i64,
}

/// A detail deletion together with every allocation that must go with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeDelete {
    pub detail_id: String,
    pub allocation_ids: Vec<String>,
}

/// An allocation ready to be created. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAllocation {
    pub room: RoomName,
    pub detail_id: String,
    pub printers: i64,
    pub started: i64,
}

/// Removal of a single allocation. No cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationDelete {
    pub allocation_id: String,
}

// =============================================================================
// Detail Rules
// =============================================================================

/// Validates a new detail.
///
/// ## Rules
/// - `name` must not be empty (whitespace-only counts as empty)
/// - `plan` must be >= 1
///
/// ## Example
/// ```rust
/// use farm_core::rules::create_detail;
///
/// let payload = create_detail("Корпус", 50).unwrap();
/// assert_eq!(payload.plan, 50);
/// assert!(create_detail("", 50).is_err());
/// assert!(create_detail("Корпус", 0).is_err());
/// ```
pub fn create_detail(name: &str, plan: i64) -> ValidationResult<NewDetail> {
    let name = validate_detail_name(name)?;
    validate_plan(plan)?;

    Ok(NewDetail { name, plan })
}

/// Validates new values for an existing detail.
///
/// Same rules as [`create_detail`]. The id is carried through unchanged;
/// whether it exists is checked by whoever applies the patch.
pub fn update_detail(detail: &Detail) -> ValidationResult<DetailPatch> {
    validate_id("id", &detail.id)?;
    let NewDetail { name, plan } = create_detail(&detail.name, detail.plan)?;

    Ok(DetailPatch {
        id: detail.id.clone(),
        name,
        plan,
    })
}

/// Plans the deletion of a detail.
///
/// Always valid. The returned plan lists every allocation referencing the
/// detail; applying only part of it would leave orphaned allocations.
pub fn delete_detail(detail_id: &str, allocations: &[RoomAllocation]) -> CascadeDelete {
    CascadeDelete {
        detail_id: detail_id.to_string(),
        allocation_ids: allocations
            .iter()
            .filter(|a| a.detail_id == detail_id)
            .map(|a| a.id.clone())
            .collect(),
    }
}

// =============================================================================
// Allocation Rules
// =============================================================================

/// Validates a new allocation of `printers` in `room` to a detail.
///
/// ## Rules
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  detail_id resolves in snapshot? ── no ──► UnknownReference            │
/// │          │ yes                                                          │
/// │          ▼                                                              │
/// │  printers >= 1? ─────────────────── no ──► MustBePositive              │
/// │          │ yes                                                          │
/// │          ▼                                                              │
/// │  printers > available(room)? ────── yes ─► InsufficientCapacity        │
/// │          │ no                                                           │
/// │          ▼                                                              │
/// │  NewAllocation { started: 0, .. }                                      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn create_allocation(
    room: RoomName,
    detail_id: &str,
    printers: i64,
    snapshot: &FarmSnapshot,
) -> ValidationResult<NewAllocation> {
    validate_id("detail_id", detail_id)?;

    if snapshot.detail(detail_id).is_none() {
        return Err(ValidationError::UnknownReference {
            field: "detail_id".to_string(),
            id: detail_id.to_string(),
        });
    }

    validate_printers(printers)?;

    let available = available_capacity(&room.room(), &snapshot.allocations);
    validate_fits(room.as_str(), printers, available)?;

    Ok(NewAllocation {
        room,
        detail_id: detail_id.to_string(),
        printers,
        started: 0,
    })
}

/// Plans the removal of one allocation. Always valid.
pub fn delete_allocation(allocation_id: &str) -> AllocationDelete {
    AllocationDelete {
        allocation_id: allocation_id.to_string(),
    }
}

// =============================================================================
// Started Counter
// =============================================================================

/// A ±1 change of the started counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum StartedStep {
    Increment,
    Decrement,
}

impl StartedStep {
    #[inline]
    pub const fn delta(&self) -> i64 {
        match self {
            StartedStep::Increment => 1,
            StartedStep::Decrement => -1,
        }
    }
}

/// The two ways an operator changes `started`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
#[ts(export)]
pub enum StartedInput {
    /// Relative step; rejected silently when out of range.
    Step(StartedStep),
    /// Raw text typed into the counter field; clamped.
    Entry(String),
}

/// Applies a step to `started`.
///
/// Returns `None` when the result would leave `[0, printers]`. That is a
/// no-op, not an error.
pub fn step_started(allocation: &RoomAllocation, step: StartedStep) -> Option<i64> {
    let next = allocation.started.checked_add(step.delta())?;
    (0..=allocation.printers).contains(&next).then_some(next)
}

/// Interprets a typed value for `started`.
///
/// Empty or non-numeric input counts as 0. Integral numbers, including
/// forms like `12.0` or `1e2`, are clamped into `[0, printers]`; values
/// beyond the integer range saturate first. Fractions count as 0.
pub fn enter_started(allocation: &RoomAllocation, raw: &str) -> i64 {
    let raw = raw.trim();
    let value = match raw.parse::<i64>() {
        Ok(value) => value,
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            IntErrorKind::InvalidDigit => integral_float(raw).unwrap_or(0),
            _ => 0,
        },
    };

    value.clamp(0, allocation.printers.max(0))
}

/// Decimal or exponent notation of a whole number. `as` saturates.
fn integral_float(raw: &str) -> Option<i64> {
    let value = raw.parse::<f64>().ok()?;
    (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
}

/// Resolves a `started` update to the value that should be written.
///
/// ## Example
/// ```rust
/// use farm_core::rules::{set_started, StartedInput, StartedStep};
/// use farm_core::{RoomAllocation, RoomName};
///
/// let alloc = RoomAllocation {
///     id: "a2".into(),
///     room: RoomName::Kurilka,
///     detail_id: "d2".into(),
///     printers: 40,
///     started: 0,
/// };
///
/// assert_eq!(set_started(&alloc, &StartedInput::Step(StartedStep::Decrement)), None);
/// assert_eq!(set_started(&alloc, &StartedInput::Entry("150".into())), Some(40));
/// ```
pub fn set_started(allocation: &RoomAllocation, input: &StartedInput) -> Option<i64> {
    match input {
        StartedInput::Step(step) => step_started(allocation, *step),
        StartedInput::Entry(raw) => Some(enter_started(allocation, raw)),
    }
}

/// Looks up an allocation and resolves a `started` update against it.
pub fn set_started_by_id(
    snapshot: &FarmSnapshot,
    allocation_id: &str,
    input: &StartedInput,
) -> CoreResult<Option<i64>> {
    let allocation = snapshot
        .allocation(allocation_id)
        .ok_or_else(|| crate::CoreError::AllocationNotFound(allocation_id.to_string()))?;

    Ok(set_started(allocation, input))
}

// =============================================================================
// Snapshot Audit
// =============================================================================

/// A broken invariant found in a snapshot.
///
/// Only data written around the rules engine (another client, manual edits)
/// can produce these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("room {room} uses {used} of {capacity} printers")]
    RoomOverCapacity {
        room: RoomName,
        used: i64,
        capacity: i64,
    },

    #[error("allocation {allocation_id} has started {started} outside [0, {printers}]")]
    StartedOutOfRange {
        allocation_id: String,
        started: i64,
        printers: i64,
    },

    #[error("allocation {allocation_id} has {printers} printers")]
    NonPositivePrinters { allocation_id: String, printers: i64 },

    #[error("detail {detail_id} has plan {plan}")]
    NonPositivePlan { detail_id: String, plan: i64 },

    #[error("allocation {allocation_id} references missing detail {detail_id}")]
    DanglingDetail {
        allocation_id: String,
        detail_id: String,
    },
}

/// Checks every invariant of the model against a snapshot.
pub fn audit_snapshot(snapshot: &FarmSnapshot) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for room in ROOMS.iter() {
        let used = used_capacity(room, &snapshot.allocations);
        if used > room.capacity {
            violations.push(InvariantViolation::RoomOverCapacity {
                room: room.name,
                used,
                capacity: room.capacity,
            });
        }
    }

    for detail in &snapshot.details {
        if detail.plan < 1 {
            violations.push(InvariantViolation::NonPositivePlan {
                detail_id: detail.id.clone(),
                plan: detail.plan,
            });
        }
    }

    for alloc in &snapshot.allocations {
        if alloc.printers < 1 {
            violations.push(InvariantViolation::NonPositivePrinters {
                allocation_id: alloc.id.clone(),
                printers: alloc.printers,
            });
        }
        if alloc.started < 0 || alloc.started > alloc.printers {
            violations.push(InvariantViolation::StartedOutOfRange {
                allocation_id: alloc.id.clone(),
                started: alloc.started,
                printers: alloc.printers,
            });
        }
        if snapshot.detail(&alloc.detail_id).is_none() {
            violations.push(InvariantViolation::DanglingDetail {
                allocation_id: alloc.id.clone(),
                detail_id: alloc.detail_id.clone(),
            });
        }
    }

    violations
}

// =============================================================================
// Unit Tests
// =============================================================================
