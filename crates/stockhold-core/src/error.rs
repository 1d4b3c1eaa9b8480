//! # Error Types
//!
//! Domain-specific error types for stockhold-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockhold-core errors (this file)                                     │
//! │  ├── ReservationError - What every workflow returns                    │
//! │  ├── ErrorKind        - Machine-checkable category (+ HTTP status)     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockhold-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError ─┐                                              │
//! │        DbError ─────────┴──► ReservationError ──► HTTP layer           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (reservation id, deposit id, IMEI)
//! 3. Expired and Conflict are never folded into NotFound

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::types::Reservation;

// =============================================================================
// Error Kind
// =============================================================================

/// Machine-checkable error category.
///
/// ## Usage in Frontend
/// ```typescript
/// switch (e.code) {
///   case 'EXPIRED':  offerNewReservation(); break;
///   case 'CONFLICT': showExisting(e.existing); break;
///   case 'NOT_FOUND': showMissing(); break;
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed input (400).
    Validation,
    /// Referenced record missing or unit unavailable (404).
    NotFound,
    /// An active reservation already holds the deposit or unit (409).
    Conflict,
    /// The reservation window has lapsed (400).
    Expired,
    /// Transaction or storage failure (500).
    Database,
}

impl ErrorKind {
    /// HTTP status the outer layer should answer with.
    pub const fn http_status(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Expired => 400,
            ErrorKind::Database => 500,
        }
    }
}

// =============================================================================
// Reservation Error
// =============================================================================

/// Errors returned by every reservation workflow.
#[derive(Debug, Error)]
pub enum ReservationError {
    /// Input validation failed.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Deposit, reservation or inventory unit is missing, or the unit does
    /// not satisfy the availability predicate.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// An active reservation already exists for the deposit or the unit.
    ///
    /// ## User Workflow
    /// ```text
    /// Create reservation for DR-690101001
    ///      │
    ///      ▼
    /// Existing active RSV-... found
    ///      │
    ///      ▼
    /// Conflict { existing: Some(RSV-...) }
    ///      │
    ///      ▼
    /// UI shows the existing hold instead of creating a duplicate
    /// ```
    #[error("{message}")]
    Conflict {
        message: String,
        existing: Option<Box<Reservation>>,
    },

    /// The reservation window has lapsed.
    #[error("Reservation {reservation_id} has expired")]
    Expired { reservation_id: String },

    /// Storage or transaction failure; nothing was written.
    #[error("Database error: {0}")]
    Database(String),
}

impl ReservationError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        ReservationError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Conflict error that carries the reservation already in place.
    pub fn conflict(message: impl Into<String>, existing: Option<Reservation>) -> Self {
        ReservationError::Conflict {
            message: message.into(),
            existing: existing.map(Box::new),
        }
    }

    /// Creates an Expired error.
    pub fn expired(reservation_id: impl Into<String>) -> Self {
        ReservationError::Expired {
            reservation_id: reservation_id.into(),
        }
    }

    /// Returns the machine-checkable category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReservationError::Validation(_) => ErrorKind::Validation,
            ReservationError::NotFound { .. } => ErrorKind::NotFound,
            ReservationError::Conflict { .. } => ErrorKind::Conflict,
            ReservationError::Expired { .. } => ErrorKind::Expired,
            ReservationError::Database(_) => ErrorKind::Database,
        }
    }

    /// Returns the reservation that caused a conflict, if known.
    pub fn existing(&self) -> Option<&Reservation> {
        match self {
            ReservationError::Conflict { existing, .. } => existing.as_deref(),
            _ => None,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any transaction is opened.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is not one of the accepted values.
    #[error("Invalid {field}: {value}")]
    Invalid { field: String, value: String },

    /// The referenced record is in a state that cannot be reserved.
    #[error("{entity} {id} is {status} and cannot be reserved")]
    NotReservable {
        entity: String,
        id: String,
        status: String,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for reservation workflow results.
pub type ReservationResult<T> = Result<T, ReservationError>;

// =============================================================================
// Unit Tests
// =============================================================================
