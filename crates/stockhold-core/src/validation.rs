//! # Validation Module
//!
//! Input validation for reservation workflows.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (HTTP handler, sweeper, seed)                         │
//! │  └── Type validation (deserialization)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (before any transaction opens)                   │
//! │  ├── Reference ids, reasons, hour windows                              │
//! │  └── Search and pagination bounds                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints on status                                       │
//! │  └── Partial UNIQUE indexes on active reservations                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockhold_core::policy::ReservationPolicy;
//! use stockhold_core::validation::{validate_cancellation_reason, validate_extension_hours};
//!
//! let policy = ReservationPolicy::default();
//! assert!(validate_extension_hours(24, &policy).is_ok());
//! assert_eq!(validate_cancellation_reason("  customer changed mind ").unwrap(), "customer changed mind");
//! ```

use crate::error::ValidationError;
use crate::policy::ReservationPolicy;
use crate::MAX_PAGE_LIMIT;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted reference id (reservation, deposit, transaction).
pub const MAX_REFERENCE_LEN: usize = 64;

/// Longest accepted cancellation reason.
pub const MAX_REASON_LEN: usize = 500;

/// Longest accepted search query.
pub const MAX_SEARCH_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a reference id such as a reservation id or deposit id.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 64 characters
///
/// ## Returns
/// The trimmed id.
pub fn validate_reference(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_REFERENCE_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_REFERENCE_LEN,
        });
    }

    Ok(value.to_string())
}

/// Validates a cancellation reason.
///
/// A reason is mandatory: staff must say why a hold was released.
pub fn validate_cancellation_reason(reason: &str) -> ValidationResult<String> {
    let reason = reason.trim();

    if reason.is_empty() {
        return Err(ValidationError::Required {
            field: "reason".to_string(),
        });
    }

    if reason.chars().count() > MAX_REASON_LEN {
        return Err(ValidationError::TooLong {
            field: "reason".to_string(),
            max: MAX_REASON_LEN,
        });
    }

    Ok(reason.to_string())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (no filtering)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

fn validate_hours(field: &str, hours: u32, policy: &ReservationPolicy) -> ValidationResult<()> {
    if hours == 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if hours > policy.max_expiration_hours {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: i64::from(policy.max_expiration_hours),
        });
    }

    Ok(())
}

/// Validates the window requested at creation.
///
/// ## Flow
/// ```text
/// create_from_deposit(deposit, Some(48))
///       │
///       ▼
/// validate_expiration_hours(48) ← THIS FUNCTION
///       │
///       ├── 0?          → Error: "expiration_hours must be positive"
///       ├── > policy max → Error: "expiration_hours must be between 1 and 720"
///       └── OK → open transaction
/// ```
pub fn validate_expiration_hours(hours: u32, policy: &ReservationPolicy) -> ValidationResult<()> {
    validate_hours("expiration_hours", hours, policy)
}

/// Validates the hours added by an extension.
pub fn validate_extension_hours(hours: u32, policy: &ReservationPolicy) -> ValidationResult<()> {
    validate_hours("additional_hours", hours, policy)
}

/// Validates listing pagination.
pub fn validate_pagination(page: u32, limit: u32) -> ValidationResult<()> {
    if page == 0 {
        return Err(ValidationError::MustBePositive {
            field: "page".to_string(),
        });
    }

    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: i64::from(MAX_PAGE_LIMIT),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
