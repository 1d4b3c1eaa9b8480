//! # stockhold-core: Pure Reservation Logic
//!
//! This crate is the **heart** of Stockhold. It holds the reservation state
//! machine and the data contracts of the collaborators it coordinates, as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockhold Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             HTTP layer / back-office UI (external)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          stockhold-db: ReservationManager workflows             │   │
//! │  │    create_from_deposit, use_reservation, cancel, extend, sweep  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockhold-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ lifecycle │  │   money   │  │ validation│  │   │
//! │  │   │Reservation│  │ is_expired│  │   Money   │  │   rules   │  │   │
//! │  │   │ Deposit   │  │ mark_used │  │  (satang) │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Reservation, deposit and inventory boundary types
//! - [`lifecycle`] - State transitions and the expiry predicate
//! - [`money`] - Integer money in satang
//! - [`clock`] - Injectable time source
//! - [`policy`] - Reservation window configuration
//! - [`error`] - Error taxonomy
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use stockhold_core::{ErrorKind, Money, ReservationError, ReservationStatus};
//!
//! // Deposit snapshot amounts are integer satang
//! let deposit = Money::from_baht(1_000);
//! let total = Money::from_baht(5_000);
//! assert_eq!((total - deposit).satang(), 400_000);
//!
//! // Terminal states never go back to active
//! assert!(ReservationStatus::Used.is_terminal());
//!
//! // Every failure carries a machine-checkable kind
//! let err = ReservationError::expired("RSV-20260101-0A1B2C3D");
//! assert_eq!(err.kind(), ErrorKind::Expired);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod policy;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ErrorKind, ReservationError, ReservationResult, ValidationError};
pub use lifecycle::{generate_reservation_id, is_expired};
pub use money::Money;
pub use policy::ReservationPolicy;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default reservation window when the caller does not ask for one.
pub const DEFAULT_EXPIRATION_HOURS: u32 = 72;

/// Default extension applied by `extend` without an explicit amount.
pub const DEFAULT_EXTENSION_HOURS: u32 = 24;

/// Upper bound for a single window or extension (30 days).
///
/// ## Business Reason
/// A hold longer than a month ties up a phone that could be sold; such
/// cases go through a manager, not through an extension.
pub const MAX_EXPIRATION_HOURS: u32 = 720;

/// Display name recorded when an operation has no authenticated user.
pub const SYSTEM_ACTOR_NAME: &str = "system";

/// Default page size for reservation listings.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Largest page a listing may request.
pub const MAX_PAGE_LIMIT: u32 = 100;
