//! # Reservation Lifecycle
//!
//! The state machine of a reservation as pure functions over a value.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   from_deposit ──► Active ──┬── mark_used ──► Used        (terminal)   │
//! │                      │  ▲   ├── cancel ─────► Cancelled   (terminal)   │
//! │                      │  │   └── expire ─────► Expired     (terminal)   │
//! │                      └──┘                                               │
//! │                     extend                                              │
//! │                                                                         │
//! │  Lapsed = Active && now > expires_at                                   │
//! │  A lapsed reservation answers Expired to mark_used, cancel and extend. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every transition leaves the value untouched when it fails. Persisting
//! the result (and flipping a lapsed record to `expired`) is the caller's
//! job inside its transaction.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::{ReservationError, ReservationResult, ValidationError};
use crate::types::{Actor, DepositReceipt, Reservation, ReservationStatus};
use crate::validation::validate_cancellation_reason;

/// Prefix of every reservation id.
pub const RESERVATION_ID_PREFIX: &str = "RSV";

// =============================================================================
// Free Functions
// =============================================================================

/// True when the record is still stored as active but its window has passed.
///
/// At `now == expires_at` the reservation is still valid.
pub fn is_expired(reservation: &Reservation, now: DateTime<Utc>) -> bool {
    reservation.status == ReservationStatus::Active && now > reservation.expires_at
}

/// Generates a business id: `RSV-YYYYMMDD-XXXXXXXX`.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use stockhold_core::lifecycle::generate_reservation_id;
///
/// let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
/// let id = generate_reservation_id(now);
/// assert!(id.starts_with("RSV-20260301-"));
/// assert_eq!(id.len(), 21);
/// ```
pub fn generate_reservation_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        RESERVATION_ID_PREFIX,
        now.format("%Y%m%d"),
        suffix[..8].to_uppercase()
    )
}

// =============================================================================
// Reservation Methods
// =============================================================================

impl Reservation {
    /// Builds a new active reservation from a deposit snapshot.
    ///
    /// The deposit must carry a product IMEI; callers check reservability
    /// before getting here, so a missing IMEI yields an empty key that the
    /// storage layer rejects.
    pub fn from_deposit(
        deposit: &DepositReceipt,
        reservation_id: String,
        now: DateTime<Utc>,
        expiration_hours: u32,
        created_by: &Actor,
    ) -> Reservation {
        Reservation {
            reservation_id,
            deposit_receipt_id: deposit.id.clone(),
            deposit_receipt_number: deposit.receipt_number.clone(),
            product_id: deposit.product.id.clone(),
            product_name: deposit.product.name.clone(),
            product_imei: deposit.product_imei().unwrap_or_default().to_string(),
            branch_code: deposit.branch_code.clone(),
            customer_name: deposit.customer.name.clone(),
            customer_phone: deposit.customer.phone.clone(),
            reservation_type: deposit.deposit_type,
            reserved_at: now,
            expires_at: now + Duration::hours(i64::from(expiration_hours)),
            deposit_amount: deposit.amounts.deposit_amount,
            total_amount: deposit.amounts.total_amount,
            remaining_amount: deposit.amounts.remaining_amount,
            status: ReservationStatus::Active,
            used_at: None,
            used_by: None,
            used_by_name: None,
            used_in_transaction: None,
            cancelled_at: None,
            cancelled_by: None,
            cancelled_by_name: None,
            cancellation_reason: None,
            created_by: Some(created_by.name.clone()),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// See [`is_expired`].
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        is_expired(self, now)
    }

    /// Status as a reader should see it: lapsed active records read as
    /// `expired` even before the sweep persists it.
    pub fn effective_status(&self, now: DateTime<Utc>) -> ReservationStatus {
        if self.is_expired(now) {
            ReservationStatus::Expired
        } else {
            self.status
        }
    }

    /// Time left on the hold; zero once lapsed or terminal.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Duration {
        if self.effective_status(now) != ReservationStatus::Active {
            return Duration::zero();
        }
        (self.expires_at - now).max(Duration::zero())
    }

    /// Gate shared by every transition out of `active`.
    fn ensure_active(&self, now: DateTime<Utc>) -> ReservationResult<()> {
        match self.effective_status(now) {
            ReservationStatus::Active => Ok(()),
            ReservationStatus::Expired => Err(ReservationError::expired(&self.reservation_id)),
            ReservationStatus::Used | ReservationStatus::Cancelled => Err(
                ReservationError::not_found("Active reservation", &self.reservation_id),
            ),
        }
    }

    /// Consumes the hold at sale time.
    pub fn mark_used(
        &mut self,
        actor: &Actor,
        transaction_id: &str,
        now: DateTime<Utc>,
    ) -> ReservationResult<()> {
        self.ensure_active(now)?;

        self.status = ReservationStatus::Used;
        self.used_at = Some(now);
        self.used_by = actor.id.clone();
        self.used_by_name = Some(actor.name.clone());
        self.used_in_transaction = Some(transaction_id.to_string());
        self.updated_at = now;
        Ok(())
    }

    /// Releases the hold. A non-empty reason is required.
    pub fn cancel(
        &mut self,
        actor: &Actor,
        reason: &str,
        now: DateTime<Utc>,
    ) -> ReservationResult<()> {
        let reason = validate_cancellation_reason(reason)?;
        self.ensure_active(now)?;

        self.status = ReservationStatus::Cancelled;
        self.cancelled_at = Some(now);
        self.cancelled_by = actor.id.clone();
        self.cancelled_by_name = Some(actor.name.clone());
        self.cancellation_reason = Some(reason);
        self.updated_at = now;
        Ok(())
    }

    /// Pushes `expires_at` forward by `additional_hours` from its current
    /// value (not from now).
    pub fn extend(&mut self, additional_hours: u32, now: DateTime<Utc>) -> ReservationResult<()> {
        if additional_hours == 0 {
            return Err(ValidationError::MustBePositive {
                field: "additional_hours".to_string(),
            }
            .into());
        }
        self.ensure_active(now)?;

        self.expires_at += Duration::hours(i64::from(additional_hours));
        self.updated_at = now;
        Ok(())
    }

    /// Flips a lapsed active record to `expired`. Returns false and changes
    /// nothing for any other record.
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_expired(now) {
            return false;
        }

        self.status = ReservationStatus::Expired;
        self.updated_at = now;
        true
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
