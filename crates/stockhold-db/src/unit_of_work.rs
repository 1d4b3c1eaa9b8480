//! # Unit of Work
//!
//! The transaction seam between reservation workflows and storage.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ReservationManager<S: TransactionSource>                              │
//! │       │                                                                 │
//! │       │  source.begin()                                                 │
//! │       ▼                                                                 │
//! │  S::Tx: UnitOfWork ─────────────┬──────────────────────┐               │
//! │   deposit / mark_deposit_*      │                      │               │
//! │   inventory_unit / decrement    │ SqliteUnitOfWork     │ MemoryUnitOfWork
//! │   reservation / insert / update │ (sqlx Transaction)   │ (copy-on-commit)
//! │   expire_lapsed / list / report │                      │               │
//! │       │                         └──────────────────────┘               │
//! │       ▼                                                                 │
//! │  commit()  → every write becomes visible at once                       │
//! │  rollback() or drop → nothing was written                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, Transaction};

use crate::error::{DbError, DbResult};
use crate::repository::{deposit, inventory, reservation};
use stockhold_core::{
    DepositReceipt, InventoryUnit, ReportFilter, Reservation, ReservationFilter, ReservationStatus,
};

// =============================================================================
// Traits
// =============================================================================

/// Something that can open a unit of work.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// The transaction type handed to workflows.
    type Tx: UnitOfWork;

    /// Opens a transaction that will write. Concurrent writers queue here,
    /// so each one reads the state the previous one committed.
    async fn begin(&self) -> DbResult<Self::Tx>;

    /// Opens a transaction that only reads.
    async fn begin_read(&self) -> DbResult<Self::Tx> {
        self.begin().await
    }
}

/// Typed operations over deposits, stock and reservations inside one
/// transaction.
#[async_trait]
pub trait UnitOfWork: Send {
    // ---- Deposit Ledger -----------------------------------------------------

    /// Loads a deposit receipt.
    async fn deposit(&mut self, deposit_id: &str) -> DbResult<Option<DepositReceipt>>;

    /// Writes `stock_reserved` plus the stock-check tracking fields.
    async fn mark_deposit_reserved(
        &mut self,
        deposit_id: &str,
        checked_by: &str,
        now: DateTime<Utc>,
    ) -> DbResult<bool>;

    /// Writes `completed` and `completed_at`. False if the deposit is gone.
    async fn mark_deposit_completed(&mut self, deposit_id: &str, now: DateTime<Utc>)
        -> DbResult<bool>;

    // ---- Inventory Store ----------------------------------------------------

    /// Loads the stock record for a unit.
    async fn inventory_unit(
        &mut self,
        branch_code: &str,
        imei: &str,
    ) -> DbResult<Option<InventoryUnit>>;

    /// Decrements stock by one, floored at zero. Returns the new value.
    async fn decrement_stock(
        &mut self,
        branch_code: &str,
        imei: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Option<i64>>;

    // ---- Reservations -------------------------------------------------------

    /// Loads a reservation by id, as stored.
    async fn reservation(&mut self, reservation_id: &str) -> DbResult<Option<Reservation>>;

    /// The stored-active reservation for a deposit, if any.
    async fn active_reservation_for_deposit(
        &mut self,
        deposit_id: &str,
    ) -> DbResult<Option<Reservation>>;

    /// The stored-active reservation holding a unit, if any.
    async fn active_reservation_for_unit(
        &mut self,
        branch_code: &str,
        imei: &str,
    ) -> DbResult<Option<Reservation>>;

    /// Inserts a new reservation; a second active hold on the same unit or
    /// deposit fails with `DbError::UniqueViolation`.
    async fn insert_reservation(&mut self, reservation: &Reservation) -> DbResult<()>;

    /// Compare-and-set update on the stored status.
    async fn update_reservation(
        &mut self,
        reservation: &Reservation,
        expected: ReservationStatus,
    ) -> DbResult<bool>;

    /// Flips every lapsed active reservation to `expired`.
    async fn expire_lapsed(&mut self, now: DateTime<Utc>) -> DbResult<u64>;

    /// Every reservation for a deposit, newest first.
    async fn reservations_for_deposit(&mut self, deposit_id: &str) -> DbResult<Vec<Reservation>>;

    /// One page of the listing plus the total match count.
    async fn list_reservations(
        &mut self,
        filter: &ReservationFilter,
        now: DateTime<Utc>,
    ) -> DbResult<(Vec<Reservation>, u64)>;

    /// Reservations inside the report range, newest first.
    async fn report_reservations(&mut self, filter: &ReportFilter) -> DbResult<Vec<Reservation>>;

    // ---- Completion ---------------------------------------------------------

    /// Makes every write visible.
    async fn commit(self) -> DbResult<()>;

    /// Discards every write. Dropping the unit has the same effect.
    async fn rollback(self) -> DbResult<()>;
}

// =============================================================================
// SQLite Implementation
// =============================================================================

/// A unit of work over one SQLite transaction.
///
/// sqlx rolls the transaction back when it is dropped uncommitted.
pub struct SqliteUnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteUnitOfWork {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        SqliteUnitOfWork { tx }
    }
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    async fn deposit(&mut self, deposit_id: &str) -> DbResult<Option<DepositReceipt>> {
        deposit::fetch_by_id(&mut self.tx, deposit_id).await
    }

    async fn mark_deposit_reserved(
        &mut self,
        deposit_id: &str,
        checked_by: &str,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        deposit::mark_reserved(&mut self.tx, deposit_id, checked_by, now).await
    }

    async fn mark_deposit_completed(
        &mut self,
        deposit_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        deposit::mark_completed(&mut self.tx, deposit_id, now).await
    }

    async fn inventory_unit(
        &mut self,
        branch_code: &str,
        imei: &str,
    ) -> DbResult<Option<InventoryUnit>> {
        inventory::fetch_unit(&mut self.tx, branch_code, imei).await
    }

    async fn decrement_stock(
        &mut self,
        branch_code: &str,
        imei: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Option<i64>> {
        inventory::decrement(&mut self.tx, branch_code, imei, now).await
    }

    async fn reservation(&mut self, reservation_id: &str) -> DbResult<Option<Reservation>> {
        reservation::fetch_by_id(&mut self.tx, reservation_id).await
    }

    async fn active_reservation_for_deposit(
        &mut self,
        deposit_id: &str,
    ) -> DbResult<Option<Reservation>> {
        reservation::fetch_active_for_deposit(&mut self.tx, deposit_id).await
    }

    async fn active_reservation_for_unit(
        &mut self,
        branch_code: &str,
        imei: &str,
    ) -> DbResult<Option<Reservation>> {
        reservation::fetch_active_for_unit(&mut self.tx, branch_code, imei).await
    }

    async fn insert_reservation(&mut self, r: &Reservation) -> DbResult<()> {
        reservation::insert(&mut self.tx, r).await
    }

    async fn update_reservation(
        &mut self,
        r: &Reservation,
        expected: ReservationStatus,
    ) -> DbResult<bool> {
        reservation::update_if_status(&mut self.tx, r, expected).await
    }

    async fn expire_lapsed(&mut self, now: DateTime<Utc>) -> DbResult<u64> {
        reservation::expire_lapsed(&mut self.tx, now).await
    }

    async fn reservations_for_deposit(&mut self, deposit_id: &str) -> DbResult<Vec<Reservation>> {
        reservation::for_deposit(&mut self.tx, deposit_id).await
    }

    async fn list_reservations(
        &mut self,
        filter: &ReservationFilter,
        now: DateTime<Utc>,
    ) -> DbResult<(Vec<Reservation>, u64)> {
        reservation::list(&mut self.tx, filter, now).await
    }

    async fn report_reservations(&mut self, filter: &ReportFilter) -> DbResult<Vec<Reservation>> {
        reservation::report(&mut self.tx, filter).await
    }

    async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}
