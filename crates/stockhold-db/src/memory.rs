//! # In-Memory Store
//!
//! A [`TransactionSource`] that keeps everything in process memory.
//!
//! ## Transaction Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  begin()   ──► lock the shared state (one transaction at a time)       │
//! │                copy it into a working set                              │
//! │                                                                         │
//! │  reads / writes go to the working set only                             │
//! │                                                                         │
//! │  commit()  ──► replace the shared state with the working set, unlock  │
//! │  rollback() or drop ──► unlock, working set discarded                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Inserts enforce the same exclusivity rules as the SQLite partial unique
//! indexes, so workflows behave identically on both backends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{DbError, DbResult};
use crate::unit_of_work::{TransactionSource, UnitOfWork};
use stockhold_core::{
    DepositReceipt, DepositStatus, InventoryUnit, ReportFilter, Reservation, ReservationFilter,
    ReservationStatus,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    deposits: HashMap<String, DepositReceipt>,
    /// Keyed by `(branch_code, imei)`.
    units: HashMap<(String, String), InventoryUnit>,
    reservations: BTreeMap<String, Reservation>,
}

impl MemoryState {
    fn active_for_deposit(&self, deposit_id: &str) -> Option<&Reservation> {
        self.reservations.values().find(|r| {
            r.status == ReservationStatus::Active && r.deposit_receipt_id == deposit_id
        })
    }

    fn active_for_unit(&self, branch_code: &str, imei: &str) -> Option<&Reservation> {
        self.reservations.values().find(|r| {
            r.status == ReservationStatus::Active
                && r.branch_code == branch_code
                && r.product_imei == imei
        })
    }

    /// Newest first, ties broken by id, matching the SQL ordering.
    fn sorted_newest_first(mut rows: Vec<Reservation>) -> Vec<Reservation> {
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.reservation_id.cmp(&a.reservation_id))
        });
        rows
    }
}

// =============================================================================
// Store
// =============================================================================

/// Shared in-memory backend. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a deposit.
    pub async fn put_deposit(&self, deposit: DepositReceipt) {
        let mut state = self.state.lock().await;
        state.deposits.insert(deposit.id.clone(), deposit);
    }

    /// Adds or replaces a stock record.
    pub async fn put_unit(&self, unit: InventoryUnit) {
        let mut state = self.state.lock().await;
        state
            .units
            .insert((unit.branch_code.clone(), unit.imei.clone()), unit);
    }

    /// Committed view of a deposit.
    pub async fn deposit(&self, deposit_id: &str) -> Option<DepositReceipt> {
        self.state.lock().await.deposits.get(deposit_id).cloned()
    }

    /// Committed view of a stock record.
    pub async fn unit(&self, branch_code: &str, imei: &str) -> Option<InventoryUnit> {
        self.state
            .lock()
            .await
            .units
            .get(&(branch_code.to_string(), imei.to_string()))
            .cloned()
    }

    /// Committed view of a reservation, as stored.
    pub async fn reservation(&self, reservation_id: &str) -> Option<Reservation> {
        self.state
            .lock()
            .await
            .reservations
            .get(reservation_id)
            .cloned()
    }
}

#[async_trait]
impl TransactionSource for MemoryStore {
    type Tx = MemoryUnitOfWork;

    async fn begin(&self) -> DbResult<MemoryUnitOfWork> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(MemoryUnitOfWork { guard, working })
    }
}

// =============================================================================
// Unit of Work
// =============================================================================

/// Holds the store lock for its whole lifetime.
#[derive(Debug)]
pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn deposit(&mut self, deposit_id: &str) -> DbResult<Option<DepositReceipt>> {
        Ok(self.working.deposits.get(deposit_id).cloned())
    }

    async fn mark_deposit_reserved(
        &mut self,
        deposit_id: &str,
        checked_by: &str,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        Ok(match self.working.deposits.get_mut(deposit_id) {
            Some(deposit) => {
                deposit.status = DepositStatus::StockReserved;
                deposit.tracking.stock_checked = true;
                deposit.tracking.stock_checked_at = Some(now);
                deposit.tracking.stock_checked_by = Some(checked_by.to_string());
                true
            }
            None => false,
        })
    }

    async fn mark_deposit_completed(
        &mut self,
        deposit_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        Ok(match self.working.deposits.get_mut(deposit_id) {
            Some(deposit) => {
                deposit.status = DepositStatus::Completed;
                deposit.completed_at = Some(now);
                true
            }
            None => false,
        })
    }

    async fn inventory_unit(
        &mut self,
        branch_code: &str,
        imei: &str,
    ) -> DbResult<Option<InventoryUnit>> {
        Ok(self
            .working
            .units
            .get(&(branch_code.to_string(), imei.to_string()))
            .cloned())
    }

    async fn decrement_stock(
        &mut self,
        branch_code: &str,
        imei: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Option<i64>> {
        let key = (branch_code.to_string(), imei.to_string());
        Ok(self.working.units.get_mut(&key).map(|unit| {
            unit.stock_value = (unit.stock_value - 1).max(0);
            unit.updated_at = now;
            unit.stock_value
        }))
    }

    async fn reservation(&mut self, reservation_id: &str) -> DbResult<Option<Reservation>> {
        Ok(self.working.reservations.get(reservation_id).cloned())
    }

    async fn active_reservation_for_deposit(
        &mut self,
        deposit_id: &str,
    ) -> DbResult<Option<Reservation>> {
        Ok(self.working.active_for_deposit(deposit_id).cloned())
    }

    async fn active_reservation_for_unit(
        &mut self,
        branch_code: &str,
        imei: &str,
    ) -> DbResult<Option<Reservation>> {
        Ok(self.working.active_for_unit(branch_code, imei).cloned())
    }

    async fn insert_reservation(&mut self, r: &Reservation) -> DbResult<()> {
        if self.working.reservations.contains_key(&r.reservation_id) {
            return Err(DbError::duplicate(
                "stock_reservations.reservation_id",
                &r.reservation_id,
            ));
        }
        if !self.working.deposits.contains_key(&r.deposit_receipt_id) {
            return Err(DbError::ForeignKeyViolation {
                message: format!("deposit {} does not exist", r.deposit_receipt_id),
            });
        }
        if r.status == ReservationStatus::Active {
            if self.working.active_for_unit(&r.branch_code, &r.product_imei).is_some() {
                return Err(DbError::duplicate(
                    "stock_reservations.branch_code, stock_reservations.product_imei",
                    format!("{}/{}", r.branch_code, r.product_imei),
                ));
            }
            if self.working.active_for_deposit(&r.deposit_receipt_id).is_some() {
                return Err(DbError::duplicate(
                    "stock_reservations.deposit_receipt_id",
                    &r.deposit_receipt_id,
                ));
            }
        }

        self.working
            .reservations
            .insert(r.reservation_id.clone(), r.clone());
        Ok(())
    }

    async fn update_reservation(
        &mut self,
        r: &Reservation,
        expected: ReservationStatus,
    ) -> DbResult<bool> {
        match self.working.reservations.get_mut(&r.reservation_id) {
            Some(stored) if stored.status == expected => {
                *stored = r.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn expire_lapsed(&mut self, now: DateTime<Utc>) -> DbResult<u64> {
        let mut expired = 0;
        for reservation in self.working.reservations.values_mut() {
            if reservation.expire(now) {
                expired += 1;
            }
        }
        Ok(expired)
    }

    async fn reservations_for_deposit(&mut self, deposit_id: &str) -> DbResult<Vec<Reservation>> {
        let rows = self
            .working
            .reservations
            .values()
            .filter(|r| r.deposit_receipt_id == deposit_id)
            .cloned()
            .collect();
        Ok(MemoryState::sorted_newest_first(rows))
    }

    async fn list_reservations(
        &mut self,
        filter: &ReservationFilter,
        now: DateTime<Utc>,
    ) -> DbResult<(Vec<Reservation>, u64)> {
        let matching: Vec<Reservation> = self
            .working
            .reservations
            .values()
            .filter(|r| filter.matches(r, now))
            .cloned()
            .collect();
        let total = matching.len() as u64;

        let page = MemoryState::sorted_newest_first(matching)
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit as usize)
            .collect();

        Ok((page, total))
    }

    async fn report_reservations(&mut self, filter: &ReportFilter) -> DbResult<Vec<Reservation>> {
        let rows = self
            .working
            .reservations
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        Ok(MemoryState::sorted_newest_first(rows))
    }

    async fn commit(self) -> DbResult<()> {
        let MemoryUnitOfWork { mut guard, working } = self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self) -> DbResult<()> {
        Ok(())
    }
}
