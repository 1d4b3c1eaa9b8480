//! # Reservation Manager
//!
//! The workflows that span deposits, stock and reservations.
//!
//! ## Workflow Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create_from_deposit(deposit_id, hours?)                               │
//! │    deposit exists? ─► no active hold on deposit? ─► no active hold on  │
//! │    unit? ─► unit in stock and verified? ─► INSERT reservation          │
//! │                                          ─► deposit = stock_reserved   │
//! │                                                                         │
//! │  use_reservation(reservation_id, transaction_id)                       │
//! │    active? ─► not lapsed? ─► unit still available?                     │
//! │      ─► reservation = used ─► stock - 1 (floor 0) ─► deposit completed │
//! │                                                                         │
//! │  cancel(reservation_id, reason)  ─► reservation = cancelled            │
//! │  extend(reservation_id, hours?)  ─► expires_at += hours                │
//! │  sweep_expired()                 ─► lapsed active ─► expired           │
//! │                                                                         │
//! │  Each call is one unit of work: all writes commit together or none.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lapsed Reservations
//! A reservation whose window passed but which the sweep has not reached
//! yet is treated as expired everywhere. When a workflow trips over one it
//! persists `expired` in its own transaction, commits that alone, and
//! returns [`ReservationError::Expired`].

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::unit_of_work::{TransactionSource, UnitOfWork};
use stockhold_core::lifecycle::generate_reservation_id;
use stockhold_core::validation::{
    validate_cancellation_reason, validate_expiration_hours, validate_extension_hours,
    validate_pagination, validate_reference, validate_search_query,
};
use stockhold_core::{
    Actor, Clock, Page, ReportFilter, Reservation, ReservationCheck, ReservationError,
    ReservationFilter, ReservationPolicy, ReservationReport, ReservationResult,
    ReservationStatus, ReservationSummary, UseOutcome, ValidationError,
};

/// Reservation workflows over any [`TransactionSource`].
///
/// ## Example
/// ```rust,ignore
/// let manager = ReservationManager::new(db, Arc::new(SystemClock), ReservationPolicy::default());
///
/// let reservation = manager.create_from_deposit("dep-1", None, &actor).await?;
/// let outcome = manager
///     .use_reservation(&reservation.reservation_id, "TXN-0001", &actor)
///     .await?;
/// assert_eq!(outcome.reservation.status, ReservationStatus::Used);
/// ```
pub struct ReservationManager<S> {
    source: S,
    clock: Arc<dyn Clock>,
    policy: ReservationPolicy,
}

impl<S: TransactionSource> ReservationManager<S> {
    /// Creates a manager over `source`.
    pub fn new(source: S, clock: Arc<dyn Clock>, policy: ReservationPolicy) -> Self {
        ReservationManager {
            source,
            clock,
            policy,
        }
    }

    /// The window configuration in use.
    pub fn policy(&self) -> &ReservationPolicy {
        &self.policy
    }

    /// The underlying storage.
    pub fn source(&self) -> &S {
        &self.source
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Reserves the deposit's unit for `expiration_hours` (policy default
    /// when `None`).
    ///
    /// ## Errors
    /// - `NotFound`: deposit missing, or unit missing / out of stock / unverified
    /// - `Conflict`: an active reservation already holds the deposit or the unit
    ///   (the existing one is attached)
    /// - `Validation`: bad input, deposit closed, or deposit without IMEI
    pub async fn create_from_deposit(
        &self,
        deposit_id: &str,
        expiration_hours: Option<u32>,
        actor: &Actor,
    ) -> ReservationResult<Reservation> {
        let deposit_id = validate_reference("deposit_id", deposit_id)?;
        let hours = expiration_hours.unwrap_or(self.policy.default_expiration_hours);
        validate_expiration_hours(hours, &self.policy)?;

        let result = self.create_in_transaction(&deposit_id, hours, actor).await;
        match &result {
            Ok(r) => info!(
                reservation_id = %r.reservation_id,
                deposit_id = %deposit_id,
                branch_code = %r.branch_code,
                imei = %r.product_imei,
                expires_at = %r.expires_at,
                "Reservation created"
            ),
            Err(e) => warn!(deposit_id = %deposit_id, kind = ?e.kind(), error = %e, "Reservation creation rejected"),
        }
        result
    }

    async fn create_in_transaction(
        &self,
        deposit_id: &str,
        hours: u32,
        actor: &Actor,
    ) -> ReservationResult<Reservation> {
        let now = self.clock.now();
        let mut uow = self.source.begin().await?;

        let deposit = uow
            .deposit(deposit_id)
            .await?
            .ok_or_else(|| ReservationError::not_found("Deposit receipt", deposit_id))?;

        if deposit.status.is_closed() {
            return Err(ValidationError::NotReservable {
                entity: "Deposit receipt".to_string(),
                id: deposit.receipt_number.clone(),
                status: deposit.status.to_string(),
            }
            .into());
        }

        let imei = deposit
            .product_imei()
            .ok_or_else(|| ValidationError::Required {
                field: "product.imei".to_string(),
            })?
            .to_string();
        let branch_code = deposit.branch_code.clone();

        if let Some(mut existing) = uow.active_reservation_for_deposit(deposit_id).await? {
            if !existing.expire(now) {
                return Err(ReservationError::conflict(
                    format!(
                        "Deposit {} already has an active reservation",
                        deposit.receipt_number
                    ),
                    Some(existing),
                ));
            }
            uow.update_reservation(&existing, ReservationStatus::Active)
                .await?;
            debug!(reservation_id = %existing.reservation_id, "Expired lapsed reservation for deposit");
        }

        if let Some(mut holder) = uow.active_reservation_for_unit(&branch_code, &imei).await? {
            if !holder.expire(now) {
                return Err(ReservationError::conflict(
                    format!("Unit {} in branch {} is already reserved", imei, branch_code),
                    Some(holder),
                ));
            }
            uow.update_reservation(&holder, ReservationStatus::Active)
                .await?;
            debug!(reservation_id = %holder.reservation_id, "Expired lapsed reservation for unit");
        }

        let available = uow
            .inventory_unit(&branch_code, &imei)
            .await?
            .is_some_and(|unit| unit.is_available());
        if !available {
            return Err(ReservationError::not_found(
                "Available stock",
                format!("{}/{}", branch_code, imei),
            ));
        }

        let reservation =
            Reservation::from_deposit(&deposit, generate_reservation_id(now), now, hours, actor);

        if let Err(err) = uow.insert_reservation(&reservation).await {
            if !err.is_unique_violation() {
                return Err(err.into());
            }
            let existing = match uow.active_reservation_for_unit(&branch_code, &imei).await? {
                Some(r) => Some(r),
                None => uow.active_reservation_for_deposit(deposit_id).await?,
            };
            return Err(ReservationError::conflict(
                format!("Unit {} in branch {} is already reserved", imei, branch_code),
                existing,
            ));
        }

        uow.mark_deposit_reserved(deposit_id, &actor.name, now)
            .await?;
        uow.commit().await?;

        Ok(reservation)
    }

    // =========================================================================
    // Terminal Transitions and Extension
    // =========================================================================

    /// Opens a transaction on a reservation that may still be active.
    ///
    /// A lapsed reservation is expired and committed here, and the caller
    /// gets `Expired`. Other statuses are left for the transition method to
    /// reject.
    async fn open_reservation(
        &self,
        reservation_id: &str,
        now: DateTime<Utc>,
    ) -> ReservationResult<(S::Tx, Reservation)> {
        let mut uow = self.source.begin().await?;

        let mut reservation = uow
            .reservation(reservation_id)
            .await?
            .ok_or_else(|| ReservationError::not_found("Reservation", reservation_id))?;

        if reservation.expire(now) {
            uow.update_reservation(&reservation, ReservationStatus::Active)
                .await?;
            uow.commit().await?;
            info!(reservation_id = %reservation_id, "Reservation expired on access");
            return Err(ReservationError::expired(reservation_id));
        }

        Ok((uow, reservation))
    }

    /// Consumes a reservation at sale time.
    ///
    /// In one transaction: reservation becomes `used`, the unit's stock drops
    /// by one (floored at zero), and the deposit becomes `completed`. A
    /// missing deposit record does not fail the sale; the outcome reports it.
    pub async fn use_reservation(
        &self,
        reservation_id: &str,
        transaction_id: &str,
        actor: &Actor,
    ) -> ReservationResult<UseOutcome> {
        let reservation_id = validate_reference("reservation_id", reservation_id)?;
        let transaction_id = validate_reference("transaction_id", transaction_id)?;

        let result = self
            .use_in_transaction(&reservation_id, &transaction_id, actor)
            .await;
        match &result {
            Ok(outcome) => info!(
                reservation_id = %reservation_id,
                transaction_id = %transaction_id,
                remaining_stock = outcome.remaining_stock,
                "Reservation used"
            ),
            Err(e) => warn!(reservation_id = %reservation_id, kind = ?e.kind(), error = %e, "Reservation use rejected"),
        }
        result
    }

    async fn use_in_transaction(
        &self,
        reservation_id: &str,
        transaction_id: &str,
        actor: &Actor,
    ) -> ReservationResult<UseOutcome> {
        let now = self.clock.now();
        let (mut uow, mut reservation) = self.open_reservation(reservation_id, now).await?;

        reservation.mark_used(actor, transaction_id, now)?;

        let branch_code = reservation.branch_code.clone();
        let imei = reservation.product_imei.clone();

        let available = uow
            .inventory_unit(&branch_code, &imei)
            .await?
            .is_some_and(|unit| unit.is_available());
        if !available {
            return Err(ReservationError::not_found(
                "Available stock",
                format!("{}/{}", branch_code, imei),
            ));
        }

        if !uow
            .update_reservation(&reservation, ReservationStatus::Active)
            .await?
        {
            return Err(ReservationError::conflict(
                format!("Reservation {} was changed by another request", reservation_id),
                None,
            ));
        }

        let remaining_stock = uow
            .decrement_stock(&branch_code, &imei, now)
            .await?
            .ok_or_else(|| {
                ReservationError::not_found("Stock record", format!("{}/{}", branch_code, imei))
            })?;

        let deposit_completed = uow
            .mark_deposit_completed(&reservation.deposit_receipt_id, now)
            .await?;
        if !deposit_completed {
            warn!(
                reservation_id = %reservation_id,
                deposit_id = %reservation.deposit_receipt_id,
                "Deposit record missing; sale recorded without completing it"
            );
        }

        uow.commit().await?;

        Ok(UseOutcome {
            reservation,
            remaining_stock,
            deposit_completed,
        })
    }

    /// Releases a reservation. The deposit and stock are left untouched.
    pub async fn cancel(
        &self,
        reservation_id: &str,
        actor: &Actor,
        reason: &str,
    ) -> ReservationResult<Reservation> {
        let reservation_id = validate_reference("reservation_id", reservation_id)?;
        let reason = validate_cancellation_reason(reason)?;

        let result = self.cancel_in_transaction(&reservation_id, actor, &reason).await;
        match &result {
            Ok(_) => info!(reservation_id = %reservation_id, reason = %reason, "Reservation cancelled"),
            Err(e) => warn!(reservation_id = %reservation_id, kind = ?e.kind(), error = %e, "Reservation cancel rejected"),
        }
        result
    }

    async fn cancel_in_transaction(
        &self,
        reservation_id: &str,
        actor: &Actor,
        reason: &str,
    ) -> ReservationResult<Reservation> {
        let now = self.clock.now();
        let (mut uow, mut reservation) = self.open_reservation(reservation_id, now).await?;

        reservation.cancel(actor, reason, now)?;

        if !uow
            .update_reservation(&reservation, ReservationStatus::Active)
            .await?
        {
            return Err(ReservationError::conflict(
                format!("Reservation {} was changed by another request", reservation_id),
                None,
            ));
        }
        uow.commit().await?;

        Ok(reservation)
    }

    /// Moves `expires_at` forward by `additional_hours` (policy extension
    /// when `None`).
    pub async fn extend(
        &self,
        reservation_id: &str,
        additional_hours: Option<u32>,
    ) -> ReservationResult<Reservation> {
        let reservation_id = validate_reference("reservation_id", reservation_id)?;
        let hours = additional_hours.unwrap_or(self.policy.default_extension_hours);
        validate_extension_hours(hours, &self.policy)?;

        let result = self.extend_in_transaction(&reservation_id, hours).await;
        match &result {
            Ok(r) => info!(
                reservation_id = %reservation_id,
                additional_hours = hours,
                expires_at = %r.expires_at,
                "Reservation extended"
            ),
            Err(e) => warn!(reservation_id = %reservation_id, kind = ?e.kind(), error = %e, "Reservation extend rejected"),
        }
        result
    }

    async fn extend_in_transaction(
        &self,
        reservation_id: &str,
        hours: u32,
    ) -> ReservationResult<Reservation> {
        let now = self.clock.now();
        let (mut uow, mut reservation) = self.open_reservation(reservation_id, now).await?;

        reservation.extend(hours, now)?;

        if !uow
            .update_reservation(&reservation, ReservationStatus::Active)
            .await?
        {
            return Err(ReservationError::conflict(
                format!("Reservation {} was changed by another request", reservation_id),
                None,
            ));
        }
        uow.commit().await?;

        Ok(reservation)
    }

    // =========================================================================
    // Expiry Sweep
    // =========================================================================

    /// Persists `expired` for every lapsed active reservation.
    ///
    /// Idempotent. Stock and deposits are never touched.
    pub async fn sweep_expired(&self) -> ReservationResult<u64> {
        let now = self.clock.now();
        let mut uow = self.source.begin().await?;
        let expired = uow.expire_lapsed(now).await?;
        uow.commit().await?;

        if expired > 0 {
            info!(count = expired, "Expired lapsed reservations");
        } else {
            debug!("No lapsed reservations");
        }
        Ok(expired)
    }

    // =========================================================================
    // Queries
    // =========================================================================
    //
    // Returned records carry their effective status: a lapsed active record
    // reads as `expired` before the sweep persists it.

    /// Gets a reservation by id.
    pub async fn get(&self, reservation_id: &str) -> ReservationResult<Reservation> {
        let reservation_id = validate_reference("reservation_id", reservation_id)?;
        let now = self.clock.now();

        let mut uow = self.source.begin_read().await?;
        let reservation = uow.reservation(&reservation_id).await?;
        uow.rollback().await?;

        reservation
            .map(|r| effective_view(r, now))
            .ok_or_else(|| ReservationError::not_found("Reservation", reservation_id))
    }

    /// Is this unit held right now?
    pub async fn check_serial(&self, imei: &str, branch_code: &str) -> ReservationResult<ReservationCheck> {
        let imei = validate_reference("imei", imei)?;
        let branch_code = validate_reference("branch_code", branch_code)?;
        let now = self.clock.now();

        let mut uow = self.source.begin_read().await?;
        let holder = uow.active_reservation_for_unit(&branch_code, &imei).await?;
        uow.rollback().await?;

        Ok(match holder.filter(|r| !r.is_expired(now)) {
            Some(reservation) => ReservationCheck {
                reserved: true,
                time_remaining_secs: reservation.time_remaining(now).num_seconds(),
                reservation: Some(reservation),
            },
            None => ReservationCheck {
                reserved: false,
                reservation: None,
                time_remaining_secs: 0,
            },
        })
    }

    /// Every reservation made against a deposit, newest first.
    pub async fn find_by_deposit(&self, deposit_id: &str) -> ReservationResult<Vec<Reservation>> {
        let deposit_id = validate_reference("deposit_id", deposit_id)?;
        let now = self.clock.now();

        let mut uow = self.source.begin_read().await?;
        let reservations = uow.reservations_for_deposit(&deposit_id).await?;
        uow.rollback().await?;

        Ok(reservations
            .into_iter()
            .map(|r| effective_view(r, now))
            .collect())
    }

    /// Paginated, filtered listing, newest first.
    pub async fn list(&self, filter: &ReservationFilter) -> ReservationResult<Page<Reservation>> {
        validate_pagination(filter.page, filter.limit)?;

        let mut filter = filter.clone();
        filter.search = match filter.search.as_deref() {
            Some(term) => Some(validate_search_query(term)?).filter(|t| !t.is_empty()),
            None => None,
        };
        let now = self.clock.now();

        let mut uow = self.source.begin_read().await?;
        let (items, total) = uow.list_reservations(&filter, now).await?;
        uow.rollback().await?;

        let items = items.into_iter().map(|r| effective_view(r, now)).collect();
        Ok(Page::new(items, filter.page, filter.limit, total))
    }

    /// Reservations in a branch and date range plus summary counts and
    /// amounts.
    pub async fn report(&self, filter: &ReportFilter) -> ReservationResult<ReservationReport> {
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from > to {
                return Err(ValidationError::Invalid {
                    field: "date range".to_string(),
                    value: format!("{} is after {}", from, to),
                }
                .into());
            }
        }
        let now = self.clock.now();

        let mut uow = self.source.begin_read().await?;
        let rows = uow.report_reservations(filter).await?;
        uow.rollback().await?;

        let summary = ReservationSummary::from_reservations(&rows, now);
        let reservations = rows.into_iter().map(|r| effective_view(r, now)).collect();

        Ok(ReservationReport {
            reservations,
            summary,
        })
    }
}

fn effective_view(mut reservation: Reservation, now: DateTime<Utc>) -> Reservation {
    reservation.status = reservation.effective_status(now);
    reservation
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::pool::{Database, DbConfig};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use stockhold_core::{
        DepositAmounts, DepositCustomer, DepositProduct, DepositReceipt, DepositStatus,
        DepositType, ErrorKind, InventoryUnit, ManualClock, Money, Salesperson, StockTracking,
    };

    // -------------------------------------------------------------------------
    // Fixtures
    // -------------------------------------------------------------------------

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn deposit(id: &str, branch_code: &str, imei: &str) -> DepositReceipt {
        DepositReceipt {
            id: id.to_string(),
            receipt_number: format!("DR-{}", id),
            deposit_type: DepositType::Online,
            status: DepositStatus::Confirmed,
            branch_code: branch_code.to_string(),
            product: DepositProduct {
                id: "prod-s25".to_string(),
                name: "Galaxy S25 256GB".to_string(),
                imei: Some(imei.to_string()),
            },
            customer: DepositCustomer {
                name: "Somchai Jaidee".to_string(),
                phone: Some("0812345678".to_string()),
            },
            amounts: DepositAmounts {
                deposit_amount: Money::from_baht(1_000),
                total_amount: Money::from_baht(5_000),
                remaining_amount: Money::from_baht(4_000),
            },
            salesperson: Salesperson {
                id: Some("emp-1".to_string()),
                name: "Nok".to_string(),
            },
            tracking: StockTracking::default(),
            completed_at: None,
            created_at: t0() - Duration::days(1),
        }
    }

    fn unit(branch_code: &str, imei: &str, stock_value: i64, verified: bool) -> InventoryUnit {
        InventoryUnit {
            id: format!("stock-{}-{}", branch_code, imei),
            branch_code: branch_code.to_string(),
            imei: imei.to_string(),
            name: "Galaxy S25 256GB".to_string(),
            stock_value,
            verified,
            updated_at: t0() - Duration::days(1),
        }
    }

    fn cashier() -> Actor {
        Actor::new("emp-7", "Ploy")
    }

    /// Seeding and committed-state inspection for both backends.
    #[async_trait]
    trait TestStore: TransactionSource + Clone + 'static {
        async fn seed_deposit(&self, deposit: DepositReceipt);
        async fn seed_unit(&self, unit: InventoryUnit);
        async fn stored_deposit(&self, id: &str) -> DepositReceipt;
        async fn stored_unit(&self, branch_code: &str, imei: &str) -> InventoryUnit;
        async fn stored_reservation(&self, id: &str) -> Reservation;
    }

    #[async_trait]
    impl TestStore for Database {
        async fn seed_deposit(&self, deposit: DepositReceipt) {
            self.deposits().insert(&deposit).await.unwrap();
        }
        async fn seed_unit(&self, unit: InventoryUnit) {
            self.inventory().upsert(&unit).await.unwrap();
        }
        async fn stored_deposit(&self, id: &str) -> DepositReceipt {
            self.deposits().get_by_id(id).await.unwrap().unwrap()
        }
        async fn stored_unit(&self, branch_code: &str, imei: &str) -> InventoryUnit {
            self.inventory().get(branch_code, imei).await.unwrap().unwrap()
        }
        async fn stored_reservation(&self, id: &str) -> Reservation {
            self.reservations().get_by_id(id).await.unwrap().unwrap()
        }
    }

    #[async_trait]
    impl TestStore for MemoryStore {
        async fn seed_deposit(&self, deposit: DepositReceipt) {
            self.put_deposit(deposit).await;
        }
        async fn seed_unit(&self, unit: InventoryUnit) {
            self.put_unit(unit).await;
        }
        async fn stored_deposit(&self, id: &str) -> DepositReceipt {
            self.deposit(id).await.unwrap()
        }
        async fn stored_unit(&self, branch_code: &str, imei: &str) -> InventoryUnit {
            self.unit(branch_code, imei).await.unwrap()
        }
        async fn stored_reservation(&self, id: &str) -> Reservation {
            self.reservation(id).await.unwrap()
        }
    }

    struct Harness<S> {
        store: S,
        clock: Arc<ManualClock>,
        manager: ReservationManager<S>,
    }

    impl<S: TestStore> Harness<S> {
        fn new(store: S) -> Self {
            let clock = Arc::new(ManualClock::new(t0()));
            let manager =
                ReservationManager::new(store.clone(), clock.clone(), ReservationPolicy::default());
            Harness {
                store,
                clock,
                manager,
            }
        }

        /// Deposit `id` for unit `imei` in BR1 with `stock` verified units.
        async fn with_deposit(self, id: &str, imei: &str, stock: i64) -> Self {
            self.store.seed_deposit(deposit(id, "BR1", imei)).await;
            self.store.seed_unit(unit("BR1", imei, stock, true)).await;
            self
        }
    }

    async fn sqlite_store() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// Runs each generic scenario against SQLite and the in-memory store.
    macro_rules! on_both_backends {
        ($($scenario:ident),* $(,)?) => {
            mod sqlite {
                $(
                    #[tokio::test]
                    async fn $scenario() {
                        super::$scenario(super::sqlite_store().await).await;
                    }
                )*
            }

            mod memory {
                $(
                    #[tokio::test]
                    async fn $scenario() {
                        super::$scenario(super::MemoryStore::new()).await;
                    }
                )*
            }
        };
    }

    on_both_backends!(
        create_reserves_unit_and_marks_deposit,
        second_create_for_deposit_conflicts,
        unit_held_by_other_deposit_conflicts,
        create_rejections_leave_no_trace,
        use_decrements_stock_and_completes_deposit,
        use_after_expiry_expires_without_touching_stock,
        cancel_records_reason_only,
        extend_moves_expiry_forward,
        terminal_reservations_reject_transitions,
        use_fails_when_unit_no_longer_available,
        sweep_expires_only_lapsed,
        lapsed_hold_does_not_block_new_reservation,
        concurrent_creates_for_one_unit_admit_one,
        check_serial_reports_live_holds,
        list_filters_and_paginates,
        search_folds_ascii_case_only,
        report_summarizes_by_effective_status,
    );

    // -------------------------------------------------------------------------
    // Creation
    // -------------------------------------------------------------------------

    async fn create_reserves_unit_and_marks_deposit<S: TestStore>(store: S) {
        let h = Harness::new(store).with_deposit("D1", "IMEI123", 3).await;

        let r = h
            .manager
            .create_from_deposit("D1", Some(72), &cashier())
            .await
            .unwrap();

        assert_eq!(r.status, ReservationStatus::Active);
        assert_eq!(r.expires_at - r.reserved_at, Duration::hours(72));
        assert_eq!(r.deposit_amount, Money::from_baht(1_000));
        assert_eq!(r.total_amount, Money::from_baht(5_000));
        assert!(r.reservation_id.starts_with("RSV-20260301-"));

        let read_back = h.manager.get(&r.reservation_id).await.unwrap();
        assert_eq!(read_back, r);

        let deposit = h.store.stored_deposit("D1").await;
        assert_eq!(deposit.status, DepositStatus::StockReserved);
        assert!(deposit.tracking.stock_checked);
        assert_eq!(deposit.tracking.stock_checked_at, Some(t0()));
        assert_eq!(deposit.tracking.stock_checked_by.as_deref(), Some("Ploy"));

        // Holding does not decrement.
        assert_eq!(h.store.stored_unit("BR1", "IMEI123").await.stock_value, 3);
    }

    async fn second_create_for_deposit_conflicts<S: TestStore>(store: S) {
        let h = Harness::new(store).with_deposit("D1", "IMEI123", 1).await;
        let first = h
            .manager
            .create_from_deposit("D1", None, &cashier())
            .await
            .unwrap();

        let err = h
            .manager
            .create_from_deposit("D1", None, &cashier())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(
            err.existing().map(|r| r.reservation_id.as_str()),
            Some(first.reservation_id.as_str())
        );
        assert_eq!(h.manager.find_by_deposit("D1").await.unwrap().len(), 1);
    }

    async fn unit_held_by_other_deposit_conflicts<S: TestStore>(store: S) {
        let h = Harness::new(store).with_deposit("D1", "IMEI123", 1).await;
        h.store.seed_deposit(deposit("D2", "BR1", "IMEI123")).await;

        let first = h
            .manager
            .create_from_deposit("D1", None, &cashier())
            .await
            .unwrap();
        let err = h
            .manager
            .create_from_deposit("D2", None, &cashier())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(
            err.existing().map(|r| r.reservation_id.clone()),
            Some(first.reservation_id)
        );
        assert_eq!(
            h.store.stored_deposit("D2").await.status,
            DepositStatus::Confirmed
        );
    }

    async fn create_rejections_leave_no_trace<S: TestStore>(store: S) {
        let h = Harness::new(store);
        h.store.seed_deposit(deposit("OUT", "BR1", "IMEI-OUT")).await;
        h.store.seed_unit(unit("BR1", "IMEI-OUT", 0, true)).await;
        h.store.seed_deposit(deposit("UNV", "BR1", "IMEI-UNV")).await;
        h.store.seed_unit(unit("BR1", "IMEI-UNV", 2, false)).await;
        h.store.seed_deposit(deposit("NOSTOCK", "BR1", "IMEI-NONE")).await;

        let mut closed = deposit("CLOSED", "BR1", "IMEI-C");
        closed.status = DepositStatus::Cancelled;
        h.store.seed_deposit(closed).await;
        h.store.seed_unit(unit("BR1", "IMEI-C", 1, true)).await;

        let mut no_imei = deposit("NOIMEI", "BR1", "");
        no_imei.product.imei = None;
        h.store.seed_deposit(no_imei).await;

        let actor = cashier();
        let kind = |r: ReservationResult<Reservation>| r.unwrap_err().kind();

        assert_eq!(
            kind(h.manager.create_from_deposit("MISSING", None, &actor).await),
            ErrorKind::NotFound
        );
        assert_eq!(
            kind(h.manager.create_from_deposit("OUT", None, &actor).await),
            ErrorKind::NotFound
        );
        assert_eq!(
            kind(h.manager.create_from_deposit("UNV", None, &actor).await),
            ErrorKind::NotFound
        );
        assert_eq!(
            kind(h.manager.create_from_deposit("NOSTOCK", None, &actor).await),
            ErrorKind::NotFound
        );
        assert_eq!(
            kind(h.manager.create_from_deposit("CLOSED", None, &actor).await),
            ErrorKind::Validation
        );
        assert_eq!(
            kind(h.manager.create_from_deposit("NOIMEI", None, &actor).await),
            ErrorKind::Validation
        );
        assert_eq!(
            kind(h.manager.create_from_deposit("OUT", Some(0), &actor).await),
            ErrorKind::Validation
        );
        assert_eq!(
            kind(h.manager.create_from_deposit("  ", None, &actor).await),
            ErrorKind::Validation
        );

        for id in ["OUT", "UNV", "NOSTOCK"] {
            assert_eq!(
                h.store.stored_deposit(id).await.status,
                DepositStatus::Confirmed
            );
            assert!(h.manager.find_by_deposit(id).await.unwrap().is_empty());
        }
    }

    // -------------------------------------------------------------------------
    // Use
    // -------------------------------------------------------------------------

    async fn use_decrements_stock_and_completes_deposit<S: TestStore>(store: S) {
        let h = Harness::new(store).with_deposit("D1", "IMEI123", 3).await;
        let r = h
            .manager
            .create_from_deposit("D1", None, &cashier())
            .await
            .unwrap();

        h.clock.advance(Duration::hours(5));
        let outcome = h
            .manager
            .use_reservation(&r.reservation_id, "TXN1", &cashier())
            .await
            .unwrap();

        assert_eq!(outcome.remaining_stock, 2);
        assert!(outcome.deposit_completed);
        assert_eq!(outcome.reservation.status, ReservationStatus::Used);

        let stored = h.store.stored_reservation(&r.reservation_id).await;
        assert_eq!(stored.status, ReservationStatus::Used);
        assert_eq!(stored.used_in_transaction.as_deref(), Some("TXN1"));
        assert_eq!(stored.used_by.as_deref(), Some("emp-7"));
        assert_eq!(stored.used_at, Some(t0() + Duration::hours(5)));
        assert!(stored.cancelled_at.is_none());

        assert_eq!(h.store.stored_unit("BR1", "IMEI123").await.stock_value, 2);

        let deposit = h.store.stored_deposit("D1").await;
        assert_eq!(deposit.status, DepositStatus::Completed);
        assert_eq!(deposit.completed_at, Some(t0() + Duration::hours(5)));
    }

    async fn use_after_expiry_expires_without_touching_stock<S: TestStore>(store: S) {
        let h = Harness::new(store).with_deposit("D1", "IMEI123", 3).await;
        let r = h
            .manager
            .create_from_deposit("D1", Some(72), &cashier())
            .await
            .unwrap();

        h.clock.advance(Duration::hours(72) + Duration::seconds(1));
        let err = h
            .manager
            .use_reservation(&r.reservation_id, "TXN1", &cashier())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Expired);
        assert_eq!(
            h.store.stored_reservation(&r.reservation_id).await.status,
            ReservationStatus::Expired
        );
        assert_eq!(h.store.stored_unit("BR1", "IMEI123").await.stock_value, 3);
        assert_eq!(
            h.store.stored_deposit("D1").await.status,
            DepositStatus::StockReserved
        );

        // Still expired on a second attempt, now from the stored status.
        let err = h
            .manager
            .use_reservation(&r.reservation_id, "TXN2", &cashier())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Expired);
    }

    async fn use_fails_when_unit_no_longer_available<S: TestStore>(store: S) {
        let h = Harness::new(store).with_deposit("D1", "IMEI123", 1).await;
        let r = h
            .manager
            .create_from_deposit("D1", None, &cashier())
            .await
            .unwrap();

        h.store.seed_unit(unit("BR1", "IMEI123", 1, false)).await;
        let err = h
            .manager
            .use_reservation(&r.reservation_id, "TXN1", &cashier())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            h.store.stored_reservation(&r.reservation_id).await.status,
            ReservationStatus::Active
        );
        assert_eq!(
            h.store.stored_deposit("D1").await.status,
            DepositStatus::StockReserved
        );
    }

    // -------------------------------------------------------------------------
    // Cancel and Extend
    // -------------------------------------------------------------------------

    async fn cancel_records_reason_only<S: TestStore>(store: S) {
        let h = Harness::new(store).with_deposit("D1", "IMEI123", 3).await;
        let r = h
            .manager
            .create_from_deposit("D1", None, &cashier())
            .await
            .unwrap();

        let err = h
            .manager
            .cancel(&r.reservation_id, &cashier(), "   ")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let cancelled = h
            .manager
            .cancel(&r.reservation_id, &cashier(), "customer changed mind")
            .await
            .unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);

        let stored = h.store.stored_reservation(&r.reservation_id).await;
        assert_eq!(stored.status, ReservationStatus::Cancelled);
        assert_eq!(
            stored.cancellation_reason.as_deref(),
            Some("customer changed mind")
        );
        assert_eq!(stored.cancelled_by_name.as_deref(), Some("Ploy"));
        assert!(stored.used_at.is_none());

        assert_eq!(h.store.stored_unit("BR1", "IMEI123").await.stock_value, 3);
        assert_eq!(
            h.store.stored_deposit("D1").await.status,
            DepositStatus::StockReserved
        );
    }

    async fn extend_moves_expiry_forward<S: TestStore>(store: S) {
        let h = Harness::new(store).with_deposit("D1", "IMEI123", 1).await;
        let r = h
            .manager
            .create_from_deposit("D1", None, &cashier())
            .await
            .unwrap();
        let original = r.expires_at;

        let extended = h.manager.extend(&r.reservation_id, Some(24)).await.unwrap();
        assert_eq!(extended.expires_at, original + Duration::hours(24));
        assert_eq!(extended.reserved_at, r.reserved_at);

        let again = h.manager.extend(&r.reservation_id, None).await.unwrap();
        assert_eq!(again.expires_at, original + Duration::hours(48));
        assert_eq!(
            h.store.stored_reservation(&r.reservation_id).await.expires_at,
            original + Duration::hours(48)
        );

        let err = h
            .manager
            .extend(&r.reservation_id, Some(0))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        h.clock.set(original + Duration::hours(49));
        let err = h
            .manager
            .extend(&r.reservation_id, Some(24))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Expired);
        assert_eq!(
            h.store.stored_reservation(&r.reservation_id).await.status,
            ReservationStatus::Expired
        );
    }

    async fn terminal_reservations_reject_transitions<S: TestStore>(store: S) {
        let h = Harness::new(store)
            .with_deposit("D1", "IMEI1", 3)
            .await
            .with_deposit("D2", "IMEI2", 3)
            .await;
        let actor = cashier();

        let used = h.manager.create_from_deposit("D1", None, &actor).await.unwrap();
        h.manager
            .use_reservation(&used.reservation_id, "TXN1", &actor)
            .await
            .unwrap();

        let err = h
            .manager
            .use_reservation(&used.reservation_id, "TXN2", &actor)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = h
            .manager
            .cancel(&used.reservation_id, &actor, "late")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = h.manager.extend(&used.reservation_id, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        // Stock decremented exactly once.
        assert_eq!(h.store.stored_unit("BR1", "IMEI1").await.stock_value, 2);
        let stored = h.store.stored_reservation(&used.reservation_id).await;
        assert_eq!(stored.used_in_transaction.as_deref(), Some("TXN1"));

        let cancelled = h.manager.create_from_deposit("D2", None, &actor).await.unwrap();
        h.manager
            .cancel(&cancelled.reservation_id, &actor, "no show")
            .await
            .unwrap();
        let err = h
            .manager
            .use_reservation(&cancelled.reservation_id, "TXN3", &actor)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(h.store.stored_unit("BR1", "IMEI2").await.stock_value, 3);

        let err = h
            .manager
            .use_reservation("RSV-20260301-FFFFFFFF", "TXN4", &actor)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    // -------------------------------------------------------------------------
    // Expiry
    // -------------------------------------------------------------------------

    async fn sweep_expires_only_lapsed<S: TestStore>(store: S) {
        let h = Harness::new(store)
            .with_deposit("D1", "IMEI1", 1)
            .await
            .with_deposit("D2", "IMEI2", 1)
            .await
            .with_deposit("D3", "IMEI3", 1)
            .await;
        let actor = cashier();

        let short = h.manager.create_from_deposit("D1", Some(1), &actor).await.unwrap();
        let long = h.manager.create_from_deposit("D2", Some(72), &actor).await.unwrap();
        let used = h.manager.create_from_deposit("D3", Some(1), &actor).await.unwrap();
        h.manager
            .use_reservation(&used.reservation_id, "TXN1", &actor)
            .await
            .unwrap();

        assert_eq!(h.manager.sweep_expired().await.unwrap(), 0);

        h.clock.advance(Duration::hours(2));
        assert_eq!(h.manager.sweep_expired().await.unwrap(), 1);
        assert_eq!(h.manager.sweep_expired().await.unwrap(), 0);

        assert_eq!(
            h.store.stored_reservation(&short.reservation_id).await.status,
            ReservationStatus::Expired
        );
        assert_eq!(
            h.store.stored_reservation(&long.reservation_id).await.status,
            ReservationStatus::Active
        );
        assert_eq!(
            h.store.stored_reservation(&used.reservation_id).await.status,
            ReservationStatus::Used
        );
        assert_eq!(h.store.stored_unit("BR1", "IMEI1").await.stock_value, 1);
    }

    async fn lapsed_hold_does_not_block_new_reservation<S: TestStore>(store: S) {
        let h = Harness::new(store).with_deposit("D1", "IMEI123", 1).await;
        h.store.seed_deposit(deposit("D2", "BR1", "IMEI123")).await;
        let actor = cashier();

        let old = h.manager.create_from_deposit("D1", Some(1), &actor).await.unwrap();
        h.clock.advance(Duration::hours(2));

        // Read paths see it as expired before any sweep.
        assert_eq!(
            h.manager.get(&old.reservation_id).await.unwrap().status,
            ReservationStatus::Expired
        );
        assert!(!h.manager.check_serial("IMEI123", "BR1").await.unwrap().reserved);

        let fresh = h.manager.create_from_deposit("D2", None, &actor).await.unwrap();
        assert_eq!(fresh.status, ReservationStatus::Active);
        assert_eq!(
            h.store.stored_reservation(&old.reservation_id).await.status,
            ReservationStatus::Expired
        );

        let again = h.manager.create_from_deposit("D1", None, &actor).await.unwrap_err();
        assert_eq!(again.kind(), ErrorKind::Conflict);
    }

    async fn concurrent_creates_for_one_unit_admit_one<S: TestStore>(store: S) {
        let h = Harness::new(store).with_deposit("D1", "IMEI123", 1).await;
        h.store.seed_deposit(deposit("D2", "BR1", "IMEI123")).await;
        let actor = cashier();

        let (a, b) = tokio::join!(
            h.manager.create_from_deposit("D1", None, &actor),
            h.manager.create_from_deposit("D2", None, &actor),
        );

        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let err = results.iter().find_map(|r| r.as_ref().err()).unwrap();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let page = h
            .manager
            .list(&ReservationFilter {
                status: Some(ReservationStatus::Active),
                ..ReservationFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total_docs, 1);
    }

    // -------------------------------------------------------------------------
    // Pooled file database
    // -------------------------------------------------------------------------
    //
    // The in-memory backends run one transaction at a time. These run on a
    // real file with several connections so transactions actually overlap.

    async fn pooled_store(dir: &tempfile::TempDir) -> Database {
        let config = DbConfig::new(dir.path().join("stockhold.db")).max_connections(5);
        Database::new(config).await.unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_creates_on_pooled_database_report_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let store = pooled_store(&dir).await;
        let manager = Arc::new(ReservationManager::new(
            store.clone(),
            Arc::new(ManualClock::new(t0())),
            ReservationPolicy::default(),
        ));

        for i in 0..20 {
            let imei = format!("IMEI{:03}", i);
            store.seed_unit(unit("BR1", &imei, 1, true)).await;
            store.seed_deposit(deposit(&format!("A{}", i), "BR1", &imei)).await;
            store.seed_deposit(deposit(&format!("B{}", i), "BR1", &imei)).await;
        }

        let mut tasks = Vec::new();
        for i in 0..20 {
            for prefix in ["A", "B"] {
                let manager = manager.clone();
                let deposit_id = format!("{}{}", prefix, i);
                tasks.push(tokio::spawn(async move {
                    manager
                        .create_from_deposit(&deposit_id, None, &cashier())
                        .await
                }));
            }
        }

        let mut results = Vec::new();
        for task in tasks {
            results.push(task.await.unwrap());
        }

        for (i, pair) in results.chunks(2).enumerate() {
            let winners = pair.iter().filter(|r| r.is_ok()).count();
            assert_eq!(winners, 1, "unit {} admitted {} holds", i, winners);

            let err = pair.iter().find_map(|r| r.as_ref().err()).unwrap();
            assert_eq!(err.kind(), ErrorKind::Conflict, "unit {}: {}", i, err);
            let winner = pair.iter().find_map(|r| r.as_ref().ok()).unwrap();
            assert_eq!(
                err.existing().map(|r| r.reservation_id.as_str()),
                Some(winner.reservation_id.as_str())
            );
        }

        store.close().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_uses_on_pooled_database_consume_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = pooled_store(&dir).await;
        store.seed_deposit(deposit("D1", "BR1", "IMEI123")).await;
        store.seed_unit(unit("BR1", "IMEI123", 2, true)).await;
        let manager = Arc::new(ReservationManager::new(
            store.clone(),
            Arc::new(ManualClock::new(t0())),
            ReservationPolicy::default(),
        ));
        let r = manager
            .create_from_deposit("D1", None, &cashier())
            .await
            .unwrap();

        let tasks: Vec<_> = (0..4)
            .map(|i| {
                let manager = manager.clone();
                let reservation_id = r.reservation_id.clone();
                tokio::spawn(async move {
                    manager
                        .use_reservation(&reservation_id, &format!("TXN-{}", i), &cashier())
                        .await
                })
            })
            .collect();

        let mut results = Vec::new();
        for task in tasks {
            results.push(task.await.unwrap());
        }

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert_eq!(err.kind(), ErrorKind::NotFound, "{}", err);
        }
        assert_eq!(store.stored_unit("BR1", "IMEI123").await.stock_value, 1);

        store.close().await;
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    async fn check_serial_reports_live_holds<S: TestStore>(store: S) {
        let h = Harness::new(store).with_deposit("D1", "IMEI123", 1).await;

        let free = h.manager.check_serial("IMEI123", "BR1").await.unwrap();
        assert!(!free.reserved);
        assert!(free.reservation.is_none());

        let r = h
            .manager
            .create_from_deposit("D1", Some(10), &cashier())
            .await
            .unwrap();
        h.clock.advance(Duration::hours(4));

        let held = h.manager.check_serial("IMEI123", "BR1").await.unwrap();
        assert!(held.reserved);
        assert_eq!(held.time_remaining_secs, 6 * 3600);
        assert_eq!(
            held.reservation.map(|r| r.reservation_id),
            Some(r.reservation_id)
        );

        let other_branch = h.manager.check_serial("IMEI123", "BR2").await.unwrap();
        assert!(!other_branch.reserved);
    }

    async fn list_filters_and_paginates<S: TestStore>(store: S) {
        let mut h = Harness::new(store);
        for i in 1..=5 {
            h = h
                .with_deposit(&format!("D{}", i), &format!("IMEI{}", i), 1)
                .await;
        }
        let actor = cashier();

        let mut ids = Vec::new();
        for i in 1..=5 {
            let hours = if i == 1 { 1 } else { 72 };
            let r = h
                .manager
                .create_from_deposit(&format!("D{}", i), Some(hours), &actor)
                .await
                .unwrap();
            ids.push(r.reservation_id);
            h.clock.advance(Duration::minutes(10));
        }
        h.manager.cancel(&ids[1], &actor, "no show").await.unwrap();
        h.clock.advance(Duration::hours(1));

        // D1 has lapsed (not swept): hidden by default.
        let page = h.manager.list(&ReservationFilter::default()).await.unwrap();
        assert_eq!(page.total_docs, 4);
        assert_eq!(page.items[0].reservation_id, ids[4]);

        let with_expired = h
            .manager
            .list(&ReservationFilter {
                include_expired: true,
                ..ReservationFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(with_expired.total_docs, 5);

        let expired = h
            .manager
            .list(&ReservationFilter {
                status: Some(ReservationStatus::Expired),
                ..ReservationFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(expired.total_docs, 1);
        assert_eq!(expired.items[0].reservation_id, ids[0]);
        assert_eq!(expired.items[0].status, ReservationStatus::Expired);

        let active = h
            .manager
            .list(&ReservationFilter {
                status: Some(ReservationStatus::Active),
                limit: 2,
                page: 2,
                ..ReservationFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(active.total_docs, 3);
        assert_eq!(active.total_pages, 2);
        assert_eq!(active.items.len(), 1);
        assert_eq!(active.items[0].reservation_id, ids[2]);
        assert!(active.has_prev_page);
        assert!(!active.has_next_page);

        let search = h
            .manager
            .list(&ReservationFilter {
                search: Some(" imei4 ".to_string()),
                ..ReservationFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(search.total_docs, 1);
        assert_eq!(search.items[0].reservation_id, ids[3]);

        let wildcard = h
            .manager
            .list(&ReservationFilter {
                search: Some("%".to_string()),
                ..ReservationFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(wildcard.total_docs, 0);

        let err = h
            .manager
            .list(&ReservationFilter {
                limit: 101,
                ..ReservationFilter::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    async fn search_folds_ascii_case_only<S: TestStore>(store: S) {
        let h = Harness::new(store);
        let mut d = deposit("D1", "BR1", "IMEI123");
        d.customer.name = "Élodie Martin".to_string();
        h.store.seed_deposit(d).await;
        h.store.seed_unit(unit("BR1", "IMEI123", 1, true)).await;
        h.manager
            .create_from_deposit("D1", None, &cashier())
            .await
            .unwrap();

        let hits = |term: &str| {
            let filter = ReservationFilter {
                search: Some(term.to_string()),
                ..ReservationFilter::default()
            };
            let manager = &h.manager;
            async move { manager.list(&filter).await.unwrap().total_docs }
        };
        assert_eq!(hits("Élodie").await, 1);
        assert_eq!(hits("MARTIN").await, 1);
        assert_eq!(hits("élodie").await, 0);
    }

    async fn report_summarizes_by_effective_status<S: TestStore>(store: S) {
        let h = Harness::new(store)
            .with_deposit("D1", "IMEI1", 2)
            .await
            .with_deposit("D2", "IMEI2", 2)
            .await
            .with_deposit("D3", "IMEI3", 2)
            .await;
        let actor = cashier();

        let used = h.manager.create_from_deposit("D1", None, &actor).await.unwrap();
        h.manager
            .use_reservation(&used.reservation_id, "TXN1", &actor)
            .await
            .unwrap();
        h.manager.create_from_deposit("D2", Some(1), &actor).await.unwrap();
        h.clock.advance(Duration::days(1));
        h.manager.create_from_deposit("D3", None, &actor).await.unwrap();

        let report = h.manager.report(&ReportFilter::default()).await.unwrap();
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.used, 1);
        assert_eq!(report.summary.expired, 1);
        assert_eq!(report.summary.active, 1);
        assert_eq!(report.summary.cancelled, 0);
        assert_eq!(report.summary.total_value, Money::from_baht(15_000));
        assert_eq!(report.summary.total_deposit, Money::from_baht(3_000));

        let first_day = h
            .manager
            .report(&ReportFilter {
                branch_code: Some("BR1".to_string()),
                from: Some(t0()),
                to: Some(t0() + Duration::hours(1)),
            })
            .await
            .unwrap();
        assert_eq!(first_day.summary.total, 2);

        let other_branch = h
            .manager
            .report(&ReportFilter {
                branch_code: Some("BR9".to_string()),
                ..ReportFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(other_branch.summary, ReservationSummary::default());

        let err = h
            .manager
            .report(&ReportFilter {
                branch_code: None,
                from: Some(t0() + Duration::days(2)),
                to: Some(t0()),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
