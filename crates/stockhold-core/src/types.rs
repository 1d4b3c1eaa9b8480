//! # Domain Types
//!
//! Types for the reservation aggregate and the boundary contracts of the
//! two collaborators it coordinates.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐    │
//! │  │ DepositReceipt   │   │   Reservation    │   │  InventoryUnit   │    │
//! │  │ (Deposit Ledger) │──►│  (this core)     │◄──│ (Inventory Store)│    │
//! │  │ ───────────────  │   │ ───────────────  │   │ ───────────────  │    │
//! │  │ product.imei     │   │ reservation_id   │   │ branch_code      │    │
//! │  │ branch_code      │   │ product_imei     │   │ imei             │    │
//! │  │ amounts          │   │ status           │   │ stock_value      │    │
//! │  │ status           │   │ expires_at       │   │ verified         │    │
//! │  └──────────────────┘   └──────────────────┘   └──────────────────┘    │
//! │                                                                         │
//! │  ReservationStatus: active ──► used | cancelled | expired              │
//! │  DepositStatus:     pending/confirmed ──► stock_reserved ──► completed │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A reservation copies the deposit's product, customer and amounts at
//! creation time. Later edits to the deposit never change the reservation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::{DEFAULT_PAGE_LIMIT, SYSTEM_ACTOR_NAME};

// =============================================================================
// Reservation Status
// =============================================================================

/// Lifecycle state of a reservation.
///
/// ```text
///              ┌──── use ─────► Used
///   Active ────┼──── cancel ──► Cancelled
///              └──── lapse ───► Expired
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Holding the unit, window still open (or lapsed but not yet swept).
    #[default]
    Active,
    /// Consumed by a sale; stock was decremented.
    Used,
    /// Window lapsed without a sale.
    Expired,
    /// Released by staff with a reason.
    Cancelled,
}

impl ReservationStatus {
    /// Storage and wire representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Active => "active",
            ReservationStatus::Used => "used",
            ReservationStatus::Expired => "expired",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal states never transition again.
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, ReservationStatus::Active)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(ReservationStatus::Active),
            "used" => Ok(ReservationStatus::Used),
            "expired" => Ok(ReservationStatus::Expired),
            "cancelled" | "canceled" => Ok(ReservationStatus::Cancelled),
            _ => Err(ValidationError::Invalid {
                field: "status".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// Deposit Ledger Boundary
// =============================================================================

/// Status of a deposit receipt as seen by the reservation core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    #[default]
    Pending,
    Confirmed,
    StockAvailable,
    /// Written by reservation creation.
    StockReserved,
    /// Written by reservation use.
    Completed,
    Cancelled,
    Expired,
}

impl DepositStatus {
    /// Storage and wire representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DepositStatus::Pending => "pending",
            DepositStatus::Confirmed => "confirmed",
            DepositStatus::StockAvailable => "stock_available",
            DepositStatus::StockReserved => "stock_reserved",
            DepositStatus::Completed => "completed",
            DepositStatus::Cancelled => "cancelled",
            DepositStatus::Expired => "expired",
        }
    }

    /// Deposits that are closed can no longer hold stock.
    pub const fn is_closed(&self) -> bool {
        matches!(
            self,
            DepositStatus::Completed | DepositStatus::Cancelled | DepositStatus::Expired
        )
    }
}

impl fmt::Display for DepositStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the deposit was taken. Copied onto the reservation as its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DepositType {
    /// Customer pays ahead for a unit that is not on the shelf yet.
    Preorder,
    /// Deposit paid online for a unit in a branch.
    #[default]
    Online,
}

/// Product section of a deposit receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DepositProduct {
    pub id: String,
    pub name: String,
    /// Serial of the physical unit; required to reserve.
    pub imei: Option<String>,
}

/// Customer section of a deposit receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DepositCustomer {
    pub name: String,
    pub phone: Option<String>,
}

/// Amounts section of a deposit receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DepositAmounts {
    pub deposit_amount: Money,
    pub total_amount: Money,
    pub remaining_amount: Money,
}

/// Salesperson who took the deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Salesperson {
    pub id: Option<String>,
    pub name: String,
}

/// Stock-check tracking written back by reservation creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockTracking {
    pub stock_checked: bool,
    #[ts(as = "Option<String>")]
    pub stock_checked_at: Option<DateTime<Utc>>,
    pub stock_checked_by: Option<String>,
}

/// A deposit receipt, reduced to the fields the reservation core reads and
/// writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DepositReceipt {
    pub id: String,
    /// Business number printed on the receipt (e.g. `DR-690101001`).
    pub receipt_number: String,
    pub deposit_type: DepositType,
    pub status: DepositStatus,
    pub branch_code: String,
    pub product: DepositProduct,
    pub customer: DepositCustomer,
    pub amounts: DepositAmounts,
    pub salesperson: Salesperson,
    pub tracking: StockTracking,
    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl DepositReceipt {
    /// Returns the product serial if one is recorded.
    pub fn product_imei(&self) -> Option<&str> {
        self.product
            .imei
            .as_deref()
            .map(str::trim)
            .filter(|imei| !imei.is_empty())
    }
}

// =============================================================================
// Inventory Store Boundary
// =============================================================================

/// A serialized stock record in a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryUnit {
    pub id: String,
    pub branch_code: String,
    pub imei: String,
    pub name: String,
    pub stock_value: i64,
    pub verified: bool,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl InventoryUnit {
    /// The availability predicate: in stock and verified.
    pub fn is_available(&self) -> bool {
        self.stock_value > 0 && self.verified
    }
}

// =============================================================================
// Actor
// =============================================================================

/// The user performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Actor {
    pub id: Option<String>,
    pub name: String,
}

impl Actor {
    /// An authenticated user.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Actor {
            id: Some(id.into()),
            name: name.into(),
        }
    }

    /// Background jobs and unauthenticated calls.
    pub fn system() -> Self {
        Actor {
            id: None,
            name: SYSTEM_ACTOR_NAME.to_string(),
        }
    }
}

impl Default for Actor {
    fn default() -> Self {
        Actor::system()
    }
}

// =============================================================================
// Reservation
// =============================================================================

/// A time-bounded hold on one serialized unit, linked to one deposit.
///
/// Created only by the creation workflow; mutated only by `mark_used`,
/// `cancel`, `extend` and `expire` (see [`crate::lifecycle`]). Never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Reservation {
    /// Date-coded business id, immutable.
    pub reservation_id: String,

    pub deposit_receipt_id: String,
    pub deposit_receipt_number: String,

    pub product_id: String,
    pub product_name: String,
    /// Exclusivity key together with `branch_code`.
    pub product_imei: String,
    pub branch_code: String,

    pub customer_name: String,
    pub customer_phone: Option<String>,

    pub reservation_type: DepositType,

    #[ts(as = "String")]
    pub reserved_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub expires_at: DateTime<Utc>,

    /// Monetary snapshot taken at creation.
    pub deposit_amount: Money,
    pub total_amount: Money,
    pub remaining_amount: Money,

    pub status: ReservationStatus,

    #[ts(as = "Option<String>")]
    pub used_at: Option<DateTime<Utc>>,
    pub used_by: Option<String>,
    pub used_by_name: Option<String>,
    pub used_in_transaction: Option<String>,

    #[ts(as = "Option<String>")]
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
    pub cancelled_by_name: Option<String>,
    pub cancellation_reason: Option<String>,

    pub created_by: Option<String>,
    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Query Types
// =============================================================================

/// Filter for the paginated reservation listing.
///
/// Without an explicit `status`, expired reservations (stored or lapsed) are
/// hidden unless `include_expired` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReservationFilter {
    #[serde(default)]
    pub branch_code: Option<String>,
    #[serde(default)]
    pub status: Option<ReservationStatus>,
    /// Substring match on customer, product, IMEI, reservation id and
    /// receipt number. Only ASCII letters fold case, matching SQLite `LOWER()`.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub include_expired: bool,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

impl Default for ReservationFilter {
    fn default() -> Self {
        ReservationFilter {
            branch_code: None,
            status: None,
            search: None,
            include_expired: false,
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl ReservationFilter {
    /// Number of rows to skip for the requested page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Whether a reservation belongs in the listing at `now`.
    ///
    /// Status matching uses the effective status, so a lapsed active record
    /// is listed under `expired`, never under `active`.
    pub fn matches(&self, reservation: &Reservation, now: DateTime<Utc>) -> bool {
        if let Some(branch) = &self.branch_code {
            if &reservation.branch_code != branch {
                return false;
            }
        }

        let effective = reservation.effective_status(now);
        match self.status {
            Some(status) if effective != status => return false,
            None if !self.include_expired && effective == ReservationStatus::Expired => {
                return false
            }
            _ => {}
        }

        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_ascii_lowercase();
                [
                    reservation.customer_name.as_str(),
                    reservation.product_name.as_str(),
                    reservation.product_imei.as_str(),
                    reservation.reservation_id.as_str(),
                    reservation.deposit_receipt_number.as_str(),
                ]
                .iter()
                .any(|field| field.to_ascii_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}

/// One page of results plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub total_pages: u64,
    pub total_docs: u64,
    pub limit: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl<T> Page<T> {
    /// Builds the page metadata from the total count.
    pub fn new(items: Vec<T>, current_page: u32, limit: u32, total_docs: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total_docs.div_ceil(u64::from(limit))
        };

        Page {
            items,
            current_page,
            total_pages,
            total_docs,
            limit,
            has_next_page: u64::from(current_page) < total_pages,
            has_prev_page: current_page > 1,
        }
    }
}

/// Filter for the reservation report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportFilter {
    #[serde(default)]
    pub branch_code: Option<String>,
    /// Inclusive lower bound on `created_at`.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub to: Option<DateTime<Utc>>,
}

/// Aggregate counts and values over a set of reservations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReservationSummary {
    pub total: u64,
    pub active: u64,
    pub used: u64,
    pub expired: u64,
    pub cancelled: u64,
    /// Sum of `total_amount`.
    pub total_value: Money,
    /// Sum of `deposit_amount`.
    pub total_deposit: Money,
}

impl ReportFilter {
    /// Whether a reservation falls inside the report's branch and date range.
    pub fn matches(&self, reservation: &Reservation) -> bool {
        self.branch_code
            .as_ref()
            .map_or(true, |branch| &reservation.branch_code == branch)
            && self.from.map_or(true, |from| reservation.created_at >= from)
            && self.to.map_or(true, |to| reservation.created_at <= to)
    }
}

impl ReservationSummary {
    /// Counts by effective status and sums the monetary snapshot.
    pub fn from_reservations<'a>(
        reservations: impl IntoIterator<Item = &'a Reservation>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut summary = ReservationSummary::default();
        for reservation in reservations {
            summary.total += 1;
            match reservation.effective_status(now) {
                ReservationStatus::Active => summary.active += 1,
                ReservationStatus::Used => summary.used += 1,
                ReservationStatus::Expired => summary.expired += 1,
                ReservationStatus::Cancelled => summary.cancelled += 1,
            }
            summary.total_value += reservation.total_amount;
            summary.total_deposit += reservation.deposit_amount;
        }
        summary
    }
}

/// Report payload: matching reservations plus their summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReservationReport {
    pub reservations: Vec<Reservation>,
    pub summary: ReservationSummary,
}

/// Answer to "is this unit reserved right now?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReservationCheck {
    pub reserved: bool,
    pub reservation: Option<Reservation>,
    /// Seconds until the hold lapses; 0 when not reserved.
    pub time_remaining_secs: i64,
}

/// Result of consuming a reservation at sale time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UseOutcome {
    pub reservation: Reservation,
    /// Stock left on the unit after the decrement.
    pub remaining_stock: i64,
    /// False when the deposit record could not be found to complete.
    pub deposit_completed: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!("active".parse::<ReservationStatus>().unwrap(), ReservationStatus::Active);
        assert_eq!("USED".parse::<ReservationStatus>().unwrap(), ReservationStatus::Used);
        assert_eq!(
            "canceled".parse::<ReservationStatus>().unwrap(),
            ReservationStatus::Cancelled
        );
        assert!("pending".parse::<ReservationStatus>().is_err());
    }

    #[test]
    fn test_status_terminal() {
        assert!(!ReservationStatus::Active.is_terminal());
        assert!(ReservationStatus::Used.is_terminal());
        assert!(ReservationStatus::Expired.is_terminal());
        assert!(ReservationStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&DepositStatus::StockReserved).unwrap();
        assert_eq!(json, "\"stock_reserved\"");
        assert_eq!(DepositStatus::StockReserved.to_string(), "stock_reserved");
    }

    #[test]
    fn test_deposit_closed() {
        assert!(!DepositStatus::Pending.is_closed());
        assert!(!DepositStatus::StockReserved.is_closed());
        assert!(DepositStatus::Completed.is_closed());
        assert!(DepositStatus::Cancelled.is_closed());
    }

    #[test]
    fn test_inventory_availability() {
        let mut unit = InventoryUnit {
            id: "unit-1".to_string(),
            branch_code: "BR1".to_string(),
            imei: "IMEI123".to_string(),
            name: "Phone".to_string(),
            stock_value: 1,
            verified: true,
            updated_at: Utc::now(),
        };
        assert!(unit.is_available());

        unit.verified = false;
        assert!(!unit.is_available());

        unit.verified = true;
        unit.stock_value = 0;
        assert!(!unit.is_available());
    }

    #[test]
    fn test_page_metadata() {
        let page = Page::new(vec![1, 2, 3], 1, 3, 7);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next_page);
        assert!(!page.has_prev_page);

        let last = Page::new(vec![7], 3, 3, 7);
        assert!(!last.has_next_page);
        assert!(last.has_prev_page);

        let empty: Page<u8> = Page::new(vec![], 1, 20, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next_page);
    }

    #[test]
    fn test_filter_defaults_and_offset() {
        let filter: ReservationFilter = serde_json::from_str("{}").unwrap();
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, 20);
        assert_eq!(filter.offset(), 0);

        let filter = ReservationFilter {
            page: 3,
            limit: 20,
            ..ReservationFilter::default()
        };
        assert_eq!(filter.offset(), 40);
    }

    fn sample(id: &str, status: ReservationStatus, expires_at: DateTime<Utc>) -> Reservation {
        let created = expires_at - chrono::Duration::hours(72);
        Reservation {
            reservation_id: id.to_string(),
            deposit_receipt_id: format!("dep-{}", id),
            deposit_receipt_number: format!("DR-{}", id),
            product_id: "prod-1".to_string(),
            product_name: "iPhone 16 Pro".to_string(),
            product_imei: format!("IMEI-{}", id),
            branch_code: "BR1".to_string(),
            customer_name: "Somchai Jaidee".to_string(),
            customer_phone: None,
            reservation_type: DepositType::Online,
            reserved_at: created,
            expires_at,
            deposit_amount: Money::from_baht(1_000),
            total_amount: Money::from_baht(5_000),
            remaining_amount: Money::from_baht(4_000),
            status,
            used_at: None,
            used_by: None,
            used_by_name: None,
            used_in_transaction: None,
            cancelled_at: None,
            cancelled_by: None,
            cancelled_by_name: None,
            cancellation_reason: None,
            created_by: None,
            notes: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_filter_uses_effective_status() {
        let now = Utc::now();
        let open = sample("a", ReservationStatus::Active, now + chrono::Duration::hours(1));
        let lapsed = sample("b", ReservationStatus::Active, now - chrono::Duration::hours(1));

        let default = ReservationFilter::default();
        assert!(default.matches(&open, now));
        assert!(!default.matches(&lapsed, now));

        let with_expired = ReservationFilter {
            include_expired: true,
            ..ReservationFilter::default()
        };
        assert!(with_expired.matches(&lapsed, now));

        let active_only = ReservationFilter {
            status: Some(ReservationStatus::Active),
            ..ReservationFilter::default()
        };
        assert!(active_only.matches(&open, now));
        assert!(!active_only.matches(&lapsed, now));

        let expired_only = ReservationFilter {
            status: Some(ReservationStatus::Expired),
            ..ReservationFilter::default()
        };
        assert!(expired_only.matches(&lapsed, now));
        assert!(!expired_only.matches(&open, now));
    }

    #[test]
    fn test_filter_search_and_branch() {
        let now = Utc::now();
        let r = sample("a", ReservationStatus::Active, now + chrono::Duration::hours(1));

        let search = |term: &str| ReservationFilter {
            search: Some(term.to_string()),
            ..ReservationFilter::default()
        };
        assert!(search("somchai").matches(&r, now));
        assert!(search("IPHONE").matches(&r, now));
        assert!(search("imei-a").matches(&r, now));
        assert!(search("DR-a").matches(&r, now));
        assert!(!search("galaxy").matches(&r, now));

        let mut accented = r.clone();
        accented.customer_name = "Élodie Martin".to_string();
        assert!(search("Élodie").matches(&accented, now));
        assert!(search("MARTIN").matches(&accented, now));
        assert!(!search("élodie").matches(&accented, now));

        let other_branch = ReservationFilter {
            branch_code: Some("BR2".to_string()),
            ..ReservationFilter::default()
        };
        assert!(!other_branch.matches(&r, now));
    }

    #[test]
    fn test_summary_counts_and_sums() {
        let now = Utc::now();
        let rows = vec![
            sample("a", ReservationStatus::Active, now + chrono::Duration::hours(1)),
            sample("b", ReservationStatus::Active, now - chrono::Duration::hours(1)),
            sample("c", ReservationStatus::Used, now - chrono::Duration::hours(1)),
            sample("d", ReservationStatus::Cancelled, now + chrono::Duration::hours(1)),
        ];

        let summary = ReservationSummary::from_reservations(&rows, now);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.active, 1);
        assert_eq!(summary.expired, 1);
        assert_eq!(summary.used, 1);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.total_value, Money::from_baht(20_000));
        assert_eq!(summary.total_deposit, Money::from_baht(4_000));
    }

    #[test]
    fn test_report_filter_range() {
        let now = Utc::now();
        let r = sample("a", ReservationStatus::Used, now);
        let inside = ReportFilter {
            branch_code: Some("BR1".to_string()),
            from: Some(r.created_at - chrono::Duration::days(1)),
            to: Some(r.created_at),
        };
        assert!(inside.matches(&r));

        let after = ReportFilter {
            from: Some(r.created_at + chrono::Duration::seconds(1)),
            ..ReportFilter::default()
        };
        assert!(!after.matches(&r));
    }

    #[test]
    fn test_actor_system_default() {
        let actor = Actor::default();
        assert!(actor.id.is_none());
        assert_eq!(actor.name, "system");
    }
}
