//! # Reservation Repository
//!
//! SQL for the `stock_reservations` table.
//!
//! ## Exclusivity at the Storage Level
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two partial unique indexes (WHERE status = 'active'):                  │
//! │                                                                         │
//! │    ux_stock_reservations_active_unit     (branch_code, product_imei)    │
//! │    ux_stock_reservations_active_deposit  (deposit_receipt_id)           │
//! │                                                                         │
//! │  Request A ──INSERT active (BR1, IMEI123)──► ✓                          │
//! │  Request B ──INSERT active (BR1, IMEI123)──► UNIQUE constraint failed   │
//! │                                              └─► Conflict               │
//! │                                                                         │
//! │  State updates are compare-and-set:                                     │
//! │    UPDATE ... WHERE reservation_id = ? AND status = 'active'            │
//! │    rows_affected = 0 → someone else got there first                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Effective Status in SQL
//! Listing filters mirror [`ReservationFilter::matches`]: a row stored as
//! `active` with `expires_at < now` is listed as expired.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockhold_core::{ReportFilter, Reservation, ReservationFilter, ReservationStatus};

const RESERVATION_COLUMNS: &str = r#"
    reservation_id, deposit_receipt_id, deposit_receipt_number,
    product_id, product_name, product_imei, branch_code,
    customer_name, customer_phone, reservation_type,
    reserved_at, expires_at,
    deposit_amount, total_amount, remaining_amount,
    status,
    used_at, used_by, used_by_name, used_in_transaction,
    cancelled_at, cancelled_by, cancelled_by_name, cancellation_reason,
    created_by, notes, created_at, updated_at
"#;

/// Columns matched by the free-text search.
const SEARCH_COLUMNS: &[&str] = &[
    "customer_name",
    "product_name",
    "product_imei",
    "reservation_id",
    "deposit_receipt_number",
];

fn select_where(clause: &str) -> String {
    format!(
        "SELECT {} FROM stock_reservations WHERE {}",
        RESERVATION_COLUMNS, clause
    )
}

// =============================================================================
// Single-Record Reads
// =============================================================================

/// Loads a reservation by its business id.
pub(crate) async fn fetch_by_id(
    conn: &mut SqliteConnection,
    reservation_id: &str,
) -> DbResult<Option<Reservation>> {
    let sql = select_where("reservation_id = ?1");
    let reservation: Option<Reservation> = sqlx::query_as(&sql)
        .bind(reservation_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(reservation)
}

/// Loads the stored-active reservation for a deposit, lapsed or not.
pub(crate) async fn fetch_active_for_deposit(
    conn: &mut SqliteConnection,
    deposit_id: &str,
) -> DbResult<Option<Reservation>> {
    let sql = select_where("deposit_receipt_id = ?1 AND status = 'active'");
    let reservation: Option<Reservation> = sqlx::query_as(&sql)
        .bind(deposit_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(reservation)
}

/// Loads the stored-active reservation holding a unit, lapsed or not.
pub(crate) async fn fetch_active_for_unit(
    conn: &mut SqliteConnection,
    branch_code: &str,
    imei: &str,
) -> DbResult<Option<Reservation>> {
    let sql = select_where("branch_code = ?1 AND product_imei = ?2 AND status = 'active'");
    let reservation: Option<Reservation> = sqlx::query_as(&sql)
        .bind(branch_code)
        .bind(imei)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(reservation)
}

// =============================================================================
// Writes
// =============================================================================

/// Inserts a new reservation.
///
/// A second active reservation for the same unit or deposit fails with
/// `DbError::UniqueViolation`.
pub(crate) async fn insert(conn: &mut SqliteConnection, r: &Reservation) -> DbResult<()> {
    debug!(
        reservation_id = %r.reservation_id,
        deposit_id = %r.deposit_receipt_id,
        branch_code = %r.branch_code,
        imei = %r.product_imei,
        "Inserting reservation"
    );

    sqlx::query(
        r#"
        INSERT INTO stock_reservations (
            reservation_id, deposit_receipt_id, deposit_receipt_number,
            product_id, product_name, product_imei, branch_code,
            customer_name, customer_phone, reservation_type,
            reserved_at, expires_at,
            deposit_amount, total_amount, remaining_amount,
            status,
            used_at, used_by, used_by_name, used_in_transaction,
            cancelled_at, cancelled_by, cancelled_by_name, cancellation_reason,
            created_by, notes, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3,
            ?4, ?5, ?6, ?7,
            ?8, ?9, ?10,
            ?11, ?12,
            ?13, ?14, ?15,
            ?16,
            ?17, ?18, ?19, ?20,
            ?21, ?22, ?23, ?24,
            ?25, ?26, ?27, ?28
        )
        "#,
    )
    .bind(&r.reservation_id)
    .bind(&r.deposit_receipt_id)
    .bind(&r.deposit_receipt_number)
    .bind(&r.product_id)
    .bind(&r.product_name)
    .bind(&r.product_imei)
    .bind(&r.branch_code)
    .bind(&r.customer_name)
    .bind(&r.customer_phone)
    .bind(r.reservation_type)
    .bind(r.reserved_at)
    .bind(r.expires_at)
    .bind(r.deposit_amount)
    .bind(r.total_amount)
    .bind(r.remaining_amount)
    .bind(r.status)
    .bind(r.used_at)
    .bind(&r.used_by)
    .bind(&r.used_by_name)
    .bind(&r.used_in_transaction)
    .bind(r.cancelled_at)
    .bind(&r.cancelled_by)
    .bind(&r.cancelled_by_name)
    .bind(&r.cancellation_reason)
    .bind(&r.created_by)
    .bind(&r.notes)
    .bind(r.created_at)
    .bind(r.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Writes the mutable fields of `r` if the stored status is still
/// `expected`. Returns false when the row was changed underneath us.
pub(crate) async fn update_if_status(
    conn: &mut SqliteConnection,
    r: &Reservation,
    expected: ReservationStatus,
) -> DbResult<bool> {
    debug!(
        reservation_id = %r.reservation_id,
        from = %expected,
        to = %r.status,
        "Updating reservation"
    );

    let result = sqlx::query(
        r#"
        UPDATE stock_reservations
        SET status = ?1,
            expires_at = ?2,
            used_at = ?3,
            used_by = ?4,
            used_by_name = ?5,
            used_in_transaction = ?6,
            cancelled_at = ?7,
            cancelled_by = ?8,
            cancelled_by_name = ?9,
            cancellation_reason = ?10,
            notes = ?11,
            updated_at = ?12
        WHERE reservation_id = ?13 AND status = ?14
        "#,
    )
    .bind(r.status)
    .bind(r.expires_at)
    .bind(r.used_at)
    .bind(&r.used_by)
    .bind(&r.used_by_name)
    .bind(&r.used_in_transaction)
    .bind(r.cancelled_at)
    .bind(&r.cancelled_by)
    .bind(&r.cancelled_by_name)
    .bind(&r.cancellation_reason)
    .bind(&r.notes)
    .bind(r.updated_at)
    .bind(&r.reservation_id)
    .bind(expected)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Flips every lapsed active reservation to `expired`.
///
/// Idempotent: a second run at the same instant matches nothing.
pub(crate) async fn expire_lapsed(conn: &mut SqliteConnection, now: DateTime<Utc>) -> DbResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE stock_reservations
        SET status = ?1, updated_at = ?2
        WHERE status = ?3 AND expires_at < ?2
        "#,
    )
    .bind(ReservationStatus::Expired)
    .bind(now)
    .bind(ReservationStatus::Active)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Queries
// =============================================================================

/// All reservations ever made against a deposit, newest first.
pub(crate) async fn for_deposit(
    conn: &mut SqliteConnection,
    deposit_id: &str,
) -> DbResult<Vec<Reservation>> {
    let sql = format!(
        "{} ORDER BY created_at DESC, reservation_id DESC",
        select_where("deposit_receipt_id = ?1")
    );
    let reservations: Vec<Reservation> = sqlx::query_as(&sql)
        .bind(deposit_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(reservations)
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn push_list_filters(
    qb: &mut QueryBuilder<'_, Sqlite>,
    filter: &ReservationFilter,
    now: DateTime<Utc>,
) {
    qb.push(" WHERE 1 = 1");

    if let Some(branch) = &filter.branch_code {
        qb.push(" AND branch_code = ").push_bind(branch.clone());
    }

    match filter.status {
        Some(ReservationStatus::Active) => {
            qb.push(" AND status = 'active' AND expires_at >= ")
                .push_bind(now);
        }
        Some(ReservationStatus::Expired) => {
            qb.push(" AND (status = 'expired' OR (status = 'active' AND expires_at < ")
                .push_bind(now)
                .push("))");
        }
        Some(status) => {
            qb.push(" AND status = ").push_bind(status);
        }
        None if !filter.include_expired => {
            qb.push(" AND status <> 'expired' AND NOT (status = 'active' AND expires_at < ")
                .push_bind(now)
                .push(")");
        }
        None => {}
    }

    let term = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty());

    if let Some(term) = term {
        // SQLite LOWER() folds ASCII only; fold the term the same way.
        let pattern = format!("%{}%", escape_like(&term.to_ascii_lowercase()));
        qb.push(" AND (");
        for (i, column) in SEARCH_COLUMNS.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push("LOWER(")
                .push(*column)
                .push(") LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\'");
        }
        qb.push(")");
    }
}

/// One page of reservations matching `filter`, newest first, plus the
/// total match count.
pub(crate) async fn list(
    conn: &mut SqliteConnection,
    filter: &ReservationFilter,
    now: DateTime<Utc>,
) -> DbResult<(Vec<Reservation>, u64)> {
    let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM stock_reservations");
    push_list_filters(&mut count_qb, filter, now);
    let total: i64 = count_qb
        .build_query_scalar::<i64>()
        .fetch_one(&mut *conn)
        .await?;

    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {} FROM stock_reservations",
        RESERVATION_COLUMNS
    ));
    push_list_filters(&mut qb, filter, now);
    qb.push(" ORDER BY created_at DESC, reservation_id DESC LIMIT ")
        .push_bind(i64::from(filter.limit))
        .push(" OFFSET ")
        .push_bind(filter.offset() as i64);

    let items: Vec<Reservation> = qb
        .build_query_as::<Reservation>()
        .fetch_all(&mut *conn)
        .await?;

    debug!(total = total, returned = items.len(), "Listed reservations");
    Ok((items, total.max(0) as u64))
}

/// Reservations created inside the report's branch and date range.
pub(crate) async fn report(
    conn: &mut SqliteConnection,
    filter: &ReportFilter,
) -> DbResult<Vec<Reservation>> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {} FROM stock_reservations WHERE 1 = 1",
        RESERVATION_COLUMNS
    ));

    if let Some(branch) = &filter.branch_code {
        qb.push(" AND branch_code = ").push_bind(branch.clone());
    }
    if let Some(from) = filter.from {
        qb.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        qb.push(" AND created_at <= ").push_bind(to);
    }
    qb.push(" ORDER BY created_at DESC, reservation_id DESC");

    let reservations: Vec<Reservation> = qb
        .build_query_as::<Reservation>()
        .fetch_all(&mut *conn)
        .await?;
    Ok(reservations)
}

// =============================================================================
// Repository
// =============================================================================

/// Pool-level read access to reservations.
///
/// Workflows never use this; they go through a unit of work.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: SqlitePool,
}

impl ReservationRepository {
    /// Creates a new ReservationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReservationRepository { pool }
    }

    /// Gets a reservation by ID, as stored.
    pub async fn get_by_id(&self, reservation_id: &str) -> DbResult<Option<Reservation>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_id(&mut conn, reservation_id).await
    }

    /// Counts reservations stored with `status`.
    pub async fn count_by_status(&self, status: ReservationStatus) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_reservations WHERE status = ?1")
                .bind(status)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
