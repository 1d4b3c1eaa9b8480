//! # Deposit Repository
//!
//! The Deposit Ledger boundary: the reservation core reads a deposit and
//! writes back two status transitions.
//!
//! ## Status Write-Back
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  pending / confirmed / stock_available                                  │
//! │       │                                                                 │
//! │       │  create_from_deposit → mark_reserved()                          │
//! │       ▼                                                                 │
//! │  stock_reserved  (+ stock_checked, stock_checked_at, stock_checked_by)  │
//! │       │                                                                 │
//! │       │  use_reservation → mark_completed()                             │
//! │       ▼                                                                 │
//! │  completed  (+ completed_at)                                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockhold_core::{
    DepositAmounts, DepositCustomer, DepositProduct, DepositReceipt, DepositStatus, DepositType,
    Money, Salesperson, StockTracking,
};

const DEPOSIT_COLUMNS: &str = r#"
    id, receipt_number, deposit_type, status, branch_code,
    product_id, product_name, product_imei,
    customer_name, customer_phone,
    deposit_amount, total_amount, remaining_amount,
    salesperson_id, salesperson_name,
    stock_checked, stock_checked_at, stock_checked_by,
    completed_at, created_at
"#;

/// Flat row shape of `deposit_receipts`.
#[derive(Debug, sqlx::FromRow)]
struct DepositRow {
    id: String,
    receipt_number: String,
    deposit_type: DepositType,
    status: DepositStatus,
    branch_code: String,
    product_id: String,
    product_name: String,
    product_imei: Option<String>,
    customer_name: String,
    customer_phone: Option<String>,
    deposit_amount: Money,
    total_amount: Money,
    remaining_amount: Money,
    salesperson_id: Option<String>,
    salesperson_name: String,
    stock_checked: bool,
    stock_checked_at: Option<DateTime<Utc>>,
    stock_checked_by: Option<String>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<DepositRow> for DepositReceipt {
    fn from(row: DepositRow) -> Self {
        DepositReceipt {
            id: row.id,
            receipt_number: row.receipt_number,
            deposit_type: row.deposit_type,
            status: row.status,
            branch_code: row.branch_code,
            product: DepositProduct {
                id: row.product_id,
                name: row.product_name,
                imei: row.product_imei,
            },
            customer: DepositCustomer {
                name: row.customer_name,
                phone: row.customer_phone,
            },
            amounts: DepositAmounts {
                deposit_amount: row.deposit_amount,
                total_amount: row.total_amount,
                remaining_amount: row.remaining_amount,
            },
            salesperson: Salesperson {
                id: row.salesperson_id,
                name: row.salesperson_name,
            },
            tracking: StockTracking {
                stock_checked: row.stock_checked,
                stock_checked_at: row.stock_checked_at,
                stock_checked_by: row.stock_checked_by,
            },
            completed_at: row.completed_at,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Connection-Level Operations (used inside a unit of work)
// =============================================================================

/// Loads a deposit by id.
pub(crate) async fn fetch_by_id(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<DepositReceipt>> {
    let sql = format!("SELECT {} FROM deposit_receipts WHERE id = ?1", DEPOSIT_COLUMNS);

    let row: Option<DepositRow> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.map(DepositReceipt::from))
}

/// Sets `stock_reserved` and the stock-check tracking fields.
pub(crate) async fn mark_reserved(
    conn: &mut SqliteConnection,
    id: &str,
    checked_by: &str,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    debug!(deposit_id = %id, "Marking deposit stock_reserved");

    let result = sqlx::query(
        r#"
        UPDATE deposit_receipts
        SET status = ?1,
            stock_checked = 1,
            stock_checked_at = ?2,
            stock_checked_by = ?3,
            updated_at = ?2
        WHERE id = ?4
        "#,
    )
    .bind(DepositStatus::StockReserved)
    .bind(now)
    .bind(checked_by)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Sets `completed` and `completed_at`. Returns false if the deposit is gone.
pub(crate) async fn mark_completed(
    conn: &mut SqliteConnection,
    id: &str,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    debug!(deposit_id = %id, "Marking deposit completed");

    let result = sqlx::query(
        r#"
        UPDATE deposit_receipts
        SET status = ?1, completed_at = ?2, updated_at = ?2
        WHERE id = ?3
        "#,
    )
    .bind(DepositStatus::Completed)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Repository
// =============================================================================

/// Pool-level access to deposits, for seeding and inspection.
#[derive(Debug, Clone)]
pub struct DepositRepository {
    pool: SqlitePool,
}

impl DepositRepository {
    /// Creates a new DepositRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DepositRepository { pool }
    }

    /// Gets a deposit by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<DepositReceipt>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_id(&mut conn, id).await
    }

    /// Inserts a deposit receipt.
    pub async fn insert(&self, deposit: &DepositReceipt) -> DbResult<()> {
        debug!(id = %deposit.id, receipt_number = %deposit.receipt_number, "Inserting deposit");

        sqlx::query(
            r#"
            INSERT INTO deposit_receipts (
                id, receipt_number, deposit_type, status, branch_code,
                product_id, product_name, product_imei,
                customer_name, customer_phone,
                deposit_amount, total_amount, remaining_amount,
                salesperson_id, salesperson_name,
                stock_checked, stock_checked_at, stock_checked_by,
                completed_at, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10,
                ?11, ?12, ?13,
                ?14, ?15,
                ?16, ?17, ?18,
                ?19, ?20, ?20
            )
            "#,
        )
        .bind(&deposit.id)
        .bind(&deposit.receipt_number)
        .bind(deposit.deposit_type)
        .bind(deposit.status)
        .bind(&deposit.branch_code)
        .bind(&deposit.product.id)
        .bind(&deposit.product.name)
        .bind(&deposit.product.imei)
        .bind(&deposit.customer.name)
        .bind(&deposit.customer.phone)
        .bind(deposit.amounts.deposit_amount)
        .bind(deposit.amounts.total_amount)
        .bind(deposit.amounts.remaining_amount)
        .bind(&deposit.salesperson.id)
        .bind(&deposit.salesperson.name)
        .bind(deposit.tracking.stock_checked)
        .bind(deposit.tracking.stock_checked_at)
        .bind(&deposit.tracking.stock_checked_by)
        .bind(deposit.completed_at)
        .bind(deposit.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts deposits.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM deposit_receipts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
