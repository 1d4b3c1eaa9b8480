//! # Inventory Repository
//!
//! The Inventory Store boundary: serialized units per branch.
//!
//! Only the use workflow writes here, and only through [`decrement`], which
//! floors `stock_value` at zero in a single statement.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockhold_core::InventoryUnit;

/// Loads the stock record for `(branch_code, imei)`.
pub(crate) async fn fetch_unit(
    conn: &mut SqliteConnection,
    branch_code: &str,
    imei: &str,
) -> DbResult<Option<InventoryUnit>> {
    let unit: Option<InventoryUnit> = sqlx::query_as(
        r#"
        SELECT id, branch_code, imei, name, stock_value, verified, updated_at
        FROM branch_stock
        WHERE branch_code = ?1 AND imei = ?2
        "#,
    )
    .bind(branch_code)
    .bind(imei)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(unit)
}

/// Decrements `stock_value` by one, floored at zero.
///
/// Returns the new stock value, or `None` if the record does not exist.
pub(crate) async fn decrement(
    conn: &mut SqliteConnection,
    branch_code: &str,
    imei: &str,
    now: DateTime<Utc>,
) -> DbResult<Option<i64>> {
    debug!(branch_code = %branch_code, imei = %imei, "Decrementing stock");

    let remaining: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE branch_stock
        SET stock_value = MAX(stock_value - 1, 0), updated_at = ?1
        WHERE branch_code = ?2 AND imei = ?3
        RETURNING stock_value
        "#,
    )
    .bind(now)
    .bind(branch_code)
    .bind(imei)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(remaining)
}

/// Pool-level access to stock records, for seeding and inspection.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Gets the stock record for a unit.
    pub async fn get(&self, branch_code: &str, imei: &str) -> DbResult<Option<InventoryUnit>> {
        let mut conn = self.pool.acquire().await?;
        fetch_unit(&mut conn, branch_code, imei).await
    }

    /// Inserts a stock record, or replaces stock and verification of an
    /// existing one.
    pub async fn upsert(&self, unit: &InventoryUnit) -> DbResult<()> {
        debug!(branch_code = %unit.branch_code, imei = %unit.imei, "Upserting stock record");

        sqlx::query(
            r#"
            INSERT INTO branch_stock (id, branch_code, imei, name, stock_value, verified, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (branch_code, imei) DO UPDATE SET
                name = excluded.name,
                stock_value = excluded.stock_value,
                verified = excluded.verified,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&unit.id)
        .bind(&unit.branch_code)
        .bind(&unit.imei)
        .bind(&unit.name)
        .bind(unit.stock_value)
        .bind(unit.verified)
        .bind(unit.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
