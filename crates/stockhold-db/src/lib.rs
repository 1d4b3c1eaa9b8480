//! # stockhold-db: Storage and Workflows for Stockhold
//!
//! This crate owns persistence for the three aggregates (deposit receipts,
//! branch stock, reservations) and the transactional workflows that span
//! them. SQLite via sqlx is the production backend; an in-memory store
//! implements the same unit-of-work seam for tests and embedding.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockhold Data Flow                              │
//! │                                                                         │
//! │  HTTP handler / stockhold-sweeper                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockhold-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────────────┐                                      │   │
//! │  │   │  ReservationManager  │  create / use / cancel / extend /   │   │
//! │  │   │     (manager.rs)     │  sweep / queries                    │   │
//! │  │   └──────────┬───────────┘                                      │   │
//! │  │              │ TransactionSource::begin()                       │   │
//! │  │   ┌──────────▼───────────┐    ┌───────────────┐  ┌──────────┐ │   │
//! │  │   │   SqliteUnitOfWork   │    │  Repositories │  │Migrations│ │   │
//! │  │   │   MemoryUnitOfWork   │───►│  deposit      │  │(embedded)│ │   │
//! │  │   │  (unit_of_work.rs)   │    │  inventory    │  │ 001_...  │ │   │
//! │  │   └──────────────────────┘    │  reservation  │  └──────────┘ │   │
//! │  │                               └───────────────┘               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   deposit_receipts • branch_stock • stock_reservations          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - SQL for deposits, stock and reservations
//! - [`unit_of_work`] - The transaction seam workflows run against
//! - [`memory`] - In-memory backend for the same seam
//! - [`manager`] - Reservation workflows
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockhold_core::{Actor, ReservationPolicy, SystemClock};
//! use stockhold_db::{Database, DbConfig, ReservationManager};
//!
//! let db = Database::new(DbConfig::new("./stockhold.db")).await?;
//! let manager = ReservationManager::new(db, Arc::new(SystemClock), ReservationPolicy::default());
//!
//! let actor = Actor::new("emp-7", "Ploy");
//! let reservation = manager.create_from_deposit("dep-1", None, &actor).await?;
//! manager.use_reservation(&reservation.reservation_id, "TXN-0001", &actor).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod manager;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use manager::ReservationManager;
pub use memory::{MemoryStore, MemoryUnitOfWork};
pub use pool::{Database, DbConfig};
pub use unit_of_work::{SqliteUnitOfWork, TransactionSource, UnitOfWork};

// Repository re-exports for convenience
pub use repository::{DepositRepository, InventoryRepository, ReservationRepository};
