//! # Repository Module
//!
//! SQL for the three aggregates.
//!
//! ## Two Access Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Workflows (ReservationManager)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteUnitOfWork ── &mut SqliteConnection ──► module functions        │
//! │                      (one transaction)          fetch_by_id, insert,   │
//! │                                                  update_if_status, ... │
//! │                                                                         │
//! │  Seeding / inspection                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.deposits() / db.inventory() / db.reservations()                    │
//! │       │  (hold a SqlitePool, one statement each)                       │
//! │       ▼                                                                 │
//! │  same module functions                                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`DepositRepository`] - Deposit Ledger records
//! - [`InventoryRepository`] - Branch stock records
//! - [`ReservationRepository`] - Reservation reads

pub mod deposit;
pub mod inventory;
pub mod reservation;

pub use deposit::DepositRepository;
pub use inventory::InventoryRepository;
pub use reservation::ReservationRepository;
