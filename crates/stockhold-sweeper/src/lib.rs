//! # stockhold-sweeper: Background Expiry Sweeper
//!
//! Runs [`ReservationManager::sweep_expired`](stockhold_db::ReservationManager::sweep_expired)
//! on a fixed interval so lapsed reservations get their `expired` status
//! persisted.
//!
//! ## Module Organization
//!
//! - [`config`] - Layered configuration (defaults, TOML, environment)
//! - [`sweeper`] - The interval loop and its shutdown handle
//! - [`error`] - Sweeper error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockhold_core::SystemClock;
//! use stockhold_db::{Database, ReservationManager};
//! use stockhold_sweeper::{ExpirySweeper, SweeperConfig};
//!
//! let config = SweeperConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//! let manager = Arc::new(ReservationManager::new(db, Arc::new(SystemClock), config.reservation));
//!
//! let (sweeper, handle) = ExpirySweeper::new(manager, config.sweep.interval());
//! let task = tokio::spawn(sweeper.run());
//! // ...
//! handle.shutdown().await?;
//! let stats = task.await?;
//! ```

pub mod config;
pub mod error;
pub mod sweeper;

pub use config::{DatabaseSettings, SweepSettings, SweeperConfig};
pub use error::{SweepError, SweepResult};
pub use sweeper::{ExpirySweeper, SweepStats, SweeperHandle};
