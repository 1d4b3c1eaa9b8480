//! # Sweeper Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Sweeper Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Database     │  │       Control           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  DatabaseError  │  │  ChannelError           │ │
//! │  │  ConfigLoad...  │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use stockhold_core::ReservationError;
use stockhold_db::DbError;

/// Result type alias for sweeper operations.
pub type SweepResult<T> = Result<T, SweepError>;

/// Errors raised while configuring or running the sweeper.
#[derive(Debug, Error)]
pub enum SweepError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// A configuration value is out of range or missing.
    #[error("Invalid sweeper configuration: {0}")]
    InvalidConfig(String),

    /// The config file could not be read or parsed.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Database Errors
    // =========================================================================
    /// Opening the database or running a sweep failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    // =========================================================================
    // Control Errors
    // =========================================================================
    /// The sweeper task is gone.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<DbError> for SweepError {
    fn from(err: DbError) -> Self {
        SweepError::DatabaseError(err.to_string())
    }
}

impl From<ReservationError> for SweepError {
    fn from(err: ReservationError) -> Self {
        SweepError::DatabaseError(err.to_string())
    }
}

impl From<std::io::Error> for SweepError {
    fn from(err: std::io::Error) -> Self {
        SweepError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SweepError {
    fn from(err: toml::de::Error) -> Self {
        SweepError::ConfigLoadFailed(err.to_string())
    }
}

impl SweepError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SweepError::InvalidConfig(_) | SweepError::ConfigLoadFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors() {
        assert!(SweepError::InvalidConfig("interval_secs".into()).is_config_error());
        assert!(SweepError::from(std::io::Error::other("denied")).is_config_error());
        assert!(!SweepError::ChannelError("closed".into()).is_config_error());
    }

    #[test]
    fn test_database_error_display() {
        let err = SweepError::from(DbError::ConnectionFailed("locked".into()));
        assert!(err.to_string().starts_with("Database error:"));
        assert!(err.to_string().contains("locked"));
    }
}
