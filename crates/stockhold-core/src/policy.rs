//! # Reservation Policy
//!
//! Window sizes for reservations, passed explicitly to the manager.
//!
//! ```toml
//! [reservation]
//! default_expiration_hours = 72
//! default_extension_hours = 24
//! max_expiration_hours = 720
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::{DEFAULT_EXPIRATION_HOURS, DEFAULT_EXTENSION_HOURS, MAX_EXPIRATION_HOURS};

/// Reservation window configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationPolicy {
    /// Window applied when creation does not specify one.
    #[serde(default = "default_expiration_hours")]
    pub default_expiration_hours: u32,

    /// Hours added by `extend` when no amount is given.
    #[serde(default = "default_extension_hours")]
    pub default_extension_hours: u32,

    /// Upper bound for a single window or a single extension.
    #[serde(default = "default_max_expiration_hours")]
    pub max_expiration_hours: u32,
}

fn default_expiration_hours() -> u32 {
    DEFAULT_EXPIRATION_HOURS
}

fn default_extension_hours() -> u32 {
    DEFAULT_EXTENSION_HOURS
}

fn default_max_expiration_hours() -> u32 {
    MAX_EXPIRATION_HOURS
}

impl Default for ReservationPolicy {
    fn default() -> Self {
        ReservationPolicy {
            default_expiration_hours: default_expiration_hours(),
            default_extension_hours: default_extension_hours(),
            max_expiration_hours: default_max_expiration_hours(),
        }
    }
}

impl ReservationPolicy {
    /// Checks that the defaults are positive and within the maximum.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_expiration_hours == 0 {
            return Err(ValidationError::MustBePositive {
                field: "max_expiration_hours".to_string(),
            });
        }

        for (field, value) in [
            ("default_expiration_hours", self.default_expiration_hours),
            ("default_extension_hours", self.default_extension_hours),
        ] {
            if value == 0 || value > self.max_expiration_hours {
                return Err(ValidationError::OutOfRange {
                    field: field.to_string(),
                    min: 1,
                    max: i64::from(self.max_expiration_hours),
                });
            }
        }

        Ok(())
    }
}
