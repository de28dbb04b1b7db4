//! Event processing configuration
//!
//! All tunable parameters for the event state machine and projector.
//! Values are normally supplied by the integration that owns the connection.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Cameras a single NVR is expected to manage.
pub const MAX_SUPPORTED_CAMERAS: usize = 256;

/// Retention bound for tracked events (two in-flight events per camera).
pub const MAX_RETAINED: usize = MAX_SUPPORTED_CAMERAS * 2;

/// Trailing window during which a finished ring still reads as ringing.
pub const DEFAULT_RING_WINDOW_MS: i64 = 3000;

const MAX_UTC_OFFSET_SECS: i32 = 24 * 60 * 60;

/// Core event configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    // --- Projection ---
    /// Score an open motion event must reach (inclusive) to read as "on"
    pub minimum_score: i64,
    /// Trailing ring window (milliseconds)
    pub ring_window_ms: i64,
    /// Offset from UTC used when formatting event start times (seconds)
    pub utc_offset_secs: i32,

    // --- Retention ---
    /// Maximum number of tracked events before the oldest is evicted
    pub max_retained: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            minimum_score: 50,
            ring_window_ms: DEFAULT_RING_WINDOW_MS,
            utc_offset_secs: 0,
            max_retained: MAX_RETAINED,
        }
    }
}

impl EventConfig {
    /// Reject values that would break the retention or timing rules.
    /// Invalid ranges are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retained == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_retained must be at least 1",
            ));
        }
        if self.ring_window_ms < 0 {
            return Err(ConfigError::ValidationFailed(
                "ring_window_ms must not be negative",
            ));
        }
        if self.utc_offset_secs.abs() >= MAX_UTC_OFFSET_SECS {
            return Err(ConfigError::ValidationFailed(
                "utc_offset_secs must be within one day",
            ));
        }
        Ok(())
    }
}
