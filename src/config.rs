//! System configuration parameters
//!
//! All tunable parameters for the PulseGate system.  Defaults reproduce
//! the bench prototype; a JSON document can override them at boot or via
//! [`AppCommand::UpdateConfig`](crate::app::commands::AppCommand).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Range gate ---
    /// Arming distance (mm, inclusive).
    pub range_threshold_mm: u32,
    /// One-way millimetres per microsecond of echo round trip
    /// (340.3 m/s halved).
    pub mm_per_echo_us: f32,
    /// Longest echo wait before the reading counts as "no echo".
    pub echo_timeout_us: u32,

    // --- Cycle sampler ---
    /// Number of sampling cycles per run.
    pub cycle_limit: u16,
    /// `|sample| > threshold` classifies a reading as high.
    pub signal_high_threshold: i32,
    /// Subtracted from raw ADC counts to produce a signed reading.
    pub signal_offset: i32,
    /// Periods at or above this are treated as sensor noise (ms).
    pub noise_ceiling_ms: f32,

    // --- Enclosure actuator ---
    pub enclosure_open_angle: u8,
    pub enclosure_closed_angle: u8,
    /// Degrees moved per actuator step.
    pub enclosure_step_deg: u8,
    /// Pause between actuator steps (ms).
    pub enclosure_step_ms: u32,

    // --- Timing ---
    /// Fixed cadence of one poll (ms).  Period fidelity depends on it.
    pub poll_period_ms: u32,
    /// Pause between display scroll steps (ms).
    pub scroll_step_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Range gate
            range_threshold_mm: 180,
            mm_per_echo_us: 0.170_15,
            echo_timeout_us: 30_000, // ~5 m

            // Cycle sampler
            cycle_limit: 50,
            signal_high_threshold: 400,
            signal_offset: 0,
            noise_ceiling_ms: 1000.0,

            // Enclosure
            enclosure_open_angle: 90,
            enclosure_closed_angle: 0,
            enclosure_step_deg: 3,
            enclosure_step_ms: 20,

            // Timing
            poll_period_ms: 170, // 20 + 20 + 130 ms per cycle
            scroll_step_ms: 106,
        }
    }
}

/// Highest angle the enclosure actuator accepts.
pub const MAX_ENCLOSURE_ANGLE: u8 = 90;

impl SystemConfig {
    /// Reject values that would break the acquisition pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.range_threshold_mm == 0 {
            return Err(ConfigError::ValidationFailed("range_threshold_mm must be > 0"));
        }
        if !(self.mm_per_echo_us.is_finite() && self.mm_per_echo_us > 0.0) {
            return Err(ConfigError::ValidationFailed("mm_per_echo_us must be finite and > 0"));
        }
        if self.echo_timeout_us == 0 {
            return Err(ConfigError::ValidationFailed("echo_timeout_us must be > 0"));
        }
        if self.cycle_limit == 0 || self.cycle_limit > 255 {
            return Err(ConfigError::ValidationFailed("cycle_limit must be in 1..=255"));
        }
        if !(self.noise_ceiling_ms.is_finite() && self.noise_ceiling_ms > 0.0) {
            return Err(ConfigError::ValidationFailed("noise_ceiling_ms must be finite and > 0"));
        }
        if self.enclosure_open_angle > MAX_ENCLOSURE_ANGLE {
            return Err(ConfigError::ValidationFailed("enclosure_open_angle must be <= 90"));
        }
        if self.enclosure_closed_angle >= self.enclosure_open_angle {
            return Err(ConfigError::ValidationFailed(
                "enclosure_closed_angle must be below enclosure_open_angle",
            ));
        }
        if self.enclosure_step_deg == 0 {
            return Err(ConfigError::ValidationFailed("enclosure_step_deg must be > 0"));
        }
        if self.poll_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("poll_period_ms must be > 0"));
        }
        Ok(())
    }

    /// Parse a (possibly partial) JSON document over the defaults and
    /// validate the result.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }
}

/// Errors from loading or validating a [`SystemConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The document could not be deserialised.
    Malformed,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed config document"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
