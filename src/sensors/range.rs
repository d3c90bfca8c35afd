//! Range gate: round-trip echo time to distance and an in-range flag.
//!
//! `distance_mm = t_us * 0.17015`: the speed of sound (~340.3 m/s) is
//! 0.3403 mm/µs, halved because the pulse travels out and back.
//!
//! A missing echo (timeout, or a zero-length pulse) maps to
//! [`NO_ECHO_DISTANCE_MM`], which is always out of range.

use crate::config::SystemConfig;

/// Distance reported when no echo came back.
pub const NO_ECHO_DISTANCE_MM: u32 = u32::MAX;

/// One gated range measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeReading {
    pub distance_mm: u32,
    pub in_range: bool,
}

impl RangeReading {
    /// Reading used before the first measurement.
    pub const fn unknown() -> Self {
        Self {
            distance_mm: NO_ECHO_DISTANCE_MM,
            in_range: false,
        }
    }

    pub fn has_echo(&self) -> bool {
        self.distance_mm != NO_ECHO_DISTANCE_MM
    }
}

impl Default for RangeReading {
    fn default() -> Self {
        Self::unknown()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RangeGate {
    threshold_mm: u32,
    mm_per_echo_us: f32,
}

impl RangeGate {
    pub fn new(threshold_mm: u32, mm_per_echo_us: f32) -> Self {
        Self {
            threshold_mm,
            mm_per_echo_us,
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(config.range_threshold_mm, config.mm_per_echo_us)
    }

    /// Convert a round-trip pulse duration into a distance (truncated).
    pub fn distance_mm(&self, round_trip_us: Option<u32>) -> u32 {
        match round_trip_us {
            Some(t) if t > 0 => {
                let mm = t as f32 * self.mm_per_echo_us;
                if mm.is_finite() && mm < NO_ECHO_DISTANCE_MM as f32 {
                    mm as u32
                } else {
                    NO_ECHO_DISTANCE_MM
                }
            }
            _ => NO_ECHO_DISTANCE_MM,
        }
    }

    /// Gate a pulse duration: in range when `distance <= threshold`.
    pub fn measure(&self, round_trip_us: Option<u32>) -> RangeReading {
        let distance_mm = self.distance_mm(round_trip_us);
        RangeReading {
            distance_mm,
            in_range: distance_mm <= self.threshold_mm,
        }
    }

    pub fn threshold_mm(&self) -> u32 {
        self.threshold_mm
    }
}
