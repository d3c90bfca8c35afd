//! Sensor subsystem: range gating and the pulse signal input.
//!
//! The echo timing itself lives in [`crate::drivers::ultrasonic`]; this
//! layer only interprets what the drivers measure.

pub mod range;
pub mod signal;

pub use range::{RangeGate, RangeReading, NO_ECHO_DISTANCE_MM};
pub use signal::AnalogSignal;
