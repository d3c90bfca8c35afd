//! Application core: pure domain logic, zero I/O.
//!
//! This module holds the session orchestration: presence arming, range
//! gating, enclosure control and the session FSM.  All interaction with
//! hardware happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
