//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, displays, event sinks) implement
//! these traits.  The [`AppService`](super::service::AppService) consumes
//! them via generics, so the domain core never touches hardware directly.
//! Port calls do not return errors: adapters log driver failures and
//! degrade to a safe reading so the poll loop never aborts.

use crate::fsm::context::Surface;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait SensorPort {
    /// Trigger one ranging pulse and return the echo round-trip time in
    /// microseconds.  `None` when no echo arrived before the timeout.
    fn echo_round_trip_us(&mut self) -> Option<u32>;

    /// One signed instantaneous reading of the pulse signal.
    fn read_signal(&mut self) -> i32;

    /// Drain presence edges recorded since the previous call.
    fn take_presence_edges(&mut self) -> u32;

    /// Monotonic milliseconds; only differences are meaningful.
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

pub trait ActuatorPort {
    /// Drive the sampling indicator light.
    fn set_indicator(&mut self, on: bool);

    /// Step the enclosure actuator monotonically to `angle` degrees.
    /// Returns once the move is finished.
    fn move_enclosure(&mut self, angle: u8);

    /// Current enclosure angle in degrees.
    fn enclosure_angle(&self) -> u8;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → text displays)
// ───────────────────────────────────────────────────────────────

pub trait DisplayPort {
    fn clear(&mut self, surface: Surface);

    fn set_cursor(&mut self, surface: Surface, col: u8, row: u8);

    fn print_line(&mut self, surface: Surface, text: &str);

    /// Scroll the whole display left by `steps` columns, paced by the
    /// adapter.
    fn scroll_left(&mut self, surface: Surface, steps: u8);

    fn set_visible(&mut self, surface: Surface, visible: bool);
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: hardware timer → drivers)
// ───────────────────────────────────────────────────────────────

/// Microsecond monotonic clock, used for echo pulse timing.
pub trait ClockPort {
    fn now_us(&self) -> u64;

    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &super::events::AppEvent) {}
}
