//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::PresenceChanged { armed } => {
                info!("PRESENCE | {}", if *armed { "armed" } else { "disarmed" });
            }
            AppEvent::RangeChanged {
                in_range,
                distance_mm,
            } => {
                info!(
                    "RANGE | {} | distance={}",
                    if *in_range { "in" } else { "out" },
                    DistanceFmt(*distance_mm)
                );
            }
            AppEvent::EnclosureMoved { angle } => {
                info!("ENCLOSURE | angle={}\u{00b0}", angle);
            }
            AppEvent::CycleRejected { cycle, period_ms } => {
                debug!("NOISE | cycle={} period={:.0}ms", cycle, period_ms);
            }
            AppEvent::SampleCompleted {
                outcome,
                classification,
            } => {
                info!(
                    "RESULT | period={:?}ms freq={:?}Hz | {}",
                    outcome.period_ms(),
                    outcome.frequency_hz(),
                    classification.label()
                );
            }
            AppEvent::AdvisoryShown(tier) => {
                info!("ADVISORY | tier={} ({})", tier.ordinal(), tier.label());
            }
            AppEvent::SessionReset(reason) => {
                info!("RESET | reason={:?}", reason);
            }
        }
    }
}

/// Prints the no-echo sentinel as `none` instead of `4294967295mm`.
struct DistanceFmt(u32);

impl core::fmt::Display for DistanceFmt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.0 == crate::sensors::NO_ECHO_DISTANCE_MM {
            write!(f, "none")
        } else {
            write!(f, "{}mm", self.0)
        }
    }
}
