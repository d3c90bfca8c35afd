//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::classifier::{Classification, RiskTier};
use crate::fsm::SessionState;
use crate::sampler::{CycleStep, SampleOutcome};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(SessionState),

    /// The FSM transitioned between states.
    StateChanged { from: SessionState, to: SessionState },

    /// A presence edge flipped the armed level.
    PresenceChanged { armed: bool },

    /// The gated range reading crossed the threshold.
    RangeChanged { in_range: bool, distance_mm: u32 },

    /// The enclosure actuator finished a move.
    EnclosureMoved { angle: u8 },

    /// A closed cycle's period was discarded as noise.
    CycleRejected { cycle: u16, period_ms: f32 },

    /// A sampling run completed.
    SampleCompleted {
        outcome: SampleOutcome,
        classification: Classification,
    },

    /// A tier advisory was displayed for the first time this session.
    AdvisoryShown(RiskTier),

    /// The session was cleared back to its initial values.
    SessionReset(ResetReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    PresenceToggle,
    RangeLost,
    Command,
}

/// A point-in-time view of the session, for diagnostics and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    /// Polls spent in `state` since it was entered.
    pub ticks_in_state: u64,
    pub armed: bool,
    pub distance_mm: u32,
    pub in_range: bool,
    pub cycle_index: u16,
    pub valid_cycles: u32,
    pub accumulator_ms: f32,
    /// The most recent sampling cycle of this session.
    pub last_cycle: Option<CycleStep>,
    pub averaged_period_ms: Option<f32>,
    pub classification: Option<Classification>,
    pub tier_shown: [bool; RiskTier::COUNT],
    pub indicator_on: bool,
    pub enclosure_angle: u8,
}
