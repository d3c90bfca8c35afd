//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the FSM, the presence controller, the range and
//! enclosure gates, and the shared context.  All I/O flows through port
//! traits injected at call sites, making the entire service testable with
//! mock adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                  │        AppService         │
//! ActuatorPort ◀── │ Presence · Range · FSM    │
//!  DisplayPort ◀── └──────────────────────────┘
//! ```
//!
//! One [`poll_once`](AppService::poll_once) is one iteration of the
//! firmware's main loop:
//!
//! 1. apply pending presence edges (each one is a full reset);
//! 2. while armed: measure range, gate the enclosure;
//! 3. while sampling in range: take one signal sample;
//! 4. tick the FSM;
//! 5. apply the FSM's output commands and forward its events.

use log::{info, warn};

use crate::classifier::{Classification, RiskTier};
use crate::config::SystemConfig;
use crate::control::enclosure::EnclosureGate;
use crate::control::presence::PresenceController;
use crate::fsm::context::{DisplayCommand, DisplayOp, FsmContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, SessionState};
use crate::sampler::SignalSample;
use crate::sensors::{RangeGate, RangeReading};

use super::commands::AppCommand;
use super::events::{AppEvent, ResetReason, SessionSnapshot};
use super::ports::{ActuatorPort, DisplayPort, EventSink, SensorPort};

pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    presence: PresenceController,
    range_gate: RangeGate,
    enclosure: EnclosureGate,
    /// Last angle reported by the actuator.
    enclosure_angle: u8,
    poll_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM: call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let range_gate = RangeGate::from_config(&config);
        let enclosure = EnclosureGate::from_config(&config);
        let enclosure_angle = config.enclosure_closed_angle;
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), SessionState::Disarmed);

        Self {
            fsm,
            ctx,
            presence: PresenceController::new(),
            range_gate,
            enclosure,
            enclosure_angle,
            poll_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter `Disarmed`, close the enclosure, and hide the displays.
    pub fn start(
        &mut self,
        hw: &mut (impl ActuatorPort + DisplayPort),
        sink: &mut impl EventSink,
    ) {
        self.fsm.start(&mut self.ctx);
        self.retract_enclosure(hw, sink);
        self.apply_outputs(hw, sink);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("AppService started in {:?}", self.fsm.current_state());
    }

    // ── Per-poll orchestration ────────────────────────────────

    /// Run one iteration of the main loop.
    ///
    /// The `hw` parameter satisfies every hardware port at once, which
    /// avoids multiple mutable borrows while keeping the boundary explicit.
    pub fn poll_once(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort + DisplayPort),
        sink: &mut impl EventSink,
    ) {
        self.poll_count = self.poll_count.wrapping_add(1);

        // 1. Presence edges recorded by the interrupt since the last poll.
        let edges = hw.take_presence_edges();
        for _ in 0..edges {
            self.on_presence_toggle(hw, sink);
        }

        let prev_state = self.fsm.current_state();
        let armed = self.presence.is_armed();
        self.ctx.inputs.armed = armed;
        self.ctx.session.armed = armed;

        // 2. Range gate and enclosure, only while armed.
        let range = if armed {
            let reading = self.range_gate.measure(hw.echo_round_trip_us());
            self.observe_range(reading, sink);
            if let Some(target) = self.enclosure.target(reading, hw.enclosure_angle()) {
                self.move_enclosure(target, hw, sink);
            }
            reading
        } else {
            RangeReading::unknown()
        };
        self.ctx.inputs.range = range;

        // 3. One signal sample per poll while sampling in range.
        self.ctx.inputs.sample = (armed
            && range.in_range
            && self.fsm.current_state() == SessionState::Sampling)
            .then(|| SignalSample {
                raw: hw.read_signal(),
                at_ms: hw.now_ms(),
            });

        // 4. FSM tick (pure state logic)
        self.fsm.tick(&mut self.ctx);

        // 5. Outputs and events
        self.apply_outputs(hw, sink);
        self.emit_state_change(prev_state, sink);
    }

    /// Apply one presence edge: flip the armed level, reset the session,
    /// close the enclosure and re-enter the matching state.
    pub fn on_presence_toggle(
        &mut self,
        hw: &mut (impl ActuatorPort + DisplayPort),
        sink: &mut impl EventSink,
    ) {
        let prev_state = self.fsm.current_state();
        let transition = self.presence.toggle();
        sink.emit(&AppEvent::PresenceChanged {
            armed: transition.armed,
        });

        self.ctx.inputs.armed = transition.armed;
        self.ctx.session.armed = transition.armed;
        self.ctx.inputs.sample = None;
        self.ctx.reset_session_for(ResetReason::PresenceToggle);
        self.ctx.commands.indicator_on = false;
        self.retract_enclosure(hw, sink);

        let target = if transition.armed {
            SessionState::Idle
        } else {
            SessionState::Disarmed
        };
        self.fsm.reenter(target, &mut self.ctx);

        self.apply_outputs(hw, sink);
        self.emit_state_change(prev_state, sink);
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (interrupt handoff, console, tests).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut (impl ActuatorPort + DisplayPort),
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::PresenceToggle => self.on_presence_toggle(hw, sink),
            AppCommand::ResetSession => {
                let prev_state = self.fsm.current_state();
                self.ctx.reset_session_for(ResetReason::Command);
                if self.presence.is_armed() {
                    self.fsm.reenter(SessionState::Idle, &mut self.ctx);
                }
                self.apply_outputs(hw, sink);
                self.emit_state_change(prev_state, sink);
            }
            AppCommand::UpdateConfig(new_config) => match new_config.validate() {
                Ok(()) => {
                    self.range_gate = RangeGate::from_config(&new_config);
                    self.enclosure = EnclosureGate::from_config(&new_config);
                    self.ctx.config = new_config;
                    info!("Configuration updated at runtime");
                }
                Err(e) => warn!("Rejected configuration update: {}", e),
            },
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn current_state(&self) -> SessionState {
        self.fsm.current_state()
    }

    /// Tier of the completed run, if it fell inside one.
    pub fn current_tier(&self) -> Option<RiskTier> {
        self.ctx.session.classification.and_then(|c| c.tier())
    }

    pub fn current_classification(&self) -> Option<Classification> {
        self.ctx.session.classification
    }

    pub fn is_armed(&self) -> bool {
        self.presence.is_armed()
    }

    /// Main-loop iterations executed since startup.
    pub fn poll_count(&self) -> u64 {
        self.poll_count
    }

    /// Clone of the live configuration.
    pub fn current_config(&self) -> SystemConfig {
        self.ctx.config.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let session = &self.ctx.session;
        SessionSnapshot {
            state: self.fsm.current_state(),
            ticks_in_state: self.fsm.ticks_in_current_state(),
            armed: self.presence.is_armed(),
            distance_mm: session.range_distance_mm,
            in_range: self.ctx.inputs.range.in_range,
            cycle_index: session.sampler.cycle_index(),
            valid_cycles: session.sampler.valid_cycles(),
            accumulator_ms: session.sampler.accumulator_ms(),
            last_cycle: session.last_step,
            averaged_period_ms: session.sampler.averaged_period_ms(),
            classification: session.classification,
            tier_shown: session.tier_shown.as_array(),
            indicator_on: self.ctx.commands.indicator_on,
            enclosure_angle: self.enclosure_angle,
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn observe_range(&mut self, reading: RangeReading, sink: &mut impl EventSink) {
        let was_in_range = self.ctx.inputs.range.in_range;
        self.ctx.session.range_distance_mm = reading.distance_mm;
        if reading.in_range != was_in_range {
            sink.emit(&AppEvent::RangeChanged {
                in_range: reading.in_range,
                distance_mm: reading.distance_mm,
            });
        }
    }

    fn retract_enclosure(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        if let Some(target) = self.enclosure.retract(hw.enclosure_angle()) {
            self.move_enclosure(target, hw, sink);
        }
    }

    fn move_enclosure(&mut self, target: u8, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.move_enclosure(target);
        self.enclosure_angle = hw.enclosure_angle();
        sink.emit(&AppEvent::EnclosureMoved {
            angle: self.enclosure_angle,
        });
    }

    /// Translate FSM output commands into port calls and forward events.
    fn apply_outputs(
        &mut self,
        hw: &mut (impl ActuatorPort + DisplayPort),
        sink: &mut impl EventSink,
    ) {
        hw.set_indicator(self.ctx.commands.indicator_on);

        let displays = core::mem::take(&mut self.ctx.commands.displays);
        for cmd in &displays {
            apply_display(hw, cmd);
        }

        let events = core::mem::take(&mut self.ctx.commands.events);
        for event in &events {
            sink.emit(event);
        }
    }

    fn emit_state_change(&self, prev: SessionState, sink: &mut impl EventSink) {
        let now = self.fsm.current_state();
        if now != prev {
            sink.emit(&AppEvent::StateChanged { from: prev, to: now });
        }
    }
}

fn apply_display(hw: &mut impl DisplayPort, cmd: &DisplayCommand) {
    let surface = cmd.surface;
    match &cmd.op {
        DisplayOp::Clear => hw.clear(surface),
        DisplayOp::SetCursor { col, row } => hw.set_cursor(surface, *col, *row),
        DisplayOp::PrintLine(text) => hw.print_line(surface, text.as_str()),
        DisplayOp::ScrollLeft { steps } => hw.scroll_left(surface, *steps),
        DisplayOp::SetVisible(visible) => hw.set_visible(surface, *visible),
    }
}
