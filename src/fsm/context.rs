//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the poll inputs gathered by the service, the output commands
//! the service applies afterwards, the configuration, and the [`Session`]
//! that owns all acquisition progress.

use heapless::{String, Vec};
use log::warn;

use crate::app::events::{AppEvent, ResetReason};
use crate::classifier::{Classification, TierFlags};
use crate::config::SystemConfig;
use crate::sampler::{CycleSampler, CycleStep, SamplerLimits, SignalSample};
use crate::sensors::RangeReading;

// ---------------------------------------------------------------------------
// Poll inputs (written by the service before each FSM tick)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct PollInputs {
    /// Presence level after this poll's toggles were applied.
    pub armed: bool,
    /// Latest gated range measurement.
    pub range: RangeReading,
    /// Signal sample taken this poll; only present while sampling in range.
    pub sample: Option<SignalSample>,
}

// ---------------------------------------------------------------------------
// Display commands
// ---------------------------------------------------------------------------

/// Capacity of a single printed line.
pub const LINE_CAP: usize = 40;
/// Display commands a single poll may queue.
pub const DISPLAY_QUEUE_CAP: usize = 32;
/// Events a single poll may queue.
pub const EVENT_QUEUE_CAP: usize = 8;

pub type LineBuf = String<LINE_CAP>;

/// Build a line buffer, truncating text that does not fit.
pub fn line(text: &str) -> LineBuf {
    let mut buf = LineBuf::new();
    for c in text.chars() {
        if buf.push(c).is_err() {
            break;
        }
    }
    buf
}

/// The two independent text displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// Status display (result line).
    Primary,
    /// Prompt and advisory display.
    Secondary,
}

impl Surface {
    pub const ALL: [Surface; 2] = [Self::Primary, Self::Secondary];

    pub const fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOp {
    Clear,
    SetCursor { col: u8, row: u8 },
    PrintLine(LineBuf),
    ScrollLeft { steps: u8 },
    SetVisible(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCommand {
    pub surface: Surface,
    pub op: DisplayOp,
}

// ---------------------------------------------------------------------------
// Output commands (written by state handlers; applied by the service)
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct OutputCommands {
    /// Desired indicator level.
    pub indicator_on: bool,
    /// Display commands queued this poll, in order.
    pub displays: Vec<DisplayCommand, DISPLAY_QUEUE_CAP>,
    /// Events queued this poll, in order.
    pub events: Vec<AppEvent, EVENT_QUEUE_CAP>,
}

impl OutputCommands {
    pub fn display(&mut self, surface: Surface, op: DisplayOp) {
        if self.displays.push(DisplayCommand { surface, op }).is_err() {
            warn!("display queue full, dropping command for {:?}", surface);
        }
    }

    /// Clear `surface` and print `text` on `row`.
    pub fn show(&mut self, surface: Surface, row: u8, text: &str) {
        self.display(surface, DisplayOp::Clear);
        self.print_at(surface, row, text);
    }

    pub fn print_at(&mut self, surface: Surface, row: u8, text: &str) {
        self.display(surface, DisplayOp::SetCursor { col: 0, row });
        self.display(surface, DisplayOp::PrintLine(line(text)));
    }

    /// Scroll so a line longer than the 16-column display is fully seen.
    pub fn scroll_overflow(&mut self, surface: Surface, text: &str) {
        let len = text.chars().count();
        if len > 16 {
            let steps = (len - 16).min(u8::MAX as usize) as u8;
            self.display(surface, DisplayOp::ScrollLeft { steps });
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        for surface in Surface::ALL {
            self.display(surface, DisplayOp::SetVisible(visible));
        }
    }

    pub fn emit(&mut self, event: AppEvent) {
        if self.events.push(event).is_err() {
            warn!("event queue full, dropping event");
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// All state belonging to one measuring session.  Volatile; nothing here
/// survives a reset or a power cycle.
#[derive(Debug, Clone)]
pub struct Session {
    pub armed: bool,
    pub range_distance_mm: u32,
    pub sampler: CycleSampler,
    pub tier_shown: TierFlags,
    /// Set when a run completes.
    pub classification: Option<Classification>,
    /// Report of the most recent cycle.
    pub last_step: Option<CycleStep>,
}

impl Session {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            armed: false,
            range_distance_mm: RangeReading::unknown().distance_mm,
            sampler: CycleSampler::from_config(config),
            tier_shown: TierFlags::new(),
            classification: None,
            last_step: None,
        }
    }

    /// Clear acquisition progress and advisory flags as one block.
    /// `armed` and the last distance are left untouched.
    pub fn reset(&mut self, config: &SystemConfig) {
        self.sampler.reconfigure(SamplerLimits::from_config(config));
        self.tier_shown.clear();
        self.classification = None;
        self.last_step = None;
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    pub inputs: PollInputs,
    pub commands: OutputCommands,
    pub config: SystemConfig,
    pub session: Session,
}

impl FsmContext {
    pub fn new(config: SystemConfig) -> Self {
        let session = Session::new(&config);
        Self {
            inputs: PollInputs::default(),
            commands: OutputCommands::default(),
            config,
            session,
        }
    }

    pub fn in_range(&self) -> bool {
        self.inputs.range.in_range
    }

    pub fn reset_session(&mut self) {
        self.session.reset(&self.config);
    }

    /// Reset and report why.
    pub fn reset_session_for(&mut self, reason: ResetReason) {
        self.reset_session();
        self.commands.emit(AppEvent::SessionReset(reason));
    }
}
