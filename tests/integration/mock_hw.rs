//! Mock hardware adapter for integration tests.
//!
//! Scripted sensors (echo time, signal pattern, presence edges) and a
//! recorder for every actuator and display call, so tests can drive the
//! whole poll loop without touching real GPIO.

use std::collections::VecDeque;

use pulsegate::app::events::AppEvent;
use pulsegate::app::ports::{ActuatorPort, DisplayPort, EventSink, SensorPort};
use pulsegate::app::service::AppService;
use pulsegate::config::SystemConfig;
use pulsegate::fsm::context::Surface;

/// Round-trip time that gates to 150 mm with the default speed of sound.
pub const ECHO_150_MM_US: u32 = 882;
/// Round-trip time that gates to 340 mm (out of range).
pub const ECHO_340_MM_US: u32 = 2_000;

// ── Display call record ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCall {
    Clear(Surface),
    Cursor(Surface, u8, u8),
    Print(Surface, String),
    Scroll(Surface, u8),
    Visible(Surface, bool),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    /// Echo returned by every ranging pulse.
    pub echo_us: Option<u32>,
    /// Signal readings replayed in order, then repeated from the start.
    pub signal_pattern: Vec<i32>,
    signal_pos: usize,
    /// Clock advance per signal read (one sampling cycle).
    pub cycle_ms: u64,
    pub now_ms: u64,
    pub pending_edges: u32,
    pub signal_reads: u32,
    pub indicator: bool,
    pub indicator_history: Vec<bool>,
    pub angle: u8,
    pub enclosure_moves: Vec<u8>,
    pub display: Vec<DisplayCall>,
    pub visible: [bool; 2],
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            echo_us: None,
            signal_pattern: vec![0],
            signal_pos: 0,
            cycle_ms: 200,
            now_ms: 0,
            pending_edges: 0,
            signal_reads: 0,
            indicator: false,
            indicator_history: Vec::new(),
            angle: 0,
            enclosure_moves: Vec::new(),
            display: Vec::new(),
            visible: [true; 2],
        }
    }

    /// Finger at 150 mm, alternating 500/0 readings every `cycle_ms`.
    pub fn finger_in_range(cycle_ms: u64) -> Self {
        Self {
            echo_us: Some(ECHO_150_MM_US),
            signal_pattern: vec![500, 0],
            cycle_ms,
            ..Self::new()
        }
    }

    pub fn press_presence(&mut self) {
        self.pending_edges += 1;
    }

    pub fn leave_range(&mut self) {
        self.echo_us = Some(ECHO_340_MM_US);
    }

    pub fn enter_range(&mut self) {
        self.echo_us = Some(ECHO_150_MM_US);
    }

    /// Every text line printed on `surface`, in order.
    pub fn printed(&self, surface: Surface) -> Vec<&str> {
        self.display
            .iter()
            .filter_map(|c| match c {
                DisplayCall::Print(s, text) if *s == surface => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn echo_round_trip_us(&mut self) -> Option<u32> {
        self.echo_us
    }

    fn read_signal(&mut self) -> i32 {
        self.now_ms += self.cycle_ms;
        self.signal_reads += 1;
        let raw = self.signal_pattern[self.signal_pos % self.signal_pattern.len()];
        self.signal_pos += 1;
        raw
    }

    fn take_presence_edges(&mut self) -> u32 {
        std::mem::take(&mut self.pending_edges)
    }

    fn now_ms(&self) -> u64 {
        self.now_ms
    }
}

impl ActuatorPort for MockHardware {
    fn set_indicator(&mut self, on: bool) {
        if self.indicator != on {
            self.indicator_history.push(on);
        }
        self.indicator = on;
    }

    fn move_enclosure(&mut self, angle: u8) {
        self.angle = angle;
        self.enclosure_moves.push(angle);
    }

    fn enclosure_angle(&self) -> u8 {
        self.angle
    }
}

impl DisplayPort for MockHardware {
    fn clear(&mut self, surface: Surface) {
        self.display.push(DisplayCall::Clear(surface));
    }

    fn set_cursor(&mut self, surface: Surface, col: u8, row: u8) {
        self.display.push(DisplayCall::Cursor(surface, col, row));
    }

    fn print_line(&mut self, surface: Surface, text: &str) {
        self.display.push(DisplayCall::Print(surface, text.to_owned()));
    }

    fn scroll_left(&mut self, surface: Surface, steps: u8) {
        self.display.push(DisplayCall::Scroll(surface, steps));
    }

    fn set_visible(&mut self, surface: Surface, visible: bool) {
        self.visible[surface.index()] = visible;
        self.display.push(DisplayCall::Visible(surface, visible));
    }
}

// ── Event recorder ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Helpers ───────────────────────────────────────────────────

/// Started service plus its adapters.
pub fn started(hw: MockHardware) -> (AppService, MockHardware, RecordingSink) {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = hw;
    let mut sink = RecordingSink::new();
    app.start(&mut hw, &mut sink);
    (app, hw, sink)
}

#[allow(dead_code)]
pub fn poll_n(app: &mut AppService, hw: &mut MockHardware, sink: &mut RecordingSink, n: usize) {
    for _ in 0..n {
        app.poll_once(hw, sink);
    }
}
