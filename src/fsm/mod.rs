//! Function-pointer finite state machine engine for the measuring session.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                      │
//! │  ┌──────────────────┬──────────┬──────────┬───────────────────┐  │
//! │  │ SessionState     │ on_enter │ on_exit  │ on_update         │  │
//! │  ├──────────────────┼──────────┼──────────┼───────────────────┤  │
//! │  │ Disarmed         │ fn(ctx)  │    -     │ fn(ctx)->Option<> │  │
//! │  │ Idle             │ fn(ctx)  │    -     │ fn(ctx)->Option<> │  │
//! │  │ WaitingForFinger │ fn(ctx)  │    -     │ fn(ctx)->Option<> │  │
//! │  │ Sampling         │ fn(ctx)  │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ Analyzed         │ fn(ctx)  │    -     │ fn(ctx)->Option<> │  │
//! │  └──────────────────┴──────────┴──────────┴───────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each poll the engine calls `on_update` for the **current** state.
//! If it returns `Some(next)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the
//! current pointer.  Handlers only touch [`FsmContext`]; hardware is
//! driven afterwards by the service from the queued output commands.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all session states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SessionState {
    Disarmed = 0,
    Idle = 1,
    WaitingForFinger = 2,
    Sampling = 3,
    Analyzed = 4,
}

impl SessionState {
    /// Total number of states: used to size the table array.
    pub const COUNT: usize = 5;

    pub const ALL: [SessionState; Self::COUNT] = [
        Self::Disarmed,
        Self::Idle,
        Self::WaitingForFinger,
        Self::Sampling,
        Self::Analyzed,
    ];

    /// Convert an index back to `SessionState`.  Debug builds assert on
    /// out-of-range; release builds fall back to `Disarmed`.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Disarmed,
            1 => Self::Idle,
            2 => Self::WaitingForFinger,
            3 => Self::Sampling,
            4 => Self::Analyzed,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Disarmed
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Disarmed => "Disarmed",
            Self::Idle => "Idle",
            Self::WaitingForFinger => "WaitingForFinger",
            Self::Sampling => "Sampling",
            Self::Analyzed => "Analyzed",
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-poll update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<SessionState>;

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: SessionState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `SessionState as usize`.
    table: [StateDescriptor; SessionState::COUNT],
    current: usize,
    tick_count: u64,
    state_entry_tick: u64,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; SessionState::COUNT], initial: SessionState) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one poll.
    pub fn tick(&mut self, ctx: &mut FsmContext) {
        self.tick_count = self.tick_count.wrapping_add(1);

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Force an immediate transition regardless of what `on_update` would
    /// return.  A no-op when already in `next`.
    pub fn force_transition(&mut self, next: SessionState, ctx: &mut FsmContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// Leave the current state and re-enter `next` even if it is the
    /// current state, so its `on_enter` runs again.
    pub fn reenter(&mut self, next: SessionState, ctx: &mut FsmContext) {
        self.transition(next, ctx);
    }

    pub fn current_state(&self) -> SessionState {
        SessionState::from_index(self.current)
    }

    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count.wrapping_sub(self.state_entry_tick)
    }

    fn transition(&mut self, next_id: SessionState, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_tick = self.tick_count;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
