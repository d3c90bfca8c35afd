//! Interrupt-to-main-loop handoff.
//!
//! The presence sensor is the only producer that runs outside the poll
//! loop.  Its edge ISR must never touch session state directly, so it
//! only bumps a lock-free counter here.  The main loop drains the counter
//! once per poll and applies each pending edge as one toggle.
//!
//! ```text
//! ┌─────────────┐  record_edge()  ┌────────────┐  take()  ┌─────────────┐
//! │ PIR edge ISR│────────────────▶│ EdgeLatch  │─────────▶│  poll_once  │
//! └─────────────┘                 │ (AtomicU32)│          │ (consumer)  │
//!                                 └────────────┘          └─────────────┘
//! ```
//!
//! Counting edges instead of latching a single flag keeps parity: a rapid
//! double toggle between two polls is applied twice, so the armed state
//! ends where the hardware left it.

use core::sync::atomic::{AtomicU32, Ordering};

/// Single-producer / single-consumer edge counter.
#[derive(Debug)]
pub struct EdgeLatch {
    pending: AtomicU32,
}

impl EdgeLatch {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU32::new(0),
        }
    }

    /// Record one edge.  Lock-free: safe to call from interrupt context.
    pub fn record_edge(&self) {
        self.pending.fetch_add(1, Ordering::Release);
    }

    /// Take every edge recorded since the last call.
    pub fn take(&self) -> u32 {
        self.pending.swap(0, Ordering::Acquire)
    }

    /// Edges waiting to be consumed.
    pub fn pending(&self) -> u32 {
        self.pending.load(Ordering::Acquire)
    }
}

impl Default for EdgeLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Edge latch fed by the presence sensor GPIO interrupt.
/// `static` because ISR callbacks cannot capture the adapter.
pub static PRESENCE_EDGES: EdgeLatch = EdgeLatch::new();

/// ISR handler: register this on the presence GPIO rising edge.
pub fn presence_isr_handler() {
    PRESENCE_EDGES.record_edge();
}
