//! Presence controller: armed/disarmed toggle driven by the PIR edge.
//!
//! Every edge flips the armed state unconditionally.  The caller performs
//! the full session reset and actuator retraction that accompany each
//! flip; this type only tracks the level and counts transitions.

use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceTransition {
    pub armed: bool,
    /// Total toggles applied since boot.
    pub toggles: u32,
}

#[derive(Debug, Default)]
pub struct PresenceController {
    armed: bool,
    toggles: u32,
}

impl PresenceController {
    pub const fn new() -> Self {
        Self {
            armed: false,
            toggles: 0,
        }
    }

    /// Apply one edge.
    pub fn toggle(&mut self) -> PresenceTransition {
        self.armed = !self.armed;
        self.toggles = self.toggles.wrapping_add(1);
        info!(
            "PRESENCE: {} (toggle #{})",
            if self.armed { "armed" } else { "disarmed" },
            self.toggles
        );
        PresenceTransition {
            armed: self.armed,
            toggles: self.toggles,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}
