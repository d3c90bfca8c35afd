//! Control decisions that sit beside the session FSM: presence arming and
//! enclosure gating.

pub mod enclosure;
pub mod presence;
