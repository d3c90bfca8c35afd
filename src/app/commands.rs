//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (interrupt
//! handoff, serial console, tests) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::config::SystemConfig;

#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Apply one presence edge; same path as the interrupt latch.
    PresenceToggle,

    /// Full session reset, back to `Idle` when armed.
    ResetSession,

    /// Hot-reload configuration.  Invalid configs are rejected.
    UpdateConfig(SystemConfig),
}
