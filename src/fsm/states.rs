//! Concrete state handler functions and table builder.
//!
//! ```text
//!  DISARMED ──[armed]──▶ IDLE ──[in range]──▶ WAITING_FOR_FINGER
//!                         ▲ ▲                    │         │
//!                         │ └────[out of range]──┘    [in range]
//!                         │                              ▼
//!                  [range lost,                       SAMPLING ──(out of range: paused)
//!                   full reset]                          │
//!                         │                       [cycle limit]
//!                         │                              ▼
//!                         └───────────────────────── ANALYZED
//!
//!  Any state ──[disarmed]──▶ DISARMED
//! ```

use super::context::{line, DisplayOp, FsmContext, LineBuf, Surface};
use super::{SessionState, StateDescriptor};
use crate::app::events::{AppEvent, ResetReason};
use crate::classifier::{classify_outcome, Classification};
use crate::sampler::PeriodVerdict;
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; SessionState::COUNT] {
    [
        // Index 0: Disarmed
        StateDescriptor {
            id: SessionState::Disarmed,
            name: "Disarmed",
            on_enter: Some(disarmed_enter),
            on_exit: None,
            on_update: disarmed_update,
        },
        // Index 1: Idle
        StateDescriptor {
            id: SessionState::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 2: WaitingForFinger
        StateDescriptor {
            id: SessionState::WaitingForFinger,
            name: "WaitingForFinger",
            on_enter: Some(waiting_enter),
            on_exit: None,
            on_update: waiting_update,
        },
        // Index 3: Sampling
        StateDescriptor {
            id: SessionState::Sampling,
            name: "Sampling",
            on_enter: Some(sampling_enter),
            on_exit: Some(sampling_exit),
            on_update: sampling_update,
        },
        // Index 4: Analyzed
        StateDescriptor {
            id: SessionState::Analyzed,
            name: "Analyzed",
            on_enter: Some(analyzed_enter),
            on_exit: None,
            on_update: analyzed_update,
        },
    ]
}

const GREETING: &str = "Hello!";
const BRING_FINGER: &str = "Bring your finger to the sensor";
const COME_CLOSER: &str = "Come closer...";
const HOLD_FINGER: &str = "Hold your finger on the sensor";
const REMOVE_FINGER: &str = "Remove your finger to measure again";

// ═══════════════════════════════════════════════════════════════════════════
//  DISARMED
// ═══════════════════════════════════════════════════════════════════════════

fn disarmed_enter(ctx: &mut FsmContext) {
    ctx.reset_session();
    ctx.commands.indicator_on = false;
    for surface in Surface::ALL {
        ctx.commands.display(surface, DisplayOp::Clear);
    }
    ctx.commands.set_visible(false);
    info!("DISARMED: waiting for presence");
}

fn disarmed_update(ctx: &mut FsmContext) -> Option<SessionState> {
    ctx.inputs.armed.then_some(SessionState::Idle)
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE: armed, nobody in range
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    ctx.reset_session();
    ctx.commands.indicator_on = false;
    ctx.commands.set_visible(true);
    ctx.commands.display(Surface::Primary, DisplayOp::Clear);
    ctx.commands.show(Surface::Secondary, 0, GREETING);
    ctx.commands.print_at(Surface::Secondary, 1, BRING_FINGER);
    ctx.commands.scroll_overflow(Surface::Secondary, BRING_FINGER);
    info!("IDLE: armed, nothing in range");
}

fn idle_update(ctx: &mut FsmContext) -> Option<SessionState> {
    if !ctx.inputs.armed {
        return Some(SessionState::Disarmed);
    }
    ctx.in_range().then_some(SessionState::WaitingForFinger)
}

// ═══════════════════════════════════════════════════════════════════════════
//  WAITING_FOR_FINGER
// ═══════════════════════════════════════════════════════════════════════════

fn waiting_enter(ctx: &mut FsmContext) {
    ctx.session.sampler.arm();
    ctx.commands.show(Surface::Secondary, 0, COME_CLOSER);
    ctx.commands.print_at(Surface::Secondary, 1, HOLD_FINGER);
    ctx.commands.scroll_overflow(Surface::Secondary, HOLD_FINGER);
    info!(
        "WAITING: finger at {} mm",
        ctx.inputs.range.distance_mm
    );
}

fn waiting_update(ctx: &mut FsmContext) -> Option<SessionState> {
    if !ctx.inputs.armed {
        return Some(SessionState::Disarmed);
    }
    if ctx.in_range() {
        Some(SessionState::Sampling)
    } else {
        Some(SessionState::Idle)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  SAMPLING: one cycle per poll while in range
// ═══════════════════════════════════════════════════════════════════════════

fn sampling_enter(ctx: &mut FsmContext) {
    ctx.commands.show(Surface::Primary, 0, "Analyzing...");
    ctx.commands.show(Surface::Secondary, 0, "Please wait...");
    ctx.commands.print_at(Surface::Secondary, 1, "Collecting data!");
    info!(
        "SAMPLING: {} cycles, resuming at {}",
        ctx.session.sampler.limits().cycle_limit,
        ctx.session.sampler.cycle_index()
    );
}

fn sampling_exit(ctx: &mut FsmContext) {
    ctx.commands.indicator_on = false;
}

fn sampling_update(ctx: &mut FsmContext) -> Option<SessionState> {
    if !ctx.inputs.armed {
        return Some(SessionState::Disarmed);
    }

    // Out of range: paused, progress kept.
    let sample = ctx.inputs.sample.take()?;
    let step = ctx.session.sampler.step(sample)?;
    ctx.session.last_step = Some(step);
    ctx.commands.indicator_on = step.indicator_on;

    if let Some(PeriodVerdict::Noise { period_ms }) = step.verdict {
        ctx.commands.emit(AppEvent::CycleRejected {
            cycle: step.cycle,
            period_ms,
        });
    }

    let outcome = step.outcome?;
    let classification = classify_outcome(outcome);
    debug!(
        "SAMPLING: complete after {} cycles, {:?}",
        step.cycle, outcome
    );
    ctx.session.classification = Some(classification);
    ctx.commands.emit(AppEvent::SampleCompleted {
        outcome,
        classification,
    });
    Some(SessionState::Analyzed)
}

// ═══════════════════════════════════════════════════════════════════════════
//  ANALYZED: result shown until the finger leaves
// ═══════════════════════════════════════════════════════════════════════════

fn analyzed_enter(ctx: &mut FsmContext) {
    let label = ctx
        .session
        .classification
        .map_or("No data", |c| c.label());
    ctx.commands.show(Surface::Primary, 0, "Analyzed!");
    ctx.commands.print_at(Surface::Primary, 1, status_line(label).as_str());
    present_advisory(ctx);
    ctx.commands.show(Surface::Secondary, 0, REMOVE_FINGER);
    ctx.commands.scroll_overflow(Surface::Secondary, REMOVE_FINGER);
    info!("ANALYZED: {}", label);
}

fn analyzed_update(ctx: &mut FsmContext) -> Option<SessionState> {
    if !ctx.inputs.armed {
        return Some(SessionState::Disarmed);
    }
    if !ctx.in_range() {
        ctx.reset_session_for(ResetReason::RangeLost);
        return Some(SessionState::Idle);
    }
    present_advisory(ctx);
    None
}

fn status_line(label: &str) -> LineBuf {
    let mut text = line("Status: ");
    for c in label.chars() {
        if text.push(c).is_err() {
            break;
        }
    }
    text
}

/// Show the tier advisory the first time the tier is reached in this
/// session.
fn present_advisory(ctx: &mut FsmContext) {
    let Some(Classification::Tier(tier)) = ctx.session.classification else {
        return;
    };
    if !ctx.session.tier_shown.mark_shown(tier) {
        return;
    }

    let [first, second] = tier.advisory();
    ctx.commands.show(Surface::Secondary, 0, first);
    ctx.commands.print_at(Surface::Secondary, 1, second);
    ctx.commands
        .scroll_overflow(Surface::Secondary, longer(first, second));
    ctx.commands.emit(AppEvent::AdvisoryShown(tier));
}

fn longer<'a>(a: &'a str, b: &'a str) -> &'a str {
    if a.chars().count() >= b.chars().count() {
        a
    } else {
        b
    }
}
