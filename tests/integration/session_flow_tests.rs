//! End-to-end session tests: presence → range gate → sampling → result.
//!
//! Drive the full `AppService::poll_once` pipeline against scripted
//! hardware and assert on states, events and what reached the displays.

use crate::mock_hw::{poll_n, started, MockHardware, RecordingSink};

use pulsegate::app::events::{AppEvent, ResetReason};
use pulsegate::app::service::AppService;
use pulsegate::classifier::{Classification, RiskTier};
use pulsegate::fsm::context::Surface;
use pulsegate::fsm::SessionState;

/// Polls from arming to a completed 50-cycle run: one to reach
/// WaitingForFinger, one to enter Sampling, then one per cycle.
const POLLS_TO_RESULT: usize = 52;

fn run_to_result(cycle_ms: u64) -> (AppService, MockHardware, RecordingSink) {
    let (mut app, mut hw, mut sink) = started(MockHardware::finger_in_range(cycle_ms));
    hw.press_presence();
    poll_n(&mut app, &mut hw, &mut sink, POLLS_TO_RESULT);
    (app, hw, sink)
}

// ── Happy path ────────────────────────────────────────────────

#[test]
fn finger_at_150mm_with_200ms_period_is_danger() {
    let (app, hw, sink) = run_to_result(200);

    assert_eq!(app.current_state(), SessionState::Analyzed);
    assert_eq!(app.current_tier(), Some(RiskTier::Danger));
    assert_eq!(hw.signal_reads, 50);

    let snap = app.snapshot();
    assert_eq!(snap.cycle_index, 50);
    assert_eq!(snap.valid_cycles, 25);
    assert_eq!(snap.averaged_period_ms, Some(200.0));
    assert_eq!(snap.distance_mm, 150);
    let last = snap.last_cycle.expect("cycle recorded");
    assert_eq!(last.cycle, 50);
    assert!(!last.is_high);
    assert!(last.outcome.is_some());
    assert!(snap.tier_shown[RiskTier::Danger.index()]);

    let primary = hw.printed(Surface::Primary);
    assert!(primary.contains(&"Analyzed!"));
    assert!(primary.contains(&"Status: Danger"));
    assert!(sink.events.contains(&AppEvent::AdvisoryShown(RiskTier::Danger)));
}

#[test]
fn each_tier_is_reached_by_its_period() {
    for (cycle_ms, tier) in [
        (300, RiskTier::Normal),
        (260, RiskTier::Good),
        (230, RiskTier::Alert),
        (150, RiskTier::Danger),
    ] {
        let (app, _hw, _sink) = run_to_result(cycle_ms);
        assert_eq!(app.current_tier(), Some(tier), "period {cycle_ms} ms");
    }
}

#[test]
fn sampling_arms_the_display_sequence() {
    let (mut app, mut hw, mut sink) = started(MockHardware::finger_in_range(200));
    hw.press_presence();
    app.poll_once(&mut hw, &mut sink);
    assert_eq!(app.current_state(), SessionState::WaitingForFinger);
    assert_eq!(hw.angle, 90, "enclosure opens when the finger is in range");

    app.poll_once(&mut hw, &mut sink);
    assert_eq!(app.current_state(), SessionState::Sampling);
    assert_eq!(hw.signal_reads, 0, "entering sampling takes no sample");

    let secondary = hw.printed(Surface::Secondary);
    assert!(secondary.contains(&"Hello!"));
    assert!(secondary.contains(&"Come closer..."));
    assert!(secondary.contains(&"Collecting data!"));
}

#[test]
fn indicator_follows_high_low_cycles_and_ends_off() {
    let (app, hw, _sink) = run_to_result(200);
    assert!(!hw.indicator);
    assert!(!app.snapshot().indicator_on);
    // 25 rising + 25 falling transitions.
    assert_eq!(hw.indicator_history.len(), 50);
    assert_eq!(hw.indicator_history.first(), Some(&true));
}

// ── Advisory bookkeeping ──────────────────────────────────────

#[test]
fn advisory_is_shown_once_while_result_is_held() {
    let (mut app, mut hw, mut sink) = run_to_result(200);
    poll_n(&mut app, &mut hw, &mut sink, 20);

    assert_eq!(app.current_state(), SessionState::Analyzed);
    assert_eq!(app.snapshot().ticks_in_state, 20);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::AdvisoryShown(_))),
        1
    );
    assert!(app.snapshot().tier_shown[RiskTier::Danger.index()]);
    assert_eq!(hw.signal_reads, 50, "no sampling after completion");
}

#[test]
fn range_lost_after_result_resets_the_session() {
    let (mut app, mut hw, mut sink) = run_to_result(200);
    hw.leave_range();
    app.poll_once(&mut hw, &mut sink);

    assert_eq!(app.current_state(), SessionState::Idle);
    assert!(sink
        .events
        .contains(&AppEvent::SessionReset(ResetReason::RangeLost)));
    let snap = app.snapshot();
    assert_eq!(snap.cycle_index, 0);
    assert_eq!(snap.valid_cycles, 0);
    assert_eq!(snap.accumulator_ms, 0.0);
    assert_eq!(snap.classification, None);
    assert_eq!(snap.last_cycle, None);
    assert_eq!(snap.tier_shown, [false; 4]);
    assert_eq!(hw.angle, 0, "enclosure closes when the finger leaves");
}

#[test]
fn second_run_after_reset_shows_advisory_again() {
    let (mut app, mut hw, mut sink) = run_to_result(200);
    hw.leave_range();
    app.poll_once(&mut hw, &mut sink);
    hw.enter_range();
    poll_n(&mut app, &mut hw, &mut sink, POLLS_TO_RESULT);

    assert_eq!(app.current_tier(), Some(RiskTier::Danger));
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::AdvisoryShown(RiskTier::Danger))),
        2
    );
}

// ── Degenerate runs ───────────────────────────────────────────

#[test]
fn all_noise_cycles_give_insufficient_data() {
    let (app, hw, sink) = run_to_result(1_200);

    assert_eq!(app.current_state(), SessionState::Analyzed);
    assert_eq!(
        app.current_classification(),
        Some(Classification::InsufficientData)
    );
    assert_eq!(app.current_tier(), None);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::CycleRejected { .. })),
        25
    );
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::AdvisoryShown(_))),
        0
    );
    assert!(hw.printed(Surface::Primary).contains(&"Status: No data"));
}

#[test]
fn period_above_normal_is_reported_above_range() {
    let (app, _hw, _sink) = run_to_result(400);
    assert_eq!(
        app.current_classification(),
        Some(Classification::AboveRange { period_ms: 400.0 })
    );
    assert_eq!(app.snapshot().tier_shown, [false; 4]);
}

const REMOVE_FINGER: &str = "Remove your finger to measure again";

#[test]
fn results_outside_the_tiers_still_prompt_for_a_new_reading() {
    for cycle_ms in [400, 1_200] {
        let (mut app, mut hw, mut sink) = run_to_result(cycle_ms);
        poll_n(&mut app, &mut hw, &mut sink, 5);

        assert_eq!(app.current_tier(), None, "period {cycle_ms} ms");
        let secondary = hw.printed(Surface::Secondary);
        assert_eq!(secondary.last(), Some(&REMOVE_FINGER));
        assert_eq!(
            secondary.iter().filter(|l| **l == REMOVE_FINGER).count(),
            1,
            "prompt shown once per result"
        );
    }
}

#[test]
fn tier_result_shows_advisory_then_prompt() {
    let (_app, hw, _sink) = run_to_result(200);
    let secondary = hw.printed(Surface::Secondary);
    let n = secondary.len();
    assert_eq!(
        &secondary[n - 3..],
        &["Not good at all, we recommend", "that you see a doctor!", REMOVE_FINGER]
    );
}

#[test]
fn steady_low_signal_never_completes_a_period() {
    let mut hw = MockHardware::finger_in_range(200);
    hw.signal_pattern = vec![0];
    let (mut app, mut hw, mut sink) = started(hw);
    hw.press_presence();
    poll_n(&mut app, &mut hw, &mut sink, POLLS_TO_RESULT);

    // Every low reading closes against the run's zero start time:
    // 200, 400, 600 and 800 ms are kept, 1000 ms onwards is noise.
    assert_eq!(app.current_state(), SessionState::Analyzed);
    assert_eq!(app.snapshot().valid_cycles, 4);
    assert_eq!(
        app.current_classification(),
        Some(Classification::AboveRange { period_ms: 500.0 })
    );
}

// ── Range pauses ──────────────────────────────────────────────

#[test]
fn leaving_range_mid_run_pauses_and_keeps_progress() {
    let (mut app, mut hw, mut sink) = started(MockHardware::finger_in_range(200));
    hw.press_presence();
    poll_n(&mut app, &mut hw, &mut sink, 2 + 20);
    assert_eq!(app.snapshot().cycle_index, 20);

    hw.leave_range();
    poll_n(&mut app, &mut hw, &mut sink, 10);
    assert_eq!(app.current_state(), SessionState::Sampling);
    assert_eq!(app.snapshot().cycle_index, 20);
    assert_eq!(hw.signal_reads, 20);
    assert_eq!(hw.angle, 0);

    hw.enter_range();
    poll_n(&mut app, &mut hw, &mut sink, 30);
    assert_eq!(app.current_state(), SessionState::Analyzed);
    assert_eq!(hw.signal_reads, 50);
    assert_eq!(app.current_tier(), Some(RiskTier::Danger));
}

#[test]
fn no_echo_reads_as_out_of_range() {
    let mut hw = MockHardware::finger_in_range(200);
    hw.echo_us = None;
    let (mut app, mut hw, mut sink) = started(hw);
    hw.press_presence();
    poll_n(&mut app, &mut hw, &mut sink, 5);

    assert_eq!(app.current_state(), SessionState::Idle);
    assert!(!app.snapshot().in_range);
    assert_eq!(hw.signal_reads, 0);
}
