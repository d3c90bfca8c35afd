//! Presence toggle, range gating and enclosure behaviour through the
//! full poll loop.

use crate::mock_hw::{poll_n, started, MockHardware};

use pulsegate::app::commands::AppCommand;
use pulsegate::app::events::{AppEvent, ResetReason};
use pulsegate::fsm::SessionState;

#[test]
fn disarmed_system_ignores_range_and_signal() {
    let (mut app, mut hw, mut sink) = started(MockHardware::finger_in_range(200));
    poll_n(&mut app, &mut hw, &mut sink, 10);

    assert_eq!(app.current_state(), SessionState::Disarmed);
    assert!(!app.is_armed());
    assert_eq!(hw.signal_reads, 0);
    assert_eq!(hw.angle, 0);
    assert_eq!(hw.visible, [false; 2]);
    assert_eq!(app.poll_count(), 10);
}

#[test]
fn first_edge_arms_and_shows_displays() {
    let (mut app, mut hw, mut sink) = started(MockHardware::new());
    hw.press_presence();
    app.poll_once(&mut hw, &mut sink);

    assert!(app.is_armed());
    assert_eq!(app.current_state(), SessionState::Idle);
    assert_eq!(hw.visible, [true; 2]);
    assert!(sink.events.contains(&AppEvent::PresenceChanged { armed: true }));
    assert!(sink.events.contains(&AppEvent::StateChanged {
        from: SessionState::Disarmed,
        to: SessionState::Idle,
    }));
}

#[test]
fn toggle_mid_run_discards_progress() {
    let (mut app, mut hw, mut sink) = started(MockHardware::finger_in_range(200));
    hw.press_presence();
    poll_n(&mut app, &mut hw, &mut sink, 2 + 23);
    assert_eq!(app.snapshot().cycle_index, 23);

    hw.press_presence();
    app.poll_once(&mut hw, &mut sink);

    assert_eq!(app.current_state(), SessionState::Disarmed);
    let snap = app.snapshot();
    assert_eq!(snap.cycle_index, 0);
    assert_eq!(snap.accumulator_ms, 0.0);
    assert_eq!(snap.valid_cycles, 0);
    assert!(!snap.indicator_on);
    assert!(!hw.indicator);
    assert_eq!(hw.angle, 0, "enclosure retracts on toggle");
    assert_eq!(hw.visible, [false; 2]);
    assert!(sink
        .events
        .contains(&AppEvent::SessionReset(ResetReason::PresenceToggle)));
}

#[test]
fn double_edge_in_one_poll_rearms_with_a_fresh_run() {
    let (mut app, mut hw, mut sink) = started(MockHardware::finger_in_range(200));
    hw.press_presence();
    poll_n(&mut app, &mut hw, &mut sink, 2 + 23);
    sink.events.clear();

    hw.press_presence();
    hw.press_presence();
    app.poll_once(&mut hw, &mut sink);

    assert!(app.is_armed());
    assert_eq!(app.snapshot().cycle_index, 0);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::SessionReset(ResetReason::PresenceToggle))),
        2
    );
    // Re-armed with the finger still in range: straight back to waiting.
    assert_eq!(app.current_state(), SessionState::WaitingForFinger);
}

#[test]
fn rearming_starts_the_run_over() {
    let (mut app, mut hw, mut sink) = started(MockHardware::finger_in_range(200));
    hw.press_presence();
    poll_n(&mut app, &mut hw, &mut sink, 2 + 23);
    hw.press_presence();
    app.poll_once(&mut hw, &mut sink);
    let reads_before = hw.signal_reads;

    hw.press_presence();
    poll_n(&mut app, &mut hw, &mut sink, 52);

    assert_eq!(app.current_state(), SessionState::Analyzed);
    assert_eq!(hw.signal_reads - reads_before, 50);
}

#[test]
fn enclosure_opens_in_range_and_closes_out_of_range() {
    let (mut app, mut hw, mut sink) = started(MockHardware::finger_in_range(200));
    hw.press_presence();
    app.poll_once(&mut hw, &mut sink);
    assert_eq!(hw.angle, 90);

    // Already open: no further move while in range.
    poll_n(&mut app, &mut hw, &mut sink, 5);
    assert_eq!(hw.enclosure_moves, vec![90]);

    hw.leave_range();
    poll_n(&mut app, &mut hw, &mut sink, 3);
    assert_eq!(hw.enclosure_moves, vec![90, 0]);
    assert!(sink.events.contains(&AppEvent::EnclosureMoved { angle: 0 }));
}

#[test]
fn waiting_falls_back_to_idle_when_finger_leaves() {
    let (mut app, mut hw, mut sink) = started(MockHardware::finger_in_range(200));
    hw.press_presence();
    app.poll_once(&mut hw, &mut sink);
    assert_eq!(app.current_state(), SessionState::WaitingForFinger);

    hw.leave_range();
    app.poll_once(&mut hw, &mut sink);
    assert_eq!(app.current_state(), SessionState::Idle);
    assert!(sink.events.contains(&AppEvent::RangeChanged {
        in_range: false,
        distance_mm: 340,
    }));
}

#[test]
fn reset_command_is_idempotent() {
    let (mut app, mut hw, mut sink) = started(MockHardware::finger_in_range(200));
    hw.press_presence();
    poll_n(&mut app, &mut hw, &mut sink, 2 + 10);

    app.handle_command(AppCommand::ResetSession, &mut hw, &mut sink);
    let first = app.snapshot();
    app.handle_command(AppCommand::ResetSession, &mut hw, &mut sink);
    let second = app.snapshot();

    assert_eq!(first, second);
    assert_eq!(first.cycle_index, 0);
    assert_eq!(first.state, SessionState::Idle);
    assert!(first.armed);
}

#[test]
fn presence_command_matches_interrupt_edge() {
    let (mut app, mut hw, mut sink) = started(MockHardware::new());
    app.handle_command(AppCommand::PresenceToggle, &mut hw, &mut sink);
    assert!(app.is_armed());
    app.handle_command(AppCommand::PresenceToggle, &mut hw, &mut sink);
    assert!(!app.is_armed());
    assert_eq!(app.current_state(), SessionState::Disarmed);
}
