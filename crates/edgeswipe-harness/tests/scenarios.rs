#![forbid(unsafe_code)]

//! End-to-end edge-swipe scenarios on a simulated screen.
//!
//! Each test replays a scripted touch stream through the arbiter, the
//! coordinator, and the host back swipe, ticking 16ms frames in between.
//!
//! Run:
//!   cargo test -p edgeswipe-harness --test scenarios

use edgeswipe_core::{SwipeOptions, SwipeState};
use edgeswipe_harness::{RunReport, SampleKind, SimulatedScreen, TouchScript};
use web_time::Duration;

fn screen() -> SimulatedScreen {
    SimulatedScreen::new(SwipeOptions::default()).unwrap()
}

fn assert_settled(report: &RunReport) {
    let last = report.last().expect("run produced samples");
    assert_eq!(last.state, SwipeState::Idle);
    assert_eq!(last.progress, 0.0);
}

/// Largest progress seen right after a scripted step, before settle frames.
fn max_step_progress(report: &RunReport) -> f32 {
    report
        .samples
        .iter()
        .filter(|s| s.kind == SampleKind::Step)
        .map(|s| s.progress)
        .fold(0.0, f32::max)
}

/// The completion fired on a frame that ended a `Completing` settle, no
/// earlier than `release + open_animation`.
fn assert_completion_after(report: &RunReport, release: Duration) {
    let idx = report
        .samples
        .iter()
        .position(|s| s.completed > 0)
        .expect("a completion fired");
    let sample = report.samples[idx];
    assert_eq!(sample.kind, SampleKind::Frame);
    assert!(
        sample.at >= release + Duration::from_millis(200),
        "fired at {:?}, released at {release:?}",
        sample.at
    );
    let before = report.samples[idx - 1];
    assert_eq!(before.state, SwipeState::Completing);
    assert!(before.progress < 100.0);
}

// ============================================================================
// Scenarios A-E
// ============================================================================

#[test]
fn scenario_a_slow_drag_completes_by_distance() {
    let mut s = screen();
    let script = TouchScript::new()
        .down(10.0, 300.0)
        .drag_to(90.0, 300.0, 8, 800)
        .up();
    let report = s.run(&script);

    assert!(report.tracked());
    assert_eq!(max_step_progress(&report), 80.0);
    assert_eq!(report.completions, 1);
    assert_completion_after(&report, Duration::from_millis(800));
    assert!(s.drawer_open());
    assert!(s.coordinator().is_blocked());
    assert_settled(&report);
}

#[test]
fn scenario_b_fast_flick_completes_by_velocity() {
    let mut s = screen();
    let script = TouchScript::new()
        .down(10.0, 300.0)
        .wait(40)
        .move_to(30.0, 300.0)
        .wait(10)
        .move_to(35.0, 300.0)
        .up();
    let report = s.run(&script);

    assert!(report.tracked());
    assert_eq!(report.completions, 1);
    assert_completion_after(&report, Duration::from_millis(50));
    assert!(s.drawer_open());
}

#[test]
fn scenario_b_flick_with_delayed_lift_completes() {
    let mut s = screen();
    let script = TouchScript::new()
        .down(10.0, 300.0)
        .wait(40)
        .move_to(30.0, 300.0)
        .wait(10)
        .move_to(35.0, 300.0)
        .wait(8)
        .up();
    let report = s.run(&script);

    assert!(report.tracked());
    assert_eq!(report.completions, 1);
    assert_completion_after(&report, Duration::from_millis(58));
    assert!(s.drawer_open());
}

#[test]
fn scenario_b_slow_short_drag_cancels() {
    let mut s = screen();
    let script = TouchScript::new()
        .down(10.0, 300.0)
        .drag_to(35.0, 300.0, 5, 500)
        .up();
    let report = s.run(&script);

    assert!(report.tracked());
    assert_eq!(report.completions, 0);
    assert!(!s.drawer_open());
    assert_settled(&report);
}

#[test]
fn scenario_c_off_edge_start_goes_to_host() {
    let mut s = screen();
    let script = TouchScript::new()
        .down(50.0, 300.0)
        .drag_to(150.0, 300.0, 5, 200)
        .up();
    let report = s.run(&script);

    assert!(!report.tracked());
    assert_eq!(report.max_progress(), 0.0);
    assert!(report.samples.iter().all(|s| s.opacity == 0.0));
    assert_eq!(report.back_swipe_grants, 1);
    assert_eq!(s.back_swipe().releases(), 1);
    assert_eq!(report.completions, 0);
}

#[test]
fn scenario_d_block_mid_gesture_continues_then_gates() {
    let mut s = screen();
    let first = TouchScript::new()
        .down(10.0, 300.0)
        .drag_to(50.0, 300.0, 4, 400)
        .open_drawer()
        .wait(100)
        .move_to(60.0, 300.0)
        .up();
    let report = s.run(&first);
    assert!(
        report
            .samples
            .iter()
            .any(|x| x.kind == SampleKind::Step && x.drawer_open && x.state == SwipeState::Tracking),
        "gesture must keep tracking after the drawer opens"
    );
    assert_eq!(report.max_progress(), 50.0);
    assert_eq!(report.completions, 0);
    assert_settled(&report);

    let swipe = TouchScript::new()
        .wait(50)
        .down(10.0, 300.0)
        .drag_to(90.0, 300.0, 4, 100)
        .up();
    let blocked = s.run(&swipe);
    assert!(!blocked.tracked());
    assert_eq!(blocked.completions, 0);

    s.close_drawer();
    let unblocked = s.run(&swipe);
    assert!(unblocked.tracked());
    assert_eq!(unblocked.completions, 1);
}

#[test]
fn scenario_e_cooldown_restarts_on_repeat_call() {
    let mut s = screen();
    let disabled = TouchScript::new()
        .temporarily_disable(Some(300))
        .wait(100)
        .temporarily_disable(Some(300))
        .wait(250)
        .down(10.0, 300.0)
        .drag_to(80.0, 300.0, 3, 30)
        .up();
    let report = s.run(&disabled);
    assert!(!report.tracked(), "350ms after the first call is still cooling down");
    assert_eq!(s.clock().elapsed(), Duration::from_millis(380));

    let after = TouchScript::new()
        .wait(20)
        .down(10.0, 300.0)
        .drag_to(80.0, 300.0, 3, 30)
        .up();
    let report = s.run(&after);
    assert!(report.tracked(), "cooldown lifts 300ms after the second call");
}

// ============================================================================
// Lifecycle and arbitration
// ============================================================================

#[test]
fn default_cooldown_uses_config() {
    let mut s = screen();
    let script = TouchScript::new()
        .temporarily_disable(None)
        .wait(200)
        .down(10.0, 300.0)
        .drag_to(80.0, 300.0, 2, 20)
        .up();
    assert!(!s.run(&script).tracked());
}

#[test]
fn blur_mid_animation_cancels_completion() {
    let mut s = screen();
    let script = TouchScript::new()
        .down(10.0, 300.0)
        .drag_to(90.0, 300.0, 4, 200)
        .up()
        .wait(100)
        .blur();
    let report = s.run(&script);
    assert_eq!(report.completions, 0);
    assert!(!s.drawer_open());
    assert_settled(&report);
    assert!(!s.coordinator().is_screen_focused());
}

#[test]
fn blur_clears_cooldown_and_focus_restores_gesture() {
    let mut s = screen();
    let script = TouchScript::new()
        .temporarily_disable(Some(1000))
        .wait(50)
        .blur()
        .wait(50)
        .focus()
        .wait(50)
        .down(10.0, 300.0)
        .drag_to(90.0, 300.0, 4, 100)
        .up();
    let report = s.run(&script);
    assert!(report.tracked());
    assert_eq!(report.completions, 1);
}

#[test]
fn blurred_screen_ignores_edge_swipes() {
    let mut s = screen();
    let script = TouchScript::new()
        .blur()
        .down(10.0, 300.0)
        .drag_to(90.0, 300.0, 4, 100)
        .up();
    let report = s.run(&script);
    assert!(!report.tracked());
    assert_eq!(report.back_swipe_grants, 1);
}

#[test]
fn platform_cancel_rolls_back() {
    let mut s = screen();
    let script = TouchScript::new()
        .down(10.0, 300.0)
        .drag_to(95.0, 300.0, 4, 100)
        .cancel();
    let report = s.run(&script);
    assert!(report.tracked());
    assert_eq!(report.completions, 0);
    assert_settled(&report);
}

#[test]
fn armed_stream_yields_to_back_swipe_on_leftward_move() {
    let mut s = screen();
    let script = TouchScript::new()
        .down(25.0, 300.0)
        .wait(16)
        .move_to(10.0, 302.0)
        .wait(16)
        .move_to(2.0, 302.0)
        .up();
    let report = s.run(&script);
    assert!(!report.tracked());
    assert_eq!(report.back_swipe_grants, 1);
    assert_eq!(s.back_swipe().releases(), 1);
}

#[test]
fn tracking_stream_is_never_stolen() {
    let mut s = screen();
    let script = TouchScript::new()
        .down(10.0, 300.0)
        .wait(16)
        .move_to(40.0, 300.0)
        .wait(16)
        .move_to(0.0, 300.0)
        .wait(16)
        .move_to(-30.0, 300.0)
        .up();
    let report = s.run(&script);
    assert!(report.tracked());
    assert_eq!(report.back_swipe_grants, 0);
    assert_eq!(report.completions, 0);
}

#[test]
fn vertical_scroll_in_edge_band_never_tracks() {
    let mut s = screen();
    let script = TouchScript::new()
        .down(10.0, 300.0)
        .drag_to(14.0, 500.0, 6, 200)
        .up();
    let report = s.run(&script);
    assert!(!report.tracked());
    assert_eq!(report.back_swipe_grants, 0);
}

#[test]
fn disabled_screen_hides_indicator() {
    let mut s = SimulatedScreen::new(SwipeOptions::default().enabled(false)).unwrap();
    let script = TouchScript::new()
        .down(10.0, 300.0)
        .drag_to(90.0, 300.0, 4, 100)
        .up();
    let report = s.run(&script);
    assert!(!report.tracked());
    assert!(!s.coordinator().indicator().visible);
}

#[test]
fn indicator_tracks_progress_while_dragging() {
    let mut s = screen();
    let script = TouchScript::new()
        .down(10.0, 300.0)
        .drag_to(60.0, 300.0, 5, 500);
    let report = s.run(&script);
    let last = report.last().unwrap();
    assert_eq!(last.state, SwipeState::Tracking);
    assert_eq!(last.progress, 50.0);
    assert!((last.opacity - 0.3).abs() < 1e-5);
}
