#![forbid(unsafe_code)]

//! Touch-stream arbitration between competing recognizers.
//!
//! Several recognizers usually watch the same finger: the screen's edge
//! swipe, the navigation stack's back swipe, a scroll container. The
//! [`TouchArbiter`] decides which one owns the stream at any moment.
//!
//! # Negotiation
//!
//! Responders are asked in two passes:
//!
//! 1. **Capture**: descending [`priority`](TouchResponder::priority). A claim
//!    here beats every bubble claim.
//! 2. **Bubble**: ascending priority.
//!
//! The first claimant wins. On `Down` the passes use
//! [`wants_start`](TouchResponder::wants_start); on `Move` they use
//! [`wants_move`](TouchResponder::wants_move). While a stream is owned, the
//! owner takes part in the move negotiation too: if it re-claims first,
//! nothing changes. If a rival claims first, the owner is asked
//! [`allows_termination`](TouchResponder::allows_termination); a refusal keeps
//! the stream where it is.
//!
//! # Invariants
//!
//! 1. At most one responder owns the stream.
//! 2. Every grant is eventually matched by exactly one `on_release` or
//!    `on_terminate`, unless the owner is abandoned (see Failure Modes).
//! 3. Responders are identified by their index in the slice passed to
//!    [`dispatch`](TouchArbiter::dispatch); callers must pass the same order
//!    for the lifetime of a stream.
//!
//! # Failure Modes
//!
//! - `Down` while a stream is active (a lost `Up`): the old owner is
//!   terminated before negotiation starts.
//! - `Move`/`Up` with no preceding `Down`: ignored.
//! - The slice shrank mid-stream so the owner's index is out of range: the
//!   owner cannot be reached, so it gets no callback. The arbiter drops
//!   ownership, logs at debug, and reports the index in
//!   [`DispatchOutcome::abandoned`].

use crate::event::{Point, TouchEvent, TouchPhase};
use crate::logging::TARGET_ARBITER;

/// Negotiation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponderPhase {
    /// Root-first pass; claims here pre-empt bubble claims.
    Capture,
    /// Leaf-first pass.
    Bubble,
}

/// The touch that opened a stream, paired with the latest one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchTrack {
    /// The `Down` event.
    pub origin: TouchEvent,
    /// The event being dispatched.
    pub current: TouchEvent,
}

impl TouchTrack {
    /// Horizontal displacement from the origin.
    #[inline]
    #[must_use]
    pub fn dx(&self) -> f32 {
        self.current.position.x - self.origin.position.x
    }

    /// Vertical displacement from the origin.
    #[inline]
    #[must_use]
    pub fn dy(&self) -> f32 {
        self.current.position.y - self.origin.position.y
    }

    /// Where the stream started.
    #[inline]
    #[must_use]
    pub fn start(&self) -> Point {
        self.origin.position
    }
}

/// A participant in touch negotiation (the "pan handlers").
pub trait TouchResponder {
    /// Position in negotiation order. Higher runs earlier in the capture pass.
    fn priority(&self) -> i32 {
        0
    }

    /// Claim the stream on `Down`.
    fn wants_start(&mut self, phase: ResponderPhase, track: &TouchTrack) -> bool;

    /// Claim (or re-claim) the stream on `Move`.
    fn wants_move(&mut self, phase: ResponderPhase, track: &TouchTrack) -> bool;

    /// This responder now owns the stream.
    fn on_grant(&mut self, track: &TouchTrack);

    /// Move delivered to the owner.
    fn on_move(&mut self, track: &TouchTrack);

    /// Finger lifted while this responder owned the stream.
    fn on_release(&mut self, track: &TouchTrack);

    /// Ownership ended without a release.
    fn on_terminate(&mut self, track: &TouchTrack);

    /// Whether a rival may take the stream away.
    fn allows_termination(&self) -> bool {
        true
    }
}

/// What a single dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    /// Index of a responder granted the stream by this event.
    pub granted: Option<usize>,
    /// Index of a responder that lost the stream without a release.
    pub terminated: Option<usize>,
    /// Index of the owner that received `on_release`.
    pub released: Option<usize>,
    /// Index of an owner that refused a takeover.
    pub refused: Option<usize>,
    /// Index of an owner dropped because it was no longer in the slice.
    pub abandoned: Option<usize>,
}

/// Owns the negotiation state for one screen's touch stream.
#[derive(Debug, Default)]
pub struct TouchArbiter {
    origin: Option<TouchEvent>,
    last: Option<TouchEvent>,
    owner: Option<usize>,
}

impl TouchArbiter {
    /// Create an idle arbiter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            origin: None,
            last: None,
            owner: None,
        }
    }

    /// Index of the current owner.
    #[inline]
    #[must_use]
    pub fn owner(&self) -> Option<usize> {
        self.owner
    }

    /// Whether a `Down` has been seen without its `Up`/`Cancel`.
    #[inline]
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.origin.is_some()
    }

    /// Route one event.
    pub fn dispatch(
        &mut self,
        event: &TouchEvent,
        responders: &mut [&mut dyn TouchResponder],
    ) -> DispatchOutcome {
        let mut outcome = DispatchOutcome {
            abandoned: self.drop_stale_owner(responders.len()),
            ..DispatchOutcome::default()
        };

        match event.phase {
            TouchPhase::Down => {
                if self.origin.is_some() {
                    outcome.terminated = self.terminate_owner(responders);
                }
                self.origin = Some(*event);
                self.last = Some(*event);
                let track = TouchTrack {
                    origin: *event,
                    current: *event,
                };
                if let Some(idx) = negotiate(responders, |r, phase| r.wants_start(phase, &track)) {
                    self.grant(idx, &track, responders);
                    outcome.granted = Some(idx);
                }
            }
            TouchPhase::Move => {
                let Some(origin) = self.origin else {
                    return outcome;
                };
                self.last = Some(*event);
                let track = TouchTrack {
                    origin,
                    current: *event,
                };
                let claimant = negotiate(responders, |r, phase| r.wants_move(phase, &track));
                match (self.owner, claimant) {
                    (Some(owner), Some(idx)) if idx != owner => {
                        if responders[owner].allows_termination() {
                            tracing::debug!(
                                target: TARGET_ARBITER,
                                from = owner,
                                to = idx,
                                "stream handed over"
                            );
                            responders[owner].on_terminate(&track);
                            outcome.terminated = Some(owner);
                            self.grant(idx, &track, responders);
                            outcome.granted = Some(idx);
                        } else {
                            tracing::debug!(
                                target: TARGET_ARBITER,
                                owner,
                                claimant = idx,
                                "termination refused"
                            );
                            outcome.refused = Some(owner);
                        }
                    }
                    (None, Some(idx)) => {
                        self.grant(idx, &track, responders);
                        outcome.granted = Some(idx);
                    }
                    _ => {}
                }
                if let Some(owner) = self.owner {
                    responders[owner].on_move(&track);
                }
            }
            TouchPhase::Up => {
                let Some(origin) = self.origin.take() else {
                    return outcome;
                };
                let track = TouchTrack {
                    origin,
                    current: *event,
                };
                if let Some(owner) = self.owner.take() {
                    responders[owner].on_release(&track);
                    outcome.released = Some(owner);
                }
                self.last = None;
            }
            TouchPhase::Cancel => {
                if self.origin.is_some() {
                    self.last = Some(*event);
                    outcome.terminated = self.terminate_owner(responders);
                }
            }
        }
        outcome
    }

    /// Force-terminate the current owner (unmount, teardown).
    pub fn cancel(&mut self, responders: &mut [&mut dyn TouchResponder]) -> Option<usize> {
        self.drop_stale_owner(responders.len());
        self.terminate_owner(responders)
    }

    fn drop_stale_owner(&mut self, len: usize) -> Option<usize> {
        let stale = self.owner.filter(|&i| i >= len)?;
        tracing::debug!(
            target: TARGET_ARBITER,
            owner = stale,
            responders = len,
            "owner out of range, stream abandoned"
        );
        self.owner = None;
        Some(stale)
    }

    fn grant(
        &mut self,
        idx: usize,
        track: &TouchTrack,
        responders: &mut [&mut dyn TouchResponder],
    ) {
        tracing::debug!(
            target: TARGET_ARBITER,
            responder = idx,
            x = track.current.position.x,
            "stream granted"
        );
        self.owner = Some(idx);
        responders[idx].on_grant(track);
    }

    fn terminate_owner(&mut self, responders: &mut [&mut dyn TouchResponder]) -> Option<usize> {
        let origin = self.origin.take();
        let last = self.last.take();
        let owner = self.owner.take()?;
        if let Some(origin) = origin {
            let track = TouchTrack {
                origin,
                current: last.unwrap_or(origin),
            };
            responders[owner].on_terminate(&track);
        }
        Some(owner)
    }
}

/// Run capture (descending priority) then bubble (ascending priority).
fn negotiate(
    responders: &mut [&mut dyn TouchResponder],
    mut wants: impl FnMut(&mut dyn TouchResponder, ResponderPhase) -> bool,
) -> Option<usize> {
    let mut order: Vec<usize> = (0..responders.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(responders[i].priority()));
    for &i in &order {
        if wants(&mut *responders[i], ResponderPhase::Capture) {
            return Some(i);
        }
    }
    order.sort_by_key(|&i| responders[i].priority());
    order
        .into_iter()
        .find(|&i| wants(&mut *responders[i], ResponderPhase::Bubble))
}

#[cfg(test)]
mod tests {
    use super::*;
    use web_time::{Duration, Instant};

    /// Records callbacks; claims according to simple flags.
    #[derive(Default)]
    struct Recorder {
        priority: i32,
        start_phase: Option<ResponderPhase>,
        move_phase: Option<ResponderPhase>,
        min_move_dx: f32,
        locked: bool,
        log: Vec<&'static str>,
    }

    impl TouchResponder for Recorder {
        fn priority(&self) -> i32 {
            self.priority
        }
        fn wants_start(&mut self, phase: ResponderPhase, _track: &TouchTrack) -> bool {
            self.start_phase == Some(phase)
        }
        fn wants_move(&mut self, phase: ResponderPhase, track: &TouchTrack) -> bool {
            self.move_phase == Some(phase) && track.dx() >= self.min_move_dx
        }
        fn on_grant(&mut self, _track: &TouchTrack) {
            self.log.push("grant");
        }
        fn on_move(&mut self, _track: &TouchTrack) {
            self.log.push("move");
        }
        fn on_release(&mut self, _track: &TouchTrack) {
            self.log.push("release");
        }
        fn on_terminate(&mut self, _track: &TouchTrack) {
            self.log.push("terminate");
        }
        fn allows_termination(&self) -> bool {
            !self.locked
        }
    }

    const MS_16: Duration = Duration::from_millis(16);

    #[test]
    fn owner_missing_from_slice_is_abandoned() {
        let mut a = Recorder::default();
        let mut b = Recorder {
            start_phase: Some(ResponderPhase::Capture),
            ..Recorder::default()
        };
        let mut arbiter = TouchArbiter::new();
        let t = Instant::now();
        let out = arbiter.dispatch(&TouchEvent::down(5.0, 5.0, t), &mut [&mut a, &mut b]);
        assert_eq!(out.granted, Some(1));

        let out = arbiter.dispatch(&TouchEvent::moved(40.0, 5.0, t + MS_16), &mut [&mut a]);
        assert_eq!(out.abandoned, Some(1));
        assert_eq!(out.terminated, None);
        assert_eq!(arbiter.owner(), None);
        assert_eq!(b.log, vec!["grant"]);

        let out = arbiter.dispatch(&TouchEvent::up(40.0, 5.0, t + MS_16 * 2), &mut [&mut a]);
        assert_eq!(out.abandoned, None);
        assert_eq!(out.released, None);
        assert!(!arbiter.is_streaming());
    }

    #[test]
    fn capture_beats_bubble_regardless_of_priority() {
        let mut low_capture = Recorder {
            priority: -5,
            start_phase: Some(ResponderPhase::Capture),
            ..Recorder::default()
        };
        let mut high_bubble = Recorder {
            priority: 50,
            start_phase: Some(ResponderPhase::Bubble),
            ..Recorder::default()
        };
        let mut arbiter = TouchArbiter::new();
        let t = Instant::now();
        let out = arbiter.dispatch(
            &TouchEvent::down(5.0, 5.0, t),
            &mut [&mut high_bubble, &mut low_capture],
        );
        assert_eq!(out.granted, Some(1));
        assert_eq!(low_capture.log, vec!["grant"]);
        assert!(high_bubble.log.is_empty());
    }

    #[test]
    fn higher_priority_wins_capture() {
        let mut a = Recorder {
            priority: 1,
            start_phase: Some(ResponderPhase::Capture),
            ..Recorder::default()
        };
        let mut b = Recorder {
            priority: 9,
            start_phase: Some(ResponderPhase::Capture),
            ..Recorder::default()
        };
        let mut arbiter = TouchArbiter::new();
        let out = arbiter.dispatch(&TouchEvent::down(0.0, 0.0, Instant::now()), &mut [&mut a, &mut b]);
        assert_eq!(out.granted, Some(1));
    }

    #[test]
    fn bubble_runs_lowest_priority_first() {
        let mut a = Recorder {
            priority: 1,
            start_phase: Some(ResponderPhase::Bubble),
            ..Recorder::default()
        };
        let mut b = Recorder {
            priority: 9,
            start_phase: Some(ResponderPhase::Bubble),
            ..Recorder::default()
        };
        let mut arbiter = TouchArbiter::new();
        let out = arbiter.dispatch(&TouchEvent::down(0.0, 0.0, Instant::now()), &mut [&mut b, &mut a]);
        assert_eq!(out.granted, Some(1));
    }

    #[test]
    fn release_goes_to_owner() {
        let mut a = Recorder {
            start_phase: Some(ResponderPhase::Capture),
            ..Recorder::default()
        };
        let mut arbiter = TouchArbiter::new();
        let t = Instant::now();
        arbiter.dispatch(&TouchEvent::down(0.0, 0.0, t), &mut [&mut a]);
        arbiter.dispatch(&TouchEvent::moved(4.0, 0.0, t + MS_16), &mut [&mut a]);
        let out = arbiter.dispatch(&TouchEvent::up(4.0, 0.0, t + MS_16 * 2), &mut [&mut a]);
        assert_eq!(out.released, Some(0));
        assert_eq!(a.log, vec!["grant", "move", "release"]);
        assert_eq!(arbiter.owner(), None);
        assert!(!arbiter.is_streaming());
    }

    #[test]
    fn takeover_when_owner_allows() {
        let mut owner = Recorder {
            priority: 10,
            start_phase: Some(ResponderPhase::Capture),
            ..Recorder::default()
        };
        let mut rival = Recorder {
            move_phase: Some(ResponderPhase::Bubble),
            min_move_dx: 10.0,
            ..Recorder::default()
        };
        let mut arbiter = TouchArbiter::new();
        let t = Instant::now();
        arbiter.dispatch(&TouchEvent::down(0.0, 0.0, t), &mut [&mut owner, &mut rival]);
        let out = arbiter.dispatch(
            &TouchEvent::moved(15.0, 0.0, t + MS_16),
            &mut [&mut owner, &mut rival],
        );
        assert_eq!(out.terminated, Some(0));
        assert_eq!(out.granted, Some(1));
        assert_eq!(owner.log, vec!["grant", "terminate"]);
        assert_eq!(rival.log, vec!["grant", "move"]);
    }

    #[test]
    fn locked_owner_refuses_takeover() {
        let mut owner = Recorder {
            priority: 10,
            start_phase: Some(ResponderPhase::Capture),
            locked: true,
            ..Recorder::default()
        };
        let mut rival = Recorder {
            move_phase: Some(ResponderPhase::Capture),
            ..Recorder::default()
        };
        let mut arbiter = TouchArbiter::new();
        let t = Instant::now();
        arbiter.dispatch(&TouchEvent::down(0.0, 0.0, t), &mut [&mut owner, &mut rival]);
        let out = arbiter.dispatch(
            &TouchEvent::moved(30.0, 0.0, t + MS_16),
            &mut [&mut owner, &mut rival],
        );
        assert_eq!(out.refused, Some(0));
        assert_eq!(arbiter.owner(), Some(0));
        assert_eq!(owner.log, vec!["grant", "move"]);
        assert!(rival.log.is_empty());
    }

    #[test]
    fn owner_reclaim_blocks_rival() {
        let mut owner = Recorder {
            priority: 10,
            start_phase: Some(ResponderPhase::Capture),
            move_phase: Some(ResponderPhase::Capture),
            ..Recorder::default()
        };
        let mut rival = Recorder {
            move_phase: Some(ResponderPhase::Bubble),
            ..Recorder::default()
        };
        let mut arbiter = TouchArbiter::new();
        let t = Instant::now();
        arbiter.dispatch(&TouchEvent::down(0.0, 0.0, t), &mut [&mut owner, &mut rival]);
        let out = arbiter.dispatch(
            &TouchEvent::moved(30.0, 0.0, t + MS_16),
            &mut [&mut owner, &mut rival],
        );
        assert_eq!(out, DispatchOutcome::default());
        assert_eq!(arbiter.owner(), Some(0));
    }

    #[test]
    fn unowned_stream_can_be_claimed_on_move() {
        let mut late = Recorder {
            move_phase: Some(ResponderPhase::Bubble),
            min_move_dx: 5.0,
            ..Recorder::default()
        };
        let mut arbiter = TouchArbiter::new();
        let t = Instant::now();
        let out = arbiter.dispatch(&TouchEvent::down(0.0, 0.0, t), &mut [&mut late]);
        assert_eq!(out.granted, None);
        arbiter.dispatch(&TouchEvent::moved(2.0, 0.0, t + MS_16), &mut [&mut late]);
        let out = arbiter.dispatch(&TouchEvent::moved(6.0, 0.0, t + MS_16 * 2), &mut [&mut late]);
        assert_eq!(out.granted, Some(0));
        assert_eq!(late.log, vec!["grant", "move"]);
    }

    #[test]
    fn cancel_event_terminates_owner() {
        let mut a = Recorder {
            start_phase: Some(ResponderPhase::Capture),
            ..Recorder::default()
        };
        let mut arbiter = TouchArbiter::new();
        let t = Instant::now();
        arbiter.dispatch(&TouchEvent::down(0.0, 0.0, t), &mut [&mut a]);
        let out = arbiter.dispatch(&TouchEvent::cancel(0.0, 0.0, t + MS_16), &mut [&mut a]);
        assert_eq!(out.terminated, Some(0));
        assert_eq!(a.log, vec!["grant", "terminate"]);
        assert!(!arbiter.is_streaming());
    }

    #[test]
    fn forced_cancel_terminates_owner() {
        let mut a = Recorder {
            start_phase: Some(ResponderPhase::Capture),
            ..Recorder::default()
        };
        let mut arbiter = TouchArbiter::new();
        arbiter.dispatch(&TouchEvent::down(0.0, 0.0, Instant::now()), &mut [&mut a]);
        assert_eq!(arbiter.cancel(&mut [&mut a]), Some(0));
        assert_eq!(arbiter.cancel(&mut [&mut a]), None);
        assert_eq!(a.log, vec!["grant", "terminate"]);
    }

    #[test]
    fn down_during_stream_terminates_previous_owner() {
        let mut a = Recorder {
            start_phase: Some(ResponderPhase::Capture),
            ..Recorder::default()
        };
        let mut arbiter = TouchArbiter::new();
        let t = Instant::now();
        arbiter.dispatch(&TouchEvent::down(0.0, 0.0, t), &mut [&mut a]);
        let out = arbiter.dispatch(&TouchEvent::down(3.0, 3.0, t + MS_16), &mut [&mut a]);
        assert_eq!(out.terminated, Some(0));
        assert_eq!(out.granted, Some(0));
        assert_eq!(a.log, vec!["grant", "terminate", "grant"]);
    }

    #[test]
    fn stray_move_and_up_ignored() {
        let mut a = Recorder {
            move_phase: Some(ResponderPhase::Capture),
            ..Recorder::default()
        };
        let mut arbiter = TouchArbiter::new();
        let t = Instant::now();
        let out = arbiter.dispatch(&TouchEvent::moved(10.0, 0.0, t), &mut [&mut a]);
        assert_eq!(out, DispatchOutcome::default());
        let out = arbiter.dispatch(&TouchEvent::up(10.0, 0.0, t), &mut [&mut a]);
        assert_eq!(out, DispatchOutcome::default());
        assert!(a.log.is_empty());
    }
}
