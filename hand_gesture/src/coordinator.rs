//! Interaction state coordinator.
//!
//! A synchronous reducer over the per-frame gesture stream.  It owns the
//! application [`InteractionMode`] and the photo focus index and is their
//! only writer.
//!
//! Mode changes are level-triggered (re-evaluated on every sample); the
//! focus advance is edge-triggered on the rising edge of `PINCH`, using the
//! previous sample's label kept in the state record.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::GestureLabel;

// ════════════════════════════════════════════════════════════════════════════
// InteractionMode
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionMode {
    /// Elements scattered; hand position steers the view.
    Chaos,
    /// Elements assembled into the tree.
    #[default]
    Formed,
    /// One photo pulled to centre stage.
    PhotoView,
}

impl InteractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chaos     => "CHAOS",
            Self::Formed    => "FORMED",
            Self::PhotoView => "PHOTO_VIEW",
        }
    }

    /// HUD caption.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Chaos     => "MAGIC SCATTERED",
            Self::Formed    => "TREE ASSEMBLED",
            Self::PhotoView => "MEMORY VIEW",
        }
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Transition — the outcome of one step
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub gesture:        GestureLabel,
    pub from:           InteractionMode,
    pub to:             InteractionMode,
    pub focus_index:    usize,
    pub focus_advanced: bool,
}

impl Transition {
    pub fn mode_changed(&self) -> bool { self.from != self.to }

    /// True when the step changed anything a renderer cares about.
    pub fn is_effective(&self) -> bool { self.mode_changed() || self.focus_advanced }
}

// ════════════════════════════════════════════════════════════════════════════
// CoordinatorState — the pure step
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CoordinatorState {
    pub mode:         InteractionMode,
    pub last_gesture: GestureLabel,
    pub focus_index:  usize,
}

impl Default for CoordinatorState {
    fn default() -> Self {
        CoordinatorState {
            mode:         InteractionMode::Formed,
            last_gesture: GestureLabel::None,
            focus_index:  0,
        }
    }
}

impl CoordinatorState {
    /// Compute the next state for one gesture sample.
    ///
    /// `photo_count == 0` suppresses both the switch into `PHOTO_VIEW` and
    /// the focus advance.
    pub fn advance(self, gesture: GestureLabel, photo_count: usize) -> (CoordinatorState, Transition) {
        use GestureLabel as G;
        use InteractionMode as M;

        let mode = match (gesture, self.mode) {
            (G::Fist, _)                        => M::Formed,
            (G::OpenPalm, _)                    => M::Chaos,
            (G::Pinch, _) if photo_count > 0    => M::PhotoView,
            (G::None, M::PhotoView)             => M::Chaos,
            (_, current)                        => current,
        };

        let rising_pinch = gesture == G::Pinch && self.last_gesture != G::Pinch;
        let focus_advanced = rising_pinch && photo_count > 0;
        let focus_index = if focus_advanced {
            (self.focus_index + 1) % photo_count
        } else {
            self.focus_index
        };

        let next = CoordinatorState { mode, last_gesture: gesture, focus_index };
        let transition = Transition {
            gesture,
            from: self.mode,
            to: mode,
            focus_index,
            focus_advanced,
        };
        (next, transition)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Coordinator — state + photo count + subscribers
// ════════════════════════════════════════════════════════════════════════════

/// Single-writer owner of the interaction state.
///
/// Not meant to be shared between threads: feed it one sample at a time
/// from the loop that receives frames.
#[derive(Debug, Default)]
pub struct Coordinator {
    state:       CoordinatorState,
    photo_count: usize,
    subscribers: Vec<Sender<Transition>>,
}

impl Coordinator {
    pub fn new() -> Self { Coordinator::default() }

    /// Constraint supplied by the renderer; changes only when the photo
    /// collection changes.
    pub fn set_photo_count(&mut self, count: usize) {
        if count != self.photo_count {
            debug!(from = self.photo_count, to = count, "photo count changed");
        }
        self.photo_count = count;
    }

    /// Feed one gesture sample.
    pub fn observe(&mut self, gesture: GestureLabel) -> Transition {
        let (next, t) = self.state.advance(gesture, self.photo_count);
        self.state = next;

        if t.mode_changed() {
            debug!(%gesture, from = %t.from, to = %t.to, "mode changed");
        }
        if t.focus_advanced {
            debug!(focus = t.focus_index, photos = self.photo_count, "focus advanced");
        }
        if t.is_effective() {
            self.subscribers.retain(|tx| tx.send(t).is_ok());
        }
        t
    }

    /// Receive every transition that changes mode or focus.
    pub fn subscribe(&mut self) -> Receiver<Transition> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn state(&self)        -> CoordinatorState  { self.state }
    pub fn mode(&self)         -> InteractionMode   { self.state.mode }
    pub fn focus_index(&self)  -> usize             { self.state.focus_index }
    pub fn photo_count(&self)  -> usize             { self.photo_count }

    /// The focus index, if it points at an existing photo.
    pub fn focused_photo(&self) -> Option<usize> {
        (self.state.focus_index < self.photo_count).then_some(self.state.focus_index)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use GestureLabel::*;

    fn with_photos(n: usize) -> Coordinator {
        let mut c = Coordinator::new();
        c.set_photo_count(n);
        c
    }

    fn feed(c: &mut Coordinator, seq: &[GestureLabel]) -> Vec<Transition> {
        seq.iter().map(|&g| c.observe(g)).collect()
    }

    #[test]
    fn starts_formed_at_focus_zero() {
        let c = Coordinator::new();
        assert_eq!(c.mode(), InteractionMode::Formed);
        assert_eq!(c.focus_index(), 0);
        assert_eq!(c.state().last_gesture, None);
    }

    #[test]
    fn pinch_run_advances_focus_once_per_edge() {
        let mut c = with_photos(3);
        let ts = feed(&mut c, &[Pinch, Pinch, Pinch, None, Pinch]);
        let advanced: Vec<bool> = ts.iter().map(|t| t.focus_advanced).collect();
        assert_eq!(advanced, vec![true, false, false, false, true]);
        assert_eq!(c.focus_index(), 2);
    }

    #[test]
    fn focus_wraps_around() {
        let mut c = with_photos(2);
        feed(&mut c, &[Pinch, None, Pinch, None, Pinch]);
        assert_eq!(c.focus_index(), 1);
    }

    #[test]
    fn fist_when_formed_is_idempotent() {
        let mut c = with_photos(1);
        for t in feed(&mut c, &[Fist, Fist, Fist]) {
            assert!(!t.is_effective());
            assert_eq!(t.to, InteractionMode::Formed);
        }
    }

    #[test]
    fn open_palm_scatters_and_fist_reforms() {
        let mut c = Coordinator::new();
        let t = c.observe(OpenPalm);
        assert!(t.mode_changed());
        assert_eq!(c.mode(), InteractionMode::Chaos);
        c.observe(Fist);
        assert_eq!(c.mode(), InteractionMode::Formed);
    }

    #[test]
    fn zero_photos_ignores_pinch() {
        let mut c = Coordinator::new();
        feed(&mut c, &[Pinch, None, Pinch, Pinch]);
        assert_eq!(c.mode(), InteractionMode::Formed);
        assert_eq!(c.focus_index(), 0);

        c.observe(OpenPalm);
        feed(&mut c, &[Pinch, Pinch]);
        assert_eq!(c.mode(), InteractionMode::Chaos);
        assert_eq!(c.focus_index(), 0);
    }

    #[test]
    fn zero_photos_pinch_holds_photo_view() {
        let viewing = CoordinatorState {
            mode:         InteractionMode::PhotoView,
            last_gesture: None,
            focus_index:  1,
        };
        let (next, t) = viewing.advance(Pinch, 0);
        assert_eq!(next.mode, InteractionMode::PhotoView);
        assert_eq!(next.focus_index, 1);
        assert_eq!(next.last_gesture, Pinch);
        assert!(!t.mode_changed());
        assert!(!t.focus_advanced);
    }

    #[test]
    fn losing_hand_in_photo_view_scatters() {
        let mut c = with_photos(4);
        c.observe(Pinch);
        assert_eq!(c.mode(), InteractionMode::PhotoView);
        let t = c.observe(None);
        assert_eq!((t.from, t.to), (InteractionMode::PhotoView, InteractionMode::Chaos));
    }

    #[test]
    fn none_outside_photo_view_keeps_mode() {
        let mut c = Coordinator::new();
        c.observe(None);
        assert_eq!(c.mode(), InteractionMode::Formed);
        c.observe(OpenPalm);
        c.observe(None);
        assert_eq!(c.mode(), InteractionMode::Chaos);
    }

    #[test]
    fn pinch_after_other_gesture_is_a_rising_edge() {
        let mut c = with_photos(5);
        let ts = feed(&mut c, &[Pinch, Fist, Pinch]);
        assert!(ts[0].focus_advanced);
        assert!(ts[2].focus_advanced);
        assert_eq!(c.mode(), InteractionMode::PhotoView);
        assert_eq!(c.focus_index(), 2);
    }

    #[test]
    fn pinch_held_while_photos_arrive_does_not_fire() {
        let mut c = Coordinator::new();
        c.observe(Pinch);
        c.set_photo_count(2);
        let t = c.observe(Pinch);
        // Mode follows the level, focus needs an edge.
        assert_eq!(t.to, InteractionMode::PhotoView);
        assert!(!t.focus_advanced);
    }

    #[test]
    fn pure_advance_matches_coordinator() {
        let seq = [OpenPalm, Pinch, Pinch, None, Fist, Pinch, None];
        let mut c = with_photos(3);
        let mut s = CoordinatorState::default();
        for g in seq {
            let (next, t) = s.advance(g, 3);
            s = next;
            assert_eq!(c.observe(g), t);
        }
        assert_eq!(c.state(), s);
    }

    #[test]
    fn subscribers_see_only_effective_transitions() {
        let mut c = with_photos(2);
        let rx = c.subscribe();
        feed(&mut c, &[Fist, OpenPalm, OpenPalm, Pinch, Pinch]);
        let got: Vec<Transition> = rx.try_iter().collect();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].to, InteractionMode::Chaos);
        assert!(got[1].focus_advanced);
    }

    #[test]
    fn dropped_subscriber_is_pruned() {
        let mut c = Coordinator::new();
        drop(c.subscribe());
        c.observe(OpenPalm);
        assert!(c.subscribers.is_empty());
    }

    #[test]
    fn focused_photo_is_bounded() {
        let mut c = with_photos(3);
        feed(&mut c, &[Pinch, None, Pinch]);
        assert_eq!(c.focused_photo(), Some(2));
        c.set_photo_count(2);
        assert_eq!(c.focused_photo(), Option::None);
    }
}
