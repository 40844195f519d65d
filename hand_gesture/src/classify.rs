//! Geometric gesture classification, one frame at a time.
//!
//! # Algorithm
//!
//! * A finger (index, middle, ring, pinky) is **extended** when its tip is
//!   more than [`EXTENSION_RATIO`] times as far from the wrist as its base
//!   joint is.  The thumb is never tested.
//! * The **pinch distance** is the gap between thumb tip and index tip.
//! * First match wins:
//!   1. four extended and pinch distance > [`OPEN_PALM_MIN_GAP`] → `OPEN_PALM`
//!   2. none extended → `FIST`
//!   3. pinch distance < [`PINCH_MAX_GAP`] → `PINCH`
//!   4. otherwise → `NONE`
//!
//! All distances use the (x, y) projection only.  The thresholds are fixed
//! calibration constants for normalized image coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::landmark::{
    planar_distance, Landmark, LandmarkFrame, FINGERS, INDEX_TIP, THUMB_TIP, WRIST,
};

pub const EXTENSION_RATIO:   f32 = 1.2;
pub const OPEN_PALM_MIN_GAP: f32 = 0.1;
pub const PINCH_MAX_GAP:     f32 = 0.05;

/// Palm position reported when no hand is visible.
pub const NEUTRAL_POSITION: (f32, f32) = (0.5, 0.5);

// ════════════════════════════════════════════════════════════════════════════
// GestureLabel
// ════════════════════════════════════════════════════════════════════════════

/// The single classification outcome for a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GestureLabel {
    /// No hand, or a hand shape that matches nothing below.
    #[default]
    None,
    /// All four fingers curled.
    Fist,
    /// All four fingers extended with thumb and index apart.
    OpenPalm,
    /// Thumb tip touching index tip.
    Pinch,
}

impl GestureLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None     => "NONE",
            Self::Fist     => "FIST",
            Self::OpenPalm => "OPEN_PALM",
            Self::Pinch    => "PINCH",
        }
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandShape — the two measurements the decision is made from
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandShape {
    /// Number of non-thumb fingers extended, 0–4.
    pub extended_count: usize,
    /// Thumb tip to index tip, (x, y) only.
    pub pinch_distance: f32,
}

impl HandShape {
    pub fn measure(frame: &LandmarkFrame) -> Self {
        let wrist = frame.point(WRIST);
        let extended_count = FINGERS
            .iter()
            .filter(|&&(base, tip)| is_extended(wrist, frame.point(base), frame.point(tip)))
            .count();
        let pinch_distance = planar_distance(frame.point(THUMB_TIP), frame.point(INDEX_TIP));
        HandShape { extended_count, pinch_distance }
    }

    /// Apply the decision ladder.  Order matters: a curled hand is a fist
    /// even if the thumb happens to rest on the index tip.
    pub fn label(&self) -> GestureLabel {
        if self.extended_count == FINGERS.len() && self.pinch_distance > OPEN_PALM_MIN_GAP {
            GestureLabel::OpenPalm
        } else if self.extended_count == 0 {
            GestureLabel::Fist
        } else if self.pinch_distance < PINCH_MAX_GAP {
            GestureLabel::Pinch
        } else {
            GestureLabel::None
        }
    }
}

fn is_extended(wrist: Landmark, base: Landmark, tip: Landmark) -> bool {
    planar_distance(tip, wrist) > planar_distance(base, wrist) * EXTENSION_RATIO
}

// ════════════════════════════════════════════════════════════════════════════
// classify
// ════════════════════════════════════════════════════════════════════════════

/// Classify one frame.  Total: an absent frame is `NONE`.
pub fn classify(frame: Option<&LandmarkFrame>) -> GestureLabel {
    match frame {
        Some(f) => HandShape::measure(f).label(),
        None    => GestureLabel::None,
    }
}

/// Classify raw detector output of any length.
pub fn classify_points(points: &[Landmark]) -> GestureLabel {
    classify(LandmarkFrame::from_points(points).as_ref())
}

// ════════════════════════════════════════════════════════════════════════════
// HandSample — what the presentation layer sees each frame
// ════════════════════════════════════════════════════════════════════════════

/// Per-frame hand summary.  The boolean views are derived from `gesture`
/// at construction and cannot disagree with it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HandSample {
    gesture:     GestureLabel,
    x:           f32,
    y:           f32,
    is_open:     bool,
    is_closed:   bool,
    is_pinching: bool,
}

impl HandSample {
    pub fn new(gesture: GestureLabel, x: f32, y: f32) -> Self {
        HandSample {
            gesture,
            x,
            y,
            is_open:     gesture == GestureLabel::OpenPalm,
            is_closed:   gesture == GestureLabel::Fist,
            is_pinching: gesture == GestureLabel::Pinch,
        }
    }

    /// No hand in view.
    pub fn absent() -> Self {
        let (x, y) = NEUTRAL_POSITION;
        HandSample::new(GestureLabel::None, x, y)
    }

    pub fn from_frame(frame: Option<&LandmarkFrame>) -> Self {
        match frame {
            Some(f) => {
                let palm = f.palm_center();
                HandSample::new(classify(Some(f)), palm.x, palm.y)
            }
            None => HandSample::absent(),
        }
    }

    pub fn from_points(points: &[Landmark]) -> Self {
        HandSample::from_frame(LandmarkFrame::from_points(points).as_ref())
    }

    pub fn gesture(&self)     -> GestureLabel { self.gesture }
    pub fn x(&self)           -> f32          { self.x }
    pub fn y(&self)           -> f32          { self.y }
    pub fn position(&self)    -> (f32, f32)   { (self.x, self.y) }
    pub fn is_open(&self)     -> bool         { self.is_open }
    pub fn is_closed(&self)   -> bool         { self.is_closed }
    pub fn is_pinching(&self) -> bool         { self.is_pinching }
}

impl Default for HandSample {
    fn default() -> Self { HandSample::absent() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::*;

    const WRIST_AT: Landmark = Landmark::new(0.5, 0.8, 0.0);

    /// Point along the wrist→`toward` ray at `scale` times its length.
    fn along(toward: Landmark, scale: f32) -> Landmark {
        Landmark::new(
            WRIST_AT.x + (toward.x - WRIST_AT.x) * scale,
            WRIST_AT.y + (toward.y - WRIST_AT.y) * scale,
            0.0,
        )
    }

    /// Build a hand with the given fingers extended (index, middle, ring,
    /// pinky).  The thumb tip is placed by `thumb`, which receives the
    /// index tip position.
    fn hand(extended: [bool; 4], thumb: impl Fn(Landmark) -> Landmark) -> Vec<Landmark> {
        let bases = [
            Landmark::new(0.44, 0.68, 0.0),
            Landmark::new(0.48, 0.66, 0.0),
            Landmark::new(0.52, 0.66, 0.0),
            Landmark::new(0.56, 0.68, 0.0),
        ];
        let mut pts = vec![Landmark::default(); LANDMARK_COUNT];
        pts[WRIST] = WRIST_AT;
        pts[THUMB_CMC] = Landmark::new(0.45, 0.78, 0.0);
        pts[THUMB_MCP] = Landmark::new(0.41, 0.74, 0.0);
        pts[THUMB_IP]  = Landmark::new(0.39, 0.71, 0.0);

        for (i, &(base, tip)) in FINGERS.iter().enumerate() {
            let b = bases[i];
            let reach = if extended[i] { 2.2 } else { 0.9 };
            pts[base]     = b;
            pts[base + 1] = along(b, (1.0 + reach) / 2.0);
            pts[base + 2] = along(b, reach);
            pts[tip]      = along(b, reach);
        }
        pts[THUMB_TIP] = thumb(pts[INDEX_TIP]);
        pts
    }

    fn offset(dx: f32, dy: f32) -> impl Fn(Landmark) -> Landmark {
        move |p| Landmark::new(p.x + dx, p.y + dy, 0.0)
    }

    #[test]
    fn curled_hand_with_thumb_out_is_fist() {
        let pts = hand([false; 4], offset(0.2, 0.0));
        assert_eq!(classify_points(&pts), GestureLabel::Fist);
    }

    #[test]
    fn thumb_on_index_tip_is_pinch() {
        let pts = hand([true, false, false, false], offset(0.0, 0.0));
        assert_eq!(classify_points(&pts), GestureLabel::Pinch);
    }

    #[test]
    fn spread_hand_is_open_palm() {
        let pts = hand([true; 4], offset(-0.3, 0.0));
        assert_eq!(classify_points(&pts), GestureLabel::OpenPalm);
    }

    #[test]
    fn curled_hand_beats_pinch() {
        // Thumb resting on a curled index tip: fist rule is checked first.
        let pts = hand([false; 4], offset(0.0, 0.0));
        assert_eq!(classify_points(&pts), GestureLabel::Fist);
    }

    #[test]
    fn open_hand_with_touching_thumb_is_pinch() {
        let pts = hand([true; 4], offset(0.03, 0.0));
        assert_eq!(classify_points(&pts), GestureLabel::Pinch);
    }

    #[test]
    fn open_hand_with_middling_gap_is_none() {
        let pts = hand([true; 4], offset(0.07, 0.0));
        assert_eq!(classify_points(&pts), GestureLabel::None);
    }

    #[test]
    fn half_open_hand_is_none() {
        let pts = hand([true, true, false, false], offset(-0.2, 0.0));
        assert_eq!(classify_points(&pts), GestureLabel::None);
    }

    #[test]
    fn shape_counts_extended_fingers() {
        let pts = hand([true, false, true, false], offset(-0.2, 0.0));
        let frame = LandmarkFrame::from_points(&pts).unwrap();
        let shape = HandShape::measure(&frame);
        assert_eq!(shape.extended_count, 2);
        assert!((shape.pinch_distance - 0.2).abs() < 1e-5);
    }

    #[test]
    fn wrong_length_is_none() {
        let full = hand([true; 4], offset(-0.3, 0.0));
        for n in [0, 1, 20, 22, 42] {
            let pts: Vec<Landmark> = full.iter().cycle().take(n).copied().collect();
            assert_eq!(classify_points(&pts), GestureLabel::None, "len {}", n);
        }
        assert_eq!(classify(None), GestureLabel::None);
    }

    #[test]
    fn classification_is_deterministic() {
        let pts = hand([true, false, false, false], offset(0.01, 0.01));
        let first = classify_points(&pts);
        for _ in 0..10 {
            assert_eq!(classify_points(&pts), first);
        }
    }

    #[test]
    fn sample_flags_match_gesture() {
        let cases = [
            (hand([true; 4], offset(-0.3, 0.0)), GestureLabel::OpenPalm),
            (hand([false; 4], offset(0.2, 0.0)), GestureLabel::Fist),
            (hand([true, false, false, false], offset(0.0, 0.0)), GestureLabel::Pinch),
            (hand([true, true, false, false], offset(-0.2, 0.0)), GestureLabel::None),
        ];
        for (pts, expected) in cases {
            let s = HandSample::from_points(&pts);
            assert_eq!(s.gesture(), expected);
            let flags = [s.is_open(), s.is_closed(), s.is_pinching()];
            assert!(flags.iter().filter(|&&f| f).count() <= 1);
            assert_eq!(s.is_open(),     expected == GestureLabel::OpenPalm);
            assert_eq!(s.is_closed(),   expected == GestureLabel::Fist);
            assert_eq!(s.is_pinching(), expected == GestureLabel::Pinch);
        }
    }

    #[test]
    fn sample_reports_palm_center() {
        let pts = hand([true; 4], offset(-0.3, 0.0));
        let s = HandSample::from_points(&pts);
        assert_eq!(s.position(), (pts[MIDDLE_MCP].x, pts[MIDDLE_MCP].y));
    }

    #[test]
    fn absent_sample_is_neutral() {
        let s = HandSample::from_points(&[Landmark::default(); 5]);
        assert_eq!(s, HandSample::absent());
        assert_eq!(s.position(), (0.5, 0.5));
        assert!(!s.is_open() && !s.is_closed() && !s.is_pinching());
    }

    #[test]
    fn label_names_are_stable() {
        assert_eq!(GestureLabel::OpenPalm.to_string(), "OPEN_PALM");
        assert_eq!(GestureLabel::None.as_str(), "NONE");
    }
}
