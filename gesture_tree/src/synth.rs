//! Synthetic hand skeletons for the keyboard simulator.
//!
//! Each [`HandPose`] produces a 21-point frame that the classifier maps to
//! the matching gesture, so the simulator exercises the real classification
//! path rather than short-circuiting to labels.

use hand_gesture::landmark::*;
use hand_gesture::{Landmark, LandmarkFrame};

/// Wrist sits this far below the palm centre (normalized units).
const WRIST_DROP: f32 = 0.14;

/// Wrist → finger-base direction for index, middle, ring, pinky.
const BASE_DIRS: [(f32, f32); 4] = [
    (-0.050, -0.130),
    ( 0.000, -0.140),
    ( 0.040, -0.135),
    ( 0.075, -0.115),
];

const REACH_EXTENDED: f32 = 2.2;
const REACH_CURLED:   f32 = 0.9;
const REACH_PINCHING: f32 = 1.6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandPose {
    /// Index and middle out, thumb away: classifies as `NONE`.
    Relaxed,
    Fist,
    OpenPalm,
    Pinch,
}

impl HandPose {
    /// Build a frame with the palm centre at `(cx, cy)`.
    pub fn frame(self, cx: f32, cy: f32) -> LandmarkFrame {
        let wrist = Landmark::new(cx, cy + WRIST_DROP, 0.0);
        let at = |dx: f32, dy: f32, s: f32| Landmark::new(wrist.x + dx * s, wrist.y + dy * s, 0.0);

        let reaches: [f32; 4] = match self {
            HandPose::Relaxed  => [REACH_EXTENDED, REACH_EXTENDED, REACH_CURLED, REACH_CURLED],
            HandPose::Fist     => [REACH_CURLED; 4],
            HandPose::OpenPalm => [REACH_EXTENDED; 4],
            HandPose::Pinch    => [REACH_PINCHING, REACH_CURLED, REACH_CURLED, REACH_CURLED],
        };

        let mut pts = [Landmark::default(); LANDMARK_COUNT];
        pts[WRIST] = wrist;

        for (i, &(base, tip)) in FINGERS.iter().enumerate() {
            let (dx, dy) = BASE_DIRS[i];
            let r = reaches[i];
            pts[base]     = at(dx, dy, 1.0);
            pts[base + 1] = at(dx, dy, 1.0 + (r - 1.0) * 0.45);
            pts[base + 2] = at(dx, dy, 1.0 + (r - 1.0) * 0.75);
            pts[tip]      = at(dx, dy, r);
        }

        pts[THUMB_CMC] = at(-0.040, -0.020, 1.0);
        pts[THUMB_MCP] = at(-0.075, -0.045, 1.0);
        pts[THUMB_IP]  = at(-0.105, -0.055, 1.0);
        pts[THUMB_TIP] = match self {
            HandPose::Fist => at(-0.060, -0.090, 1.0),
            HandPose::Pinch => {
                let index_tip = pts[INDEX_TIP];
                Landmark::new(index_tip.x + 0.01, index_tip.y + 0.01, 0.0)
            }
            HandPose::Relaxed | HandPose::OpenPalm => at(-0.160, -0.060, 1.0),
        };

        LandmarkFrame::new(pts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::{classify, GestureLabel, HandSample};

    #[test]
    fn poses_classify_as_intended() {
        let cases = [
            (HandPose::Relaxed,  GestureLabel::None),
            (HandPose::Fist,     GestureLabel::Fist),
            (HandPose::OpenPalm, GestureLabel::OpenPalm),
            (HandPose::Pinch,    GestureLabel::Pinch),
        ];
        for (pose, expected) in cases {
            for &(cx, cy) in &[(0.5, 0.5), (0.2, 0.7), (0.8, 0.3)] {
                let f = pose.frame(cx, cy);
                assert_eq!(classify(Some(&f)), expected, "{:?} at ({}, {})", pose, cx, cy);
            }
        }
    }

    #[test]
    fn palm_center_follows_cursor() {
        let f = HandPose::OpenPalm.frame(0.3, 0.6);
        let s = HandSample::from_frame(Some(&f));
        assert!((s.x() - 0.3).abs() < 1e-6);
        assert!((s.y() - 0.6).abs() < 1e-6);
    }
}
