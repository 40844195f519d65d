//! Hand landmarks in normalized image coordinates.
//!
//! A frame is exactly 21 points in the usual anatomical order: the wrist,
//! then four points per digit from the base joint out to the tip.  Anything
//! shorter or longer is not a frame.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// (base joint, fingertip) for the four non-thumb digits.
pub const FINGERS: [(usize, usize); 4] = [
    (INDEX_MCP,  INDEX_TIP),
    (MIDDLE_MCP, MIDDLE_TIP),
    (RING_MCP,   RING_TIP),
    (PINKY_MCP,  PINKY_TIP),
];

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One tracked point.  `x`/`y` are in `[0, 1]` relative to the image;
/// `z` is relative depth as reported by the detector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }
}

/// Euclidean distance between two landmarks, ignoring depth.
pub fn planar_distance(a: Landmark, b: Landmark) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkFrame
// ════════════════════════════════════════════════════════════════════════════

/// A complete single-hand skeleton.  Only constructible from exactly
/// [`LANDMARK_COUNT`] points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandmarkFrame {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkFrame {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        LandmarkFrame { points }
    }

    /// Validate raw detector output.  Short and long inputs are rejected
    /// whole; there is no partial frame.
    pub fn from_points(points: &[Landmark]) -> Option<Self> {
        let points: [Landmark; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(LandmarkFrame { points })
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] { &self.points }

    pub fn point(&self, index: usize) -> Landmark { self.points[index] }

    /// Palm centre, approximated by the middle-finger base joint.
    pub fn palm_center(&self) -> Landmark { self.points[MIDDLE_MCP] }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_requires_exactly_21() {
        let pts = vec![Landmark::default(); 21];
        assert!(LandmarkFrame::from_points(&pts).is_some());
        assert!(LandmarkFrame::from_points(&pts[..20]).is_none());
        assert!(LandmarkFrame::from_points(&[]).is_none());
        let long = vec![Landmark::default(); 22];
        assert!(LandmarkFrame::from_points(&long).is_none());
    }

    #[test]
    fn palm_center_is_middle_base() {
        let mut pts = [Landmark::default(); 21];
        pts[MIDDLE_MCP] = Landmark::new(0.3, 0.7, -0.1);
        let frame = LandmarkFrame::new(pts);
        assert_eq!(frame.palm_center(), Landmark::new(0.3, 0.7, -0.1));
    }

    #[test]
    fn planar_distance_ignores_depth() {
        let a = Landmark::new(0.0, 0.0, 5.0);
        let b = Landmark::new(0.3, 0.4, -5.0);
        assert!((planar_distance(a, b) - 0.5).abs() < 1e-6);
    }
}
