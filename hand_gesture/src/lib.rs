//! # hand_gesture
//!
//! Turns a live stream of single-hand landmark frames into a stable
//! interaction mode plus an edge-triggered photo focus index.
//!
//! ## Pipeline
//!
//! ```text
//! landmarks (21 pts | absent) ─► classify ─► GestureLabel ─► Coordinator ─► (mode, focus)
//! ```
//!
//! * [`classify`] is a stateless geometric heuristic, evaluated once per frame.
//! * [`Coordinator`] is a synchronous reducer over the label sequence.  Its
//!   output depends only on the order of labels, never on the time between
//!   them.
//!
//! ## Gesture → Mode mapping
//!
//! | Gesture | Effect |
//! |---|---|
//! | `FIST` | mode → `FORMED` |
//! | `OPEN_PALM` | mode → `CHAOS` |
//! | `PINCH` (photos > 0) | mode → `PHOTO_VIEW`; rising edge advances focus |
//! | `NONE` while in `PHOTO_VIEW` | mode → `CHAOS` |
//!
//! ## Quick start
//!
//! ```rust
//! use hand_gesture::{Coordinator, GestureLabel, HandSample, InteractionMode};
//!
//! let mut coord = Coordinator::new();
//! coord.set_photo_count(3);
//!
//! let sample = HandSample::from_points(&[]);   // no hand detected
//! assert_eq!(sample.gesture(), GestureLabel::None);
//!
//! let t = coord.observe(GestureLabel::Pinch);
//! assert_eq!(t.to, InteractionMode::PhotoView);
//! assert_eq!(coord.focus_index(), 1);
//! ```

pub mod landmark;
pub mod classify;
pub mod coordinator;

pub use landmark::{Landmark, LandmarkFrame, LANDMARK_COUNT, planar_distance};
pub use classify::{classify, classify_points, GestureLabel, HandSample, HandShape};
pub use coordinator::{Coordinator, CoordinatorState, InteractionMode, Transition};
