//! # gesture_tree
//!
//! Hand-gesture controlled particle tree with photo cards, rendered in a
//! software window.
//!
//! ## Gesture → Scene mapping
//!
//! | Gesture | Mode | Scene |
//! |---|---|---|
//! | Fist | `FORMED` | particles assemble into the tree, camera orbits |
//! | Open palm | `CHAOS` | particles scatter; palm x rotates the cloud |
//! | Pinch (photos > 0) | `PHOTO_VIEW` | next photo is pulled to centre stage |
//! | Hand lost while viewing | `CHAOS` | photo returns to the cloud |
//!
//! ## Frame sources
//!
//! * `sim` (default): keyboard and mouse drive a synthetic hand skeleton.
//! * `replay`: JSON-lines landmark recording, one frame per line.
//! * `leap` (feature `leap`): LeapMotion controller via LeapC.
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Action |
//! |---|---|
//! | mouse | move the hand |
//! | `F` (hold) | fist |
//! | `O` (hold) | open palm |
//! | `P` (hold) | pinch |
//! | `H` | hide / show the hand |
//! | `U` | add a photo (any source) |
//! | `Q` | quit (any source) |

pub mod error;
pub mod synth;
pub mod source;
pub mod scene;
pub mod visualizer;
pub mod app;

pub use error::{AppError, Result};

/// Install the `fmt` subscriber.  `RUST_LOG` wins over `fallback`.
pub fn init_logging(fallback: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
