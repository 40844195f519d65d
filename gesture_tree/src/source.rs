//! Landmark frame sources — keyboard simulation, file replay, and (with the
//! `leap` feature) LeapMotion hardware.
//!
//! The public interface is [`SourceEvent`] delivered over a `mpsc` channel.
//! Each source runs on its own thread; the app loop drains the channel and
//! processes events one at a time, so the coordinator is never fed
//! concurrently.  Frames are forwarded raw: length validation happens in
//! the classifier.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use hand_gesture::Landmark;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::synth::HandPose;

// ════════════════════════════════════════════════════════════════════════════
// SourceEvent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    /// One detected hand, as delivered by the detector (not yet validated).
    Hand(Vec<Landmark>),
    /// Frame processed, no hand visible.
    NoHand,
    /// Photos added to the collection.
    AddPhotos(usize),
    /// The source is done; stop the application.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// FrameSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`SourceEvent`]s over a channel.
pub trait FrameSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>);
}

/// Spawn a frame source on its own thread and return the receiving end.
pub fn spawn_frame_source<S: FrameSource>(source: S) -> Receiver<SourceEvent> {
    let boxed: Box<dyn FrameSource> = Box::new(source);
    spawn_frame_sources(vec![boxed])
}

/// Spawn several sources feeding one channel.  Events from different
/// sources interleave but are still consumed one at a time.
pub fn spawn_frame_sources(sources: Vec<Box<dyn FrameSource>>) -> Receiver<SourceEvent> {
    let (tx, rx) = mpsc::channel();
    for source in sources {
        let tx = tx.clone();
        thread::spawn(move || source.run(tx));
    }
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// SimFrameSource — keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input from the simulation window, sent once per window frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Current hand state: `None` when the hand is hidden.
    Hand { pose: Option<HandPose>, x: f32, y: f32 },
    AddPhoto,
    Quit,
}

/// Turns [`SimInput`]s from the window into synthesized landmark frames.
pub struct SimFrameSource {
    pub rx: Receiver<SimInput>,
}

impl FrameSource for SimFrameSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        for input in self.rx {
            let event = match input {
                SimInput::Hand { pose: Some(pose), x, y } =>
                    SourceEvent::Hand(pose.frame(x, y).points().to_vec()),
                SimInput::Hand { pose: None, .. } => SourceEvent::NoHand,
                SimInput::AddPhoto                => SourceEvent::AddPhotos(1),
                SimInput::Quit => {
                    let _ = tx.send(SourceEvent::Quit);
                    return;
                }
            };
            if tx.send(event).is_err() { return; }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Replay file format
// ════════════════════════════════════════════════════════════════════════════
//
// One JSON value per line:
//
//   null                                   no hand
//   {"landmarks": [{"x":..,"y":..,"z":..}, ...]}
//   {"landmarks": [[x, y, z], ...]}
//   [[x, y, z], ...]
//
// Blank lines are skipped.

#[derive(Deserialize)]
#[serde(untagged)]
enum WirePoint {
    Object(Landmark),
    Tuple(Vec<f32>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireFrame {
    Hand { landmarks: Vec<WirePoint> },
    Points(Vec<WirePoint>),
}

impl WirePoint {
    fn into_landmark(self) -> std::result::Result<Landmark, serde_json::Error> {
        match self {
            WirePoint::Object(l) => Ok(l),
            WirePoint::Tuple(v) => match v.as_slice() {
                [x, y]    => Ok(Landmark::new(*x, *y, 0.0)),
                [x, y, z] => Ok(Landmark::new(*x, *y, *z)),
                _ => Err(serde::de::Error::custom(format!(
                    "landmark needs 2 or 3 coordinates, got {}", v.len()
                ))),
            },
        }
    }
}

/// Parse one replay line.  `Ok(None)` means no hand.
pub fn parse_frame_line(line: &str) -> std::result::Result<Option<Vec<Landmark>>, serde_json::Error> {
    let frame: Option<WireFrame> = serde_json::from_str(line)?;
    let points = match frame {
        None => return Ok(None),
        Some(WireFrame::Hand { landmarks }) => landmarks,
        Some(WireFrame::Points(points))     => points,
    };
    points
        .into_iter()
        .map(WirePoint::into_landmark)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(Some)
}

/// Map a parse result onto the event the app sees.  Bad lines degrade to
/// "no hand" so a corrupt recording never stalls the stream.
pub fn line_event(line_no: usize, line: &str) -> SourceEvent {
    match parse_frame_line(line) {
        Ok(Some(points)) => SourceEvent::Hand(points),
        Ok(None)         => SourceEvent::NoHand,
        Err(e) => {
            warn!(line = line_no, error = %e, "unparseable landmark frame");
            SourceEvent::NoHand
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ReplayFrameSource — JSON-lines recording
// ════════════════════════════════════════════════════════════════════════════

/// Plays back a recorded landmark stream at a fixed frame rate.
pub struct ReplayFrameSource {
    path:   PathBuf,
    reader: BufReader<File>,
    period: Duration,
}

impl ReplayFrameSource {
    /// Open `path` for playback at `fps` frames per second.
    pub fn open(path: &Path, fps: f32) -> Result<Self> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(AppError::Config(format!("replay fps must be positive, got {}", fps)));
        }
        let file = File::open(path).map_err(|source| AppError::Replay {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(ReplayFrameSource {
            path:   path.to_path_buf(),
            reader: BufReader::new(file),
            period: Duration::from_secs_f32(1.0 / fps),
        })
    }
}

impl FrameSource for ReplayFrameSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        info!(path = %self.path.display(), "replay started");
        let mut frames = 0usize;

        for (i, line) in self.reader.lines().enumerate() {
            let line = match line {
                Ok(l)  => l,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "replay read failed");
                    break;
                }
            };
            if line.trim().is_empty() { continue; }

            if tx.send(line_event(i + 1, &line)).is_err() { return; }
            frames += 1;
            thread::sleep(self.period);
        }

        info!(frames, "replay finished");
        let _ = tx.send(SourceEvent::Quit);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapFrameSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Frame source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
///
/// The first tracked hand's bone joints are mapped onto the 21-point
/// scheme: wrist from the middle metacarpal base, then for every digit the
/// proximal, intermediate and distal bone bases followed by the distal tip.
/// Millimetre positions over the device are normalized into a virtual
/// image: x ∈ ±[`LEAP_HALF_WIDTH_MM`], height ∈ [0, [`LEAP_HEIGHT_MM`]],
/// with y growing downward.
#[cfg(feature = "leap")]
pub struct LeapFrameSource;

#[cfg(feature = "leap")]
pub const LEAP_HALF_WIDTH_MM: f32 = 200.0;
#[cfg(feature = "leap")]
pub const LEAP_HEIGHT_MM:     f32 = 400.0;

#[cfg(feature = "leap")]
impl FrameSource for LeapFrameSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                tracing::error!(error = ?e, "failed to create LeapC connection");
                return;
            }
        };
        if let Err(e) = connection.open() {
            tracing::error!(error = ?e, "failed to open LeapMotion device");
            return;
        }
        info!("LeapMotion connected");

        let norm = |x: f32, y: f32, z: f32| Landmark::new(
            (x + LEAP_HALF_WIDTH_MM) / (2.0 * LEAP_HALF_WIDTH_MM),
            1.0 - y / LEAP_HEIGHT_MM,
            z / LEAP_HEIGHT_MM,
        );

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let event = match frame.hands().next() {
                    None => SourceEvent::NoHand,
                    Some(hand) => {
                        let digits: Vec<_> = hand.digits().collect();
                        let mut points = Vec::with_capacity(hand_gesture::LANDMARK_COUNT);
                        if let Some(middle) = digits.get(2) {
                            let w = middle.metacarpal().prev_joint();
                            points.push(norm(w.x, w.y, w.z));
                        }
                        for d in &digits {
                            for j in [
                                d.proximal().prev_joint(),
                                d.intermediate().prev_joint(),
                                d.distal().prev_joint(),
                                d.distal().next_joint(),
                            ] {
                                points.push(norm(j.x, j.y, j.z));
                            }
                        }
                        SourceEvent::Hand(points)
                    }
                };
                if tx.send(event).is_err() { return; }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn null_line_is_no_hand() {
        assert_eq!(parse_frame_line("null").unwrap(), None);
        assert_eq!(line_event(1, "null"), SourceEvent::NoHand);
    }

    #[test]
    fn object_points_parse() {
        let line = r#"{"landmarks":[{"x":0.1,"y":0.2,"z":0.3},{"x":0.4,"y":0.5}]}"#;
        let pts = parse_frame_line(line).unwrap().unwrap();
        assert_eq!(pts, vec![Landmark::new(0.1, 0.2, 0.3), Landmark::new(0.4, 0.5, 0.0)]);
    }

    #[test]
    fn tuple_points_parse() {
        let pts = parse_frame_line("[[0.1,0.2,0.3],[0.4,0.5]]").unwrap().unwrap();
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[1], Landmark::new(0.4, 0.5, 0.0));
    }

    #[test]
    fn short_tuple_is_rejected() {
        assert!(parse_frame_line("[[0.1]]").is_err());
    }

    #[test]
    fn garbage_degrades_to_no_hand() {
        assert_eq!(line_event(7, "{not json"), SourceEvent::NoHand);
    }

    #[test]
    fn sim_source_synthesizes_frames() {
        let (sim_tx, sim_rx) = mpsc::channel();
        let rx = spawn_frame_source(SimFrameSource { rx: sim_rx });

        sim_tx.send(SimInput::Hand { pose: Some(HandPose::Fist), x: 0.5, y: 0.5 }).unwrap();
        sim_tx.send(SimInput::Hand { pose: None, x: 0.5, y: 0.5 }).unwrap();
        sim_tx.send(SimInput::AddPhoto).unwrap();
        sim_tx.send(SimInput::Quit).unwrap();

        let events: Vec<SourceEvent> = rx.iter().collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(&events[0], SourceEvent::Hand(p) if p.len() == 21));
        assert_eq!(events[1], SourceEvent::NoHand);
        assert_eq!(events[2], SourceEvent::AddPhotos(1));
        assert_eq!(events[3], SourceEvent::Quit);
    }

    #[test]
    fn replay_source_plays_file_then_quits() {
        let path = std::env::temp_dir().join(format!("gesture_tree_replay_{}.jsonl", std::process::id()));
        {
            let mut f = File::create(&path).unwrap();
            writeln!(f, "null").unwrap();
            writeln!(f).unwrap();
            writeln!(f, "[[0.1,0.2,0.0]]").unwrap();
            writeln!(f, "oops").unwrap();
        }
        let src = ReplayFrameSource::open(&path, 1000.0).unwrap();
        let events: Vec<SourceEvent> = spawn_frame_source(src).iter().collect();
        std::fs::remove_file(&path).ok();

        assert_eq!(events, vec![
            SourceEvent::NoHand,
            SourceEvent::Hand(vec![Landmark::new(0.1, 0.2, 0.0)]),
            SourceEvent::NoHand,
            SourceEvent::Quit,
        ]);
    }

    #[test]
    fn replay_rejects_bad_fps_and_missing_file() {
        let missing = Path::new("/definitely/not/here.jsonl");
        assert!(matches!(ReplayFrameSource::open(missing, 30.0), Err(AppError::Replay { .. })));
        assert!(matches!(ReplayFrameSource::open(missing, 0.0), Err(AppError::Config(_))));
    }
}
