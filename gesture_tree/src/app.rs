//! Top-level application loop.
//!
//! `AppState` owns the `Coordinator` and the `Scene`.  It processes
//! `SourceEvent`s one at a time (classify, then reduce) and drives the
//! visualizer each frame.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use clap::{Parser, ValueEnum};
use hand_gesture::{
    Coordinator, HandSample, HandShape, InteractionMode, LandmarkFrame, Transition,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::scene::Scene;
use crate::source::{
    spawn_frame_sources, FrameSource, ReplayFrameSource, SimFrameSource, SimInput, SourceEvent,
};
use crate::visualizer::{HudView, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Keyboard and mouse drive a synthetic hand.
    Sim,
    /// Play back a JSON-lines landmark recording.
    Replay,
    /// LeapMotion controller (needs the `leap` feature).
    Leap,
}

/// Configuration for the full application.
#[derive(Clone, Debug, Parser)]
#[command(name = "gesture_tree", version, about = "Hand-gesture driven particle tree")]
pub struct AppConfig {
    /// Where hand frames come from.
    #[arg(long, value_enum, default_value_t = SourceKind::Sim)]
    pub source: SourceKind,

    /// Recording to play with `--source replay`.
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,

    /// Replay rate in frames per second.
    #[arg(long, default_value_t = 30.0)]
    pub fps: f32,

    /// Photo cards hung on the tree at start.
    #[arg(long, default_value_t = 0)]
    pub photos: usize,

    #[arg(long, default_value_t = 1800)]
    pub foliage: usize,

    #[arg(long, default_value_t = 120)]
    pub ornaments: usize,

    /// Scene layout seed; random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fallback log filter when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            source:    SourceKind::Sim,
            replay:    None,
            fps:       30.0,
            photos:    0,
            foliage:   1800,
            ornaments: 120,
            seed:      None,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(AppError::Config(format!("--fps must be positive, got {}", self.fps)));
        }
        match self.source {
            SourceKind::Replay if self.replay.is_none() => {
                Err(AppError::Config("--source replay needs --replay <FILE>".into()))
            }
            SourceKind::Leap if !cfg!(feature = "leap") => {
                Err(AppError::Config("built without the `leap` feature".into()))
            }
            _ => Ok(()),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── interaction ──────────────────────────────────────────────────────
    coordinator: Coordinator,
    /// Mode and focus changes, subscribed from the coordinator.
    transitions: Receiver<Transition>,
    hand:        HandSample,
    /// Measurements of the last valid frame; `None` while no hand is seen.
    shape:       Option<HandShape>,

    // ── presentation ─────────────────────────────────────────────────────
    scene: Scene,
    rng:   StdRng,

    status: String,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> Self {
        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };
        let scene = Scene::new(cfg.foliage, cfg.ornaments, &mut rng);
        let mut coordinator = Coordinator::new();
        let transitions = coordinator.subscribe();

        let mut app = AppState {
            coordinator,
            transitions,
            hand:        HandSample::absent(),
            shape:       None,
            scene,
            rng,
            status:      String::new(),
        };
        app.add_photos(cfg.photos);
        app.status = format!("Ready: {}  photos={}", app.mode().label(), app.photo_count());
        app
    }

    // ── process one SourceEvent ──────────────────────────────────────────

    /// Returns the coordinator step for hand/no-hand events.
    pub fn handle_event(&mut self, event: SourceEvent) -> Option<Transition> {
        match event {
            SourceEvent::Hand(points) => {
                self.shape = LandmarkFrame::from_points(&points).map(|f| HandShape::measure(&f));
                Some(self.observe(HandSample::from_points(&points)))
            }
            SourceEvent::NoHand => {
                self.shape = None;
                Some(self.observe(HandSample::absent()))
            }
            SourceEvent::AddPhotos(n) => {
                self.add_photos(n);
                None
            }
            SourceEvent::Quit => None, // handled in run loop
        }
    }

    fn observe(&mut self, sample: HandSample) -> Transition {
        self.hand = sample;
        self.coordinator.observe(sample.gesture())
    }

    pub fn add_photos(&mut self, n: usize) {
        if n == 0 { return; }
        for _ in 0..n {
            self.scene.add_photo(&mut self.rng);
        }
        self.coordinator.set_photo_count(self.scene.photo_count());
        info!(added = n, total = self.scene.photo_count(), "photos added");
        self.status = format!("{} photo(s) added, {} total", n, self.scene.photo_count());
    }

    // ── Per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self) {
        // Only the latest change since the last frame makes it to the status bar.
        if let Some(t) = self.transitions.try_iter().last() {
            self.status = if t.mode_changed() {
                format!("{}: {} -> {}", t.gesture, t.from, t.to)
            } else {
                format!("{}: photo {} of {}", t.gesture, t.focus_index + 1, self.photo_count())
            };
        }

        self.scene.tick(self.coordinator.mode(), self.hand.x(), self.coordinator.focused_photo());
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn scene(&self)       -> &Scene            { &self.scene }
    pub fn mode(&self)        -> InteractionMode   { self.coordinator.mode() }
    pub fn hand(&self)        -> HandSample        { self.hand }
    pub fn photo_count(&self) -> usize             { self.coordinator.photo_count() }
    pub fn status(&self)      -> &str              { &self.status }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn hud(&self) -> HudView<'_> {
        HudView {
            mode:    self.coordinator.mode(),
            gesture: self.hand.gesture(),
            hand:    self.shape.map(|_| self.hand.position()),
            shape:   self.shape,
            focus:   self.coordinator.focused_photo(),
            photos:  self.photo_count(),
            status:  &self.status,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// The window always feeds a [`SimFrameSource`] (photo and quit keys, plus
/// the synthetic hand in `sim` mode); replay and hardware sources share the
/// same channel.
pub fn run(cfg: AppConfig) -> Result<()> {
    cfg.validate()?;

    // ── Sources ───────────────────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let mut sources: Vec<Box<dyn FrameSource>> = Vec::new();
    sources.push(Box::new(SimFrameSource { rx: sim_rx }));

    match cfg.source {
        SourceKind::Sim => {}
        SourceKind::Replay => {
            let path = cfg.replay.as_deref()
                .ok_or_else(|| AppError::Config("--source replay needs --replay <FILE>".into()))?;
            sources.push(Box::new(ReplayFrameSource::open(path, cfg.fps)?));
        }
        SourceKind::Leap => {
            #[cfg(feature = "leap")]
            sources.push(Box::new(crate::source::LeapFrameSource));
            #[cfg(not(feature = "leap"))]
            return Err(AppError::Device("built without the `leap` feature".into()));
        }
    }
    info!(source = ?cfg.source, "frame source started");
    let event_rx = spawn_frame_sources(sources);

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(sim_tx, cfg.source == SourceKind::Sim)?;

    // ── App state ─────────────────────────────────────────────────────────
    let mut app = AppState::new(&cfg);
    let mut disconnected = false;

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        if !vis.poll_input() { break; }

        loop {
            match event_rx.try_recv() {
                Ok(SourceEvent::Quit) => {
                    info!("frame source finished");
                    return Ok(());
                }
                Ok(evt) => { app.handle_event(evt); }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !disconnected {
                        warn!("frame source disconnected");
                        let holding = format!("Source disconnected, holding {}", app.mode().label());
                        app.set_status(holding);
                        disconnected = true;
                    }
                    break;
                }
            }
        }

        app.tick();
        vis.render(app.scene(), &app.hud());
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::HandPose;
    use hand_gesture::GestureLabel;

    fn make_app(photos: usize) -> AppState {
        AppState::new(&AppConfig {
            photos,
            foliage:   40,
            ornaments: 8,
            seed:      Some(3),
            ..AppConfig::default()
        })
    }

    fn pose(p: HandPose) -> SourceEvent {
        SourceEvent::Hand(p.frame(0.5, 0.5).points().to_vec())
    }

    #[test]
    fn starts_formed_with_requested_photos() {
        let app = make_app(2);
        assert_eq!(app.mode(), InteractionMode::Formed);
        assert_eq!(app.photo_count(), 2);
        assert_eq!(app.scene().photo_count(), 2);
    }

    #[test]
    fn open_palm_scatters_and_fist_assembles() {
        let mut app = make_app(0);
        app.handle_event(pose(HandPose::OpenPalm));
        assert_eq!(app.mode(), InteractionMode::Chaos);
        app.handle_event(pose(HandPose::Fist));
        assert_eq!(app.mode(), InteractionMode::Formed);
    }

    #[test]
    fn pinch_without_photos_is_ignored() {
        let mut app = make_app(0);
        let t = app.handle_event(pose(HandPose::Pinch)).unwrap();
        assert_eq!(t.gesture, GestureLabel::Pinch);
        assert_eq!(app.mode(), InteractionMode::Formed);
        assert!(!t.focus_advanced);
    }

    #[test]
    fn added_photos_enable_photo_view() {
        let mut app = make_app(0);
        app.handle_event(SourceEvent::AddPhotos(3));
        assert_eq!(app.photo_count(), 3);

        let t = app.handle_event(pose(HandPose::Pinch)).unwrap();
        assert_eq!(t.to, InteractionMode::PhotoView);
        assert_eq!(t.focus_index, 1);
        assert_eq!(app.hud().focus, Some(1));
    }

    #[test]
    fn losing_the_hand_leaves_photo_view() {
        let mut app = make_app(2);
        app.handle_event(pose(HandPose::Pinch));
        assert_eq!(app.mode(), InteractionMode::PhotoView);
        app.handle_event(SourceEvent::NoHand);
        assert_eq!(app.mode(), InteractionMode::Chaos);
        assert!(app.hud().hand.is_none());
    }

    #[test]
    fn malformed_frame_classifies_as_none() {
        let mut app = make_app(0);
        let t = app.handle_event(SourceEvent::Hand(vec![Default::default(); 20])).unwrap();
        assert_eq!(t.gesture, GestureLabel::None);
        assert_eq!(app.hand().position(), (0.5, 0.5));
        assert!(app.hud().shape.is_none());
    }

    #[test]
    fn hud_tracks_hand_position() {
        let mut app = make_app(0);
        app.handle_event(SourceEvent::Hand(HandPose::Relaxed.frame(0.2, 0.7).points().to_vec()));
        let (x, y) = app.hud().hand.unwrap();
        assert!((x - 0.2).abs() < 1e-6 && (y - 0.7).abs() < 1e-6);
        assert_eq!(app.hud().shape.unwrap().extended_count, 2);
    }

    #[test]
    fn status_follows_latest_transition_on_tick() {
        let mut app = make_app(2);
        app.handle_event(pose(HandPose::Pinch));
        assert!(app.status().starts_with("Ready"));
        app.tick();
        assert_eq!(app.status(), "PINCH: FORMED -> PHOTO_VIEW");

        app.handle_event(pose(HandPose::Fist));
        app.handle_event(pose(HandPose::OpenPalm));
        app.tick();
        assert_eq!(app.status(), "OPEN_PALM: FORMED -> CHAOS");

        // Nothing new: status stays put.
        app.handle_event(pose(HandPose::OpenPalm));
        app.tick();
        assert_eq!(app.status(), "OPEN_PALM: FORMED -> CHAOS");
    }

    #[test]
    fn quit_and_photo_events_do_not_step_the_coordinator() {
        let mut app = make_app(0);
        assert!(app.handle_event(SourceEvent::Quit).is_none());
        assert!(app.handle_event(SourceEvent::AddPhotos(1)).is_none());
    }

    #[test]
    fn tick_steers_scene_with_hand() {
        let mut app = make_app(0);
        app.handle_event(SourceEvent::Hand(HandPose::OpenPalm.frame(1.0, 0.5).points().to_vec()));
        app.tick();
        assert!(app.scene().yaw > 1.5);
    }

    #[test]
    fn config_validation() {
        assert!(AppConfig::default().validate().is_ok());

        let no_file = AppConfig { source: SourceKind::Replay, ..AppConfig::default() };
        assert!(matches!(no_file.validate(), Err(AppError::Config(_))));

        let zero_fps = AppConfig { fps: 0.0, ..AppConfig::default() };
        assert!(matches!(zero_fps.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn cli_parses_into_config() {
        let cfg = AppConfig::parse_from([
            "gesture_tree", "--source", "replay", "--replay", "hand.jsonl", "--photos", "4", "--seed", "9",
        ]);
        assert_eq!(cfg.source, SourceKind::Replay);
        assert_eq!(cfg.replay, Some(PathBuf::from("hand.jsonl")));
        assert_eq!(cfg.photos, 4);
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.fps, 30.0);
        assert!(cfg.validate().is_ok());
    }
}
