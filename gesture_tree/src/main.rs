//! gesture_tree — interactive entry point.

use clap::Parser;
use gesture_tree::app::{run, AppConfig, SourceKind};

fn main() {
    let cfg = AppConfig::parse();
    gesture_tree::init_logging(&cfg.log_level);

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Gesture Tree — Hand-Controlled Christmas Tree         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    match cfg.source {
        SourceKind::Sim    => println!("  Mode: Keyboard simulation  (F fist, O open, P pinch, U photo, Q quit)"),
        SourceKind::Replay => println!("  Mode: Replay {}  @ {} fps",
            cfg.replay.as_ref().map_or("?".to_string(), |p| p.display().to_string()), cfg.fps),
        SourceKind::Leap   => println!("  Mode: LeapMotion hardware"),
    }
    println!();
    println!("  Opening visualizer window…");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
