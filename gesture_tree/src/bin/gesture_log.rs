//! gesture_log — headless classify-then-reduce over a landmark recording.
//!
//! Reads the replay format (one JSON frame per line, `null` for no hand)
//! from a file or stdin and prints one JSON object per frame.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use clap::Parser;
use gesture_tree::source::{line_event, SourceEvent};
use gesture_tree::{AppError, Result};
use hand_gesture::{Coordinator, GestureLabel, HandSample, InteractionMode};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "gesture_log", version, about = "Print per-frame gesture and mode for a landmark recording")]
struct Cli {
    /// JSON-lines recording; stdin when omitted.
    input: Option<PathBuf>,

    /// Photo count the coordinator sees.
    #[arg(long, default_value_t = 0)]
    photos: usize,

    /// Fallback log filter when RUST_LOG is unset.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Serialize)]
struct FrameRecord {
    frame:          usize,
    gesture:        GestureLabel,
    x:              f32,
    y:              f32,
    mode:           InteractionMode,
    focus:          usize,
    mode_changed:   bool,
    focus_advanced: bool,
}

fn main() {
    let cli = Cli::parse();
    gesture_tree::init_logging(&cli.log_level);

    if let Err(e) = log_input(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn log_input(cli: &Cli) -> Result<()> {
    let stdout = io::stdout();
    let out = stdout.lock();
    match &cli.input {
        Some(path) => {
            let file = File::open(path).map_err(|source| AppError::Replay {
                path: path.clone(),
                source,
            })?;
            run(BufReader::new(file), out, cli.photos)
        }
        None => run(io::stdin().lock(), out, cli.photos),
    }
}

/// Classify and reduce every non-blank line of `input`, writing one JSON
/// record per frame to `out`.
fn run<R: BufRead, W: Write>(input: R, mut out: W, photos: usize) -> Result<()> {
    let mut coord = Coordinator::new();
    coord.set_photo_count(photos);
    let mut frame = 0usize;

    for (i, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }

        let sample = match line_event(i + 1, &line) {
            SourceEvent::Hand(points) => HandSample::from_points(&points),
            _                         => HandSample::absent(),
        };
        let t = coord.observe(sample.gesture());

        let record = FrameRecord {
            frame,
            gesture:        sample.gesture(),
            x:              sample.x(),
            y:              sample.y(),
            mode:           t.to,
            focus:          t.focus_index,
            mode_changed:   t.mode_changed(),
            focus_advanced: t.focus_advanced,
        };
        serde_json::to_writer(&mut out, &record)?;
        writeln!(out)?;
        frame += 1;
    }
    out.flush()?;
    Ok(())
}
