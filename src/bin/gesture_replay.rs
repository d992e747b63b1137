//! gesture_replay - run recorded or synthetic landmarks through the recognizer
//!
//! Frames are timed by a virtual clock at `--fps`, so a recording produces
//! the same confirmations no matter how fast it is processed.

use anyhow::{anyhow, Result};
use clap::Parser;
use serde::Serialize;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use gesture_kernel::{
    BackendRegistry, DetectionCapability, Gesture, GestureConfig, GestureTracker, SessionStats,
};

#[path = "../ui.rs"]
mod ui;

#[derive(Parser, Debug)]
#[command(
    name = "gesture_replay",
    about = "Replay hand landmarks through gesture recognition"
)]
struct Args {
    /// JSON-lines landmark recording (selects the replay backend)
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// TOML config file (defaults to GESTURE_CONFIG)
    #[arg(long, env = "GESTURE_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Frame rate of the recording (defaults to frame.target_fps)
    #[arg(long)]
    fps: Option<u32>,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Print confirmations and the session summary as JSON on stdout
    #[arg(long)]
    json: bool,

    /// UI mode for stderr progress (auto|plain|pretty)
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: String,
}

#[derive(Serialize)]
struct ConfirmationRecord {
    frame: u64,
    time_secs: f64,
    gesture: Gesture,
    confidence: f32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let is_tty = std::io::stderr().is_terminal();
    let ui = ui::Ui::from_args(Some(&args.ui), is_tty, args.json);

    let mut cfg = {
        let _stage = ui.stage("Load config");
        GestureConfig::load_from(args.config.as_deref())?
    };
    if let Some(input) = &args.input {
        cfg.replay_path = Some(input.clone());
        cfg.backend = "replay".to_string();
    }
    let fps = args.fps.unwrap_or(cfg.target_fps);
    if fps == 0 {
        return Err(anyhow!("fps must be >= 1"));
    }
    if cfg.backend != "replay" && args.frames.is_none() {
        log::info!("no --frames limit on a live backend, stop with Ctrl-C");
    }

    let backend = {
        let _stage = ui.stage("Open landmark backend");
        let registry = BackendRegistry::from_config(&cfg)?;
        let backend = registry.backend_for_capability(DetectionCapability::HandLandmarks)?;
        backend
            .lock()
            .map_err(|_| anyhow!("backend lock poisoned"))?
            .warm_up()?;
        backend
    };

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .map_err(|e| anyhow!("error setting Ctrl-C handler: {}", e))?;

    let mut tracker = GestureTracker::new(cfg.recognition);
    let meter = ui.hold_meter();
    let start = Instant::now();
    let frame_period = 1.0 / f64::from(fps);
    let mut frame = 0u64;

    loop {
        if args.frames.is_some_and(|limit| frame >= limit) || rx.try_recv().is_ok() {
            break;
        }
        let detection = {
            let mut guard = backend
                .lock()
                .map_err(|_| anyhow!("backend lock poisoned"))?;
            if guard.is_exhausted() {
                break;
            }
            guard.detect(&[], cfg.frame.width, cfg.frame.height)?
        };
        let time_secs = frame as f64 * frame_period;
        let now = start + Duration::from_secs_f64(time_secs);

        match detection.primary() {
            Some(hand) => {
                let update = tracker.process_at(&hand.landmarks, cfg.frame, now);
                meter.update(update.smoothed.gesture.as_str(), update.progress, "");
                if let Some(gesture) = update.confirmed {
                    let record = ConfirmationRecord {
                        frame,
                        time_secs,
                        gesture,
                        confidence: update.smoothed.confidence,
                    };
                    if args.json {
                        println!("{}", serde_json::to_string(&record)?);
                    } else {
                        meter.println(&format!(
                            "frame {:>6} t={:>7.2}s confirmed {} ({:.2})",
                            record.frame, record.time_secs, record.gesture, record.confidence
                        ));
                    }
                }
            }
            None => {
                tracker.hand_lost();
                meter.update("-", 0.0, "no hand");
            }
        }
        frame += 1;
    }
    meter.finish();

    log::info!("processed {} frames", frame);
    let stats = tracker.stats();
    if args.json {
        println!("{}", serde_json::to_string(stats)?);
    } else {
        print_summary(stats);
    }
    Ok(())
}

fn print_summary(stats: &SessionStats) {
    println!("frames:        {}", stats.frames);
    println!("hand losses:   {}", stats.hand_losses);
    println!("confirmations: {}", stats.confirmations);
    for gesture in Gesture::ALL {
        let tally = stats.tally(gesture);
        println!(
            "  {:<9} frames={:<6} mean_conf={:.2} confirmed={}",
            gesture.as_str(),
            tally.frames,
            tally.mean_confidence(),
            tally.confirmations
        );
    }
}
