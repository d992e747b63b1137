//! rps_demo - survival rock/paper/scissors against a scripted synthetic player
//!
//! Each round the scripted player shows a random pose to the synthetic
//! backend. The pose is recognized, held until confirmed, and played against
//! the computer. The match ends on the first computer win.

use anyhow::{anyhow, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use gesture_kernel::detect::Segment;
use gesture_kernel::{
    GameLogic, GestureConfig, GestureTracker, LandmarkBackend, Move, Pose, RoundResult,
    SyntheticBackend,
};

#[path = "../ui.rs"]
mod ui;

/// Frames with no hand between rounds.
const GAP_FRAMES: u32 = 10;
const JITTER: f32 = 0.003;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Deterministic seed for the player and the computer.
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after this many rounds even if the player keeps surviving.
    #[arg(long, default_value_t = 10)]
    rounds: usize,
    /// Frames per second of the simulated camera.
    #[arg(long, default_value_t = 30)]
    fps: u32,
    /// Do not pace frames in real time.
    #[arg(long)]
    fast: bool,
    /// TOML config file (defaults to GESTURE_CONFIG).
    #[arg(long, env = "GESTURE_CONFIG")]
    config: Option<PathBuf>,
    /// UI mode for stderr progress (auto|plain|pretty).
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if args.fps == 0 {
        return Err(anyhow!("fps must be >= 1"));
    }
    let is_tty = std::io::stderr().is_terminal();
    let ui = ui::Ui::from_args(Some(&args.ui), is_tty, false);

    let cfg = {
        let _stage = ui.stage("Load config");
        GestureConfig::load_from(args.config.as_deref())?
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("rps_demo seed {}", seed);
    let mut player = StdRng::seed_from_u64(seed);
    let mut game = GameLogic::seeded(seed.wrapping_add(1));
    let mut backend = SyntheticBackend::default().with_jitter(JITTER, seed);
    backend.configure(&cfg.detector);
    backend.warm_up()?;
    let mut tracker = GestureTracker::new(cfg.recognition);

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .map_err(|e| anyhow!("error setting Ctrl-C handler: {}", e))?;

    let frame_period = Duration::from_secs_f64(1.0 / f64::from(args.fps));
    let show_frames = pose_frames(
        cfg.recognition.hold_time,
        args.fps,
        cfg.recognition.smoothing_frames,
    );
    let round_budget = GAP_FRAMES.saturating_add(show_frames);

    let meter = ui.hold_meter();
    let start = Instant::now();
    let mut frame = 0u32;
    let mut interrupted = false;

    'rounds: for _ in 0..args.rounds {
        if game.is_game_over() {
            break;
        }
        let pose = Pose::ALL[player.gen_range(0..Pose::ALL.len())];
        backend.set_timeline(vec![
            Segment::empty(GAP_FRAMES),
            Segment::hand(pose, show_frames),
        ]);

        let mut confirmed = None;
        for _ in 0..round_budget {
            if rx.try_recv().is_ok() {
                interrupted = true;
                break 'rounds;
            }
            let now = start + frame_period * frame;
            frame += 1;
            let detection = backend.detect(&[], cfg.frame.width, cfg.frame.height)?;
            match detection.primary() {
                Some(hand) => {
                    let update = tracker.process_at(&hand.landmarks, cfg.frame, now);
                    meter.update(update.smoothed.gesture.as_str(), update.progress, "hold");
                    confirmed = update.confirmed;
                }
                None => {
                    tracker.hand_lost();
                    meter.update("-", 0.0, "show a hand");
                }
            }
            if !args.fast {
                std::thread::sleep(frame_period);
            }
            if confirmed.is_some() {
                break;
            }
        }

        let Some(player_move) = confirmed.and_then(Move::from_gesture) else {
            meter.println(&format!("player showed {} but it was not recognized", pose));
            tracker.hand_lost();
            continue;
        };
        let round = game.play_round(player_move);
        let verdict = match round.result {
            RoundResult::PlayerWin => "player wins",
            RoundResult::CpuWin => "cpu wins",
            RoundResult::Draw => "draw",
        };
        meter.println(&format!(
            "round {:>2}: {} vs {} -> {} (streak {})",
            game.history().len(),
            round.player,
            round.cpu,
            verdict,
            game.win_streak()
        ));
        tracker.hand_lost();
    }
    meter.finish();

    if interrupted {
        log::info!("interrupted, stopping");
    }
    let stats = game.stats();
    println!(
        "rounds={} player_wins={} cpu_wins={} draws={} win_rate={:.2}",
        stats.rounds_played, stats.player_wins, stats.cpu_wins, stats.draws, stats.win_rate
    );
    println!("{}", serde_json::to_string(tracker.stats())?);
    Ok(())
}

/// Frames a pose is shown for: enough to fill the smoothing window and
/// complete the hold twice over. Saturates for absurd hold times.
fn pose_frames(hold: Duration, fps: u32, smoothing_frames: usize) -> u32 {
    // `as` saturates on float to int.
    let hold_frames = (hold.as_secs_f64() * f64::from(fps)).ceil() as u32;
    let window = u32::try_from(smoothing_frames).unwrap_or(u32::MAX);
    hold_frames
        .saturating_add(window)
        .saturating_mul(2)
        .saturating_add(1)
}
