use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};

use cctv_track::mot::MatchingPolicy;
use cctv_track::pipeline::{Output, Session, SessionConfig, SystemClock, VideoSource};
use cctv_track::replay::{JsonLinesSink, ReplayFrame, ReplayRecognizer, ReplaySource, TerminalPresenter};

#[derive(Parser, Debug)]
#[command(
    name = "cctv-track",
    about = "Replays recorded recognizer output through the frame scheduler and track manager"
)]
struct Args {
    /// JSON lines capture: stream header followed by per-frame recognizer records
    capture: PathBuf,
    /// Write one JSON overlay per processed frame here instead of printing them
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// JSON session configuration
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long)]
    target_fps: Option<f64>,
    /// Frames a track survives without being observed
    #[arg(long)]
    max_staleness: Option<u64>,
    /// Require this bounding box overlap on top of label equality when matching
    #[arg(long)]
    min_iou: Option<f32>,
    /// Read the capture as fast as possible instead of at its native frame rate
    #[arg(long)]
    no_pace: bool,
    /// Wait for enter after every displayed frame, `q` quits
    #[arg(long)]
    step: bool,
    /// Stop processing after this many seconds
    #[arg(long, value_name = "SECS")]
    time_limit: Option<u64>,
    /// Also write the session summary as JSON
    #[arg(long, value_name = "PATH")]
    summary_json: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if let Some(target_fps) = args.target_fps {
        config.target_fps = target_fps;
    }
    if let Some(max_staleness) = args.max_staleness {
        config.max_staleness = max_staleness;
    }
    if let Some(min_iou) = args.min_iou {
        config.matching = MatchingPolicy::LabelIou { min_iou };
    }
    config.validate()?;
    Ok(config)
}

/// Raises `stop` on Ctrl-C, so the session ends between frames and still releases its output.
/// The handler is installed before this returns.
fn watch_interrupt(stop: Arc<AtomicBool>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("can't start interrupt listener")?;
    let mut interrupt = {
        let _guard = runtime.enter();
        #[cfg(unix)]
        let interrupt = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt());
        #[cfg(windows)]
        let interrupt = tokio::signal::windows::ctrl_c();
        interrupt.context("can't listen for Ctrl-C")?
    };
    thread::spawn(move || {
        if runtime.block_on(interrupt.recv()).is_some() {
            warn!("Interrupt received, stopping after the current frame");
            stop.store(true, Ordering::Relaxed);
        }
    });
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = load_config(&args)?;
    info!(
        "Target FPS: {}, max staleness: {} frames, matching: {}",
        config.target_fps, config.max_staleness, config.matching
    );

    // Nothing is written when the source can't be opened
    let source = ReplaySource::open(&args.capture)
        .with_context(|| format!("can't open capture {}", args.capture.display()))?;
    let mut source = if args.no_pace { source } else { source.paced() };

    let mut sink = match &args.output {
        Some(path) => match JsonLinesSink::create(path) {
            Ok(sink) => Some(sink),
            Err(e) => {
                error!("{}; falling back to interactive display", e);
                None
            }
        },
        None => None,
    };
    let input = if args.step { Some(io::stdin().lock()) } else { None };
    let mut presenter = TerminalPresenter::new(io::stdout(), input);
    let output: Output<'_, ReplayFrame> = match sink.as_mut() {
        Some(sink) => Output::Sink(sink),
        None => Output::Display(&mut presenter),
    };

    let stop = Arc::new(AtomicBool::new(false));
    watch_interrupt(Arc::clone(&stop))?;
    if let Some(secs) = args.time_limit {
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            stop.store(true, Ordering::Relaxed);
        });
    }

    let source_fps = source.metadata().fps;
    let mut session = Session::new(&config, source_fps, ReplayRecognizer, SystemClock);
    let summary = session.run(&mut source, output, &stop);

    println!("\n{}", summary);
    if let Some(path) = &args.summary_json {
        let json = serde_json::to_string_pretty(&summary)?;
        fs::write(path, json).with_context(|| format!("can't write summary {}", path.display()))?;
    }
    Ok(())
}
