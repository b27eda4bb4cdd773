use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use kurbo::Size;
use reveal_core::{Batch, Phase, Playback, Scheduler, Shape, TransitionConfig, TransitionSequencer};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Container the built-in FAB and dialog are laid out in.
const PRESET_CONTAINER: Size = Size::new(250.0, 541.0);

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scene file with `start`, `end` and an optional `config`.
    /// Defaults to the FAB to dialog preset.
    #[arg(long, value_name = "FILE")]
    scene: Option<PathBuf>,

    /// Total duration in seconds, overriding the scene's config
    #[arg(long)]
    duration: Option<f64>,

    /// Print frames sampled at this rate instead of the timeline
    #[arg(long, value_name = "FPS")]
    sample_fps: Option<f64>,

    /// Cancel once this many phases have started
    #[arg(long, value_name = "PHASES")]
    cancel_after: Option<usize>,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Deserialize)]
struct Scene {
    start: Shape,
    end: Shape,
    #[serde(default)]
    config: TransitionConfig,
}

impl Scene {
    fn preset() -> Self {
        Self {
            start: Shape::fab(PRESET_CONTAINER),
            end: Shape::dialog(PRESET_CONTAINER),
            config: TransitionConfig::default(),
        }
    }

    fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading scene file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing scene file {}", path.display()))
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(cli.log_level.to_string().parse()?)
        .from_env_lossy();

    let subscriber_builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match cli.log_format {
        LogFormat::Json => subscriber_builder.json().init(),
        LogFormat::Pretty => subscriber_builder.pretty().init(),
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<String> {
    let mut scene = match &cli.scene {
        Some(path) => Scene::load(path)?,
        None => Scene::preset(),
    };
    if let Some(duration) = cli.duration {
        scene.config.total_duration = duration;
    }

    let mut sequencer = TransitionSequencer::new(scene.start, scene.end, scene.config)
        .context("planning transition")?;
    info!(durations = ?sequencer.plan().durations, "Transition planned");

    let token = sequencer.cancellation_token();
    let mut started = 0;
    let mut host = |at: f64, batch: &Batch| {
        info!(phase = ?batch.phase, at, instructions = batch.instructions.len(), "Batch committed");
        if batch.phase.is_morph_phase() {
            started += 1;
            if cli.cancel_after.is_some_and(|limit| started >= limit) {
                token.cancel();
            }
        }
    };
    let timeline = Scheduler::run(&mut sequencer, &mut host).context("running transition")?;

    if timeline.outcome == Phase::Cancelled {
        info!("Transition cancelled");
    }

    let output = match cli.sample_fps {
        Some(fps) => {
            let frames = Playback::new(&timeline).frames(fps);
            serde_json::to_string_pretty(&frames)?
        }
        None => serde_json::to_string_pretty(&timeline)?,
    };
    Ok(output)
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    match run(&cli) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
