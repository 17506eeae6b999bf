mod scene;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use handgrip_base::GestureConfig;
use handgrip_geometry::Rect;
use handgrip_gesture::{Frame, GestureSession};
use scene::Scene;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "handgrip")]
#[command(about = "Hand gesture interpretation: replay landmark recordings as events")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Replay(ReplayArgs),
    Config(ConfigArgs),
}

#[derive(Args)]
struct ReplayArgs {
    /// One JSON frame per line.
    #[arg(long)]
    frames: PathBuf,
    #[arg(long)]
    scene: PathBuf,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "1280x720")]
    viewport: String,
}

#[derive(Args)]
struct ConfigArgs {
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Replay(args) => replay(args),
        Command::Config(args) => show_config(args),
    }
}

fn replay(args: ReplayArgs) -> Result<()> {
    let viewport = parse_viewport(&args.viewport)?;
    let config = load_config(args.config.as_deref())?;
    let Scene { camera, mut targets } = Scene::load(&args.scene)?;
    let projector = camera.build()?;
    let mut session = GestureSession::new(config).context("invalid gesture config")?;

    let file = std::fs::File::open(&args.frames)
        .with_context(|| format!("failed to open {}", args.frames.display()))?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let mut frames = 0usize;
    let mut emitted = 0usize;
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", number + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: Frame = serde_json::from_str(&line)
            .with_context(|| format!("invalid frame on line {}", number + 1))?;
        for event in session.on_frame(&frame, &mut targets, &*projector, viewport) {
            writeln!(out, "{}", serde_json::to_string(&event)?)?;
            emitted += 1;
        }
        frames += 1;
    }

    writeln!(out, "{}", serde_json::to_string(&targets)?)?;
    info!(frames, events = emitted, path = %args.frames.display(), "replay complete");
    Ok(())
}

fn show_config(args: ConfigArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<GestureConfig> {
    match path {
        Some(path) => GestureConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(GestureConfig::default()),
    }
}

fn parse_viewport(text: &str) -> Result<Rect> {
    let Some((width, height)) = text.split_once(['x', 'X']) else {
        bail!("--viewport expects WIDTHxHEIGHT, e.g. 1280x720");
    };

    let width: f32 = width.trim().parse().context("invalid viewport width")?;
    let height: f32 = height.trim().parse().context("invalid viewport height")?;
    if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
        bail!("viewport must be positive, got {width}x{height}");
    }
    Ok(Rect::from_size(width, height))
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
