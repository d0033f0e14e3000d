use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use heartfield_client::{run_sequence, MonoFontRasterizer, RunOptions};
use heartfield_core::{FieldConfig, RandomSource, Scene, SimpleRng, ThreadRandom};
use heartfield_shared::{FieldSettings, PhraseSequence, SceneMode};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    /// Layered heart, ambient orbiters, edge wrapping and trails
    Layered,
    /// Single heart outline, no wrapping, full clears
    Simple,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless particle scene renderer", long_about = None)]
struct Args {
    /// Viewport width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Number of frames to simulate (60 per second)
    #[arg(short, long, default_value_t = 900)]
    frames: u32,

    /// Write a PNG every N frames (0 to disable)
    #[arg(short = 'n', long, default_value_t = 60)]
    snapshot_every: u32,

    /// Directory for PNG snapshots
    #[arg(short, long, default_value = "frames")]
    out_dir: PathBuf,

    /// Engine preset the settings file is applied on top of
    #[arg(short, long, value_enum, default_value = "layered")]
    preset: Preset,

    /// JSON file with field setting overrides
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Pointer interaction: 'attract' or 'repel'
    #[arg(short, long, default_value = "repel")]
    mode: SceneMode,

    /// Hold the pointer at x,y for the whole run (e.g. '400,300')
    #[arg(long, value_parser = parse_point)]
    pointer: Option<(f32, f32)>,

    /// Milliseconds each phrase stays on screen
    #[arg(long, default_value_t = heartfield_shared::DEFAULT_PHRASE_INTERVAL_MS)]
    interval_ms: u32,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u32>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn parse_point(value: &str) -> Result<(f32, f32), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected 'x,y', got '{}'", value))?;
    let x = x.trim().parse().map_err(|e| format!("bad x: {}", e))?;
    let y = y.trim().parse().map_err(|e| format!("bad y: {}", e))?;
    Ok((x, y))
}

fn load_config(args: &Args) -> Result<FieldConfig> {
    let mut config = match args.preset {
        Preset::Layered => FieldConfig::layered(),
        Preset::Simple => FieldConfig::simple(),
    };

    if let Some(path) = &args.settings {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings = FieldSettings::from_json(&json)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        log::info!("Applying settings from {}", path.display());
        config.apply(&settings);
    }

    Ok(config)
}

fn run<R: RandomSource>(args: &Args, config: FieldConfig, rng: R) -> Result<()> {
    let mut scene = Scene::new(config, MonoFontRasterizer::new(), rng);
    scene.set_mode(args.mode);
    if let Some((x, y)) = args.pointer {
        scene.pointer_moved(x, y);
    }

    let sequence = PhraseSequence {
        interval_ms: args.interval_ms,
        ..PhraseSequence::default()
    };
    let options = RunOptions {
        width: args.width,
        height: args.height,
        frames: args.frames,
        snapshot_every: args.snapshot_every,
        out_dir: Some(args.out_dir.clone()),
    };

    let (written, _) = run_sequence(&mut scene, &sequence, &options).context("Scene run failed")?;
    log::info!(
        "Wrote {} snapshots to {}",
        written.len(),
        args.out_dir.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    log::info!("Heartfield client starting...");
    log::info!("Viewport: {}x{}", args.width, args.height);
    log::info!("Mode: {}", args.mode.as_str());

    let config = load_config(&args)?;

    match args.seed {
        Some(seed) => run(&args, config, SimpleRng::new(seed)),
        None => run(&args, config, ThreadRandom::new()),
    }
}
