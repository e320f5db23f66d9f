use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use cosmic_swirl::{RunError, Stepping, Swirl, SwirlConfig, Time, VisualFlags};

/// Cosmic Swirl - orbiting particle visualizer for voice assistants
#[derive(Parser)]
#[command(name = "cosmic-swirl", version, about)]
struct Cli {
    /// JSON config file; defaults are used for anything it leaves out
    #[arg(short, long, env = "COSMIC_SWIRL_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for the particle layout (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Scale motion by frame time at this reference rate instead of one step per frame
    #[arg(long, value_name = "FPS")]
    normalized: Option<f32>,

    /// Start with a call already live
    #[arg(long)]
    listening: bool,

    /// Run the engine without a window and report trail statistics
    #[arg(long)]
    headless: bool,

    /// Frames to simulate in headless mode
    #[arg(long, default_value = "1500")]
    frames: u64,

    /// Print the effective config as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,cosmic_swirl=info",
        1 => "info,cosmic_swirl=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), RunError> {
    let mut config = match &cli.config {
        Some(path) => SwirlConfig::load(path)?,
        None => SwirlConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(reference_fps) = cli.normalized {
        config.stepping = Stepping::Normalized { reference_fps };
    }
    config.validate()?;

    if cli.dump_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let swirl = Swirl::new(&config, &mut rng)?;

    if cli.headless {
        run_headless(swirl, cli.frames, cli.listening);
        return Ok(());
    }

    tracing::info!(
        config = ?cli.config,
        seed = ?config.seed,
        stepping = ?config.stepping,
        "starting visualizer"
    );
    cosmic_swirl::window::run(&config, swirl, cli.listening)
}

fn run_headless(mut swirl: Swirl, frames: u64, listening: bool) {
    swirl.set_flags(VisualFlags {
        listening,
        speaking: false,
    });

    let mut time = Time::fixed(1.0 / 60.0);
    for _ in 0..frames {
        time.update();
        swirl.frame(&time);
    }

    let radius_drift = swirl
        .particles()
        .iter()
        .map(|p| (p.position().length() - p.radius()).abs())
        .fold(0.0_f32, f32::max);
    let trail_len = swirl.particles().first().map_or(0, |p| p.trail.len());
    let points: usize = swirl.particles().iter().map(|p| p.trail.len()).sum();

    tracing::info!(
        frames = swirl.frames_elapsed(),
        particles = swirl.particles().len(),
        trail_len,
        points,
        radius_drift,
        "headless run finished"
    );
}
