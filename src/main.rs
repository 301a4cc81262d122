//! Core Siege headless runner
//!
//! Drives a session at a fixed frame length, feeds it scripted commands and
//! writes one JSON snapshot per frame to stdout.
//!
//! ```text
//! core-siege [--settings FILE] [--script FILE] [--duration-ms N]
//!            [--frame-ms N] [--stride N] [--no-particles] [--quiet]
//!            [--print-settings]
//! ```

use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use core_siege::Settings;
use core_siege::platform::{InputSource, ScriptedInput};
use core_siege::renderer::{FrameSnapshot, JsonLinesRenderer, NullRenderer, Renderer};
use core_siege::sim::{GamePhase, GameSession, tick};

/// One frame at 60 Hz
const DEFAULT_FRAME_MS: f64 = 1000.0 / 60.0;
/// Five minutes of wall-clock time
const DEFAULT_DURATION_MS: f64 = 300_000.0;

/// Headless core-defense simulation
#[derive(Debug, Parser)]
#[command(name = "core-siege", version, about)]
struct Options {
    /// Settings file (JSON)
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Timed command script (JSON)
    #[arg(long)]
    script: Option<PathBuf>,
    /// Simulated run length in milliseconds
    #[arg(long, default_value_t = DEFAULT_DURATION_MS)]
    duration_ms: f64,
    /// Length of one frame in milliseconds
    #[arg(long, default_value_t = DEFAULT_FRAME_MS, value_parser = positive_ms)]
    frame_ms: f64,
    /// Write every Nth snapshot
    #[arg(long, default_value_t = 1)]
    stride: u64,
    /// Disable cosmetic particles
    #[arg(long)]
    no_particles: bool,
    /// Run without writing snapshots
    #[arg(long)]
    quiet: bool,
    /// Print the effective settings as JSON and exit
    #[arg(long)]
    print_settings: bool,
}

fn positive_ms(raw: &str) -> Result<f64, String> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(format!("expected a positive number of milliseconds, got '{raw}'")),
    }
}

/// Run until the duration elapses, or the run is over and no scripted
/// command could restart it
fn run(
    session: &mut GameSession,
    input: &mut dyn InputSource,
    renderer: &mut dyn Renderer,
    opts: &Options,
) -> Result<u64> {
    let mut now = 0.0;
    let mut frames = 0;
    while now < opts.duration_ms {
        for command in input.poll(now) {
            // Rejections are logged by the session
            let _ = session.apply(command);
        }

        tick(session, opts.frame_ms);
        let events = session.drain_events();
        renderer
            .draw(&FrameSnapshot::capture(session, events))
            .with_context(|| format!("failed to draw frame {}", session.frame))?;

        now += opts.frame_ms;
        frames += 1;

        if session.phase == GamePhase::GameOver && input.is_exhausted() {
            break;
        }
    }
    renderer.finish().context("failed to flush renderer")?;
    Ok(frames)
}

/// Settings from the file (or defaults) with command-line overrides applied
fn effective_settings(opts: &Options) -> Result<Settings> {
    let mut settings = match &opts.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if opts.no_particles {
        settings.particles = false;
    }
    Ok(settings)
}

fn main() -> Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let opts = Options::parse();
    let settings = effective_settings(&opts)?;

    if opts.print_settings {
        println!("{}", settings.to_json_pretty().context("failed to encode settings")?);
        return Ok(());
    }

    let mut input = match &opts.script {
        Some(path) => ScriptedInput::load(path)
            .with_context(|| format!("failed to load script from {}", path.display()))?,
        None => ScriptedInput::default(),
    };

    log::info!("Core Siege (headless) starting...");
    let mut session = GameSession::new(settings);

    let frames = if opts.quiet {
        run(&mut session, &mut input, &mut NullRenderer::default(), &opts)?
    } else {
        let stdout = BufWriter::new(io::stdout().lock());
        let mut renderer = JsonLinesRenderer::new(stdout).with_stride(opts.stride);
        run(&mut session, &mut input, &mut renderer, &opts)?
    };

    log::info!(
        "Finished after {} frames: phase={:?} wave={} money={} units={}",
        frames,
        session.phase,
        session.wave(),
        session.money,
        session.units.len()
    );
    Ok(())
}
