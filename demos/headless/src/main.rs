//! headless — run the flock without a renderer and report how it behaves.
//!
//! Usage: `headless [config.json]`.  Without a path the built-in defaults
//! below are used.  Set `RUST_LOG=debug` to see per-step dispatch logs.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use flock_core::{FlockConfig, ForceCoefficients, Pose, Vec3};
use flock_sim::{Advance, FlockBuilder, FlockObserver};

// ── Constants ─────────────────────────────────────────────────────────────────

const DEFAULT_SIDE:     usize = 16; // 16³ = 4 096 agents
const DEFAULT_STEPS:    u64   = 240;
const DEFAULT_FRAME_MS: u64   = 16; // ~60 Hz presentation cadence

// ── Config file ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(default)]
struct DemoConfig {
    /// Grid side; the flock holds `side³` agents.
    side:         usize,
    /// Presentation frames to run.
    steps:        u64,
    /// Sleep between frames, standing in for a renderer's frame time.
    frame_ms:     u64,
    coefficients: ForceCoefficients,
    #[serde(flatten)]
    flock:        FlockConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            side:         DEFAULT_SIDE,
            steps:        DEFAULT_STEPS,
            frame_ms:     DEFAULT_FRAME_MS,
            coefficients: ForceCoefficients::classic(),
            flock:        FlockConfig::default(),
        }
    }
}

fn load_config(path: &Path) -> Result<DemoConfig> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Tallies frames and tracks how far the flock has spread.
#[derive(Default)]
struct Stats {
    frames:      u64,
    completed:   u64,
    dropped:     u64,
    busy_time:   Duration,
    max_radius:  f32,
}

impl FlockObserver for Stats {
    fn on_poses(&mut self, _step: u64, poses: &[Pose]) {
        self.frames += 1;
        let widest = poses.iter().map(|p| p.position.length()).fold(0.0, f32::max);
        self.max_radius = self.max_radius.max(widest);
    }

    fn on_step_complete(&mut self, _step: u64, _agents: usize, elapsed: Duration) {
        self.completed += 1;
        self.busy_time += elapsed;
    }

    fn on_step_dropped(&mut self, _step: u64) {
        self.dropped += 1;
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let demo = match std::env::args_os().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => DemoConfig::default(),
    };

    println!("=== headless — rust_flock ===");
    println!(
        "Agents: {}  |  Frames: {}  |  Radius: {}  |  Chunk: {}  |  Units: {}",
        demo.side.pow(3),
        demo.steps,
        demo.flock.neighbor_radius,
        demo.flock.chunk_size,
        demo.flock.resolved_unit_count(),
    );
    println!();

    let mut flock = FlockBuilder::new(demo.flock.clone())
        .coefficients(demo.coefficients)
        .population(demo.side)
        .build(Stats::default())
        .context("building flock")?;

    let frame = Duration::from_millis(demo.frame_ms);
    let t0 = Instant::now();
    for _ in 0..demo.steps {
        flock.poll()?;
        if let Advance::Dispatched { step, chunks } = flock.advance()? {
            if step % 60 == 0 {
                info!(step, chunks, "frame");
            }
        }
        thread::sleep(frame);
    }
    flock.wait()?;
    let elapsed = t0.elapsed();

    // ── Summary ───────────────────────────────────────────────────────────
    let stats = flock.observer();
    let agents = flock.agents();
    let count = agents.len().max(1) as f32;
    let centroid: Vec3 = agents.iter().map(|a| a.position()).sum::<Vec3>() / count;
    let mean_speed = agents.iter().map(|a| a.speed()).sum::<f32>() / count;
    let heading = agents.iter().map(|a| a.velocity.normalize_or_zero()).sum::<Vec3>() / count;

    println!("Run complete in {:.3} s", elapsed.as_secs_f64());
    println!("  frames emitted  : {}", stats.frames);
    println!("  steps completed : {}", stats.completed);
    println!("  advances dropped: {}", stats.dropped);
    if stats.completed > 0 {
        println!(
            "  mean step time  : {:.2} ms",
            stats.busy_time.as_secs_f64() * 1_000.0 / stats.completed as f64
        );
    }
    println!();
    println!("{:<18} {:>10}", "Metric", "Value");
    println!("{}", "-".repeat(29));
    println!("{:<18} {:>10.3}", "centroid drift", centroid.length());
    println!("{:<18} {:>10.3}", "mean speed", mean_speed);
    println!("{:<18} {:>10.3}", "polarization", heading.length());
    println!("{:<18} {:>10.3}", "max radius", stats.max_radius);

    Ok(())
}
