use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pidf::Timing;
use sim::{ClosedLoop, Scenario as SimScenario};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::{AXES, AXIS_NAMES};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scenario {
    Step,
    Disturbance,
    Noisy,
}

impl From<Scenario> for SimScenario {
    fn from(s: Scenario) -> Self {
        match s {
            Scenario::Step => SimScenario::Step,
            Scenario::Disturbance => SimScenario::Disturbance,
            Scenario::Noisy => SimScenario::Noisy,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "pidf-sim",
    version,
    about = "Closed-loop PIDF filter simulation over three decoupled axes"
)]
struct Args {
    #[arg(value_enum, long, default_value = "step")]
    scenario: Scenario,

    /// JSON loop configuration (timing, per-axis gains and plants)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Total simulation time in seconds
    #[arg(long, default_value_t = 30.0)]
    seconds: f64,

    /// Sample period T_s in seconds, overrides the config file
    #[arg(long)]
    ts: Option<f64>,

    /// Derivative filter time constant T_f in seconds, overrides the config file
    #[arg(long)]
    tf: Option<f64>,

    /// RNG seed for sensor noise
    #[arg(long, default_value_t = 12345)]
    seed: u64,
}

/// Number of ticks needed to cover `seconds` at period `dt_s`.
fn tick_count(seconds: f64, dt_s: f64) -> Result<u64> {
    anyhow::ensure!(
        seconds.is_finite() && seconds > 0.0,
        "--seconds must be finite and > 0, got {seconds}"
    );
    Ok((seconds / dt_s).ceil() as u64)
}

#[derive(serde::Serialize)]
struct TraceRow {
    t_s: f64,
    setpoint: [f64; AXES],
    measurement: [f64; AXES],
    error: [f64; AXES],
    output: [f64; AXES],
    plant: [f64; AXES],
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => config::load(path)?.into_loop_config(args.seed)?,
        None => config::demo(Timing::new(0.01, 0.05)?, args.seed),
    };

    if args.ts.is_some() || args.tf.is_some() {
        let ts = args.ts.unwrap_or(cfg.timing.ts());
        let tf = args.tf.unwrap_or(cfg.timing.tf());
        cfg.timing = Timing::new(ts, tf).context("bad --ts/--tf")?;
    }

    let scenario = SimScenario::from(args.scenario);
    scenario.configure(&mut cfg);

    let dt_s = cfg.timing.ts();
    let steps = tick_count(args.seconds, dt_s)?;

    info!(
        scenario = scenario.label(),
        ts = dt_s,
        tf = cfg.timing.tf(),
        steps,
        "starting run"
    );
    for (name, ch) in AXIS_NAMES.iter().zip(cfg.channels.iter()) {
        info!(
            axis = *name,
            kp = ch.gains.kp,
            ki = ch.gains.ki,
            kd = ch.gains.kd,
            setpoint = ch.setpoint,
            "axis"
        );
    }

    let mut lp = ClosedLoop::new(&cfg);

    // Output JSONL trace to stdout (one object per line)
    for _ in 0..steps {
        let s = lp.tick();
        scenario.update(&mut lp, args.seconds);

        let row = TraceRow {
            t_s: s.t,
            setpoint: s.setpoint,
            measurement: s.measurement,
            error: s.error,
            output: s.output,
            plant: s.plant,
        };
        println!("{}", serde_json::to_string(&row)?);
    }

    let last = lp.plants();
    for (name, p) in AXIS_NAMES.iter().zip(last.iter()) {
        info!(axis = *name, value = p.value, "final");
    }

    Ok(())
}
