use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pidf::{Gains, Timing};
use serde::Deserialize;
use sim::{ChannelConfig, LoopConfig, PlantParams};

pub const AXES: usize = 3;
pub const AXIS_NAMES: [&str; AXES] = ["roll", "pitch", "yaw"];

/// Loop configuration as read from a JSON file.
///
/// ```json
/// {
///   "timing": { "ts": 0.01, "tf": 0.05 },
///   "channels": [
///     { "kp": 2.0, "ki": 2.0, "kd": 0.05, "setpoint": 0.2 },
///     { "kp": 2.0, "ki": 2.0, "kd": 0.05, "setpoint": -0.1 },
///     { "kp": 1.0, "ki": 0.5, "kd": 0.0, "setpoint": 0.5, "plant_tau": 1.5 }
///   ]
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct FileConfig {
    pub timing: Timing,
    #[serde(default)]
    pub seed: Option<u64>,
    pub channels: Vec<FileChannel>,
}

#[derive(Debug, Deserialize)]
pub struct FileChannel {
    #[serde(flatten)]
    pub gains: Gains,
    #[serde(default)]
    pub setpoint: f64,
    #[serde(default = "default_plant_gain")]
    pub plant_gain: f64,
    #[serde(default = "default_plant_tau")]
    pub plant_tau: f64,
    #[serde(default)]
    pub noise_std: f64,
    #[serde(default)]
    pub bias: f64,
}

fn default_plant_gain() -> f64 {
    PlantParams::default().gain
}

fn default_plant_tau() -> f64 {
    PlantParams::default().tau
}

impl From<&FileChannel> for ChannelConfig {
    fn from(c: &FileChannel) -> Self {
        Self {
            gains: c.gains,
            setpoint: c.setpoint,
            plant: PlantParams {
                gain: c.plant_gain,
                tau: c.plant_tau,
            },
            noise_std: c.noise_std,
            bias: c.bias,
        }
    }
}

impl FileConfig {
    pub fn into_loop_config(self, fallback_seed: u64) -> Result<LoopConfig<AXES>> {
        anyhow::ensure!(
            self.channels.len() == AXES,
            "config has {} channels, expected {AXES} ({})",
            self.channels.len(),
            AXIS_NAMES.join(", ")
        );
        for (name, ch) in AXIS_NAMES.iter().zip(self.channels.iter()) {
            anyhow::ensure!(
                ch.plant_tau.is_finite() && ch.plant_tau > 0.0,
                "axis {name}: plant_tau must be finite and > 0, got {}",
                ch.plant_tau
            );
        }
        let mut cfg = LoopConfig::new(self.timing, self.seed.unwrap_or(fallback_seed));
        for (dst, src) in cfg.channels.iter_mut().zip(self.channels.iter()) {
            *dst = src.into();
        }
        Ok(cfg)
    }
}

pub fn load(path: &Path) -> Result<FileConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

/// Built-in configuration for the three demo axes.
pub fn demo(timing: Timing, seed: u64) -> LoopConfig<AXES> {
    let mut cfg = LoopConfig::new(timing, seed);
    cfg.channels[0].setpoint = 0.2;
    cfg.channels[1].setpoint = -0.1;
    cfg.channels[2] = ChannelConfig {
        gains: Gains::new(1.0, 0.5, 0.0),
        setpoint: 0.5,
        plant: PlantParams {
            gain: 1.0,
            tau: 1.5,
        },
        ..Default::default()
    };
    cfg
}
