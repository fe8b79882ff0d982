use pidf::{Gains, Pidf, Timing, Window};
use tracing::{debug, warn};

use crate::{PlantParams, PlantState, Sensor};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelConfig {
    pub gains: Gains,
    pub setpoint: f64,
    pub plant: PlantParams,
    pub noise_std: f64,
    pub bias: f64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            gains: Gains::new(2.0, 2.0, 0.05),
            setpoint: 1.0,
            plant: PlantParams::default(),
            noise_std: 0.0,
            bias: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoopConfig<const N: usize> {
    pub timing: Timing,
    pub channels: [ChannelConfig; N],
    pub seed: u64,
}

impl<const N: usize> LoopConfig<N> {
    pub fn new(timing: Timing, seed: u64) -> Self {
        Self {
            timing,
            channels: [ChannelConfig::default(); N],
            seed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scenario {
    /// Setpoint step from rest.
    Step,
    /// Setpoint step, then a constant input load at half time.
    Disturbance,
    /// Setpoint step seen through a noisy sensor.
    Noisy,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Step, Scenario::Disturbance, Scenario::Noisy];

    pub fn label(self) -> &'static str {
        match self {
            Scenario::Step => "Step",
            Scenario::Disturbance => "Load disturbance (after 50%)",
            Scenario::Noisy => "Noisy sensor",
        }
    }

    /// Adjust a configuration before the run starts.
    pub fn configure<const N: usize>(self, cfg: &mut LoopConfig<N>) {
        if self == Scenario::Noisy {
            for ch in cfg.channels.iter_mut() {
                if ch.noise_std == 0.0 {
                    ch.noise_std = 0.02;
                }
            }
        }
    }

    /// Apply time-dependent scenario events. Call once per tick.
    pub fn update<const N: usize>(self, lp: &mut ClosedLoop<N>, seconds: f64) {
        if self == Scenario::Disturbance && lp.t() > seconds * 0.5 {
            for i in 0..N {
                lp.set_load(i, -0.3);
            }
        }
    }
}

/// One tick of the closed loop, all channels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickSample<const N: usize> {
    pub t: f64,
    pub setpoint: [f64; N],
    pub measurement: [f64; N],
    pub error: [f64; N],
    pub output: [f64; N],
    pub plant: [f64; N],
}

/// Control loop around `N` independent plants.
///
/// Owns the sample window and does the per-tick shift; the filter itself
/// only sees the window for the duration of a call.
#[derive(Clone, Debug)]
pub struct ClosedLoop<const N: usize> {
    pidf: Pidf<N>,
    window: Window<N>,
    setpoints: [f64; N],
    params: [PlantParams; N],
    plants: [PlantState; N],
    sensors: [Sensor; N],
    t: f64,
    step_count: u64,
}

impl<const N: usize> ClosedLoop<N> {
    pub fn new(cfg: &LoopConfig<N>) -> Self {
        let gains = cfg.channels.map(|c| c.gains);
        let sensors = core::array::from_fn(|i| {
            let mut s = Sensor::new(cfg.seed ^ (0xA1 + i as u64));
            s.noise_std = cfg.channels[i].noise_std;
            s.bias = cfg.channels[i].bias;
            s
        });

        Self {
            pidf: Pidf::new(cfg.timing, gains),
            window: Window::at_rest(),
            setpoints: cfg.channels.map(|c| c.setpoint),
            params: cfg.channels.map(|c| c.plant),
            plants: [PlantState::default(); N],
            sensors,
            t: 0.0,
            step_count: 0,
        }
    }

    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn pidf(&self) -> &Pidf<N> {
        &self.pidf
    }

    pub fn window(&self) -> &Window<N> {
        &self.window
    }

    pub fn plants(&self) -> &[PlantState; N] {
        &self.plants
    }

    pub fn set_setpoint(&mut self, channel: usize, value: f64) {
        self.setpoints[channel] = value;
    }

    pub fn set_load(&mut self, channel: usize, load: f64) {
        self.plants[channel].load = load;
    }

    /// Retune between ticks. The sample history is kept.
    pub fn set_gains(&mut self, channel: usize, gains: Gains) {
        self.pidf.set_gains(channel, gains);
    }

    pub fn set_timing(&mut self, timing: Timing) {
        self.pidf.set_timing(timing);
    }

    /// Read sensors, evaluate the filter on the control error, shift the
    /// window and drive the plants with the new output.
    pub fn tick(&mut self) -> TickSample<N> {
        let dt_s = self.pidf.timing().ts();

        let measurement: [f64; N] =
            core::array::from_fn(|i| self.sensors[i].read(self.plants[i].value));
        let error: [f64; N] = core::array::from_fn(|i| self.setpoints[i] - measurement[i]);

        let output = self.pidf.tick(&mut self.window, error);

        for (i, u) in output.iter().enumerate() {
            if !u.is_finite() {
                warn!(channel = i, t = self.t, "non-finite controller output {u}");
            }
            self.plants[i].step(&self.params[i], *u, dt_s);
        }

        let sample = TickSample {
            t: self.t,
            setpoint: self.setpoints,
            measurement,
            error,
            output,
            plant: self.plants.map(|p| p.value),
        };
        debug!(step = self.step_count, t = self.t, ?output, "tick");

        self.t += dt_s;
        self.step_count += 1;
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config<const N: usize>() -> LoopConfig<N> {
        LoopConfig::new(Timing::new(0.01, 0.05).unwrap(), 1)
    }

    #[test]
    fn settles_at_loop_gain_fraction_of_setpoint() {
        let mut lp = ClosedLoop::new(&config::<1>());
        let mut last = None;
        for _ in 0..3000 {
            last = Some(lp.tick());
        }
        let s = last.unwrap();
        // Controller DC gain 4 K_i T_s = 0.08 against a unit plant gain.
        let c = 4.0 * 2.0 * 0.01;
        let expected = c / (1.0 + c);
        assert!((s.plant[0] - expected).abs() < 1e-9, "plant = {}", s.plant[0]);
        assert!((s.output[0] - expected).abs() < 1e-9, "output = {}", s.output[0]);
        assert!((s.t - 29.99).abs() < 1e-9);
    }

    #[test]
    fn window_holds_last_error_and_output() {
        let mut lp = ClosedLoop::new(&config::<2>());
        let first = lp.tick();
        let second = lp.tick();
        let w = lp.window();
        assert_eq!(w.x, second.error);
        assert_eq!(w.x_prev, first.error);
        assert_eq!(w.y, second.output);
        assert_eq!(w.y_prev, first.output);
    }

    #[test]
    fn disturbance_scenario_loads_plant_after_half_time() {
        let mut lp = ClosedLoop::new(&config::<2>());
        for _ in 0..20 {
            lp.tick();
            Scenario::Disturbance.update(&mut lp, 0.2);
        }
        assert_eq!(lp.plants()[0].load, -0.3);
        assert_eq!(lp.plants()[1].load, -0.3);
    }

    #[test]
    fn noisy_scenario_keeps_explicit_noise() {
        let mut cfg = config::<2>();
        cfg.channels[1].noise_std = 0.5;
        Scenario::Noisy.configure(&mut cfg);
        assert_eq!(cfg.channels[0].noise_std, 0.02);
        assert_eq!(cfg.channels[1].noise_std, 0.5);
    }
}
