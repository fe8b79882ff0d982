use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

mod closed_loop;

pub use closed_loop::{ChannelConfig, ClosedLoop, LoopConfig, Scenario, TickSample};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlantParams {
    /// Static gain from actuator command to plant output.
    pub gain: f64,
    /// First-order time constant in seconds.
    pub tau: f64,
}

impl Default for PlantParams {
    fn default() -> Self {
        Self {
            gain: 1.0,
            tau: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlantState {
    pub value: f64,
    /// Input disturbance added to the actuator command.
    pub load: f64,
}

impl PlantState {
    /// Euler step of a first-order lag:
    /// d(value)/dt = (gain*(u + load) - value) / tau
    pub fn step(&mut self, p: &PlantParams, u: f64, dt_s: f64) {
        let dvalue = (p.gain * (u + self.load) - self.value) / p.tau;
        self.value += dvalue * dt_s;

        // Keep the demo running if the controller fed us garbage
        if self.value.is_nan() {
            tracing::warn!("plant state became NaN, resetting to zero");
            self.value = 0.0;
        }
    }
}

#[derive(Clone, Debug)]
pub struct Sensor {
    pub noise_std: f64,
    pub bias: f64,
    rng: StdRng,
}

impl Sensor {
    pub fn new(seed: u64) -> Self {
        Self {
            noise_std: 0.0,
            bias: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn read(&mut self, true_value: f64) -> f64 {
        let mut v = true_value + self.bias;

        if self.noise_std > 0.0 {
            if let Ok(normal) = Normal::new(0.0, self.noise_std) {
                v += normal.sample(&mut self.rng);
            }
        }

        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plant_settles_at_gain_times_input() {
        let p = PlantParams {
            gain: 2.0,
            tau: 0.1,
        };
        let mut x = PlantState::default();
        for _ in 0..2000 {
            x.step(&p, 0.5, 0.001);
        }
        assert!((x.value - 1.0).abs() < 1e-6, "value = {}", x.value);
    }

    #[test]
    fn load_shifts_equilibrium() {
        let p = PlantParams::default();
        let mut x = PlantState {
            value: 0.0,
            load: 0.25,
        };
        for _ in 0..5000 {
            x.step(&p, 0.0, 0.01);
        }
        assert!((x.value - 0.25).abs() < 1e-6);
    }

    #[test]
    fn nan_command_resets_plant() {
        let mut x = PlantState::default();
        x.step(&PlantParams::default(), f64::NAN, 0.01);
        assert_eq!(x.value, 0.0);
    }

    #[test]
    fn noiseless_sensor_reports_bias_only() {
        let mut s = Sensor::new(7);
        s.bias = 0.5;
        assert_eq!(s.read(1.0), 1.5);
    }

    #[test]
    fn seeded_noise_is_repeatable() {
        let mut a = Sensor::new(42);
        let mut b = Sensor::new(42);
        a.noise_std = 0.1;
        b.noise_std = 0.1;
        for _ in 0..10 {
            assert_eq!(a.read(3.0), b.read(3.0));
        }
    }
}
