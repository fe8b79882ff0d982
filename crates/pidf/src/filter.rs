use crate::{Coefficients, Gains, PidfError, Timing, Window};

/// A bank of `N` PIDF channels with cached coefficients.
///
/// Holds parameters only. The sample history lives in a [`Window`] owned by
/// the caller, so one `Pidf` can be shared between loops.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pidf<const N: usize> {
    timing: Timing,
    gains: [Gains; N],
    coefs: [Coefficients; N],
}

impl<const N: usize> Pidf<N> {
    pub fn new(timing: Timing, gains: [Gains; N]) -> Self {
        let coefs = core::array::from_fn(|i| Coefficients::tustin(&timing, gains[i]));
        Self {
            timing,
            gains,
            coefs,
        }
    }

    /// Build from raw values, validating `ts` and `tf`.
    pub fn from_raw(
        ts: f64,
        tf: f64,
        kp: [f64; N],
        ki: [f64; N],
        kd: [f64; N],
    ) -> Result<Self, PidfError> {
        let timing = Timing::new(ts, tf)?;
        let gains = core::array::from_fn(|i| Gains::new(kp[i], ki[i], kd[i]));
        Ok(Self::new(timing, gains))
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn gains(&self) -> &[Gains; N] {
        &self.gains
    }

    pub fn coefficients(&self) -> &[Coefficients; N] {
        &self.coefs
    }

    pub fn set_timing(&mut self, timing: Timing) {
        self.timing = timing;
        for (c, g) in self.coefs.iter_mut().zip(self.gains.iter()) {
            *c = Coefficients::tustin(&timing, *g);
        }
    }

    /// # Panics
    ///
    /// Panics if `channel >= N`.
    pub fn set_gains(&mut self, channel: usize, gains: Gains) {
        self.gains[channel] = gains;
        self.coefs[channel] = Coefficients::tustin(&self.timing, gains);
    }

    /// Next output for every channel. Does not touch the window.
    pub fn step(&self, window: &Window<N>) -> [f64; N] {
        core::array::from_fn(|i| self.coefs[i].apply(&window.tap(i)))
    }

    /// Sample `x_next`, evaluate and shift the window. Returns `y_next`.
    pub fn tick(&self, window: &mut Window<N>, x_next: [f64; N]) -> [f64; N] {
        window.sample(x_next);
        let y_next = self.step(window);
        window.advance(y_next);
        y_next
    }
}
