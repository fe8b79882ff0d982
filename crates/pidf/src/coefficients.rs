use crate::Timing;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Gain triple of a single channel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Gains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }
}

/// History samples of a single channel, oldest to newest.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tap {
    pub x_prev: f64,
    pub x: f64,
    pub x_next: f64,
    pub y_prev: f64,
    pub y: f64,
}

/// Recurrence coefficients of one channel.
///
/// The output is normalised so that `y_next` has unit weight:
///
/// ```text
/// y_next = c.x_prev*x_prev + c.x*x + c.x_next*x_next - c.y_prev*y_prev - c.y*y
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Coefficients {
    pub x_prev: f64,
    pub x: f64,
    pub x_next: f64,
    pub y_prev: f64,
    pub y: f64,
}

impl Coefficients {
    /// Bilinear (Tustin) discretisation of
    ///
    /// ```text
    ///                K_i       K_d s
    /// PIDF(s) = K_p + --- + -----------
    ///                 s      T_f s + 1
    /// ```
    ///
    /// obtained by substituting `s = 2/T_s * (z - 1)/(z + 1)` and clearing the
    /// common factor `(z + 1)^2`, with every term divided by
    /// `D = 2(2T_f + T_s)`.
    ///
    /// The output side has characteristic polynomial
    /// `D z^2 - 8T_f z + (4T_f - T_s)`. Both roots lie inside the unit circle
    /// for any valid [`Timing`], so the recurrence has no pole at `z = 1`:
    /// `1 + c.y + c.y_prev = T_s/D`. A constant input therefore settles at
    /// `4 K_i T_s` times that input, and the proportional and derivative
    /// paths decay to zero.
    pub fn tustin(timing: &Timing, gains: Gains) -> Self {
        let ts = timing.ts();
        let tf = timing.tf();
        let d = timing.denominator();
        let Gains { kp, ki, kd } = gains;

        Self {
            x_prev: (2.0 * kp * (2.0 * tf - ts) + ki * ts * (ts - 2.0 * tf) + 4.0 * kd) / d,
            x: (-8.0 * kp * tf + 2.0 * ki * ts * ts - 8.0 * kd) / d,
            x_next: (2.0 * kp * (2.0 * tf + ts) + ki * ts * (ts + 2.0 * tf) + 4.0 * kd) / d,
            y_prev: (4.0 * tf - ts) / d,
            y: (-8.0 * tf) / d,
        }
    }

    /// Next output sample for one channel. NaN or infinite inputs propagate.
    #[inline]
    pub fn apply(&self, tap: &Tap) -> f64 {
        self.x_prev * tap.x_prev + self.x * tap.x + self.x_next * tap.x_next
            - self.y_prev * tap.y_prev
            - self.y * tap.y
    }
}
