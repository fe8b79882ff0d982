use crate::{Coefficients, Gains, PidfError, Tap, Timing, Window};

/// Per-channel gains borrowed from the caller.
#[derive(Clone, Copy, Debug)]
pub struct GainSlices<'a> {
    pub kp: &'a [f64],
    pub ki: &'a [f64],
    pub kd: &'a [f64],
}

impl GainSlices<'_> {
    fn channel(&self, i: usize) -> Gains {
        Gains::new(self.kp[i], self.ki[i], self.kd[i])
    }
}

/// Per-channel input and output history borrowed from the caller.
#[derive(Clone, Copy, Debug)]
pub struct HistorySlices<'a> {
    pub x_prev: &'a [f64],
    pub x: &'a [f64],
    pub x_next: &'a [f64],
    pub y_prev: &'a [f64],
    pub y: &'a [f64],
}

impl HistorySlices<'_> {
    fn channel(&self, i: usize) -> Tap {
        Tap {
            x_prev: self.x_prev[i],
            x: self.x[i],
            x_next: self.x_next[i],
            y_prev: self.y_prev[i],
            y: self.y[i],
        }
    }
}

fn check_len(name: &'static str, expected: usize, s: &[f64]) -> Result<(), PidfError> {
    if s.len() != expected {
        return Err(PidfError::LengthMismatch {
            name,
            expected,
            actual: s.len(),
        });
    }
    Ok(())
}

/// Compute `y_next` for every channel.
///
/// The channel count is `y_next.len()`. Timing is validated first, then every
/// input slice must match the channel count. On error `y_next` is untouched.
///
/// Does not allocate; coefficients are recomputed on every call so gains and
/// timing may change from one tick to the next. Use [`crate::Pidf`] to cache
/// them when they are constant.
pub fn evaluate(
    ts: f64,
    tf: f64,
    gains: &GainSlices<'_>,
    history: &HistorySlices<'_>,
    y_next: &mut [f64],
) -> Result<(), PidfError> {
    let timing = Timing::new(ts, tf)?;

    let n = y_next.len();
    check_len("K_p", n, gains.kp)?;
    check_len("K_i", n, gains.ki)?;
    check_len("K_d", n, gains.kd)?;
    check_len("x_prev", n, history.x_prev)?;
    check_len("x", n, history.x)?;
    check_len("x_next", n, history.x_next)?;
    check_len("y_prev", n, history.y_prev)?;
    check_len("y", n, history.y)?;

    for (i, out) in y_next.iter_mut().enumerate() {
        *out = Coefficients::tustin(&timing, gains.channel(i)).apply(&history.channel(i));
    }
    Ok(())
}

/// Compute `y_next` for a compile-time number of channels.
///
/// Infallible: `Timing` is already validated and the array lengths are fixed.
pub fn evaluate_fixed<const N: usize>(
    timing: &Timing,
    gains: &[Gains; N],
    window: &Window<N>,
) -> [f64; N] {
    core::array::from_fn(|i| Coefficients::tustin(timing, gains[i]).apply(&window.tap(i)))
}
