use crate::{HistorySlices, Tap};

/// Sliding sample history for `N` channels.
///
/// The window belongs to the control loop. Each tick the loop stores the
/// newest input with [`Window::sample`], evaluates, then shifts with
/// [`Window::advance`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window<const N: usize> {
    pub x_prev: [f64; N],
    pub x: [f64; N],
    pub x_next: [f64; N],
    pub y_prev: [f64; N],
    pub y: [f64; N],
}

impl<const N: usize> Default for Window<N> {
    fn default() -> Self {
        Self::at_rest()
    }
}

impl<const N: usize> Window<N> {
    /// All inputs and outputs zero.
    pub const fn at_rest() -> Self {
        Self {
            x_prev: [0.0; N],
            x: [0.0; N],
            x_next: [0.0; N],
            y_prev: [0.0; N],
            y: [0.0; N],
        }
    }

    /// Store this tick's newest input sample.
    pub fn sample(&mut self, x_next: [f64; N]) {
        self.x_next = x_next;
    }

    /// Shift the window by one tick once `y_next` has been computed.
    pub fn advance(&mut self, y_next: [f64; N]) {
        self.x_prev = self.x;
        self.x = self.x_next;
        self.y_prev = self.y;
        self.y = y_next;
    }

    /// History of channel `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= N`.
    pub fn tap(&self, i: usize) -> Tap {
        Tap {
            x_prev: self.x_prev[i],
            x: self.x[i],
            x_next: self.x_next[i],
            y_prev: self.y_prev[i],
            y: self.y[i],
        }
    }

    /// Borrow the window for the slice-based [`crate::evaluate`].
    pub fn as_history(&self) -> HistorySlices<'_> {
        HistorySlices {
            x_prev: &self.x_prev,
            x: &self.x,
            x_next: &self.x_next,
            y_prev: &self.y_prev,
            y: &self.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_shifts_oldest_out() {
        let mut w = Window::<2>::at_rest();
        w.x_prev = [1.0, 10.0];
        w.x = [2.0, 20.0];
        w.sample([3.0, 30.0]);
        w.y_prev = [4.0, 40.0];
        w.y = [5.0, 50.0];

        w.advance([6.0, 60.0]);

        assert_eq!(w.x_prev, [2.0, 20.0]);
        assert_eq!(w.x, [3.0, 30.0]);
        assert_eq!(w.x_next, [3.0, 30.0]);
        assert_eq!(w.y_prev, [5.0, 50.0]);
        assert_eq!(w.y, [6.0, 60.0]);
    }

    #[test]
    fn tap_picks_one_channel() {
        let mut w = Window::<3>::default();
        w.sample([0.0, 7.0, 0.0]);
        w.y = [0.0, -1.0, 0.0];
        let tap = w.tap(1);
        assert_eq!(tap.x_next, 7.0);
        assert_eq!(tap.y, -1.0);
        assert_eq!(tap.x_prev, 0.0);
    }
}
