//! Discrete PIDF filter for fixed-rate control loops.
//!
//! Each channel evaluates
//!
//! ```text
//!                K_i       K_d s
//! PIDF(s) = K_p + --- + -----------
//!                 s      T_f s + 1
//! ```
//!
//! discretised with the bilinear (Tustin) transform into a second-order
//! recurrence over three input samples and two output samples. Channels share
//! `T_s` and `T_f` and never interact otherwise.
//!
//! Nothing here allocates or keeps hidden state. The caller owns the sample
//! history and shifts it between ticks, see [`Window`].
//!
//! ```
//! use pidf::{Gains, Pidf, Timing, Window};
//!
//! let timing = Timing::new(0.01, 0.05).unwrap();
//! let pidf = Pidf::new(timing, [Gains::new(2.0, 0.0, 0.0)]);
//! let mut window = Window::at_rest();
//!
//! let y = pidf.tick(&mut window, [1.0]);
//! assert!((y[0] - 2.0).abs() < 1e-12);
//! ```
//!
//! Non-finite gains or samples are not rejected; NaN and infinity propagate to
//! the output.

mod coefficients;
mod error;
mod evaluate;
mod filter;
mod timing;
mod window;


pub use coefficients::{Coefficients, Gains, Tap};
pub use error::PidfError;
pub use evaluate::{evaluate, evaluate_fixed, GainSlices, HistorySlices};
pub use filter::Pidf;
pub use timing::Timing;
pub use window::Window;
