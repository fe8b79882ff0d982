use crate::PidfError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sample period and derivative filter time constant shared by every channel.
///
/// A `Timing` can only be built through [`Timing::new`], so holding one means
/// `T_s > 0` and `T_f >= 0`, both finite.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawTiming", into = "RawTiming"))]
pub struct Timing {
    ts: f64,
    tf: f64,
}

impl Timing {
    pub fn new(ts: f64, tf: f64) -> Result<Self, PidfError> {
        if !ts.is_finite() || ts <= 0.0 {
            return Err(PidfError::InvalidParameter {
                name: "T_s",
                value: ts,
            });
        }
        if !tf.is_finite() || tf < 0.0 {
            return Err(PidfError::InvalidParameter {
                name: "T_f",
                value: tf,
            });
        }
        Ok(Self { ts, tf })
    }

    /// Sample period in seconds.
    pub fn ts(&self) -> f64 {
        self.ts
    }

    /// Derivative low-pass time constant in seconds.
    pub fn tf(&self) -> f64 {
        self.tf
    }

    /// `2 * (2*T_f + T_s)`, the normalising term of every coefficient.
    pub fn denominator(&self) -> f64 {
        2.0 * (2.0 * self.tf + self.ts)
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct RawTiming {
    ts: f64,
    tf: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawTiming> for Timing {
    type Error = PidfError;

    fn try_from(raw: RawTiming) -> Result<Self, Self::Error> {
        Timing::new(raw.ts, raw.tf)
    }
}

#[cfg(feature = "serde")]
impl From<Timing> for RawTiming {
    fn from(t: Timing) -> Self {
        Self { ts: t.ts, tf: t.tf }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_zero_filter_constant() {
        let t = Timing::new(0.01, 0.0).unwrap();
        assert_eq!(t.denominator(), 0.02);
    }

    #[test]
    fn rejects_bad_sample_period() {
        for ts in [0.0, -0.01, f64::NAN, f64::INFINITY] {
            match Timing::new(ts, 0.05) {
                Err(PidfError::InvalidParameter { name, .. }) => assert_eq!(name, "T_s"),
                other => panic!("ts = {ts}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_bad_filter_constant() {
        for tf in [-1.0, -1e-12, f64::NAN, f64::INFINITY] {
            match Timing::new(0.01, tf) {
                Err(PidfError::InvalidParameter { name, .. }) => assert_eq!(name, "T_f"),
                other => panic!("tf = {tf}: unexpected {other:?}"),
            }
        }
    }
}
