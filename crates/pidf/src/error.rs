use thiserror::Error;

/// Errors reported by the PIDF evaluator.
///
/// Both kinds are caller errors. Evaluation is deterministic, so the same
/// inputs fail the same way on every call.
#[derive(Error, Copy, Clone, Debug, PartialEq)]
pub enum PidfError {
    /// `T_s` is not strictly positive, `T_f` is negative, or either is not finite.
    #[error("invalid parameter `{name}` = {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// A per-channel sequence does not hold exactly one value per channel.
    #[error("`{name}` has {actual} elements, expected {expected}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
}
