// ─────────────────────────────────────────────────────────────────────
// LJPW Resonance Kernel — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for the resonance chamber.
///
/// Only construction and caller input can fail. Stepping a valid
/// chamber never returns an error: bound saturation is steady state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChamberError {
    /// Invalid chamber parameters (dt, gains, boundary range, matrices).
    #[error("config error: {0}")]
    Config(String),

    /// A vector or matrix was built from a slice of the wrong length.
    #[error("dimension error: {what} must have {expected} components, got {got}")]
    Dimension {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// Invalid caller input to a run (initial state, interval, budget).
    #[error("validation error: {0}")]
    Validation(String),
}

pub type ChamberResult<T> = Result<T, ChamberError>;
