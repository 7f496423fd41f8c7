// ─────────────────────────────────────────────────────────────────────
// LJPW Resonance Kernel — Canonical Parameters
// ─────────────────────────────────────────────────────────────────────
//! Reference points and default coupling matrices.
//!
//! All values are `const`: computed at compile time, read everywhere,
//! never mutated.

use crate::vector::{StateVector, DIM};

/// φ⁻¹ = (√5 − 1) / 2.
#[allow(clippy::excessive_precision)]
pub const PHI_INV: f64 = 0.618_033_988_749_894_848_2;

/// Natural Equilibrium: (φ⁻¹, √2 − 1, e − 2, ln 2).
///
/// Every simulation is pulled toward this point regardless of coupling.
pub const NATURAL_EQUILIBRIUM: StateVector = StateVector([
    PHI_INV,
    std::f64::consts::SQRT_2 - 1.0,
    std::f64::consts::E - 2.0,
    std::f64::consts::LN_2,
]);

/// Anchor Point (1, 1, 1, 1). Only used to measure harmony.
pub const ANCHOR_POINT: StateVector = StateVector([1.0; DIM]);

/// Default floor applied to every component.
pub const EPSILON: f64 = 0.001;

/// Default self-coupling matrix. Row `i` lists how much dimension `i`
/// reinforces each dimension `j`; the matrix is applied transposed.
pub const DEFAULT_COUPLING: [[f64; DIM]; DIM] = [
    [1.0, 1.4, 1.3, 1.5], // L
    [0.9, 1.0, 0.7, 1.2], // J
    [0.6, 0.8, 1.0, 0.5], // P
    [1.3, 1.1, 1.0, 1.0], // W
];

/// Default inter-coupling matrix for the dual-agent mode: strong
/// like-for-like transfer with weak cross-dimension leakage.
pub const DEFAULT_INTER_COUPLING: [[f64; DIM]; DIM] = [
    [0.9, 0.2, 0.1, 0.3],
    [0.2, 0.9, 0.2, 0.1],
    [0.1, 0.2, 0.9, 0.2],
    [0.3, 0.1, 0.2, 0.9],
];
