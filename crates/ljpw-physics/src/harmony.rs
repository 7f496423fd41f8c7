// ─────────────────────────────────────────────────────────────────────
// LJPW Resonance Kernel — Harmony Metric
// ─────────────────────────────────────────────────────────────────────
//! harmony(s) = 1 / (1 + ||A − s||₂), A = Anchor Point (1, 1, 1, 1).
//!
//! Always recomputed from the state it describes; never cached.

use ljpw_types::params::ANCHOR_POINT;
use ljpw_types::StateVector;

/// Harmony ∈ (0, 1]; exactly 1 only at the Anchor Point.
#[inline]
pub fn harmony(state: &StateVector) -> f64 {
    1.0 / (1.0 + ANCHOR_POINT.distance(state))
}

/// Harmony of the midpoint between two agents.
#[inline]
pub fn shared_harmony(a: &StateVector, b: &StateVector) -> f64 {
    harmony(&a.midpoint(b))
}

/// Resonance strength between two agents: 1 / (1 + ||a − b||).
#[inline]
pub fn resonance(a: &StateVector, b: &StateVector) -> f64 {
    1.0 / (1.0 + a.distance(b))
}
