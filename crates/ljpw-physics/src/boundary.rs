// ─────────────────────────────────────────────────────────────────────
// LJPW Resonance Kernel — Boundary Policies
// ─────────────────────────────────────────────────────────────────────
//! Three interchangeable ceiling policies:
//!
//! - **Hard clip**: clamp into `[ε, c_i]` after the step.
//! - **Soft resistance**: above `threshold · c_i` the derivative gets
//!   `−r · (s_i − threshold · c_i) / ((1 − threshold) · c_i)`; after the
//!   step a safety clip allows up to `overshoot · c_i`.
//! - **Co-evolving**: soft resistance against ceilings that evolve each
//!   cycle:
//!
//!     c_i' = clamp(c_i + g · H · s_i / max(c_i, 0.1) − d · (1 − H), lo, hi)
//!
//! The policy never mutates anything. `settle` returns the new state
//! and the new ceilings as values.

use ljpw_types::{BoundaryConfig, BoundaryVector, ChamberConfig, ChamberResult, StateVector, DIM};

use crate::harmony::harmony;

/// Minimum divisor for the co-evolving growth term.
const BOUND_DIVISOR_FLOOR: f64 = 0.1;

/// Result of applying the post-step boundary policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settled {
    pub state: StateVector,
    pub bounds: BoundaryVector,
    /// Per-dimension "hitting the bound" flags for this step.
    pub clipped: [bool; DIM],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryPolicy {
    config: BoundaryConfig,
    epsilon: f64,
}

impl BoundaryPolicy {
    /// Fails on a non-positive epsilon or invalid policy parameters.
    pub fn new(config: BoundaryConfig, epsilon: f64) -> ChamberResult<Self> {
        config.validate(epsilon)?;
        Ok(Self { config, epsilon })
    }

    pub fn from_config(config: &ChamberConfig) -> ChamberResult<Self> {
        Self::new(config.boundary, config.epsilon)
    }

    pub fn config(&self) -> &BoundaryConfig {
        &self.config
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn is_co_evolving(&self) -> bool {
        matches!(self.config, BoundaryConfig::CoEvolving { .. })
    }

    /// Ceilings in force at cycle 0.
    pub fn initial_bounds(&self) -> BoundaryVector {
        match self.config {
            BoundaryConfig::HardClip { ceiling } | BoundaryConfig::SoftResistance { ceiling, .. } => {
                ceiling
            }
            BoundaryConfig::CoEvolving { initial, .. } => initial,
        }
    }

    /// Highest value a component may take under the given ceilings.
    pub fn admissible_ceiling(&self, bounds: &BoundaryVector) -> StateVector {
        match self.config {
            BoundaryConfig::HardClip { .. } => bounds.scaled(1.0),
            BoundaryConfig::SoftResistance { overshoot, .. }
            | BoundaryConfig::CoEvolving { overshoot, .. } => bounds.scaled(overshoot),
        }
    }

    /// Derivative penalty near the ceiling. Zero for hard clip.
    pub fn resistance(&self, state: &StateVector, bounds: &BoundaryVector) -> StateVector {
        let (threshold, strength) = match self.config {
            BoundaryConfig::HardClip { .. } => return StateVector::ZERO,
            BoundaryConfig::SoftResistance {
                threshold,
                resistance,
                ..
            }
            | BoundaryConfig::CoEvolving {
                threshold,
                resistance,
                ..
            } => (threshold, resistance),
        };

        let mut out = [0.0; DIM];
        for (i, o) in out.iter_mut().enumerate() {
            let ceiling = bounds[i];
            let onset = threshold * ceiling;
            if state[i] > onset {
                let overshoot_fraction = (state[i] - onset) / ((1.0 - threshold) * ceiling);
                *o = -strength * overshoot_fraction;
            }
        }
        StateVector(out)
    }

    /// Bring a state into `[ε, admissible]` for the given ceilings.
    ///
    /// Used on the initial state before cycle 0 is recorded.
    pub fn admit(&self, state: &StateVector, bounds: &BoundaryVector) -> StateVector {
        self.clamp(*state, bounds).0
    }

    /// Co-evolve ceilings from the state just reached. Fixed policies
    /// return the ceilings unchanged.
    pub fn evolve_bounds(&self, bounds: &BoundaryVector, state: &StateVector) -> BoundaryVector {
        let BoundaryConfig::CoEvolving {
            growth_rate,
            decay_rate,
            min_bound,
            max_bound,
            ..
        } = self.config
        else {
            return *bounds;
        };

        let h = harmony(state);
        let mut next = bounds.0;
        for (i, c) in next.iter_mut().enumerate() {
            let growth = growth_rate * h * (state[i] / c.max(BOUND_DIVISOR_FLOOR));
            let decay = decay_rate * (1.0 - h);
            *c = (*c + growth - decay).clamp(min_bound, max_bound);
        }
        BoundaryVector(next)
    }

    /// Post-step policy: floor, clip, and co-evolve the ceilings.
    pub fn settle(&self, raw: StateVector, bounds: &BoundaryVector) -> Settled {
        let (state, mut clipped) = self.clamp(raw, bounds);
        if !self.is_co_evolving() {
            return Settled {
                state,
                bounds: *bounds,
                clipped,
            };
        }

        let next_bounds = self.evolve_bounds(bounds, &state);
        // A shrinking ceiling can leave the state above its new limit.
        let (state, reclipped) = self.clamp(state, &next_bounds);
        for (c, r) in clipped.iter_mut().zip(reclipped) {
            *c |= r;
        }
        Settled {
            state,
            bounds: next_bounds,
            clipped,
        }
    }

    fn clamp(&self, state: StateVector, bounds: &BoundaryVector) -> (StateVector, [bool; DIM]) {
        let hi = self.admissible_ceiling(bounds);
        let mut out = state.0;
        let mut clipped = [false; DIM];
        for i in 0..DIM {
            let v = out[i];
            if !v.is_finite() {
                log::error!(
                    "non-finite component {i} ({v}) reached the boundary; flooring to {}",
                    self.epsilon
                );
                out[i] = self.epsilon;
                clipped[i] = true;
                continue;
            }
            let c = v.clamp(self.epsilon, hi[i].max(self.epsilon));
            clipped[i] = c != v;
            out[i] = c;
        }
        (StateVector(out), clipped)
    }
}
