// ─────────────────────────────────────────────────────────────────────
// LJPW Resonance Kernel — Derivative Model
// ─────────────────────────────────────────────────────────────────────
//! Instantaneous rate of change of one agent:
//!
//!   ds/dt = g_self  · (κ(H(s))   · Mᵀ s − s)           (self flow)
//!         + r_pull  · (E − s)                          (equilibrium pull)
//!         + B(s, c)                                    (boundary resistance)
//!         + g_inter · (κ(H(m)) · Iᵀ p − s)             (dual-agent only)
//!
//! with H the harmony, κ the alignment multiplier, E the equilibrium
//! target, p the partner state and m = (s + p) / 2. The partner term
//! uses the *shared* harmony of the midpoint, so two agents that agree
//! with each other amplify one another even when neither sits on the
//! anchor.
//!
//! Models are pure: no internal state, identical inputs give identical
//! output.

use ljpw_types::{BoundaryVector, ChamberConfig, ChamberResult, CouplingStrength, StateVector};

use crate::boundary::BoundaryPolicy;
use crate::coupling::{alignment_multiplier, CouplingMatrix};
use crate::harmony::{harmony, shared_harmony};

/// Strategy seam for the integrator: anything that can produce ds/dt
/// for a state under given ceilings.
pub trait DerivativeModel {
    fn derivative(&self, state: &StateVector, bounds: &BoundaryVector) -> StateVector;

    /// Post-step policy the integrator applies after each RK4 step.
    fn boundary(&self) -> &BoundaryPolicy;
}

impl<D: DerivativeModel + ?Sized> DerivativeModel for &D {
    fn derivative(&self, state: &StateVector, bounds: &BoundaryVector) -> StateVector {
        (**self).derivative(state, bounds)
    }

    fn boundary(&self) -> &BoundaryPolicy {
        (**self).boundary()
    }
}

/// The LJPW resonance model.
#[derive(Debug, Clone, PartialEq)]
pub struct LjpwDerivative {
    coupling: CouplingMatrix,
    inter_coupling: CouplingMatrix,
    strength: CouplingStrength,
    coupling_gain: f64,
    inter_coupling_gain: f64,
    pull_rate: f64,
    target: StateVector,
    boundary: BoundaryPolicy,
}

impl LjpwDerivative {
    /// Build from a chamber configuration. Rejects any config that
    /// `ChamberConfig::validate` rejects.
    pub fn from_config(config: &ChamberConfig) -> ChamberResult<Self> {
        config.validate()?;
        let inter_coupling = match config.inter_coupling_matrix {
            Some(m) => CouplingMatrix::new(m)?,
            None => CouplingMatrix::default_inter(),
        };
        Ok(Self {
            coupling: CouplingMatrix::new(config.coupling_matrix)?,
            inter_coupling,
            strength: config.coupling_strength,
            coupling_gain: config.coupling_gain,
            inter_coupling_gain: config.inter_coupling_gain,
            pull_rate: config.pull_rate,
            target: config.equilibrium_target,
            boundary: BoundaryPolicy::from_config(config)?,
        })
    }

    pub fn coupling(&self) -> &CouplingMatrix {
        &self.coupling
    }

    pub fn inter_coupling(&self) -> &CouplingMatrix {
        &self.inter_coupling
    }

    pub fn target(&self) -> &StateVector {
        &self.target
    }

    /// g_self · (κ(H) · Mᵀ s − s).
    pub fn self_flow(&self, state: &StateVector) -> StateVector {
        let kappa = alignment_multiplier(self.strength, harmony(state));
        self.coupling
            .effect(state, kappa)
            .sub(*state)
            .scale(self.coupling_gain)
    }

    /// r_pull · (E − s). Present regardless of coupling.
    pub fn equilibrium_pull(&self, state: &StateVector) -> StateVector {
        self.target.sub(*state).scale(self.pull_rate)
    }

    /// g_inter · (κ(H(midpoint)) · Iᵀ p − s).
    pub fn cross_flow(&self, state: &StateVector, partner: &StateVector) -> StateVector {
        let kappa = alignment_multiplier(self.strength, shared_harmony(state, partner));
        self.inter_coupling
            .effect(partner, kappa)
            .sub(*state)
            .scale(self.inter_coupling_gain)
    }

    /// Full derivative, with an optional partner for dual-agent mode.
    pub fn evaluate(
        &self,
        state: &StateVector,
        bounds: &BoundaryVector,
        partner: Option<&StateVector>,
    ) -> StateVector {
        let mut ds = self
            .self_flow(state)
            .add(self.equilibrium_pull(state))
            .add(self.boundary.resistance(state, bounds));
        if let Some(p) = partner {
            ds = ds.add(self.cross_flow(state, p));
        }
        ds
    }

    /// View of this model with the partner held fixed at `partner`.
    pub fn with_partner(&self, partner: StateVector) -> PartnerFrozen<'_> {
        PartnerFrozen {
            model: self,
            partner,
        }
    }
}

impl DerivativeModel for LjpwDerivative {
    fn derivative(&self, state: &StateVector, bounds: &BoundaryVector) -> StateVector {
        self.evaluate(state, bounds, None)
    }

    fn boundary(&self) -> &BoundaryPolicy {
        &self.boundary
    }
}

/// Dual-agent derivative with the partner frozen at its pre-step value
/// for all four RK4 stages.
#[derive(Debug, Clone, Copy)]
pub struct PartnerFrozen<'a> {
    model: &'a LjpwDerivative,
    partner: StateVector,
}

impl PartnerFrozen<'_> {
    pub fn partner(&self) -> &StateVector {
        &self.partner
    }
}

impl DerivativeModel for PartnerFrozen<'_> {
    fn derivative(&self, state: &StateVector, bounds: &BoundaryVector) -> StateVector {
        self.model.evaluate(state, bounds, Some(&self.partner))
    }

    fn boundary(&self) -> &BoundaryPolicy {
        &self.model.boundary
    }
}

/// Closure-backed model, for experiments that swap in their own flow.
pub struct FnModel<F> {
    f: F,
    boundary: BoundaryPolicy,
}

impl<F> FnModel<F>
where
    F: Fn(&StateVector, &BoundaryVector) -> StateVector,
{
    pub fn new(f: F, boundary: BoundaryPolicy) -> Self {
        Self { f, boundary }
    }
}

impl<F> DerivativeModel for FnModel<F>
where
    F: Fn(&StateVector, &BoundaryVector) -> StateVector,
{
    fn derivative(&self, state: &StateVector, bounds: &BoundaryVector) -> StateVector {
        (self.f)(state, bounds)
    }

    fn boundary(&self) -> &BoundaryPolicy {
        &self.boundary
    }
}
