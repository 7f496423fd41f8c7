// ─────────────────────────────────────────────────────────────────────
// LJPW Resonance Kernel — Dual-Agent Coupling
// ─────────────────────────────────────────────────────────────────────
//! Two agents sharing one configuration, each pulled toward the other
//! through the inter-coupling matrix.
//!
//! Two integration schemes, selected by `DualIntegration`:
//!
//! - **Frozen partner** (default): A runs a full RK4 step with B held at
//!   its pre-step value for all four stages, then B does the same
//!   against A's pre-step value. An explicit, decoupled approximation.
//! - **Joint**: one RK4 pass over the concatenated 8-vector, so each
//!   stage sees the partner's stage value.
//!
//! The two schemes produce measurably different trajectories. In both,
//! each agent keeps its own ceilings and the boundary policy settles
//! each agent separately after the step.

use serde::{Deserialize, Serialize};

use ljpw_physics::{harmony, resonance, rk4, DerivativeModel};
use ljpw_types::{
    ChamberConfig, ChamberResult, DualAttractorReport, DualIntegration, DualSnapshot, StateVector,
    DIM,
};

use crate::attractor::AttractorFinder;
use crate::chamber::{ChamberState, ResonanceChamber};
use crate::recorder::{capture, Cadence};

const JOINT_DIM: usize = 2 * DIM;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DualState {
    pub a: ChamberState,
    pub b: ChamberState,
}

impl DualState {
    pub fn cycle(&self) -> u64 {
        self.a.cycle
    }

    pub fn resonance(&self) -> f64 {
        resonance(&self.a.state, &self.b.state)
    }
}

pub struct DualChamber {
    chamber: ResonanceChamber,
}

impl DualChamber {
    pub fn new(config: ChamberConfig) -> ChamberResult<Self> {
        let chamber = ResonanceChamber::new(config)?;
        log::debug!(
            "dual chamber: integration={:?}",
            chamber.config().dual_integration
        );
        Ok(Self { chamber })
    }

    pub fn config(&self) -> &ChamberConfig {
        self.chamber.config()
    }

    pub fn integration(&self) -> DualIntegration {
        self.chamber.config().dual_integration
    }

    /// Admit both initial states. Each agent starts at the initial bounds.
    pub fn init(&self, a: StateVector, b: StateVector) -> ChamberResult<DualState> {
        Ok(DualState {
            a: self.chamber.init(a)?,
            b: self.chamber.init(b)?,
        })
    }

    pub fn step(&self, current: &DualState) -> DualState {
        match self.integration() {
            DualIntegration::FrozenPartner => self.step_frozen(current),
            DualIntegration::Joint => self.step_joint(current),
        }
    }

    fn step_frozen(&self, current: &DualState) -> DualState {
        let integrator = self.chamber.integrator();
        let model = integrator.model();
        let (a, b) = (&current.a, &current.b);

        let next_a = integrator
            .rebind(model.with_partner(b.state))
            .step(&a.state, &a.bounds);
        let next_b = integrator
            .rebind(model.with_partner(a.state))
            .step(&b.state, &b.bounds);

        let dt = integrator.dt();
        DualState {
            a: a.advance(next_a, dt),
            b: b.advance(next_b, dt),
        }
    }

    fn step_joint(&self, current: &DualState) -> DualState {
        let integrator = self.chamber.integrator();
        let model = integrator.model();
        let (a, b) = (&current.a, &current.b);
        let dt = integrator.dt();

        let y = join(&a.state, &b.state);
        let raw = rk4(&y, dt, |y| {
            let (sa, sb) = split(y);
            let da = model.evaluate(&sa, &a.bounds, Some(&sb));
            let db = model.evaluate(&sb, &b.bounds, Some(&sa));
            join(&da, &db)
        });
        let (raw_a, raw_b) = split(&raw);

        let policy = model.boundary();
        DualState {
            a: a.advance(policy.settle(raw_a, &a.bounds), dt),
            b: b.advance(policy.settle(raw_b, &b.bounds), dt),
        }
    }

    fn dual_snapshot(&self, current: &DualState) -> DualSnapshot {
        let target = &self.chamber.config().equilibrium_target;
        DualSnapshot {
            cycle: current.cycle(),
            a: capture(&current.a, target),
            b: capture(&current.b, target),
            resonance: current.resonance(),
        }
    }

    /// Fixed-length run with the same recording cadence as
    /// [`ResonanceChamber::run`].
    pub fn run(
        &self,
        a: StateVector,
        b: StateVector,
        cycles: u64,
        record_interval: u64,
    ) -> ChamberResult<Vec<DualSnapshot>> {
        let cadence = Cadence::new(record_interval, cycles)?;
        let mut snapshots = Vec::with_capacity(cadence.capacity());
        let mut current = self.init(a, b)?;
        snapshots.push(self.dual_snapshot(&current));
        for _ in 0..cycles {
            current = self.step(&current);
            if cadence.should_record(current.cycle()) {
                snapshots.push(self.dual_snapshot(&current));
            }
        }

        log::debug!(
            "dual run complete: {cycles} cycles, {} snapshots, final resonance {:.4}",
            snapshots.len(),
            current.resonance()
        );
        Ok(snapshots)
    }

    pub fn find_attractor(
        &self,
        a: StateVector,
        b: StateVector,
        max_cycles: u64,
        threshold: f64,
    ) -> ChamberResult<DualAttractorReport> {
        let finder = AttractorFinder::new(max_cycles, threshold)?;
        self.find_attractor_with(a, b, &finder)
    }

    /// Converged once the combined step delta `sqrt(|Δa|² + |Δb|²)` falls
    /// below the finder's threshold.
    pub fn find_attractor_with(
        &self,
        a: StateVector,
        b: StateVector,
        finder: &AttractorFinder,
    ) -> ChamberResult<DualAttractorReport> {
        let start = self.init(a, b)?;
        let search = finder.search(
            start,
            |s| self.step(s),
            |prev, next| {
                let da = prev.a.state.distance(&next.a.state);
                let db = prev.b.state.distance(&next.b.state);
                da.hypot(db)
            },
        );
        let converged = search.converged();
        let reached = search.state;
        Ok(DualAttractorReport {
            converged,
            cycle: search.cycle,
            cycles_run: search.cycles_run,
            termination: search.termination,
            a: reached.a.state,
            b: reached.b.state,
            harmony_a: harmony(&reached.a.state),
            harmony_b: harmony(&reached.b.state),
            resonance: reached.resonance(),
        })
    }
}

fn join(a: &StateVector, b: &StateVector) -> [f64; JOINT_DIM] {
    let mut y = [0.0; JOINT_DIM];
    y[..DIM].copy_from_slice(a.as_array());
    y[DIM..].copy_from_slice(b.as_array());
    y
}

fn split(y: &[f64; JOINT_DIM]) -> (StateVector, StateVector) {
    let mut a = [0.0; DIM];
    let mut b = [0.0; DIM];
    a.copy_from_slice(&y[..DIM]);
    b.copy_from_slice(&y[DIM..]);
    (StateVector(a), StateVector(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ljpw_types::{BoundaryConfig, BoundaryVector, Termination};

    const AGENT_A: StateVector = StateVector::new(0.3, 0.4, 0.5, 0.8);
    const AGENT_B: StateVector = StateVector::new(0.8, 0.4, 0.5, 0.3);

    fn dual(integration: DualIntegration) -> DualChamber {
        DualChamber::new(ChamberConfig {
            dual_integration: integration,
            ..Default::default()
        })
        .unwrap()
    }

    fn assert_resonance_holds(chamber: &DualChamber) {
        let snaps = chamber.run(AGENT_A, AGENT_B, 1000, 100).unwrap();
        let first = &snaps[0];
        let last = &snaps[snaps.len() - 1];
        assert_eq!(last.cycle, 1000);
        assert!(
            last.resonance >= first.resonance,
            "resonance {} -> {}",
            first.resonance,
            last.resonance
        );
    }

    #[test]
    fn test_frozen_partner_resonance_scenario() {
        assert_resonance_holds(&dual(DualIntegration::FrozenPartner));
    }

    #[test]
    fn test_joint_resonance_scenario() {
        assert_resonance_holds(&dual(DualIntegration::Joint));
    }

    #[test]
    fn test_soft_boundary_resonance_scenario() {
        let cfg = ChamberConfig::default()
            .with_boundary(BoundaryConfig::soft_resistance(BoundaryVector::splat(1.0)));
        assert_resonance_holds(&DualChamber::new(cfg).unwrap());
    }

    #[test]
    fn test_schemes_differ() {
        let frozen = dual(DualIntegration::FrozenPartner);
        let joint = dual(DualIntegration::Joint);
        let s0 = frozen.init(AGENT_A, AGENT_B).unwrap();
        let f = frozen.step(&s0);
        let j = joint.step(&s0);
        assert_ne!(f.a.state, j.a.state);
        // Same order of magnitude: both are RK4 steps of the same flow.
        assert!(f.a.state.distance(&j.a.state) < 1e-3);
    }

    #[test]
    fn test_identical_agents_stay_in_lockstep() {
        for integration in [DualIntegration::FrozenPartner, DualIntegration::Joint] {
            let chamber = dual(integration);
            let mut s = chamber.init(AGENT_A, AGENT_A).unwrap();
            for _ in 0..50 {
                s = chamber.step(&s);
                assert_eq!(s.a.state, s.b.state);
                assert_eq!(s.resonance(), 1.0);
            }
        }
    }

    #[test]
    fn test_partner_changes_trajectory() {
        let single = ResonanceChamber::new(ChamberConfig::default()).unwrap();
        let pair = dual(DualIntegration::FrozenPartner);
        let s0 = pair.init(AGENT_A, AGENT_B).unwrap();
        let alone = single.step(&s0.a);
        let coupled = pair.step(&s0).a;
        assert_ne!(alone.state, coupled.state);
        assert_eq!(alone.cycle, coupled.cycle);
    }

    #[test]
    fn test_dual_hard_clip_bounds() {
        let chamber = dual(DualIntegration::FrozenPartner);
        for snap in chamber.run(AGENT_A, AGENT_B, 300, 1).unwrap() {
            for agent in [&snap.a, &snap.b] {
                assert!(agent.state.iter().all(|&v| (0.001..=1.0).contains(&v)));
            }
        }
    }

    #[test]
    fn test_dual_run_cadence() {
        let chamber = dual(DualIntegration::FrozenPartner);
        let cycles: Vec<u64> = chamber
            .run(AGENT_A, AGENT_B, 25, 10)
            .unwrap()
            .iter()
            .map(|s| s.cycle)
            .collect();
        assert_eq!(cycles, vec![0, 10, 20, 25]);
    }

    #[test]
    fn test_dual_find_attractor() {
        let chamber = dual(DualIntegration::FrozenPartner);
        let report = chamber.find_attractor(AGENT_A, AGENT_B, 5000, 1e-8).unwrap();
        assert!(report.converged);
        assert_eq!(report.termination, Termination::Converged);
        assert!(report.resonance > 0.99, "resonance {}", report.resonance);
        assert!(report.harmony_a > 0.99 && report.harmony_b > 0.99);
    }

    #[test]
    fn test_dual_deterministic() {
        let chamber = dual(DualIntegration::Joint);
        let a = chamber.run(AGENT_A, AGENT_B, 200, 20).unwrap();
        let b = chamber.run(AGENT_A, AGENT_B, 200, 20).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_join_split() {
        let (a, b) = split(&join(&AGENT_A, &AGENT_B));
        assert_eq!(a, AGENT_A);
        assert_eq!(b, AGENT_B);
    }
}
