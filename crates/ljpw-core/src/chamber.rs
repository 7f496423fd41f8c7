// ─────────────────────────────────────────────────────────────────────
// LJPW Resonance Kernel — Resonance Chamber
// ─────────────────────────────────────────────────────────────────────
//! Single-agent chamber: admit an initial state, step it through the
//! integrator, record snapshots and search for attractors.
//!
//! Every step returns a fresh [`ChamberState`]; the chamber itself is
//! immutable after construction and can be shared across threads.

use serde::{Deserialize, Serialize};

use ljpw_physics::{harmony, DerivativeModel, Integrator, LjpwDerivative, Settled};
use ljpw_types::{
    AttractorReport, BoundaryVector, ChamberConfig, ChamberError, ChamberResult, Snapshot,
    StateVector, DIM,
};

use crate::attractor::AttractorFinder;
use crate::recorder::{capture, SnapshotRecorder};

/// Everything one cycle produces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChamberState {
    pub cycle: u64,
    pub t: f64,
    pub state: StateVector,
    pub bounds: BoundaryVector,
    pub clipped: [bool; DIM],
}

impl ChamberState {
    /// The state one cycle later, after `settled` was produced by a step.
    pub fn advance(&self, settled: Settled, dt: f64) -> Self {
        let cycle = self.cycle + 1;
        Self {
            cycle,
            // Derived from the cycle so long runs do not accumulate error.
            t: cycle as f64 * dt,
            state: settled.state,
            bounds: settled.bounds,
            clipped: settled.clipped,
        }
    }

    pub fn harmony(&self) -> f64 {
        harmony(&self.state)
    }
}

pub struct ResonanceChamber {
    config: ChamberConfig,
    integrator: Integrator<LjpwDerivative>,
}

impl ResonanceChamber {
    /// Validate `config` and build the chamber.
    pub fn new(config: ChamberConfig) -> ChamberResult<Self> {
        config.validate()?;
        let model = LjpwDerivative::from_config(&config)?;
        let integrator = Integrator::new(model, config.dt)?;
        log::debug!(
            "resonance chamber: dt={}, boundary={}, coupling={:?}",
            config.dt,
            config.boundary.mode_name(),
            config.coupling_strength
        );
        Ok(Self { config, integrator })
    }

    pub fn config(&self) -> &ChamberConfig {
        &self.config
    }

    pub fn integrator(&self) -> &Integrator<LjpwDerivative> {
        &self.integrator
    }

    /// Cycle 0: the initial state floored at epsilon and clamped to the
    /// admissible ceiling of the initial bounds.
    pub fn init(&self, initial: StateVector) -> ChamberResult<ChamberState> {
        if !initial.is_finite() {
            return Err(ChamberError::Validation(format!(
                "initial state must be finite, got {:?}",
                initial.as_array()
            )));
        }
        let policy = self.integrator.model().boundary();
        let bounds = policy.initial_bounds();
        let state = policy.admit(&initial, &bounds);

        let mut clipped = [false; DIM];
        for (i, c) in clipped.iter_mut().enumerate() {
            *c = state[i] != initial[i];
        }
        if clipped.iter().any(|&c| c) {
            log::warn!(
                "initial state {:?} admitted as {:?}",
                initial.as_array(),
                state.as_array()
            );
        }

        Ok(ChamberState {
            cycle: 0,
            t: 0.0,
            state,
            bounds,
            clipped,
        })
    }

    /// One RK4 step plus the boundary policy.
    pub fn step(&self, current: &ChamberState) -> ChamberState {
        let settled = self.integrator.step(&current.state, &current.bounds);
        current.advance(settled, self.config.dt)
    }

    pub fn snapshot(&self, current: &ChamberState) -> Snapshot {
        capture(current, &self.config.equilibrium_target)
    }

    /// Fixed-length run. Records cycle 0, every `record_interval`-th
    /// cycle and the final cycle.
    pub fn run(
        &self,
        initial: StateVector,
        cycles: u64,
        record_interval: u64,
    ) -> ChamberResult<Vec<Snapshot>> {
        let mut recorder =
            SnapshotRecorder::new(record_interval, cycles, self.config.equilibrium_target)?;
        let mut current = self.init(initial)?;
        recorder.observe(&current);
        for _ in 0..cycles {
            current = self.step(&current);
            recorder.observe(&current);
        }

        let snapshots = recorder.finish();
        log::debug!(
            "run complete: {cycles} cycles, {} snapshots, final harmony {:.4}",
            snapshots.len(),
            current.harmony()
        );
        Ok(snapshots)
    }

    pub fn find_attractor(
        &self,
        initial: StateVector,
        max_cycles: u64,
        threshold: f64,
    ) -> ChamberResult<AttractorReport> {
        let finder = AttractorFinder::new(max_cycles, threshold)?;
        self.find_attractor_with(initial, &finder)
    }

    /// Attractor search with a configured finder (cancellation, deadline).
    pub fn find_attractor_with(
        &self,
        initial: StateVector,
        finder: &AttractorFinder,
    ) -> ChamberResult<AttractorReport> {
        let start = self.init(initial)?;
        let search = finder.search(
            start,
            |s| self.step(s),
            |prev, next| prev.state.distance(&next.state),
        );
        let converged = search.converged();
        let reached = search.state;
        Ok(AttractorReport {
            converged,
            cycle: search.cycle,
            cycles_run: search.cycles_run,
            termination: search.termination,
            state: reached.state,
            bounds: reached.bounds,
            harmony: reached.harmony(),
        })
    }
}
