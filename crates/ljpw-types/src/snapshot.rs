// ─────────────────────────────────────────────────────────────────────
// LJPW Resonance Kernel — Snapshot & Report Types
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::vector::{BoundaryVector, StateVector, DIM, DIM_NAMES};

/// Immutable record of one recorded cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Cycle index; 0 is the admitted initial state.
    pub cycle: u64,
    /// Simulation time (cycle · dt).
    pub t: f64,
    pub state: StateVector,
    /// Ceilings in force after this cycle.
    pub bounds: BoundaryVector,
    /// Harmony ∈ (0, 1].
    pub harmony: f64,
    /// Euclidean distance to the equilibrium target.
    pub distance_to_equilibrium: f64,
    /// Dimension with the lowest fill ratio `state[i] / bounds[i]`.
    pub limiting_dimension: usize,
    /// Which components were clamped by the boundary this cycle.
    pub clipped: [bool; DIM],
}

impl Snapshot {
    pub fn limiting_dimension_name(&self) -> &'static str {
        DIM_NAMES[self.limiting_dimension]
    }

    pub fn hitting_bound(&self) -> bool {
        self.clipped.iter().any(|&c| c)
    }
}

/// One recorded cycle of a dual-agent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualSnapshot {
    pub cycle: u64,
    pub a: Snapshot,
    pub b: Snapshot,
    /// 1 / (1 + ||a − b||).
    pub resonance: f64,
}

/// Why an attractor search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Step delta fell below the convergence threshold.
    Converged,
    /// Cycle budget used up without converging.
    Exhausted,
    /// Caller cancellation observed.
    Cancelled,
    /// Wall-clock deadline passed.
    DeadlineExceeded,
}

/// Outcome of a single-agent attractor search.
///
/// Non-convergence is a normal result, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttractorReport {
    pub converged: bool,
    /// Cycle at which convergence was detected.
    pub cycle: Option<u64>,
    /// Cycles actually stepped.
    pub cycles_run: u64,
    pub termination: Termination,
    pub state: StateVector,
    pub bounds: BoundaryVector,
    pub harmony: f64,
}

/// Outcome of a dual-agent attractor search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualAttractorReport {
    pub converged: bool,
    pub cycle: Option<u64>,
    pub cycles_run: u64,
    pub termination: Termination,
    pub a: StateVector,
    pub b: StateVector,
    pub harmony_a: f64,
    pub harmony_b: f64,
    pub resonance: f64,
}

/// Headline numbers of a recorded trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySummary {
    pub snapshots: usize,
    pub final_cycle: u64,
    pub initial_harmony: f64,
    pub final_harmony: f64,
    pub min_harmony: f64,
    pub max_harmony: f64,
    pub final_state: StateVector,
    /// Recorded cycles in which at least one component was clamped.
    pub bound_hits: usize,
}

impl TrajectorySummary {
    /// `None` for an empty trajectory.
    pub fn from_snapshots(snapshots: &[Snapshot]) -> Option<Self> {
        let first = snapshots.first()?;
        let last = snapshots.last()?;
        let (min_harmony, max_harmony) = snapshots
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s.harmony), hi.max(s.harmony))
            });
        Some(Self {
            snapshots: snapshots.len(),
            final_cycle: last.cycle,
            initial_harmony: first.harmony,
            final_harmony: last.harmony,
            min_harmony,
            max_harmony,
            final_state: last.state,
            bound_hits: snapshots.iter().filter(|s| s.hitting_bound()).count(),
        })
    }

    pub fn harmony_gain(&self) -> f64 {
        self.final_harmony - self.initial_harmony
    }
}
