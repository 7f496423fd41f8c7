// ─────────────────────────────────────────────────────────────────────
// LJPW Resonance Kernel — Snapshot Recorder
// ─────────────────────────────────────────────────────────────────────
//! Records cycle 0, every `interval`-th cycle, and the final cycle.
//! The trajectory is a finite in-memory `Vec`; re-running the same
//! initial conditions reproduces it exactly.

use ljpw_physics::harmony;
use ljpw_types::{ChamberError, ChamberResult, Snapshot, StateVector};

use crate::chamber::ChamberState;

const MAX_PREALLOC: u64 = 4096;

/// Which cycles of a `total_cycles` run get recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    interval: u64,
    total_cycles: u64,
}

impl Cadence {
    pub fn new(interval: u64, total_cycles: u64) -> ChamberResult<Self> {
        if interval == 0 {
            return Err(ChamberError::Validation(
                "record_interval must be >= 1".to_string(),
            ));
        }
        Ok(Self {
            interval,
            total_cycles,
        })
    }

    pub fn should_record(&self, cycle: u64) -> bool {
        cycle % self.interval == 0 || cycle == self.total_cycles
    }

    /// Pre-allocation hint, capped so huge runs grow on demand.
    pub fn capacity(&self) -> usize {
        (self.total_cycles / self.interval).min(MAX_PREALLOC) as usize + 2
    }
}

pub struct SnapshotRecorder {
    cadence: Cadence,
    target: StateVector,
    snapshots: Vec<Snapshot>,
}

impl SnapshotRecorder {
    pub fn new(interval: u64, total_cycles: u64, target: StateVector) -> ChamberResult<Self> {
        let cadence = Cadence::new(interval, total_cycles)?;
        Ok(Self {
            cadence,
            target,
            snapshots: Vec::with_capacity(cadence.capacity()),
        })
    }

    /// Record `current` if its cycle is on the cadence.
    pub fn observe(&mut self, current: &ChamberState) {
        if self.cadence.should_record(current.cycle) {
            self.snapshots.push(capture(current, &self.target));
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn finish(self) -> Vec<Snapshot> {
        self.snapshots
    }
}

/// Build a snapshot of `current` measured against `target`.
pub fn capture(current: &ChamberState, target: &StateVector) -> Snapshot {
    let fill = current
        .state
        .zip_with(StateVector(current.bounds.0), |s, c| s / c);
    Snapshot {
        cycle: current.cycle,
        t: current.t,
        state: current.state,
        bounds: current.bounds,
        harmony: harmony(&current.state),
        distance_to_equilibrium: current.state.distance(target),
        limiting_dimension: fill.argmin(),
        clipped: current.clipped,
    }
}
