// ─────────────────────────────────────────────────────────────────────
// LJPW Resonance Kernel — Chamber Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Resonance chamber simulator: fixed-length runs, dual-agent coupling,
//! attractor search and batch sweeps over the `ljpw-physics` integrator.
//!
//! Entry points:
//!
//! - [`ResonanceChamber::run`]: deterministic fixed-length simulation
//!   returning an ordered `Vec<Snapshot>`.
//! - [`ResonanceChamber::find_attractor`]: step until the per-cycle
//!   delta falls below a threshold or the budget runs out.
//!
//! # Invariants
//!
//! 1. **Bounded state**: after every cycle each component is finite and
//!    inside `[epsilon, admissible ceiling]`. Saturation is normal
//!    steady-state behaviour, never an error.
//!
//! 2. **Determinism**: no randomness, no I/O, no shared mutable state.
//!    Identical configuration and initial state give identical
//!    snapshot sequences.
//!
//! 3. **Sequential cycles**: cycle N+1 depends on cycle N. Parallelism
//!    only exists across independent scenarios in [`sweep`].
//!
//! 4. **Non-convergence is a result**: an exhausted, cancelled or timed
//!    out attractor search returns its last state with
//!    `converged = false`.

pub mod attractor;
pub mod chamber;
pub mod dual;
pub mod recorder;
pub mod sweep;

pub use attractor::{AttractorFinder, CancelToken, Search};
pub use chamber::{ChamberState, ResonanceChamber};
pub use dual::{DualChamber, DualState};
pub use recorder::{Cadence, SnapshotRecorder};
pub use sweep::{pull_rate_sweep, run_batch, run_scenario, Scenario, ScenarioOutcome};

pub use ljpw_physics as physics;
pub use ljpw_types as types;
