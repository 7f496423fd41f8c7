// ─────────────────────────────────────────────────────────────────────
// LJPW Resonance Kernel — Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! State vectors, configuration, snapshot records and the error
//! hierarchy shared by the LJPW resonance chamber crates.

pub mod config;
pub mod error;
pub mod params;
pub mod snapshot;
pub mod vector;

pub use config::{BoundaryConfig, ChamberConfig, CouplingStrength, DualIntegration};
pub use error::{ChamberError, ChamberResult};
pub use params::{ANCHOR_POINT, EPSILON, NATURAL_EQUILIBRIUM};
pub use snapshot::{
    AttractorReport, DualAttractorReport, DualSnapshot, Snapshot, Termination, TrajectorySummary,
};
pub use vector::{BoundaryVector, StateVector, DIM, DIM_NAMES};
