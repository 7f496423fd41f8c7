// ─────────────────────────────────────────────────────────────────────
// LJPW Resonance Kernel — Physics
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Numerical core of the resonance chamber: coupling matrices, the
//! harmony metric, the state-dependent derivative model, boundary
//! policies and the fixed-step RK4 integrator.
//!
//! Everything here is pure, single-threaded arithmetic. Identical
//! inputs always produce identical outputs.

pub mod boundary;
pub mod coupling;
pub mod derivative;
pub mod harmony;
pub mod integrator;

pub use boundary::{BoundaryPolicy, Settled};
pub use coupling::{alignment_multiplier, CouplingMatrix};
pub use derivative::{DerivativeModel, FnModel, LjpwDerivative, PartnerFrozen};
pub use harmony::{harmony, resonance, shared_harmony};
pub use integrator::{rk4, Integrator};
pub use ljpw_types::params;
