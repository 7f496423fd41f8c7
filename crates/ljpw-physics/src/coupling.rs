// ─────────────────────────────────────────────────────────────────────
// LJPW Resonance Kernel — Coupling Matrix
// ─────────────────────────────────────────────────────────────────────
//! 4×4 non-negative coupling matrix, applied transposed:
//!
//!   effect_j = kappa · Σ_i M_ij s_i
//!
//! Row `i` describes how dimension `i` reinforces the others. The
//! matrix need not be symmetric.

use serde::{Deserialize, Serialize};

use ljpw_types::params::{DEFAULT_COUPLING, DEFAULT_INTER_COUPLING};
use ljpw_types::{ChamberError, ChamberResult, CouplingStrength, StateVector, DIM};

/// Strength multiplier for a given harmony.
///
/// `HarmonyScaled` gives kappa = 0.5 + harmony ∈ (0.5, 1.5]; `Static`
/// gives 1.
#[inline]
pub fn alignment_multiplier(strength: CouplingStrength, harmony: f64) -> f64 {
    match strength {
        CouplingStrength::HarmonyScaled => 0.5 + harmony,
        CouplingStrength::Static => 1.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouplingMatrix([[f64; DIM]; DIM]);

impl CouplingMatrix {
    /// Validate entries are finite and non-negative.
    pub fn new(m: [[f64; DIM]; DIM]) -> ChamberResult<Self> {
        for (i, row) in m.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                if !v.is_finite() || v < 0.0 {
                    return Err(ChamberError::Config(format!(
                        "coupling[{i}][{j}] must be finite and >= 0, got {v}"
                    )));
                }
            }
        }
        Ok(Self(m))
    }

    /// Build from dynamically sized rows, rejecting anything not 4×4.
    pub fn from_rows(rows: &[Vec<f64>]) -> ChamberResult<Self> {
        if rows.len() != DIM {
            return Err(ChamberError::Dimension {
                what: "coupling matrix",
                expected: DIM,
                got: rows.len(),
            });
        }
        let mut m = [[0.0; DIM]; DIM];
        for (dst, row) in m.iter_mut().zip(rows) {
            *dst = row.as_slice().try_into().map_err(|_| ChamberError::Dimension {
                what: "coupling matrix row",
                expected: DIM,
                got: row.len(),
            })?;
        }
        Self::new(m)
    }

    pub const fn identity() -> Self {
        let mut m = [[0.0; DIM]; DIM];
        let mut i = 0;
        while i < DIM {
            m[i][i] = 1.0;
            i += 1;
        }
        Self(m)
    }

    pub const fn zeros() -> Self {
        Self([[0.0; DIM]; DIM])
    }

    /// The canonical self-coupling matrix.
    pub const fn default_self() -> Self {
        Self(DEFAULT_COUPLING)
    }

    /// The canonical partner-coupling matrix.
    pub const fn default_inter() -> Self {
        Self(DEFAULT_INTER_COUPLING)
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.0[i][j]
    }

    pub fn rows(&self) -> &[[f64; DIM]; DIM] {
        &self.0
    }

    /// Mᵀ · s.
    pub fn apply_transposed(&self, s: &StateVector) -> StateVector {
        let mut out = [0.0; DIM];
        for (i, row) in self.0.iter().enumerate() {
            for (j, &m_ij) in row.iter().enumerate() {
                out[j] += m_ij * s[i];
            }
        }
        StateVector(out)
    }

    /// kappa · (Mᵀ · s).
    pub fn effect(&self, s: &StateVector, kappa: f64) -> StateVector {
        self.apply_transposed(s).scale(kappa)
    }

    /// Total reinforcement received by each dimension from a unit state.
    pub fn column_sums(&self) -> StateVector {
        self.apply_transposed(&StateVector::splat(1.0))
    }

    pub fn is_symmetric(&self) -> bool {
        (0..DIM).all(|i| (0..DIM).all(|j| (self.0[i][j] - self.0[j][i]).abs() < 1e-12))
    }
}

impl Default for CouplingMatrix {
    fn default() -> Self {
        Self::default_self()
    }
}
