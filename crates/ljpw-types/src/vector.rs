// ─────────────────────────────────────────────────────────────────────
// LJPW Resonance Kernel — State & Boundary Vectors
// ─────────────────────────────────────────────────────────────────────
//! Fixed-size 4-component vectors and the arithmetic the integrator
//! needs: add, sub, scale, Euclidean norm, component-wise clip and
//! element-wise multiply.
//!
//! Both vector types wrap `[f64; DIM]`, so a length mismatch cannot
//! happen after construction. Slices are checked once, in
//! [`StateVector::from_slice`] / [`BoundaryVector::from_slice`].

use std::ops::{Add, Index, IndexMut, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::error::{ChamberError, ChamberResult};

/// Number of state dimensions.
pub const DIM: usize = 4;

/// Conventional component labels, in order.
pub const DIM_NAMES: [&str; DIM] = ["L", "J", "P", "W"];

/// A point in the 4-dimensional LJPW state space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateVector(pub [f64; DIM]);

impl StateVector {
    pub const ZERO: Self = Self([0.0; DIM]);

    pub const fn new(l: f64, j: f64, p: f64, w: f64) -> Self {
        Self([l, j, p, w])
    }

    pub const fn splat(v: f64) -> Self {
        Self([v; DIM])
    }

    /// Build from a slice, failing fast on a length mismatch.
    pub fn from_slice(values: &[f64]) -> ChamberResult<Self> {
        let arr: [f64; DIM] = values.try_into().map_err(|_| ChamberError::Dimension {
            what: "state vector",
            expected: DIM,
            got: values.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn l(&self) -> f64 {
        self.0[0]
    }

    pub fn j(&self) -> f64 {
        self.0[1]
    }

    pub fn p(&self) -> f64 {
        self.0[2]
    }

    pub fn w(&self) -> f64 {
        self.0[3]
    }

    pub fn as_array(&self) -> &[f64; DIM] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }

    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self(self.0.map(f))
    }

    pub fn zip_with(self, other: Self, f: impl Fn(f64, f64) -> f64) -> Self {
        let mut out = [0.0; DIM];
        for (i, o) in out.iter_mut().enumerate() {
            *o = f(self.0[i], other.0[i]);
        }
        Self(out)
    }

    pub fn add(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn sub(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a - b)
    }

    pub fn scale(self, s: f64) -> Self {
        self.map(|a| a * s)
    }

    pub fn elementwise_mul(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a * b)
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.0.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    pub fn distance(&self, other: &Self) -> f64 {
        self.sub(*other).norm()
    }

    pub fn midpoint(&self, other: &Self) -> Self {
        self.add(*other).scale(0.5)
    }

    /// Component-wise clamp into `[lo[i], hi[i]]`.
    ///
    /// `hi[i] < lo[i]` resolves to `lo[i]`; NaN components map to `lo[i]`.
    pub fn clip(self, lo: &Self, hi: &Self) -> Self {
        let mut out = self.0;
        for (i, v) in out.iter_mut().enumerate() {
            *v = if v.is_nan() { lo.0[i] } else { v.min(hi.0[i]).max(lo.0[i]) };
        }
        Self(out)
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// Index of the smallest component (first one on ties).
    pub fn argmin(&self) -> usize {
        self.0
            .iter()
            .enumerate()
            .fold((0, f64::INFINITY), |(bi, bv), (i, &v)| if v < bv { (i, v) } else { (bi, bv) })
            .0
    }
}

impl From<[f64; DIM]> for StateVector {
    fn from(values: [f64; DIM]) -> Self {
        Self(values)
    }
}

impl Index<usize> for StateVector {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl IndexMut<usize> for StateVector {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.0[i]
    }
}

impl Add for StateVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        StateVector::add(self, rhs)
    }
}

impl Sub for StateVector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        StateVector::sub(self, rhs)
    }
}

impl Mul<f64> for StateVector {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.scale(rhs)
    }
}

impl Neg for StateVector {
    type Output = Self;

    fn neg(self) -> Self {
        self.scale(-1.0)
    }
}

/// Per-dimension ceilings on the state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundaryVector(pub [f64; DIM]);

impl BoundaryVector {
    pub const fn splat(v: f64) -> Self {
        Self([v; DIM])
    }

    pub fn from_slice(values: &[f64]) -> ChamberResult<Self> {
        let arr: [f64; DIM] = values.try_into().map_err(|_| ChamberError::Dimension {
            what: "boundary vector",
            expected: DIM,
            got: values.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn as_array(&self) -> &[f64; DIM] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }

    /// Ceilings as a state vector, scaled by `factor`.
    pub fn scaled(&self, factor: f64) -> StateVector {
        StateVector(self.0.map(|c| c * factor))
    }

    pub fn within(&self, lo: f64, hi: f64) -> bool {
        self.0.iter().all(|&c| (lo..=hi).contains(&c))
    }
}

impl Default for BoundaryVector {
    fn default() -> Self {
        Self::splat(1.0)
    }
}

impl From<[f64; DIM]> for BoundaryVector {
    fn from(values: [f64; DIM]) -> Self {
        Self(values)
    }
}

impl Index<usize> for BoundaryVector {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}
