// ─────────────────────────────────────────────────────────────────────
// LJPW Resonance Kernel — RK4 Integrator
// ─────────────────────────────────────────────────────────────────────
//! Fixed-step classical Runge-Kutta:
//!
//!   k1 = f(y)
//!   k2 = f(y + dt/2 · k1)
//!   k3 = f(y + dt/2 · k2)
//!   k4 = f(y + dt · k3)
//!   y' = y + dt/6 · (k1 + 2 k2 + 2 k3 + k4)
//!
//! followed by the model's boundary policy. Ceilings are held fixed
//! across the four stages and only co-evolve in the post-step settle.

use ljpw_types::{BoundaryVector, ChamberError, ChamberResult, StateVector};

use crate::boundary::Settled;
use crate::derivative::DerivativeModel;

/// One RK4 step over an `N`-dimensional state.
///
/// Generic over the dimension so the joint dual-agent mode can advance
/// both agents as a single 8-vector.
pub fn rk4<const N: usize>(
    y: &[f64; N],
    dt: f64,
    mut f: impl FnMut(&[f64; N]) -> [f64; N],
) -> [f64; N] {
    let offset = |k: &[f64; N], h: f64| -> [f64; N] {
        let mut out = *y;
        for (o, ki) in out.iter_mut().zip(k) {
            *o += h * ki;
        }
        out
    };

    let k1 = f(y);
    let k2 = f(&offset(&k1, 0.5 * dt));
    let k3 = f(&offset(&k2, 0.5 * dt));
    let k4 = f(&offset(&k3, dt));

    let mut out = *y;
    for i in 0..N {
        out[i] += dt / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
    }
    out
}

/// RK4 stepper driving an injected derivative model.
#[derive(Debug, Clone)]
pub struct Integrator<D> {
    model: D,
    dt: f64,
}

impl<D: DerivativeModel> Integrator<D> {
    pub fn new(model: D, dt: f64) -> ChamberResult<Self> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ChamberError::Config(format!(
                "dt must be finite and > 0, got {dt}"
            )));
        }
        Ok(Self { model, dt })
    }

    pub fn model(&self) -> &D {
        &self.model
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Same step size, another model. Used to swap in a partner-frozen
    /// view for one dual-agent step.
    pub fn rebind<M: DerivativeModel>(&self, model: M) -> Integrator<M> {
        Integrator { model, dt: self.dt }
    }

    /// RK4 update without the boundary policy.
    pub fn raw_step(&self, state: &StateVector, bounds: &BoundaryVector) -> StateVector {
        StateVector(rk4(&state.0, self.dt, |y| {
            self.model.derivative(&StateVector(*y), bounds).0
        }))
    }

    /// Full step: RK4 then the boundary policy.
    ///
    /// The result is always finite and inside `[ε, admissible ceiling]`.
    pub fn step(&self, state: &StateVector, bounds: &BoundaryVector) -> Settled {
        let raw = self.raw_step(state, bounds);
        self.model.boundary().settle(raw, bounds)
    }
}
