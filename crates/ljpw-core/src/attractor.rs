// ─────────────────────────────────────────────────────────────────────
// LJPW Resonance Kernel — Attractor Finder
// ─────────────────────────────────────────────────────────────────────
//! Step until the per-cycle delta drops below a threshold, the cycle
//! budget runs out, or the caller interrupts.
//!
//! The cycle loop is the only check point. A cancellation token and an
//! optional wall-clock deadline are polled once per cycle, before the
//! step. An interrupted search returns the last state it reached.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ljpw_types::{ChamberError, ChamberResult, Termination};

/// Cloneable cancellation flag shared between a search and its caller.
///
/// Once cancelled it stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Raw outcome of [`AttractorFinder::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct Search<S> {
    /// Last state reached.
    pub state: S,
    pub termination: Termination,
    /// Cycle at which convergence was detected.
    pub cycle: Option<u64>,
    pub cycles_run: u64,
    /// Delta of the final step, if any step ran.
    pub last_delta: Option<f64>,
}

impl<S> Search<S> {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}

#[derive(Debug, Clone)]
pub struct AttractorFinder {
    max_cycles: u64,
    threshold: f64,
    cancel: Option<CancelToken>,
    deadline: Option<Instant>,
}

impl AttractorFinder {
    pub fn new(max_cycles: u64, threshold: f64) -> ChamberResult<Self> {
        if max_cycles == 0 {
            return Err(ChamberError::Validation(
                "max_cycles must be >= 1".to_string(),
            ));
        }
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(ChamberError::Validation(format!(
                "convergence threshold must be finite and > 0, got {threshold}"
            )));
        }
        Ok(Self {
            max_cycles,
            threshold,
            cancel: None,
            deadline: None,
        })
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn max_cycles(&self) -> u64 {
        self.max_cycles
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn interrupted(&self) -> Option<Termination> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Some(Termination::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Termination::DeadlineExceeded),
            _ => None,
        }
    }

    /// Drive `step` from `initial`, measuring each step with `delta`.
    ///
    /// A NaN delta never counts as converged.
    pub fn search<S>(
        &self,
        initial: S,
        mut step: impl FnMut(&S) -> S,
        delta: impl Fn(&S, &S) -> f64,
    ) -> Search<S> {
        let mut current = initial;
        let mut last_delta = None;

        for cycle in 1..=self.max_cycles {
            if let Some(termination) = self.interrupted() {
                log::warn!(
                    "attractor search stopped ({termination:?}) after {} cycles",
                    cycle - 1
                );
                return Search {
                    state: current,
                    termination,
                    cycle: None,
                    cycles_run: cycle - 1,
                    last_delta,
                };
            }

            let next = step(&current);
            let d = delta(&current, &next);
            current = next;
            last_delta = Some(d);

            if d < self.threshold {
                log::info!("attractor converged at cycle {cycle} (delta {d:.3e})");
                return Search {
                    state: current,
                    termination: Termination::Converged,
                    cycle: Some(cycle),
                    cycles_run: cycle,
                    last_delta,
                };
            }
        }

        Search {
            state: current,
            termination: Termination::Exhausted,
            cycle: None,
            cycles_run: self.max_cycles,
            last_delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn halve(x: &f64) -> f64 {
        x / 2.0
    }

    fn gap(a: &f64, b: &f64) -> f64 {
        (a - b).abs()
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(AttractorFinder::new(10, 0.0).is_err());
        assert!(AttractorFinder::new(10, -1.0).is_err());
        assert!(AttractorFinder::new(10, f64::NAN).is_err());
    }

    #[test]
    fn test_converges_on_shrinking_deltas() {
        let finder = AttractorFinder::new(1000, 1e-6).unwrap();
        assert_eq!(finder.max_cycles(), 1000);
        assert_eq!(finder.threshold(), 1e-6);
        let out = finder.search(1.0, halve, gap);
        assert!(out.converged());
        // 2^-k < 1e-6 first at k = 20
        assert_eq!(out.cycle, Some(20));
        assert_eq!(out.cycles_run, 20);
        assert!(out.last_delta.unwrap() < 1e-6);
    }

    #[test]
    fn test_exhausted_on_constant_drift() {
        let finder = AttractorFinder::new(50, 1e-6).unwrap();
        let out = finder.search(0.0, |x| x + 0.1, gap);
        assert_eq!(out.termination, Termination::Exhausted);
        assert_eq!(out.cycle, None);
        assert_eq!(out.cycles_run, 50);
        assert!((out.state - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_budget_rejected() {
        assert!(matches!(
            AttractorFinder::new(0, 1e-6),
            Err(ChamberError::Validation(_))
        ));
    }

    #[test]
    fn test_nan_delta_never_converges() {
        let finder = AttractorFinder::new(5, 1e-6).unwrap();
        let out = finder.search(1.0, halve, |_, _| f64::NAN);
        assert_eq!(out.termination, Termination::Exhausted);
    }

    #[test]
    fn test_cancel_before_start() {
        let token = CancelToken::new();
        token.cancel();
        let finder = AttractorFinder::new(100, 1e-6).unwrap().with_cancel(token);
        let out = finder.search(1.0, halve, gap);
        assert_eq!(out.termination, Termination::Cancelled);
        assert_eq!(out.cycles_run, 0);
        assert_eq!(out.state, 1.0);
    }

    #[test]
    fn test_cancel_mid_search_keeps_best_state() {
        let token = CancelToken::new();
        let finder = AttractorFinder::new(100, 1e-12)
            .unwrap()
            .with_cancel(token.clone());
        let mut steps = 0;
        let out = finder.search(
            0.0,
            |x| {
                steps += 1;
                if steps == 5 {
                    token.cancel();
                }
                x + 1.0
            },
            gap,
        );
        assert_eq!(out.termination, Termination::Cancelled);
        assert_eq!(out.cycles_run, 5);
        assert_eq!(out.state, 5.0);
        assert!(!out.converged());
    }

    #[test]
    fn test_deadline_exceeded() {
        let finder = AttractorFinder::new(100, 1e-6)
            .unwrap()
            .with_deadline(Instant::now());
        let out = finder.search(1.0, halve, gap);
        assert_eq!(out.termination, Termination::DeadlineExceeded);
        assert_eq!(out.cycles_run, 0);
    }

    #[test]
    fn test_generous_timeout_does_not_interrupt() {
        let finder = AttractorFinder::new(1000, 1e-6)
            .unwrap()
            .with_timeout(Duration::from_secs(3600));
        assert!(finder.search(1.0, halve, gap).converged());
    }

    #[test]
    fn test_token_clones_share_flag() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }
}
