// ─────────────────────────────────────────────────────────────────────
// LJPW Resonance Kernel — Batch Sweeps
// ─────────────────────────────────────────────────────────────────────
//! Independent scenarios run side by side. Each scenario builds its own
//! chamber, so nothing is shared between runs and results come back in
//! input order after a single join.
//!
//! With the `parallel` feature the batch is spread over the rayon
//! thread pool; without it the scenarios run one after another.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use ljpw_types::{
    ChamberConfig, ChamberError, ChamberResult, Snapshot, StateVector, TrajectorySummary,
};

use crate::chamber::ResonanceChamber;

/// One fixed-length run to execute in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub config: ChamberConfig,
    pub initial: StateVector,
    pub cycles: u64,
    pub record_interval: u64,
}

impl Scenario {
    /// Records only cycle 0 and the final cycle.
    pub fn new(
        name: impl Into<String>,
        config: ChamberConfig,
        initial: StateVector,
        cycles: u64,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            initial,
            cycles,
            record_interval: cycles.max(1),
        }
    }

    pub fn with_record_interval(mut self, record_interval: u64) -> Self {
        self.record_interval = record_interval;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub summary: TrajectorySummary,
    pub final_snapshot: Snapshot,
}

pub fn run_scenario(scenario: &Scenario) -> ChamberResult<ScenarioOutcome> {
    let chamber = ResonanceChamber::new(scenario.config.clone())?;
    let snapshots = chamber.run(
        scenario.initial,
        scenario.cycles,
        scenario.record_interval,
    )?;
    let empty = || {
        ChamberError::Validation(format!("scenario {} recorded nothing", scenario.name))
    };
    let summary = TrajectorySummary::from_snapshots(&snapshots).ok_or_else(empty)?;
    let final_snapshot = snapshots.last().cloned().ok_or_else(empty)?;
    Ok(ScenarioOutcome {
        name: scenario.name.clone(),
        summary,
        final_snapshot,
    })
}

/// Run every scenario. One failing scenario does not affect the others.
pub fn run_batch(scenarios: &[Scenario]) -> Vec<ChamberResult<ScenarioOutcome>> {
    #[cfg(feature = "parallel")]
    let outcomes: Vec<_> = scenarios.par_iter().map(run_scenario).collect();
    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<_> = scenarios.iter().map(run_scenario).collect();

    let failed = outcomes.iter().filter(|o| o.is_err()).count();
    log::debug!(
        "batch complete: {} scenarios, {failed} failed",
        scenarios.len()
    );
    outcomes
}

/// Dissipation sweep: the same start under each `pull_rate`.
pub fn pull_rate_sweep(
    base: &ChamberConfig,
    initial: StateVector,
    pull_rates: &[f64],
    cycles: u64,
) -> Vec<ChamberResult<ScenarioOutcome>> {
    let scenarios: Vec<Scenario> = pull_rates
        .iter()
        .map(|&rate| {
            let config = ChamberConfig {
                pull_rate: rate,
                ..base.clone()
            };
            Scenario::new(format!("pull_rate={rate}"), config, initial, cycles)
        })
        .collect();
    run_batch(&scenarios)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ljpw_types::{BoundaryConfig, BoundaryVector};

    const START: StateVector = StateVector::new(0.167, 0.152, 0.393, 0.288);

    fn pull_only() -> ChamberConfig {
        ChamberConfig {
            coupling_gain: 0.0,
            ..Default::default()
        }
        .with_boundary(BoundaryConfig::hard_clip(BoundaryVector::splat(100.0)))
    }

    #[test]
    fn test_batch_preserves_order_and_matches_single_runs() {
        let scenarios = vec![
            Scenario::new("hard", ChamberConfig::default(), START, 300),
            Scenario::new(
                "soft",
                ChamberConfig::default()
                    .with_boundary(BoundaryConfig::soft_resistance(BoundaryVector::splat(1.0))),
                START,
                300,
            ),
            Scenario::new(
                "co_evolving",
                ChamberConfig::default()
                    .with_boundary(BoundaryConfig::co_evolving(BoundaryVector::splat(1.0))),
                START,
                300,
            )
            .with_record_interval(30),
        ];
        let outcomes = run_batch(&scenarios);
        assert_eq!(outcomes.len(), 3);
        for (scenario, outcome) in scenarios.iter().zip(&outcomes) {
            let outcome = outcome.as_ref().unwrap();
            assert_eq!(outcome.name, scenario.name);
            assert_eq!(outcome, &run_scenario(scenario).unwrap());
            assert_eq!(outcome.final_snapshot.cycle, 300);
        }
        assert_eq!(outcomes[0].as_ref().unwrap().summary.snapshots, 2);
        assert_eq!(outcomes[2].as_ref().unwrap().summary.snapshots, 11);
    }

    #[test]
    fn test_failing_scenario_is_isolated() {
        let bad = ChamberConfig {
            dt: -0.1,
            ..Default::default()
        };
        let outcomes = run_batch(&[
            Scenario::new("bad", bad, START, 10),
            Scenario::new("good", ChamberConfig::default(), START, 10),
        ]);
        assert!(matches!(outcomes[0], Err(ChamberError::Config(_))));
        assert!(outcomes[1].is_ok());
    }

    #[test]
    fn test_empty_batch() {
        assert!(run_batch(&[]).is_empty());
    }

    #[test]
    fn test_stronger_pull_ends_closer_to_equilibrium() {
        let outcomes = pull_rate_sweep(&pull_only(), START, &[0.01, 0.05, 0.2], 200);
        let distances: Vec<f64> = outcomes
            .iter()
            .map(|o| o.as_ref().unwrap().final_snapshot.distance_to_equilibrium)
            .collect();
        assert!(
            distances.windows(2).all(|w| w[1] < w[0]),
            "distances {distances:?}"
        );
        assert_eq!(outcomes[1].as_ref().unwrap().name, "pull_rate=0.05");
    }

    #[test]
    fn test_zero_pull_without_coupling_is_static() {
        let outcomes = pull_rate_sweep(&pull_only(), START, &[0.0], 100);
        let outcome = outcomes[0].as_ref().unwrap();
        assert_eq!(outcome.final_snapshot.state, START);
        assert_eq!(outcome.summary.harmony_gain(), 0.0);
    }

    #[test]
    fn test_scenario_from_json() {
        let json = r#"{
            "name": "soft",
            "config": {"boundary": {"mode": "soft_resistance"}},
            "initial": [0.3, 0.4, 0.5, 0.8],
            "cycles": 40,
            "record_interval": 10
        }"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        assert_eq!(scenario.config.boundary.mode_name(), "soft_resistance");
        let outcome = run_scenario(&scenario).unwrap();
        assert_eq!(outcome.summary.snapshots, 5);
    }
}
