// ─────────────────────────────────────────────────────────────────────
// LJPW Resonance Kernel — Chamber Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{ChamberError, ChamberResult};
use crate::params::{DEFAULT_COUPLING, EPSILON, NATURAL_EQUILIBRIUM};
use crate::vector::{BoundaryVector, StateVector, DIM};

/// How the coupling matrix strength responds to harmony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouplingStrength {
    /// kappa = 0.5 + harmony: aligned states couple more strongly.
    #[default]
    HarmonyScaled,
    /// kappa = 1.
    Static,
}

/// How two agents are advanced together in dual-agent mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DualIntegration {
    /// Each agent runs its own RK4 step with the partner held at its
    /// pre-step value for all four stages.
    #[default]
    FrozenPartner,
    /// One RK4 pass over the combined 8-dimensional state.
    Joint,
}

fn default_threshold() -> f64 {
    0.8
}

fn default_resistance() -> f64 {
    0.4
}

fn default_overshoot() -> f64 {
    1.1
}

fn default_growth_rate() -> f64 {
    0.02
}

fn default_decay_rate() -> f64 {
    0.01
}

fn default_min_bound() -> f64 {
    0.1
}

fn default_max_bound() -> f64 {
    1.5
}

fn unit_bounds() -> BoundaryVector {
    BoundaryVector::splat(1.0)
}

/// Boundary policy parameters, tagged by `mode` in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BoundaryConfig {
    /// Clamp every component into `[epsilon, ceiling[i]]` after each step.
    HardClip {
        #[serde(default = "unit_bounds")]
        ceiling: BoundaryVector,
    },
    /// Penalise the derivative above `threshold * ceiling[i]`, then
    /// clip lightly at `overshoot * ceiling[i]`.
    SoftResistance {
        #[serde(default = "unit_bounds")]
        ceiling: BoundaryVector,
        #[serde(default = "default_threshold")]
        threshold: f64,
        #[serde(default = "default_resistance")]
        resistance: f64,
        #[serde(default = "default_overshoot")]
        overshoot: f64,
    },
    /// Ceilings grow with harmony and decay without it, clamped into
    /// `[min_bound, max_bound]`. The state is softly resisted against
    /// the current ceilings.
    CoEvolving {
        #[serde(default = "unit_bounds")]
        initial: BoundaryVector,
        #[serde(default = "default_growth_rate")]
        growth_rate: f64,
        #[serde(default = "default_decay_rate")]
        decay_rate: f64,
        #[serde(default = "default_min_bound")]
        min_bound: f64,
        #[serde(default = "default_max_bound")]
        max_bound: f64,
        #[serde(default = "default_threshold")]
        threshold: f64,
        #[serde(default = "default_resistance")]
        resistance: f64,
        #[serde(default = "default_overshoot")]
        overshoot: f64,
    },
}

impl BoundaryConfig {
    pub fn hard_clip(ceiling: BoundaryVector) -> Self {
        Self::HardClip { ceiling }
    }

    pub fn soft_resistance(ceiling: BoundaryVector) -> Self {
        Self::SoftResistance {
            ceiling,
            threshold: default_threshold(),
            resistance: default_resistance(),
            overshoot: default_overshoot(),
        }
    }

    pub fn co_evolving(initial: BoundaryVector) -> Self {
        Self::CoEvolving {
            initial,
            growth_rate: default_growth_rate(),
            decay_rate: default_decay_rate(),
            min_bound: default_min_bound(),
            max_bound: default_max_bound(),
            threshold: default_threshold(),
            resistance: default_resistance(),
            overshoot: default_overshoot(),
        }
    }

    /// Short name used in logs.
    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::HardClip { .. } => "hard_clip",
            Self::SoftResistance { .. } => "soft_resistance",
            Self::CoEvolving { .. } => "co_evolving",
        }
    }

    /// Validate the policy parameters against the epsilon floor.
    pub fn validate(&self, epsilon: f64) -> ChamberResult<()> {
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(ChamberError::Config(format!(
                "epsilon must be finite and > 0, got {epsilon}"
            )));
        }
        let check_ceiling = |name: &str, ceiling: &BoundaryVector| -> ChamberResult<()> {
            for (i, &c) in ceiling.iter().enumerate() {
                if !c.is_finite() || c <= epsilon {
                    return Err(ChamberError::Config(format!(
                        "{name}[{i}] must be finite and > epsilon ({epsilon}), got {c}"
                    )));
                }
            }
            Ok(())
        };
        let check_soft = |threshold: f64, resistance: f64, overshoot: f64| -> ChamberResult<()> {
            if !(threshold > 0.0 && threshold < 1.0) {
                return Err(ChamberError::Config(format!(
                    "threshold must be in (0, 1), got {threshold}"
                )));
            }
            if !resistance.is_finite() || resistance < 0.0 {
                return Err(ChamberError::Config(format!(
                    "resistance must be >= 0, got {resistance}"
                )));
            }
            if !overshoot.is_finite() || overshoot < 1.0 {
                return Err(ChamberError::Config(format!(
                    "overshoot must be >= 1, got {overshoot}"
                )));
            }
            Ok(())
        };

        match self {
            Self::HardClip { ceiling } => check_ceiling("ceiling", ceiling),
            Self::SoftResistance {
                ceiling,
                threshold,
                resistance,
                overshoot,
            } => {
                check_ceiling("ceiling", ceiling)?;
                check_soft(*threshold, *resistance, *overshoot)
            }
            Self::CoEvolving {
                initial,
                growth_rate,
                decay_rate,
                min_bound,
                max_bound,
                threshold,
                resistance,
                overshoot,
            } => {
                if !min_bound.is_finite() || !max_bound.is_finite() {
                    return Err(ChamberError::Config(
                        "bound range must be finite".to_string(),
                    ));
                }
                if min_bound > max_bound {
                    return Err(ChamberError::Config(format!(
                        "bound range floor {min_bound} exceeds ceiling {max_bound}"
                    )));
                }
                if *min_bound <= epsilon {
                    return Err(ChamberError::Config(format!(
                        "min_bound must be > epsilon ({epsilon}), got {min_bound}"
                    )));
                }
                check_ceiling("initial", initial)?;
                if !initial.within(*min_bound, *max_bound) {
                    return Err(ChamberError::Config(format!(
                        "initial bounds {:?} outside [{min_bound}, {max_bound}]",
                        initial.as_array()
                    )));
                }
                for (name, rate) in [("growth_rate", growth_rate), ("decay_rate", decay_rate)] {
                    if !rate.is_finite() || *rate < 0.0 {
                        return Err(ChamberError::Config(format!(
                            "{name} must be >= 0, got {rate}"
                        )));
                    }
                }
                check_soft(*threshold, *resistance, *overshoot)
            }
        }
    }
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self::hard_clip(unit_bounds())
    }
}

/// Construction-time configuration of a resonance chamber.
///
/// Immutable once a chamber is built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChamberConfig {
    /// Fixed RK4 time step. Must be > 0.
    /// Default: 0.05.
    pub dt: f64,

    /// Floor applied to every component.
    /// Default: 0.001.
    pub epsilon: f64,

    /// Rate of the pull toward `equilibrium_target`.
    /// Default: 0.05.
    pub pull_rate: f64,

    /// Weight of the self-coupling flow.
    /// Default: 0.1.
    pub coupling_gain: f64,

    /// Weight of the partner cross term (dual-agent only).
    /// Default: 0.05.
    pub inter_coupling_gain: f64,

    /// Self-coupling matrix, applied transposed.
    pub coupling_matrix: [[f64; DIM]; DIM],

    /// Partner coupling matrix. `None` uses the canonical default.
    pub inter_coupling_matrix: Option<[[f64; DIM]; DIM]>,

    /// Default: harmony-scaled.
    pub coupling_strength: CouplingStrength,

    /// Default: the Natural Equilibrium.
    pub equilibrium_target: StateVector,

    /// Default: hard clip at (1, 1, 1, 1).
    pub boundary: BoundaryConfig,

    /// Default: frozen partner.
    pub dual_integration: DualIntegration,
}

impl Default for ChamberConfig {
    fn default() -> Self {
        Self {
            dt: 0.05,
            epsilon: EPSILON,
            pull_rate: 0.05,
            coupling_gain: 0.1,
            inter_coupling_gain: 0.05,
            coupling_matrix: DEFAULT_COUPLING,
            inter_coupling_matrix: None,
            coupling_strength: CouplingStrength::HarmonyScaled,
            equilibrium_target: NATURAL_EQUILIBRIUM,
            boundary: BoundaryConfig::default(),
            dual_integration: DualIntegration::FrozenPartner,
        }
    }
}

impl ChamberConfig {
    pub fn with_boundary(mut self, boundary: BoundaryConfig) -> Self {
        self.boundary = boundary;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> ChamberResult<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ChamberError::Config(format!(
                "dt must be finite and > 0, got {}",
                self.dt
            )));
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(ChamberError::Config(format!(
                "epsilon must be finite and > 0, got {}",
                self.epsilon
            )));
        }
        for (name, value) in [
            ("pull_rate", self.pull_rate),
            ("coupling_gain", self.coupling_gain),
            ("inter_coupling_gain", self.inter_coupling_gain),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChamberError::Config(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        validate_matrix("coupling_matrix", &self.coupling_matrix)?;
        if let Some(m) = &self.inter_coupling_matrix {
            validate_matrix("inter_coupling_matrix", m)?;
        }
        if !self.equilibrium_target.is_finite() {
            return Err(ChamberError::Config(format!(
                "equilibrium_target must be finite, got {:?}",
                self.equilibrium_target.as_array()
            )));
        }
        self.boundary.validate(self.epsilon)
    }

    /// Load from JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ChamberResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ChamberError::Config(format!("JSON parse error: {e}")))
    }
}

fn validate_matrix(name: &str, m: &[[f64; DIM]; DIM]) -> ChamberResult<()> {
    for (i, row) in m.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            if !v.is_finite() || v < 0.0 {
                return Err(ChamberError::Config(format!(
                    "{name}[{i}][{j}] must be finite and >= 0, got {v}"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ChamberConfig::default().validate().is_ok());
    }

    #[test]
    fn test_all_boundary_modes_valid_by_default() {
        for boundary in [
            BoundaryConfig::hard_clip(BoundaryVector::splat(1.0)),
            BoundaryConfig::soft_resistance(BoundaryVector::splat(1.0)),
            BoundaryConfig::co_evolving(BoundaryVector::splat(1.0)),
        ] {
            let cfg = ChamberConfig::default().with_boundary(boundary);
            assert!(cfg.validate().is_ok(), "{} should validate", boundary.mode_name());
        }
    }

    #[test]
    fn test_non_positive_dt_rejected() {
        for dt in [0.0, -0.05, f64::NAN, f64::INFINITY] {
            let cfg = ChamberConfig {
                dt,
                ..Default::default()
            };
            assert!(
                matches!(cfg.validate(), Err(ChamberError::Config(_))),
                "dt={dt} should be rejected"
            );
        }
    }

    #[test]
    fn test_negative_matrix_entry_rejected() {
        let mut m = DEFAULT_COUPLING;
        m[2][1] = -0.1;
        let cfg = ChamberConfig {
            coupling_matrix: m,
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("coupling_matrix[2][1]"), "{err}");
    }

    #[test]
    fn test_inverted_bound_range_rejected() {
        let cfg = ChamberConfig::default().with_boundary(BoundaryConfig::CoEvolving {
            initial: BoundaryVector::splat(1.0),
            growth_rate: 0.02,
            decay_rate: 0.01,
            min_bound: 1.5,
            max_bound: 0.1,
            threshold: 0.8,
            resistance: 0.4,
            overshoot: 1.1,
        });
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds"), "{err}");
    }

    #[test]
    fn test_boundary_validate_rejects_bad_epsilon() {
        let boundary = BoundaryConfig::hard_clip(BoundaryVector::splat(1.0));
        assert!(boundary.validate(0.001).is_ok());
        for eps in [0.0, -0.001, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(boundary.validate(eps), Err(ChamberError::Config(_))),
                "epsilon {eps} accepted"
            );
        }
    }

    #[test]
    fn test_initial_bounds_outside_range_rejected() {
        let cfg = ChamberConfig::default()
            .with_boundary(BoundaryConfig::co_evolving(BoundaryVector::splat(2.0)));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_ceiling_below_epsilon_rejected() {
        let cfg = ChamberConfig::default()
            .with_boundary(BoundaryConfig::hard_clip(BoundaryVector([1.0, 1.0, 0.0, 1.0])));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_soft_threshold_range() {
        let cfg = ChamberConfig::default().with_boundary(BoundaryConfig::SoftResistance {
            ceiling: BoundaryVector::splat(1.0),
            threshold: 1.2,
            resistance: 0.4,
            overshoot: 1.1,
        });
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let cfg = ChamberConfig::from_json(
            r#"{"dt": 0.01, "boundary": {"mode": "soft_resistance", "resistance": 0.3}}"#,
        )
        .unwrap();
        assert_eq!(cfg.dt, 0.01);
        assert_eq!(cfg.pull_rate, 0.05);
        match cfg.boundary {
            BoundaryConfig::SoftResistance {
                ceiling,
                threshold,
                resistance,
                overshoot,
            } => {
                assert_eq!(ceiling, BoundaryVector::splat(1.0));
                assert_eq!(threshold, 0.8);
                assert_eq!(resistance, 0.3);
                assert_eq!(overshoot, 1.1);
            }
            other => panic!("unexpected boundary {other:?}"),
        }
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_from_json_co_evolving_and_dual() {
        let cfg = ChamberConfig::from_json(
            r#"{
                "boundary": {"mode": "co_evolving", "min_bound": 0.2, "max_bound": 2.0},
                "dual_integration": "joint",
                "coupling_strength": "static"
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.boundary.mode_name(), "co_evolving");
        assert_eq!(cfg.dual_integration, DualIntegration::Joint);
        assert_eq!(cfg.coupling_strength, CouplingStrength::Static);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_from_json_bad_input() {
        let err = ChamberConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ChamberError::Config(_)));
        let err = ChamberConfig::from_json(r#"{"coupling_matrix": [[1.0, 2.0]]}"#).unwrap_err();
        assert!(err.to_string().contains("JSON parse error"));
    }

    #[test]
    fn test_json_roundtrip_preserves_config() {
        let cfg = ChamberConfig::default()
            .with_boundary(BoundaryConfig::co_evolving(BoundaryVector::splat(0.8)));
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(ChamberConfig::from_json(&json).unwrap(), cfg);
    }
}
