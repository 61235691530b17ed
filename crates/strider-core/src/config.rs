use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::GaitType;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_trajectory_dt() -> f64 {
    0.02
}
fn default_initial_positions() -> Vec<[f64; 2]> {
    // Left-hind, left-front, right-hind, right-front.
    vec![[-0.3, 0.2], [0.3, 0.2], [-0.3, -0.2], [0.3, -0.2]]
}
const fn default_steps() -> usize {
    4
}
const fn default_swing_duration() -> f64 {
    0.5
}
const fn default_stance_duration() -> f64 {
    0.2
}
const fn default_initial_stance_duration() -> f64 {
    0.4
}
const fn default_final_stance_duration() -> f64 {
    0.4
}
const fn default_swing_free_coefficients() -> usize {
    4
}

/// Number of polynomial coefficients per axis.
const MAX_FREE_COEFFICIENTS: usize = 6;

// ---------------------------------------------------------------------------
// PlannerConfig
// ---------------------------------------------------------------------------

/// Top-level planner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Sampling resolution of the exported trajectory in seconds (default: 0.02).
    #[serde(default = "default_trajectory_dt")]
    pub trajectory_dt: f64,

    /// Initial planar position of every limb, in limb id order.
    #[serde(default = "default_initial_positions")]
    pub initial_positions: Vec<[f64; 2]>,

    /// Contact schedule generation.
    #[serde(default)]
    pub gait: GaitConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            trajectory_dt: default_trajectory_dt(),
            initial_positions: default_initial_positions(),
            gait: GaitConfig::default(),
        }
    }
}

impl PlannerConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.trajectory_dt > 0.0 && self.trajectory_dt.is_finite()) {
            return Err(ConfigError::InvalidTrajectoryDt(self.trajectory_dt));
        }
        if self.initial_positions.is_empty() {
            return Err(ConfigError::MissingField("initial_positions".into()));
        }
        if let Some(p) = self
            .initial_positions
            .iter()
            .find(|p| !(p[0].is_finite() && p[1].is_finite()))
        {
            return Err(ConfigError::InvalidValue {
                field: "initial_positions".into(),
                message: format!("non-finite position {p:?}"),
            });
        }
        self.gait.validate(self.initial_positions.len())
    }

    /// Number of limbs described by this configuration.
    pub fn n_limbs(&self) -> usize {
        self.initial_positions.len()
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// GaitConfig
// ---------------------------------------------------------------------------

/// Gait timing and parameter layout used to build the contact schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaitConfig {
    #[serde(default)]
    pub gait: GaitType,

    /// Number of swing phases in the horizon (ignored when standing).
    #[serde(default = "default_steps")]
    pub steps: usize,

    /// Order in which limbs swing, cycled over `steps`. Defaults to id order.
    #[serde(default)]
    pub step_order: Option<Vec<usize>>,

    /// Duration of each single-limb swing phase.
    #[serde(default = "default_swing_duration")]
    pub swing_duration: f64,

    /// Duration of the multi-contact phase between two swings.
    #[serde(default = "default_stance_duration")]
    pub stance_duration: f64,

    #[serde(default = "default_initial_stance_duration")]
    pub initial_stance_duration: f64,

    #[serde(default = "default_final_stance_duration")]
    pub final_stance_duration: f64,

    /// Lowest-order coefficients per axis exposed to the optimizer in a swing segment.
    #[serde(default = "default_swing_free_coefficients")]
    pub swing_free_coefficients: usize,
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            gait: GaitType::default(),
            steps: default_steps(),
            step_order: None,
            swing_duration: default_swing_duration(),
            stance_duration: default_stance_duration(),
            initial_stance_duration: default_initial_stance_duration(),
            final_stance_duration: default_final_stance_duration(),
            swing_free_coefficients: default_swing_free_coefficients(),
        }
    }
}

impl GaitConfig {
    /// Validate against the number of limbs in the planner.
    pub fn validate(&self, n_limbs: usize) -> Result<(), ConfigError> {
        for (field, value) in [
            ("gait.swing_duration", self.swing_duration),
            ("gait.stance_duration", self.stance_duration),
            ("gait.initial_stance_duration", self.initial_stance_duration),
            ("gait.final_stance_duration", self.final_stance_duration),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::InvalidValue {
                    field: field.into(),
                    message: format!("{value} must be finite and > 0"),
                });
            }
        }
        if self.swing_free_coefficients > MAX_FREE_COEFFICIENTS {
            return Err(ConfigError::InvalidValue {
                field: "gait.swing_free_coefficients".into(),
                message: format!(
                    "{} exceeds the {MAX_FREE_COEFFICIENTS} polynomial coefficients",
                    self.swing_free_coefficients
                ),
            });
        }
        if let Some(order) = &self.step_order {
            if order.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "gait.step_order".into(),
                    message: "must name at least one limb".into(),
                });
            }
            if let Some(bad) = order.iter().find(|&&limb| limb >= n_limbs) {
                return Err(ConfigError::InvalidValue {
                    field: "gait.step_order".into(),
                    message: format!("limb {bad} >= limb count {n_limbs}"),
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
