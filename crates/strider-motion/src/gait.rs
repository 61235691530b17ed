//! Gait planner for legged locomotion.
//!
//! Turns a gait pattern into a [`ContactSchedule`]. A walk is a sequence of
//! single-limb swings in a fixed step order:
//!
//! ```text
//! initial stance | swing(a) | stance | swing(b) | stance | ... | swing(z) | final stance
//! ```
//!
//! Every limb shares the same global phase sequence; whether a phase frees a
//! limb's coefficients is decided later by the parameter structure.

use strider_core::config::PlannerConfig;
use strider_core::error::MotionError;
use strider_core::types::{GaitType, LimbId};

use crate::polynomial::PhaseKind;
use crate::schedule::{ContactSchedule, Phase};

/// Phase durations of a gait, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaitTiming {
    /// Single-limb swing.
    pub swing: f64,
    /// Multi-contact phase between two swings.
    pub stance: f64,
    /// Multi-contact phase before the first swing.
    pub initial_stance: f64,
    /// Multi-contact phase after the last swing.
    pub final_stance: f64,
}

impl Default for GaitTiming {
    fn default() -> Self {
        Self {
            swing: 0.5,
            stance: 0.2,
            initial_stance: 0.4,
            final_stance: 0.4,
        }
    }
}

/// Generates contact schedules from a gait pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct GaitPlanner {
    gait: GaitType,
    n_limbs: usize,
    /// Limbs in the order they lift, cycled when there are more steps.
    step_order: Vec<LimbId>,
    timing: GaitTiming,
}

impl GaitPlanner {
    /// Planner for a quadruped (4 limbs), stepping left-hind, left-front,
    /// right-hind, right-front.
    pub fn quadruped(gait: GaitType) -> Self {
        Self {
            gait,
            n_limbs: 4,
            step_order: (0..4).map(LimbId).collect(),
            timing: GaitTiming::default(),
        }
    }

    /// Planner with an explicit step order.
    pub fn custom(
        gait: GaitType,
        n_limbs: usize,
        step_order: Vec<LimbId>,
        timing: GaitTiming,
    ) -> Result<Self, MotionError> {
        if n_limbs == 0 || step_order.is_empty() {
            return Err(MotionError::EmptySchedule);
        }
        if let Some(&bad) = step_order.iter().find(|l| l.index() >= n_limbs) {
            return Err(MotionError::UnknownLimb(bad));
        }
        Ok(Self {
            gait,
            n_limbs,
            step_order,
            timing,
        })
    }

    /// Planner described by a validated [`PlannerConfig`].
    pub fn from_config(config: &PlannerConfig) -> Result<Self, MotionError> {
        let n_limbs = config.n_limbs();
        let step_order = config.gait.step_order.as_ref().map_or_else(
            || (0..n_limbs).map(LimbId).collect(),
            |order| order.iter().copied().map(LimbId).collect(),
        );
        let timing = GaitTiming {
            swing: config.gait.swing_duration,
            stance: config.gait.stance_duration,
            initial_stance: config.gait.initial_stance_duration,
            final_stance: config.gait.final_stance_duration,
        };
        Self::custom(config.gait.gait, n_limbs, step_order, timing)
    }

    pub const fn gait(&self) -> GaitType {
        self.gait
    }

    pub const fn n_limbs(&self) -> usize {
        self.n_limbs
    }

    pub const fn timing(&self) -> &GaitTiming {
        &self.timing
    }

    pub fn set_timing(&mut self, timing: GaitTiming) {
        self.timing = timing;
    }

    /// Limb lifted in step `step` (0-based).
    pub fn step_limb(&self, step: usize) -> LimbId {
        self.step_order[step % self.step_order.len()]
    }

    /// Global phase sequence for `n_steps` swings.
    ///
    /// Standing, or walking zero steps, yields an initial and a final stance.
    pub fn phases(&self, n_steps: usize) -> Vec<Phase> {
        let t = &self.timing;
        if self.gait == GaitType::Stand || n_steps == 0 {
            return vec![
                Phase::new(PhaseKind::InitialStance { next_swing: None }, t.initial_stance),
                Phase::new(PhaseKind::FinalStance { next_swing: None }, t.final_stance),
            ];
        }

        let mut phases = Vec::with_capacity(2 * n_steps + 1);
        phases.push(Phase::new(
            PhaseKind::InitialStance {
                next_swing: Some(self.step_limb(0)),
            },
            t.initial_stance,
        ));
        for step in 0..n_steps {
            phases.push(Phase::swing(self.step_limb(step), t.swing));
            if step + 1 < n_steps {
                phases.push(Phase::new(
                    PhaseKind::IntermediateStance {
                        next_swing: Some(self.step_limb(step + 1)),
                    },
                    t.stance,
                ));
            }
        }
        phases.push(Phase::new(
            PhaseKind::FinalStance { next_swing: None },
            t.final_stance,
        ));
        phases
    }

    /// Contact schedule in which every limb follows [`phases`](Self::phases).
    pub fn schedule(&self, n_steps: usize) -> Result<ContactSchedule, MotionError> {
        ContactSchedule::shared(self.n_limbs, &self.phases(n_steps))
    }

    /// Horizon of a schedule with `n_steps` swings.
    pub fn horizon(&self, n_steps: usize) -> f64 {
        self.phases(n_steps).iter().map(|p| p.duration).sum()
    }
}
