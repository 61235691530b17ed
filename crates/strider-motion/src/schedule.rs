//! Per-limb contact schedules.
//!
//! A schedule lists, for every limb, the ordered phases it goes through. All
//! limbs share one global timeline, so every limb's phase durations must sum
//! to the same horizon.

use serde::{Deserialize, Serialize};
use strider_core::error::MotionError;
use strider_core::types::{Endeffectors, LimbId};

use crate::polynomial::PhaseKind;

/// Largest allowed difference between two limbs' horizons, in seconds.
pub const HORIZON_TOLERANCE: f64 = 1e-9;

/// One contact phase: what kind it is and how long it lasts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub kind: PhaseKind,
    pub duration: f64,
}

impl Phase {
    pub const fn new(kind: PhaseKind, duration: f64) -> Self {
        Self { kind, duration }
    }

    pub const fn swing(limb: LimbId, duration: f64) -> Self {
        Self::new(PhaseKind::Swing { limb }, duration)
    }
}

/// Validated per-limb phase sequences sharing one horizon.
#[derive(Clone, Debug, PartialEq)]
pub struct ContactSchedule {
    phases: Endeffectors<Vec<Phase>>,
    total_time: f64,
}

impl ContactSchedule {
    /// Build a schedule from one phase list per limb (limb id = position).
    pub fn new(per_limb: Vec<Vec<Phase>>) -> Result<Self, MotionError> {
        if per_limb.is_empty() {
            return Err(MotionError::EmptySchedule);
        }
        let n_limbs = per_limb.len();
        let mut horizon: Option<f64> = None;

        for (limb, phases) in per_limb.iter().enumerate() {
            if phases.is_empty() {
                return Err(MotionError::EmptySchedule);
            }
            for (i, phase) in phases.iter().enumerate() {
                if !(phase.duration > 0.0 && phase.duration.is_finite()) {
                    return Err(MotionError::InvalidPhaseDuration {
                        limb: LimbId(limb),
                        phase: i,
                        duration: phase.duration,
                    });
                }
                if let Some(other) = phase.kind.referenced_limb() {
                    if other.index() >= n_limbs {
                        return Err(MotionError::UnknownLimb(other));
                    }
                }
            }

            let total: f64 = phases.iter().map(|p| p.duration).sum();
            match horizon {
                None => horizon = Some(total),
                Some(expected) if (expected - total).abs() > HORIZON_TOLERANCE => {
                    return Err(MotionError::ScheduleHorizonMismatch {
                        limb: LimbId(limb),
                        expected,
                        got: total,
                    });
                }
                Some(_) => {}
            }
        }

        Ok(Self {
            phases: Endeffectors::new(per_limb),
            total_time: horizon.unwrap_or_default(),
        })
    }

    /// Every limb follows the same global phase sequence.
    pub fn shared(n_limbs: usize, phases: &[Phase]) -> Result<Self, MotionError> {
        Self::new(vec![phases.to_vec(); n_limbs])
    }

    pub const fn n_limbs(&self) -> usize {
        self.phases.len()
    }

    /// Horizon shared by all limbs (taken from limb 0).
    pub const fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn phases(&self, limb: LimbId) -> Result<&[Phase], MotionError> {
        self.phases
            .get(limb)
            .map(Vec::as_slice)
            .ok_or(MotionError::UnknownLimb(limb))
    }

    pub fn iter(&self) -> impl Iterator<Item = (LimbId, &[Phase])> {
        self.phases.iter().map(|(id, p)| (id, p.as_slice()))
    }
}
