//! Motion of all end-effectors, exposed as one optimization-parameter vector.
//!
//! Each limb owns a contiguous block of the global vector:
//!
//! ```text
//! [ limb 0 free coeffs | limb 1 free coeffs | ... | limb n-1 free coeffs ]
//!   ^offset(0)           ^offset(1)                 ^offset(n-1)
//! ```
//!
//! Offsets are assigned once at construction by a left-to-right scan in limb
//! id order and never change. A limb's position only depends on its own
//! block, so every Jacobian row is zero outside that block.

use std::ops::Range;

use nalgebra::{DMatrix, DVector, Vector2};
use strider_core::config::PlannerConfig;
use strider_core::error::{MotionError, StriderError};
use strider_core::types::{Coords2d, Endeffectors, LimbId, StateLin2d};
use tracing::debug;

use crate::diagnostics::SegmentSnapshot;
use crate::gait::GaitPlanner;
use crate::limb::LimbMotion;
use crate::parametrization::{JacobianRow, Parametrization};
use crate::polynomial::{CoeffValues, FreeCoefficients, PhaseKind, PolynomialSegment};
use crate::schedule::{ContactSchedule, HORIZON_TOLERANCE, Phase};

// ---------------------------------------------------------------------------
// ParameterStructure
// ---------------------------------------------------------------------------

/// Decides which coefficients of each phase are optimization variables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParameterStructure {
    /// Lowest-order coefficients per axis freed while the limb itself swings.
    pub swing_free_coefficients: usize,
}

impl Default for ParameterStructure {
    fn default() -> Self {
        Self {
            swing_free_coefficients: 4,
        }
    }
}

impl ParameterStructure {
    /// Free mask of a `kind` phase in the segment chain of `limb`.
    ///
    /// A limb in contact is pinned, so only its own swing phases carry
    /// free coefficients.
    pub fn free_mask(&self, limb: LimbId, kind: PhaseKind) -> Result<FreeCoefficients, MotionError> {
        match kind {
            PhaseKind::Swing { limb: swinging } if swinging == limb => {
                FreeCoefficients::lowest(self.swing_free_coefficients)
            }
            _ => Ok(FreeCoefficients::none()),
        }
    }
}

// ---------------------------------------------------------------------------
// EndeffectorsMotion
// ---------------------------------------------------------------------------

/// Per-limb polynomial motions and their layout in the parameter vector.
#[derive(Clone, Debug, PartialEq)]
pub struct EndeffectorsMotion {
    endeffectors: Endeffectors<LimbMotion>,
    offsets: Endeffectors<usize>,
    n_opt_params: usize,
    total_time: f64,
}

impl EndeffectorsMotion {
    /// Build one segment per scheduled phase with the default parameter structure.
    pub fn new(
        initial_pos: &Endeffectors<Vector2<f64>>,
        schedule: &ContactSchedule,
    ) -> Result<Self, MotionError> {
        Self::with_structure(initial_pos, schedule, &ParameterStructure::default())
    }

    /// Build one segment per scheduled phase.
    ///
    /// Every segment starts as a constant polynomial at the limb's initial
    /// position. Where the zero-order coefficient is fixed this pins the
    /// limb; where it is free it is the optimizer's starting value.
    pub fn with_structure(
        initial_pos: &Endeffectors<Vector2<f64>>,
        schedule: &ContactSchedule,
        structure: &ParameterStructure,
    ) -> Result<Self, MotionError> {
        if initial_pos.len() != schedule.n_limbs() {
            return Err(MotionError::LimbCountMismatch {
                positions: initial_pos.len(),
                schedules: schedule.n_limbs(),
            });
        }

        let limbs = schedule
            .iter()
            .map(|(limb, phases)| build_limb(limb, initial_pos[limb], phases, structure))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_limbs(Endeffectors::new(limbs))
    }

    /// Validate `config`, plan its gait and build the motion from it.
    pub fn from_config(config: &PlannerConfig) -> Result<Self, StriderError> {
        config.validate()?;
        let schedule = GaitPlanner::from_config(config)?.schedule(config.gait.steps)?;
        let initial_pos: Endeffectors<Vector2<f64>> = config
            .initial_positions
            .iter()
            .map(|&[x, y]| Vector2::new(x, y))
            .collect();
        let structure = ParameterStructure {
            swing_free_coefficients: config.gait.swing_free_coefficients,
        };
        Ok(Self::with_structure(&initial_pos, &schedule, &structure)?)
    }

    /// Assemble pre-built limbs, checking they share one horizon.
    pub fn from_limbs(endeffectors: Endeffectors<LimbMotion>) -> Result<Self, MotionError> {
        let Some(first) = endeffectors.values().first() else {
            return Err(MotionError::EmptySchedule);
        };
        let total_time = first.total_time();
        for (limb, motion) in endeffectors.iter() {
            if (motion.total_time() - total_time).abs() > HORIZON_TOLERANCE {
                return Err(MotionError::ScheduleHorizonMismatch {
                    limb,
                    expected: total_time,
                    got: motion.total_time(),
                });
            }
        }

        let mut n_opt_params = 0;
        let offsets = endeffectors.map(|motion| {
            let start = n_opt_params;
            n_opt_params += motion.free_parameter_count();
            start
        });

        debug!(
            limbs = endeffectors.len(),
            n_opt_params, total_time, "built endeffectors motion"
        );

        Ok(Self {
            endeffectors,
            offsets,
            n_opt_params,
            total_time,
        })
    }

    pub const fn n_endeffectors(&self) -> usize {
        self.endeffectors.len()
    }

    /// Horizon shared by every limb.
    pub const fn total_time(&self) -> f64 {
        self.total_time
    }

    pub const fn n_opt_params(&self) -> usize {
        self.n_opt_params
    }

    pub fn limb(&self, limb: LimbId) -> Result<&LimbMotion, MotionError> {
        self.endeffectors
            .get(limb)
            .ok_or(MotionError::UnknownLimb(limb))
    }

    pub const fn limbs(&self) -> &Endeffectors<LimbMotion> {
        &self.endeffectors
    }

    /// First index of `limb`'s block in the parameter vector.
    pub fn index_start(&self, limb: LimbId) -> Result<usize, MotionError> {
        self.offsets
            .get(limb)
            .copied()
            .ok_or(MotionError::UnknownLimb(limb))
    }

    /// Index range of `limb`'s block in the parameter vector.
    pub fn parameter_range(&self, limb: LimbId) -> Result<Range<usize>, MotionError> {
        let start = self.index_start(limb)?;
        Ok(start..start + self.limb(limb)?.free_parameter_count())
    }

    /// Concatenation of every limb's free coefficients in offset order.
    pub fn optimization_parameters(&self) -> DVector<f64> {
        let mut out = DVector::zeros(self.n_opt_params);
        for (limb, motion) in self.endeffectors.iter() {
            let start = self.offsets[limb];
            out.rows_mut(start, motion.free_parameter_count())
                .copy_from(&motion.free_parameter_vector());
        }
        out
    }

    /// Slice `values` at each limb's offset and hand it to that limb.
    pub fn set_optimization_parameters(&mut self, values: &[f64]) -> Result<(), MotionError> {
        if values.len() != self.n_opt_params {
            return Err(MotionError::ParameterVectorLengthMismatch {
                expected: self.n_opt_params,
                got: values.len(),
            });
        }
        for (limb, motion) in self.endeffectors.iter_mut() {
            let start = self.offsets[limb];
            let len = motion.free_parameter_count();
            motion.set_free_parameter_vector(&values[start..start + len])?;
        }
        Ok(())
    }

    /// Derivative of `limb`'s `dim` position at `t` w.r.t. the full parameter vector.
    ///
    /// Zero outside `parameter_range(limb)`.
    pub fn jacobian_wrt_opt_params(
        &self,
        t: f64,
        limb: LimbId,
        dim: Coords2d,
    ) -> Result<JacobianRow, MotionError> {
        let motion = self.limb(limb)?;
        let t_limb = self.limb_time(motion, t)?;
        let range = self.parameter_range(limb)?;

        let mut row = DVector::zeros(self.n_opt_params);
        motion.fill_jacobian_row(t_limb, dim, &mut row.as_mut_slice()[range])?;
        Ok(row)
    }

    /// Jacobian rows for several times stacked into a `times.len() x n_opt_params` matrix.
    pub fn jacobian_matrix(
        &self,
        times: &[f64],
        limb: LimbId,
        dim: Coords2d,
    ) -> Result<DMatrix<f64>, MotionError> {
        let mut jac = DMatrix::zeros(times.len(), self.n_opt_params);
        for (i, &t) in times.iter().enumerate() {
            let row = self.jacobian_wrt_opt_params(t, limb, dim)?;
            jac.row_mut(i).tr_copy_from(&row);
        }
        Ok(jac)
    }

    /// State of every limb at global time `t`.
    pub fn endeffectors(&self, t: f64) -> Result<Endeffectors<StateLin2d>, MotionError> {
        self.endeffectors_vec(t).map(Endeffectors::new)
    }

    /// State of every limb at global time `t`, in limb id order.
    pub fn endeffectors_vec(&self, t: f64) -> Result<Vec<StateLin2d>, MotionError> {
        self.endeffectors
            .values()
            .iter()
            .map(|motion| motion.state_at(self.limb_time(motion, t)?))
            .collect()
    }

    /// Contact phase of `limb` at global time `t`.
    pub fn active_phase_at(&self, t: f64, limb: LimbId) -> Result<PhaseKind, MotionError> {
        let motion = self.limb(limb)?;
        let t_limb = self
            .limb_time(motion, t)
            .map_err(|_| MotionError::NoActivePhase(t))?;
        motion.active_phase_at(t_limb)
    }

    /// The limb in the air at `t`, if any.
    pub fn swinging_limb_at(&self, t: f64) -> Result<Option<LimbId>, MotionError> {
        for limb in self.endeffectors.ids() {
            if let Some(swinging) = self.active_phase_at(t, limb)?.current_swing() {
                return Ok(Some(swinging));
            }
        }
        Ok(None)
    }

    /// Read-only copy of every limb's segments.
    pub fn snapshot(&self) -> Endeffectors<Vec<SegmentSnapshot>> {
        self.endeffectors.map(LimbMotion::snapshot)
    }

    /// Check `t` against the shared horizon and map it onto `motion`'s own.
    ///
    /// Limb horizons may differ by up to [`HORIZON_TOLERANCE`].
    fn limb_time(&self, motion: &LimbMotion, t: f64) -> Result<f64, MotionError> {
        if !(0.0..=self.total_time).contains(&t) {
            return Err(MotionError::TimeOutOfRange {
                t,
                total: self.total_time,
            });
        }
        Ok(t.min(motion.total_time()))
    }
}

impl Parametrization for EndeffectorsMotion {
    fn n_opt_params(&self) -> usize {
        self.n_opt_params
    }

    fn optimization_parameters(&self) -> DVector<f64> {
        Self::optimization_parameters(self)
    }

    fn set_optimization_parameters(&mut self, values: &[f64]) -> Result<(), MotionError> {
        Self::set_optimization_parameters(self, values)
    }
}

fn build_limb(
    limb: LimbId,
    initial_pos: Vector2<f64>,
    phases: &[Phase],
    structure: &ParameterStructure,
) -> Result<LimbMotion, MotionError> {
    let segments = phases
        .iter()
        .enumerate()
        .map(|(id, phase)| {
            Ok(PolynomialSegment::new(id, phase.duration, phase.kind)?
                .with_coefficients(CoeffValues::constant(initial_pos))
                .with_free_mask(structure.free_mask(limb, phase.kind)?))
        })
        .collect::<Result<Vec<_>, MotionError>>()?;
    LimbMotion::new(segments)
}
