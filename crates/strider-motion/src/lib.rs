//! Polynomial limb trajectories parametrized for gradient-based optimization.
//!
//! Each limb's horizontal foot motion is a chain of quintic polynomials, one
//! per contact phase. The free coefficients of all limbs are flattened into
//! a single vector that an external solver reads and writes, together with
//! analytic Jacobians of foot position with respect to that vector.
//!
//! # Pipeline
//!
//! ```text
//! GaitPlanner → ContactSchedule → EndeffectorsMotion → state / Jacobian at t
//!               (phases per limb)  (LimbMotion per limb,
//!                                   PolynomialSegment per phase)
//! ```
//!
//! # Quick Start
//!
//! ```
//! use nalgebra::Vector2;
//! use strider_core::prelude::*;
//! use strider_motion::prelude::*;
//!
//! let schedule = GaitPlanner::quadruped(GaitType::Walk).schedule(4).unwrap();
//! let footholds: Endeffectors<Vector2<f64>> = Endeffectors::new(vec![
//!     Vector2::new(-0.3, 0.2),
//!     Vector2::new(0.3, 0.2),
//!     Vector2::new(-0.3, -0.2),
//!     Vector2::new(0.3, -0.2),
//! ]);
//! let mut motion = EndeffectorsMotion::new(&footholds, &schedule).unwrap();
//!
//! let mut params = motion.optimization_parameters();
//! params[1] = 0.1;
//! motion.set_optimization_parameters(params.as_slice()).unwrap();
//!
//! let state = motion.endeffectors(0.5).unwrap();
//! let row = motion.jacobian_wrt_opt_params(0.5, LimbId(0), Coords2d::X).unwrap();
//! assert_eq!(row.len(), motion.n_opt_params());
//! assert!(state[LimbId(0)].v.x > 0.0);
//! ```

pub mod diagnostics;
pub mod endeffectors;
pub mod gait;
pub mod limb;
pub mod parametrization;
pub mod polynomial;
pub mod sampling;
pub mod schedule;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::diagnostics::SegmentSnapshot;
    pub use crate::endeffectors::{EndeffectorsMotion, ParameterStructure};
    pub use crate::gait::{GaitPlanner, GaitTiming};
    pub use crate::limb::LimbMotion;
    pub use crate::parametrization::{JacobianRow, Parametrization};
    pub use crate::polynomial::{
        COEFF_COUNT, CoeffValues, FreeCoefficients, PhaseKind, PolynomialSegment, PosVelAcc,
    };
    pub use crate::sampling::{
        LimbSample, MAX_SAMPLES, TrajectorySample, sample_times, sample_trajectory,
    };
    pub use crate::schedule::{ContactSchedule, HORIZON_TOLERANCE, Phase};
}
