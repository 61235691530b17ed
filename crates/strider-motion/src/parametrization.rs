//! Solver-facing view of anything described by a flat parameter vector.

use nalgebra::DVector;
use strider_core::error::MotionError;

/// One row of a Jacobian w.r.t. the full optimization-parameter vector.
pub type JacobianRow = DVector<f64>;

/// A quantity whose state is a flat vector of optimization parameters.
///
/// An external solver reads the vector, proposes a new one and writes it
/// back; no query may run concurrently with a write.
pub trait Parametrization {
    /// Length of the parameter vector.
    fn n_opt_params(&self) -> usize;

    fn optimization_parameters(&self) -> DVector<f64>;

    /// Fails if `values.len() != self.n_opt_params()`.
    fn set_optimization_parameters(&mut self, values: &[f64]) -> Result<(), MotionError>;
}
