//! Motion of a single limb as a chain of polynomial segments.

use nalgebra::DVector;
use strider_core::error::MotionError;
use strider_core::types::{Coords2d, StateLin2d};

use crate::diagnostics::SegmentSnapshot;
use crate::polynomial::{PhaseKind, PolynomialSegment, PosVelAcc};

/// Chronological, contiguous polynomial segments of one limb.
///
/// The free coefficients of all segments form this limb's parameter block,
/// ordered by segment, then axis (x before y), then ascending power.
#[derive(Clone, Debug, PartialEq)]
pub struct LimbMotion {
    segments: Vec<PolynomialSegment>,
    /// Global end time of each segment.
    ends: Vec<f64>,
    /// Offset of each segment's free coefficients within the limb block.
    block_starts: Vec<usize>,
    n_free: usize,
}

impl LimbMotion {
    /// Take ownership of `segments`; their order is the time order.
    pub fn new(segments: Vec<PolynomialSegment>) -> Result<Self, MotionError> {
        if segments.is_empty() {
            return Err(MotionError::EmptySchedule);
        }

        let mut ends = Vec::with_capacity(segments.len());
        let mut block_starts = Vec::with_capacity(segments.len());
        let mut t_end = 0.0;
        let mut n_free = 0;
        for seg in &segments {
            t_end += seg.duration();
            ends.push(t_end);
            block_starts.push(n_free);
            n_free += seg.free_parameter_count();
        }

        Ok(Self {
            segments,
            ends,
            block_starts,
            n_free,
        })
    }

    pub fn segments(&self) -> &[PolynomialSegment] {
        &self.segments
    }

    /// Sum of all segment durations.
    pub fn total_time(&self) -> f64 {
        self.ends.last().copied().unwrap_or_default()
    }

    /// Length of this limb's parameter block.
    pub const fn free_parameter_count(&self) -> usize {
        self.n_free
    }

    /// Current values of every free coefficient.
    pub fn free_parameter_vector(&self) -> DVector<f64> {
        let mut out = DVector::zeros(self.n_free);
        for (seg, &start) in self.segments.iter().zip(&self.block_starts) {
            let len = seg.free_parameter_count();
            seg.read_free_parameters(&mut out.as_mut_slice()[start..start + len]);
        }
        out
    }

    /// Overwrite every free coefficient. `values` must have exactly
    /// [`free_parameter_count`](Self::free_parameter_count) entries.
    pub fn set_free_parameter_vector(&mut self, values: &[f64]) -> Result<(), MotionError> {
        if values.len() != self.n_free {
            return Err(MotionError::InvalidParameterCount {
                expected: self.n_free,
                got: values.len(),
            });
        }
        for (seg, &start) in self.segments.iter_mut().zip(&self.block_starts) {
            let len = seg.free_parameter_count();
            seg.write_free_parameters(&values[start..start + len]);
        }
        Ok(())
    }

    /// Active segment index and local time for global time `t`.
    ///
    /// A time on a boundary between two segments resolves to the earlier
    /// one at its end; `t == total_time()` resolves to the last segment.
    pub fn locate(&self, t: f64) -> Result<(usize, f64), MotionError> {
        let total = self.total_time();
        if !(0.0..=total).contains(&t) {
            return Err(MotionError::TimeOutOfRange { t, total });
        }
        let idx = self
            .ends
            .partition_point(|&end| end < t)
            .min(self.segments.len() - 1);
        let start = if idx == 0 { 0.0 } else { self.ends[idx - 1] };
        let local = (t - start).clamp(0.0, self.segments[idx].duration());
        Ok((idx, local))
    }

    pub fn segment_index_at(&self, t: f64) -> Result<usize, MotionError> {
        self.locate(t).map(|(idx, _)| idx)
    }

    /// Position, velocity and acceleration at global time `t`.
    pub fn state_at(&self, t: f64) -> Result<StateLin2d, MotionError> {
        let (idx, local) = self.locate(t)?;
        let seg = &self.segments[idx];
        Ok(StateLin2d::new(
            seg.evaluate(PosVelAcc::Pos, local),
            seg.evaluate(PosVelAcc::Vel, local),
            seg.evaluate(PosVelAcc::Acc, local),
        ))
    }

    /// Derivative of the position on `dim` at `t` w.r.t. every free coefficient.
    pub fn jacobian_row_at(&self, t: f64, dim: Coords2d) -> Result<DVector<f64>, MotionError> {
        let mut row = DVector::zeros(self.n_free);
        self.fill_jacobian_row(t, dim, row.as_mut_slice())?;
        Ok(row)
    }

    /// Write the Jacobian row into `out` (length = parameter block length).
    ///
    /// Only the active segment's entries are non-zero.
    pub fn fill_jacobian_row(
        &self,
        t: f64,
        dim: Coords2d,
        out: &mut [f64],
    ) -> Result<(), MotionError> {
        if out.len() != self.n_free {
            return Err(MotionError::InvalidParameterCount {
                expected: self.n_free,
                got: out.len(),
            });
        }
        let (idx, local) = self.locate(t)?;
        out.fill(0.0);

        let seg = &self.segments[idx];
        let start = self.block_starts[idx];
        let block = &mut out[start..start + seg.free_parameter_count()];
        for (slot, (coeff_dim, k)) in block.iter_mut().zip(seg.free_mask().iter()) {
            *slot = seg.partial_derivative(dim, coeff_dim, k, local);
        }
        Ok(())
    }

    /// Contact phase active at global time `t`.
    pub fn active_phase_at(&self, t: f64) -> Result<PhaseKind, MotionError> {
        self.locate(t)
            .map(|(idx, _)| self.segments[idx].kind())
            .map_err(|_| MotionError::NoActivePhase(t))
    }

    /// Read-only copy of every segment for logging and export.
    pub fn snapshot(&self) -> Vec<SegmentSnapshot> {
        self.segments.iter().map(SegmentSnapshot::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial::{CoeffValues, FreeCoefficients};
    use approx::assert_relative_eq;
    use nalgebra::Vector2;
    use strider_core::types::LimbId;

    /// Swing of 0.5 s with the 4 lowest coefficients free, then a fixed 0.3 s stance.
    fn swing_then_stance() -> LimbMotion {
        let swing = PolynomialSegment::new(0, 0.5, PhaseKind::Swing { limb: LimbId(0) })
            .unwrap()
            .with_free_mask(FreeCoefficients::lowest(4).unwrap());
        let stance = PolynomialSegment::new(1, 0.3, PhaseKind::FinalStance { next_swing: None })
            .unwrap()
            .with_coefficients(CoeffValues::constant(Vector2::new(0.5, 0.0)));
        LimbMotion::new(vec![swing, stance]).unwrap()
    }

    #[test]
    fn empty_limb_is_rejected() {
        assert_eq!(
            LimbMotion::new(vec![]).unwrap_err(),
            MotionError::EmptySchedule
        );
    }

    #[test]
    fn total_time_is_sum_of_durations() {
        let limb = swing_then_stance();
        let sum: f64 = limb.segments().iter().map(PolynomialSegment::duration).sum();
        assert_relative_eq!(limb.total_time(), sum);
        assert_relative_eq!(limb.total_time(), 0.8);
    }

    #[test]
    fn parameter_count_only_counts_free_coefficients() {
        let limb = swing_then_stance();
        assert_eq!(limb.free_parameter_count(), 8);
        assert_eq!(limb.free_parameter_vector().len(), 8);
    }

    #[test]
    fn free_parameter_round_trip() {
        let mut limb = swing_then_stance();
        let v = [0.1, 0.2, 0.3, 0.4, -0.1, -0.2, -0.3, -0.4];
        limb.set_free_parameter_vector(&v).unwrap();
        assert_eq!(limb.free_parameter_vector().as_slice(), &v);
    }

    #[test]
    fn wrong_parameter_count_is_rejected() {
        let mut limb = swing_then_stance();
        let err = limb.set_free_parameter_vector(&[0.0; 7]).unwrap_err();
        assert_eq!(
            err,
            MotionError::InvalidParameterCount {
                expected: 8,
                got: 7
            }
        );
    }

    #[test]
    fn locate_resolves_segments() {
        let limb = swing_then_stance();
        assert_eq!(limb.locate(0.0).unwrap(), (0, 0.0));
        let (idx, local) = limb.locate(0.25).unwrap();
        assert_eq!(idx, 0);
        assert_relative_eq!(local, 0.25);
        // boundary belongs to the earlier segment
        let (idx, local) = limb.locate(0.5).unwrap();
        assert_eq!(idx, 0);
        assert_relative_eq!(local, 0.5);
        let (idx, local) = limb.locate(0.6).unwrap();
        assert_eq!(idx, 1);
        assert_relative_eq!(local, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn end_of_horizon_resolves_to_last_segment() {
        let limb = swing_then_stance();
        let (idx, local) = limb.locate(limb.total_time()).unwrap();
        assert_eq!(idx, 1);
        assert_relative_eq!(local, limb.segments()[1].duration(), epsilon = 1e-12);
        assert!(limb.state_at(limb.total_time()).is_ok());
    }

    #[test]
    fn out_of_range_time_fails() {
        let limb = swing_then_stance();
        let total = limb.total_time();
        assert!(matches!(
            limb.state_at(total + 1e-9),
            Err(MotionError::TimeOutOfRange { .. })
        ));
        assert!(matches!(
            limb.state_at(-1e-9),
            Err(MotionError::TimeOutOfRange { .. })
        ));
        assert!(limb.state_at(f64::NAN).is_err());
    }

    #[test]
    fn linear_ramp_state() {
        let mut limb = swing_then_stance();
        limb.set_free_parameter_vector(&[0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
            .unwrap();
        let s = limb.state_at(0.25).unwrap();
        assert_relative_eq!(s.p.x, 0.25);
        assert_relative_eq!(s.p.y, 0.0);
        assert_relative_eq!(s.v.x, 1.0);
        assert_relative_eq!(s.a.x, 0.0);
    }

    #[test]
    fn jacobian_row_only_touches_active_segment() {
        let limb = swing_then_stance();
        let row = limb.jacobian_row_at(0.25, Coords2d::X).unwrap();
        let expected = [1.0, 0.25, 0.0625, 0.015625, 0.0, 0.0, 0.0, 0.0];
        assert_eq!(row.len(), expected.len());
        for (a, e) in row.iter().zip(expected) {
            assert_relative_eq!(*a, e);
        }

        let row_y = limb.jacobian_row_at(0.25, Coords2d::Y).unwrap();
        assert!(row_y.as_slice()[..4].iter().all(|&v| v == 0.0));
        assert_relative_eq!(row_y[5], 0.25);

        // the stance segment has no free coefficients
        let row_stance = limb.jacobian_row_at(0.7, Coords2d::X).unwrap();
        assert!(row_stance.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn jacobian_matches_finite_difference() {
        let mut limb = swing_then_stance();
        let base = [0.3, -0.2, 0.5, 1.1, 0.05, 0.4, -0.7, 0.2];
        limb.set_free_parameter_vector(&base).unwrap();
        let t = 0.37;
        let row = limb.jacobian_row_at(t, Coords2d::Y).unwrap();
        let h = 1e-7;
        for i in 0..base.len() {
            let mut bumped = base;
            bumped[i] += h;
            let mut other = limb.clone();
            other.set_free_parameter_vector(&bumped).unwrap();
            let fd = (other.state_at(t).unwrap().p.y - limb.state_at(t).unwrap().p.y) / h;
            assert_relative_eq!(row[i], fd, epsilon = 1e-6);
        }
    }

    #[test]
    fn fill_jacobian_row_checks_length() {
        let limb = swing_then_stance();
        let mut out = vec![0.0; 3];
        assert!(matches!(
            limb.fill_jacobian_row(0.1, Coords2d::X, &mut out),
            Err(MotionError::InvalidParameterCount { .. })
        ));
    }

    #[test]
    fn active_phase() {
        let limb = swing_then_stance();
        assert_eq!(
            limb.active_phase_at(0.1).unwrap(),
            PhaseKind::Swing { limb: LimbId(0) }
        );
        assert_eq!(
            limb.active_phase_at(0.8).unwrap(),
            PhaseKind::FinalStance { next_swing: None }
        );
        assert_eq!(
            limb.active_phase_at(0.9).unwrap_err(),
            MotionError::NoActivePhase(0.9)
        );
    }

    #[test]
    fn snapshot_lists_every_segment() {
        let limb = swing_then_stance();
        let snap = limb.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].free_parameters, 8);
        assert_eq!(snap[1].free_parameters, 0);
    }
}
