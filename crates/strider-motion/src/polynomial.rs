//! Fifth-order planar polynomial segments.
//!
//! A segment represents the motion of one limb during exactly one contact
//! phase. Position on each axis is
//!
//! ```text
//! p(t) = c0 + c1 t + c2 t^2 + c3 t^3 + c4 t^4 + c5 t^5,   t in [0, duration]
//! ```
//!
//! Velocity and acceleration are the exact derivatives of the same
//! coefficients. A per-coefficient mask records which coefficients are
//! optimization variables; the rest stay at the values written at setup.

use std::fmt;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use strider_core::error::MotionError;
use strider_core::types::{Coords2d, LimbId};

/// Number of coefficients per axis (degree 5).
pub const COEFF_COUNT: usize = 6;

/// Which derivative of the polynomial to evaluate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PosVelAcc {
    Pos,
    Vel,
    Acc,
}

impl PosVelAcc {
    pub const fn order(self) -> usize {
        match self {
            Self::Pos => 0,
            Self::Vel => 1,
            Self::Acc => 2,
        }
    }
}

// ---------------------------------------------------------------------------
// PhaseKind
// ---------------------------------------------------------------------------

/// The contact phase a segment belongs to.
///
/// Multi-contact phases carry the limb planned to swing next (if any); a
/// swing phase carries the limb currently in the air.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhaseKind {
    /// All limbs in contact before the first step.
    InitialStance { next_swing: Option<LimbId> },
    /// Exactly one limb in the air.
    Swing { limb: LimbId },
    /// All limbs in contact between two steps.
    IntermediateStance { next_swing: Option<LimbId> },
    /// All limbs in contact after the last step.
    FinalStance { next_swing: Option<LimbId> },
}

impl PhaseKind {
    pub const fn is_multi_contact(self) -> bool {
        !matches!(self, Self::Swing { .. })
    }

    /// Limb in the air, only for swing phases.
    pub const fn current_swing(self) -> Option<LimbId> {
        match self {
            Self::Swing { limb } => Some(limb),
            _ => None,
        }
    }

    /// Limb planned to lift after this multi-contact phase.
    pub const fn next_planned_swing(self) -> Option<LimbId> {
        match self {
            Self::Swing { .. } => None,
            Self::InitialStance { next_swing }
            | Self::IntermediateStance { next_swing }
            | Self::FinalStance { next_swing } => next_swing,
        }
    }

    /// The limb this phase names, swinging now or next.
    pub const fn referenced_limb(self) -> Option<LimbId> {
        match self {
            Self::Swing { limb } => Some(limb),
            _ => self.next_planned_swing(),
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitialStance { .. } => f.write_str("initial-stance"),
            Self::Swing { limb } => write!(f, "swing({limb})"),
            Self::IntermediateStance { .. } => f.write_str("intermediate-stance"),
            Self::FinalStance { .. } => f.write_str("final-stance"),
        }
    }
}

// ---------------------------------------------------------------------------
// CoeffValues
// ---------------------------------------------------------------------------

/// The full 6x2 coefficient block of a segment, ascending powers of `t`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CoeffValues {
    pub x: [f64; COEFF_COUNT],
    pub y: [f64; COEFF_COUNT],
}

impl CoeffValues {
    pub const fn new(x: [f64; COEFF_COUNT], y: [f64; COEFF_COUNT]) -> Self {
        Self { x, y }
    }

    /// A constant polynomial resting at `p`.
    pub fn constant(p: Vector2<f64>) -> Self {
        let mut c = Self::default();
        c.x[0] = p.x;
        c.y[0] = p.y;
        c
    }

    pub const fn axis(&self, dim: Coords2d) -> &[f64; COEFF_COUNT] {
        match dim {
            Coords2d::X => &self.x,
            Coords2d::Y => &self.y,
        }
    }

    pub fn axis_mut(&mut self, dim: Coords2d) -> &mut [f64; COEFF_COUNT] {
        match dim {
            Coords2d::X => &mut self.x,
            Coords2d::Y => &mut self.y,
        }
    }
}

// ---------------------------------------------------------------------------
// FreeCoefficients
// ---------------------------------------------------------------------------

/// Per-axis mask of the coefficients exposed to the optimizer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FreeCoefficients {
    pub x: [bool; COEFF_COUNT],
    pub y: [bool; COEFF_COUNT],
}

impl FreeCoefficients {
    /// Every coefficient fixed.
    pub const fn none() -> Self {
        Self {
            x: [false; COEFF_COUNT],
            y: [false; COEFF_COUNT],
        }
    }

    /// Every coefficient free.
    pub const fn all() -> Self {
        Self {
            x: [true; COEFF_COUNT],
            y: [true; COEFF_COUNT],
        }
    }

    /// The `n` lowest-order coefficients free on both axes.
    pub fn lowest(n: usize) -> Result<Self, MotionError> {
        Self::lowest_per_axis(n, n)
    }

    /// The `nx` / `ny` lowest-order coefficients free on x / y.
    pub fn lowest_per_axis(nx: usize, ny: usize) -> Result<Self, MotionError> {
        if let Some(&bad) = [nx, ny].iter().find(|&&n| n > COEFF_COUNT) {
            return Err(MotionError::InvalidFreeCoefficientCount(bad));
        }
        let mut mask = Self::none();
        mask.x[..nx].fill(true);
        mask.y[..ny].fill(true);
        Ok(mask)
    }

    pub const fn axis(&self, dim: Coords2d) -> &[bool; COEFF_COUNT] {
        match dim {
            Coords2d::X => &self.x,
            Coords2d::Y => &self.y,
        }
    }

    pub fn is_free(&self, dim: Coords2d, coeff: usize) -> bool {
        self.axis(dim).get(coeff).copied().unwrap_or(false)
    }

    /// Free coefficients on one axis.
    pub fn count_axis(&self, dim: Coords2d) -> usize {
        self.axis(dim).iter().filter(|&&f| f).count()
    }

    pub fn count(&self) -> usize {
        self.count_axis(Coords2d::X) + self.count_axis(Coords2d::Y)
    }

    /// `(axis, coefficient)` pairs of the free coefficients in parameter order:
    /// x before y, ascending power within an axis.
    pub fn iter(&self) -> impl Iterator<Item = (Coords2d, usize)> + '_ {
        Coords2d::ALL.into_iter().flat_map(move |dim| {
            self.axis(dim)
                .iter()
                .enumerate()
                .filter(|(_, free)| **free)
                .map(move |(k, _)| (dim, k))
        })
    }
}

// ---------------------------------------------------------------------------
// PolynomialSegment
// ---------------------------------------------------------------------------

/// A planar quintic active for a fixed duration during one contact phase.
#[derive(Clone, Debug, PartialEq)]
pub struct PolynomialSegment {
    id: usize,
    duration: f64,
    kind: PhaseKind,
    coeff: CoeffValues,
    free: FreeCoefficients,
}

impl PolynomialSegment {
    /// Create a segment with zero coefficients and nothing free.
    ///
    /// `duration` must be finite and strictly positive.
    pub fn new(id: usize, duration: f64, kind: PhaseKind) -> Result<Self, MotionError> {
        if !(duration > 0.0 && duration.is_finite()) {
            return Err(MotionError::InvalidDuration {
                phase: id,
                duration,
            });
        }
        Ok(Self {
            id,
            duration,
            kind,
            coeff: CoeffValues::default(),
            free: FreeCoefficients::none(),
        })
    }

    #[must_use]
    pub fn with_coefficients(mut self, coeff: CoeffValues) -> Self {
        self.coeff = coeff;
        self
    }

    #[must_use]
    pub fn with_free_mask(mut self, free: FreeCoefficients) -> Self {
        self.free = free;
        self
    }

    pub const fn id(&self) -> usize {
        self.id
    }

    pub const fn duration(&self) -> f64 {
        self.duration
    }

    pub const fn kind(&self) -> PhaseKind {
        self.kind
    }

    pub const fn is_multi_contact(&self) -> bool {
        self.kind.is_multi_contact()
    }

    /// Limb being swung, `None` during multi-contact phases.
    pub const fn current_swing_limb(&self) -> Option<LimbId> {
        self.kind.current_swing()
    }

    /// Limb planned to swing once this multi-contact phase ends.
    pub const fn next_planned_swing(&self) -> Option<LimbId> {
        self.kind.next_planned_swing()
    }

    /// Number of whole `dt` steps that fit in this segment.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn node_count(&self, dt: f64) -> usize {
        (self.duration / dt).floor() as usize
    }

    /// Read-only view of the coefficient block.
    pub const fn coefficients(&self) -> &CoeffValues {
        &self.coeff
    }

    pub fn set_coefficients(&mut self, coeff: CoeffValues) {
        self.coeff = coeff;
    }

    pub const fn free_mask(&self) -> &FreeCoefficients {
        &self.free
    }

    pub fn set_free_mask(&mut self, free: FreeCoefficients) {
        self.free = free;
    }

    pub fn free_parameter_count(&self) -> usize {
        self.free.count()
    }

    /// Copy the free coefficients into `out` in parameter order.
    ///
    /// `out.len()` must equal [`free_parameter_count`](Self::free_parameter_count).
    pub fn read_free_parameters(&self, out: &mut [f64]) {
        debug_assert_eq!(out.len(), self.free_parameter_count());
        for (slot, (dim, k)) in out.iter_mut().zip(self.free.iter()) {
            *slot = self.coeff.axis(dim)[k];
        }
    }

    /// Overwrite the free coefficients from `values` in parameter order.
    pub fn write_free_parameters(&mut self, values: &[f64]) {
        debug_assert_eq!(values.len(), self.free_parameter_count());
        let free = self.free;
        for (&v, (dim, k)) in values.iter().zip(free.iter()) {
            self.coeff.axis_mut(dim)[k] = v;
        }
    }

    /// Position, velocity or acceleration at local time `t`.
    ///
    /// `t` is clamped to `[0, duration]`.
    pub fn evaluate(&self, deriv: PosVelAcc, t: f64) -> Vector2<f64> {
        let t = t.clamp(0.0, self.duration);
        Vector2::new(
            eval_axis(&self.coeff.x, deriv, t),
            eval_axis(&self.coeff.y, deriv, t),
        )
    }

    /// Partial derivative of the position on `dim` with respect to
    /// coefficient `coeff` of axis `coeff_dim` at local time `t`.
    ///
    /// Equals `t^coeff` on the matching axis and zero across axes.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn partial_derivative(
        &self,
        dim: Coords2d,
        coeff_dim: Coords2d,
        coeff: usize,
        t: f64,
    ) -> f64 {
        debug_assert!(coeff < COEFF_COUNT);
        if dim != coeff_dim {
            return 0.0;
        }
        t.clamp(0.0, self.duration).powi(coeff as i32)
    }
}

impl fmt::Display for PolynomialSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "segment {} [{}] duration {:.3}s, x: {:?}, y: {:?}",
            self.id, self.kind, self.duration, self.coeff.x, self.coeff.y
        )
    }
}

/// Horner evaluation of the `order`-th derivative of one axis polynomial.
#[allow(clippy::cast_precision_loss)]
fn eval_axis(c: &[f64; COEFF_COUNT], deriv: PosVelAcc, t: f64) -> f64 {
    let order = deriv.order();
    let mut acc = 0.0;
    for k in (order..COEFF_COUNT).rev() {
        // d^order/dt^order of t^k = k!/(k-order)! * t^(k-order)
        let falling: usize = ((k - order + 1)..=k).product();
        acc = acc * t + falling as f64 * c[k];
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_segment() -> PolynomialSegment {
        PolynomialSegment::new(0, 0.8, PhaseKind::Swing { limb: LimbId(0) })
            .unwrap()
            .with_coefficients(CoeffValues::new(
                [0.1, -0.4, 2.0, 0.7, -1.3, 0.9],
                [-0.2, 1.1, 0.3, -2.2, 0.5, 0.25],
            ))
    }

    #[test]
    fn new_rejects_non_positive_duration() {
        let kind = PhaseKind::InitialStance { next_swing: None };
        assert_eq!(
            PolynomialSegment::new(3, 0.0, kind).unwrap_err(),
            MotionError::InvalidDuration {
                phase: 3,
                duration: 0.0
            }
        );
        assert!(PolynomialSegment::new(0, -1.0, kind).is_err());
        assert!(PolynomialSegment::new(0, f64::NAN, kind).is_err());
        assert!(PolynomialSegment::new(0, f64::INFINITY, kind).is_err());
    }

    #[test]
    fn evaluate_position_matches_direct_sum() {
        let seg = sample_segment();
        let t: f64 = 0.37;
        let c = seg.coefficients();
        let expected_x: f64 = (0..COEFF_COUNT).map(|k| c.x[k] * t.powi(k as i32)).sum();
        let expected_y: f64 = (0..COEFF_COUNT).map(|k| c.y[k] * t.powi(k as i32)).sum();
        let p = seg.evaluate(PosVelAcc::Pos, t);
        assert_relative_eq!(p.x, expected_x, epsilon = 1e-12);
        assert_relative_eq!(p.y, expected_y, epsilon = 1e-12);
    }

    #[test]
    fn velocity_is_numerical_derivative_of_position() {
        let seg = sample_segment();
        let h = 1e-6;
        for i in 1..16 {
            let t = f64::from(i) * 0.05;
            let fd = (seg.evaluate(PosVelAcc::Pos, t + h) - seg.evaluate(PosVelAcc::Pos, t - h))
                / (2.0 * h);
            let v = seg.evaluate(PosVelAcc::Vel, t);
            assert_relative_eq!(v, fd, epsilon = 1e-6);
        }
    }

    #[test]
    fn acceleration_is_second_numerical_derivative() {
        let seg = sample_segment();
        let h = 1e-4;
        for i in 1..16 {
            let t = f64::from(i) * 0.05;
            let p = |t| seg.evaluate(PosVelAcc::Pos, t);
            let fd = (p(t + h) - 2.0 * p(t) + p(t - h)) / (h * h);
            let a = seg.evaluate(PosVelAcc::Acc, t);
            assert_relative_eq!(a, fd, epsilon = 1e-4);
        }
    }

    #[test]
    fn evaluate_clamps_local_time() {
        let seg = sample_segment();
        assert_eq!(
            seg.evaluate(PosVelAcc::Pos, 2.0),
            seg.evaluate(PosVelAcc::Pos, seg.duration())
        );
        assert_eq!(
            seg.evaluate(PosVelAcc::Vel, -1.0),
            seg.evaluate(PosVelAcc::Vel, 0.0)
        );
    }

    #[test]
    fn partial_derivative_is_power_of_time() {
        let seg = sample_segment();
        let t = 0.25;
        let expected = [1.0, 0.25, 0.0625, 0.015625, 0.00390625, 0.0009765625];
        for (k, e) in expected.iter().enumerate() {
            assert_relative_eq!(seg.partial_derivative(Coords2d::X, Coords2d::X, k, t), *e);
            assert_relative_eq!(seg.partial_derivative(Coords2d::Y, Coords2d::Y, k, t), *e);
            assert_eq!(seg.partial_derivative(Coords2d::X, Coords2d::Y, k, t), 0.0);
        }
    }

    #[test]
    fn partial_derivative_matches_perturbation() {
        let seg = sample_segment();
        let t = 0.6;
        let h = 1e-7;
        for k in 0..COEFF_COUNT {
            let mut bumped = seg.clone();
            let mut c = *seg.coefficients();
            c.y[k] += h;
            bumped.set_coefficients(c);
            let fd = (bumped.evaluate(PosVelAcc::Pos, t).y - seg.evaluate(PosVelAcc::Pos, t).y) / h;
            assert_relative_eq!(
                seg.partial_derivative(Coords2d::Y, Coords2d::Y, k, t),
                fd,
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn free_mask_lowest() {
        let mask = FreeCoefficients::lowest(4).unwrap();
        assert_eq!(mask.count(), 8);
        assert!(mask.is_free(Coords2d::X, 3));
        assert!(!mask.is_free(Coords2d::Y, 4));
        assert!(!mask.is_free(Coords2d::Y, 9));
        assert_eq!(
            FreeCoefficients::lowest(7).unwrap_err(),
            MotionError::InvalidFreeCoefficientCount(7)
        );
    }

    #[test]
    fn free_iteration_order_is_x_block_then_y_block() {
        let mask = FreeCoefficients::lowest_per_axis(2, 1).unwrap();
        let order: Vec<_> = mask.iter().collect();
        assert_eq!(
            order,
            vec![(Coords2d::X, 0), (Coords2d::X, 1), (Coords2d::Y, 0)]
        );
    }

    #[test]
    fn free_parameter_read_write() {
        let mut seg = sample_segment().with_free_mask(FreeCoefficients::lowest_per_axis(3, 2).unwrap());
        let mut out = vec![0.0; seg.free_parameter_count()];
        seg.read_free_parameters(&mut out);
        assert_eq!(out, vec![0.1, -0.4, 2.0, -0.2, 1.1]);

        seg.write_free_parameters(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let c = seg.coefficients();
        assert_eq!(c.x[..3], [1.0, 2.0, 3.0]);
        assert_eq!(c.y[..2], [4.0, 5.0]);
        // fixed coefficients untouched
        assert_eq!(c.x[3], 0.7);
        assert_eq!(c.y[2], 0.3);
    }

    #[test]
    fn phase_kind_limb_accessors() {
        let swing = PhaseKind::Swing { limb: LimbId(2) };
        assert!(!swing.is_multi_contact());
        assert_eq!(swing.current_swing(), Some(LimbId(2)));
        assert_eq!(swing.next_planned_swing(), None);

        let stance = PhaseKind::IntermediateStance {
            next_swing: Some(LimbId(1)),
        };
        assert!(stance.is_multi_contact());
        assert_eq!(stance.current_swing(), None);
        assert_eq!(stance.next_planned_swing(), Some(LimbId(1)));
        assert_eq!(stance.referenced_limb(), Some(LimbId(1)));
    }

    #[test]
    fn node_count_floors() {
        let seg = sample_segment();
        assert_eq!(seg.node_count(0.1), 8);
        assert_eq!(seg.node_count(0.3), 2);
    }

    #[test]
    fn display_mentions_kind_and_id() {
        let s = sample_segment().to_string();
        assert!(s.contains("segment 0"));
        assert!(s.contains("swing(limb 0)"));
    }
}
