//! Uniform sampling of an [`EndeffectorsMotion`] over its horizon.

use serde::Serialize;
use strider_core::error::MotionError;
use strider_core::types::StateLin2d;
use tracing::debug;

use crate::endeffectors::EndeffectorsMotion;
use crate::schedule::HORIZON_TOLERANCE;

/// Kinematic state of one limb at a sample time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LimbSample {
    pub position: [f64; 2],
    pub velocity: [f64; 2],
    pub acceleration: [f64; 2],
}

impl From<&StateLin2d> for LimbSample {
    fn from(s: &StateLin2d) -> Self {
        Self {
            position: [s.p.x, s.p.y],
            velocity: [s.v.x, s.v.y],
            acceleration: [s.a.x, s.a.y],
        }
    }
}

/// States of all limbs at one instant, indexed by limb id.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrajectorySample {
    pub time: f64,
    pub limbs: Vec<LimbSample>,
}

/// Upper bound on the number of grid points produced by [`sample_times`].
pub const MAX_SAMPLES: usize = 1_000_000;

/// Sample times `0, dt, 2 dt, ...` up to the horizon.
///
/// The horizon itself is always the last time, even when it is not a
/// multiple of `dt`. Fails when the grid would exceed [`MAX_SAMPLES`].
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn sample_times(total: f64, dt: f64) -> Result<Vec<f64>, MotionError> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(MotionError::InvalidTimeStep(dt));
    }
    let steps = (total / dt).ceil();
    if steps.is_nan() || steps >= MAX_SAMPLES as f64 {
        return Err(MotionError::TooManySamples {
            dt,
            total,
            max: MAX_SAMPLES,
        });
    }
    let n = steps as usize;

    let mut times = Vec::with_capacity(n + 1);
    // A grid point within tolerance of the horizon is the horizon.
    times.extend(
        (0..n)
            .map(|k| k as f64 * dt)
            .take_while(|&t| t <= total - HORIZON_TOLERANCE),
    );
    times.push(total);
    Ok(times)
}

/// Evaluate every limb at [`sample_times`].
pub fn sample_trajectory(
    motion: &EndeffectorsMotion,
    dt: f64,
) -> Result<Vec<TrajectorySample>, MotionError> {
    let times = sample_times(motion.total_time(), dt)?;
    let samples = times
        .into_iter()
        .map(|time| {
            let states = motion.endeffectors(time)?;
            Ok(TrajectorySample {
                time,
                limbs: states.values().iter().map(LimbSample::from).collect(),
            })
        })
        .collect::<Result<Vec<_>, MotionError>>()?;

    debug!(
        samples = samples.len(),
        dt,
        horizon = motion.total_time(),
        "sampled trajectory"
    );
    Ok(samples)
}
