use thiserror::Error;

use crate::types::LimbId;

/// Top-level error type for strider.
#[derive(Debug, Error)]
pub enum StriderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Motion error: {0}")]
    Motion(#[from] MotionError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid trajectory_dt: {0} (must be > 0)")]
    InvalidTrajectoryDt(f64),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors raised by the trajectory parametrization engine.
///
/// Every variant is a caller contract violation; nothing here is retried.
/// Copy so it propagates cheaply out of the solver's inner loop.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MotionError {
    #[error("Invalid duration {duration} for phase {phase} (must be finite and > 0)")]
    InvalidDuration { phase: usize, duration: f64 },

    #[error("Invalid duration {duration} for phase {phase} of {limb} (must be finite and > 0)")]
    InvalidPhaseDuration {
        limb: LimbId,
        phase: usize,
        duration: f64,
    },

    #[error("Contact schedule has no phases")]
    EmptySchedule,

    #[error("Limb count mismatch: {positions} initial positions, {schedules} schedules")]
    LimbCountMismatch { positions: usize, schedules: usize },

    #[error("Schedule horizon mismatch for {limb}: expected {expected}, got {got}")]
    ScheduleHorizonMismatch {
        limb: LimbId,
        expected: f64,
        got: f64,
    },

    #[error("Invalid parameter count: expected {expected}, got {got}")]
    InvalidParameterCount { expected: usize, got: usize },

    #[error("Parameter vector length mismatch: expected {expected}, got {got}")]
    ParameterVectorLengthMismatch { expected: usize, got: usize },

    #[error("Time {t} out of range [0, {total}]")]
    TimeOutOfRange { t: f64, total: f64 },

    #[error("Unknown {0}")]
    UnknownLimb(LimbId),

    #[error("No active phase at time {0}")]
    NoActivePhase(f64),

    #[error("Invalid time step: {0} (must be finite and > 0)")]
    InvalidTimeStep(f64),

    #[error("Time step {dt} over a {total}s horizon exceeds {max} samples")]
    TooManySamples { dt: f64, total: f64, max: usize },

    #[error("Invalid free coefficient count: {0} (polynomial has 6 coefficients)")]
    InvalidFreeCoefficientCount(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strider_error_from_motion_error() {
        let err = MotionError::UnknownLimb(LimbId(7));
        let top: StriderError = err.into();
        assert!(matches!(top, StriderError::Motion(_)));
        assert!(top.to_string().contains("limb 7"));
    }

    #[test]
    fn strider_error_from_config_error() {
        let err = ConfigError::InvalidTrajectoryDt(-1.0);
        let top: StriderError = err.into();
        assert!(matches!(top, StriderError::Config(_)));
        assert!(top.to_string().contains("-1"));
    }

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let config_err: ConfigError = io_err.into();
        assert!(matches!(config_err, ConfigError::Io(_)));
    }

    #[test]
    fn motion_error_is_copy() {
        let err = MotionError::NoActivePhase(1.5);
        let err2 = err;
        assert_eq!(err, err2);
    }

    #[test]
    fn motion_error_display_messages() {
        assert_eq!(
            MotionError::ParameterVectorLengthMismatch {
                expected: 8,
                got: 7
            }
            .to_string(),
            "Parameter vector length mismatch: expected 8, got 7"
        );
        assert_eq!(
            MotionError::InvalidParameterCount {
                expected: 4,
                got: 2
            }
            .to_string(),
            "Invalid parameter count: expected 4, got 2"
        );
        assert_eq!(
            MotionError::TimeOutOfRange { t: 1.5, total: 0.8 }.to_string(),
            "Time 1.5 out of range [0, 0.8]"
        );
        assert_eq!(
            MotionError::UnknownLimb(LimbId(4)).to_string(),
            "Unknown limb 4"
        );
        assert_eq!(
            MotionError::ScheduleHorizonMismatch {
                limb: LimbId(1),
                expected: 1.0,
                got: 1.2
            }
            .to_string(),
            "Schedule horizon mismatch for limb 1: expected 1, got 1.2"
        );
        assert_eq!(
            MotionError::InvalidPhaseDuration {
                limb: LimbId(2),
                phase: 3,
                duration: -0.5
            }
            .to_string(),
            "Invalid duration -0.5 for phase 3 of limb 2 (must be finite and > 0)"
        );
        assert_eq!(
            MotionError::TooManySamples {
                dt: 1e-9,
                total: 2.0,
                max: 1000
            }
            .to_string(),
            "Time step 0.000000001 over a 2s horizon exceeds 1000 samples"
        );
        assert_eq!(
            MotionError::EmptySchedule.to_string(),
            "Contact schedule has no phases"
        );
    }

    #[test]
    fn config_error_display_messages() {
        assert_eq!(
            ConfigError::InvalidTrajectoryDt(0.0).to_string(),
            "Invalid trajectory_dt: 0 (must be > 0)"
        );
        assert_eq!(
            ConfigError::InvalidValue {
                field: "gait.steps".into(),
                message: "must be positive".into()
            }
            .to_string(),
            "Invalid value for gait.steps: must be positive"
        );
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn errors_are_send_sync() {
        assert_send_sync::<MotionError>();
        assert_send_sync::<StriderError>();
    }
}
