// strider-core: Types, config and errors shared by the strider crates.

pub mod config;
pub mod error;
pub mod types;

pub mod prelude {
    pub use crate::config::{GaitConfig, PlannerConfig};
    pub use crate::error::{ConfigError, MotionError, StriderError};
    pub use crate::types::{Coords2d, Endeffectors, GaitType, LimbId, StateLin2d};
}
