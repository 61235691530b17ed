//! Shared test fixtures and utilities for strider crates.
//!
//! Provides deterministic RNG setup and reference limb layouts.

pub mod fixtures;
pub mod rng;

pub use fixtures::{biped_positions, quadruped_positions};
pub use rng::{deterministic_vec, seeded_rng};
