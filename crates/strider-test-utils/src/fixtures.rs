//! Reference foothold layouts.

use nalgebra::Vector2;
use strider_core::types::Endeffectors;

/// Nominal footholds of a quadruped: left-hind, left-front, right-hind,
/// right-front.
pub fn quadruped_positions() -> Endeffectors<Vector2<f64>> {
    Endeffectors::new(vec![
        Vector2::new(-0.3, 0.2),
        Vector2::new(0.3, 0.2),
        Vector2::new(-0.3, -0.2),
        Vector2::new(0.3, -0.2),
    ])
}

/// Nominal footholds of a biped: left, right.
pub fn biped_positions() -> Endeffectors<Vector2<f64>> {
    Endeffectors::new(vec![Vector2::new(0.0, 0.1), Vector2::new(0.0, -0.1)])
}
