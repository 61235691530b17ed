use std::fmt;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LimbId
// ---------------------------------------------------------------------------

/// Index of one end-effector (foot or hand).
///
/// Limb ids are dense: a machine with `n` limbs uses ids `0..n`, and every
/// per-limb container is ordered by id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LimbId(pub usize);

impl LimbId {
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LimbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "limb {}", self.0)
    }
}

impl From<usize> for LimbId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

// ---------------------------------------------------------------------------
// Coords2d
// ---------------------------------------------------------------------------

/// Planar axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coords2d {
    X,
    Y,
}

impl Coords2d {
    /// Both axes in storage order.
    pub const ALL: [Self; 2] = [Self::X, Self::Y];

    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
        }
    }
}

impl fmt::Display for Coords2d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
        }
    }
}

// ---------------------------------------------------------------------------
// StateLin2d
// ---------------------------------------------------------------------------

/// Planar position, velocity and acceleration of a point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateLin2d {
    pub p: Vector2<f64>,
    pub v: Vector2<f64>,
    pub a: Vector2<f64>,
}

impl StateLin2d {
    pub const fn new(p: Vector2<f64>, v: Vector2<f64>, a: Vector2<f64>) -> Self {
        Self { p, v, a }
    }
}

// ---------------------------------------------------------------------------
// Endeffectors
// ---------------------------------------------------------------------------

/// One value per limb, indexed by [`LimbId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endeffectors<T> {
    values: Vec<T>,
}

impl<T> Endeffectors<T> {
    pub const fn new(values: Vec<T>) -> Self {
        Self { values }
    }

    pub const fn len(&self) -> usize {
        self.values.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, limb: LimbId) -> Option<&T> {
        self.values.get(limb.0)
    }

    /// Limb ids in enumeration order.
    pub fn ids(&self) -> impl Iterator<Item = LimbId> + '_ {
        (0..self.values.len()).map(LimbId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LimbId, &T)> {
        self.values.iter().enumerate().map(|(i, v)| (LimbId(i), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (LimbId, &mut T)> {
        self.values
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (LimbId(i), v))
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Apply `f` to every limb's value, keeping the limb order.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Endeffectors<U> {
        Endeffectors::new(self.values.iter().map(f).collect())
    }
}

impl<T> std::ops::Index<LimbId> for Endeffectors<T> {
    type Output = T;
    fn index(&self, limb: LimbId) -> &T {
        &self.values[limb.0]
    }
}

impl<T> std::ops::IndexMut<LimbId> for Endeffectors<T> {
    fn index_mut(&mut self, limb: LimbId) -> &mut T {
        &mut self.values[limb.0]
    }
}

impl<T> From<Vec<T>> for Endeffectors<T> {
    fn from(values: Vec<T>) -> Self {
        Self::new(values)
    }
}

impl<T> FromIterator<T> for Endeffectors<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// GaitType
// ---------------------------------------------------------------------------

/// Supported gait patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GaitType {
    /// All limbs on the ground for the whole horizon.
    Stand,
    /// One limb lifts at a time, separated by multi-contact phases.
    #[default]
    Walk,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
