//! Type definitions and aliases for maximum search.
//!
//! Search points live in a two-dimensional coordinate system, so the
//! library works with statically-sized nalgebra types throughout.

use nalgebra::{Matrix2, Point2, Vector2};

/// A point `(x, y)` in the domain's coordinate system.
pub type Point = Point2<f64>;

/// A displacement between two points.
pub type Vector = Vector2<f64>;

/// A 2x2 matrix, used for covariance and step shapes.
pub type Matrix = Matrix2<f64>;

/// Number of search parameters. Terrain search is always two-dimensional.
pub const DIMENSION: usize = 2;

/// Creates a point from its coordinates.
#[inline]
pub fn point(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: &Point, b: &Point) -> f64 {
    nalgebra::distance(a, b)
}

/// Numerical constants shared by the strategies.
pub mod constants {
    /// Smallest eigenvalue kept when decomposing a covariance matrix.
    pub const MIN_EIGENVALUE: f64 = 1e-20;

    /// Lower clamp for a step size before it is considered collapsed.
    pub const MIN_STEP_SIZE: f64 = 1e-12;

    /// Default tolerance for comparing objective values.
    pub const DEFAULT_TOLERANCE: f64 = 1e-8;
}
