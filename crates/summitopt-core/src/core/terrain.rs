//! Height oracle interface.
//!
//! The terrain collaborator owns elevation data, its interpolation and all
//! coordinate conversions. The search engine only needs two things from it:
//! the height at a point and the extent of the rectangle it covers.

use crate::core::{error::Result, types::Point};
use std::fmt::Debug;

/// Trait for height oracles.
///
/// Implementations must be pure and deterministic, and total over
/// `[0, width] x [0, height]`. Points outside that rectangle are never
/// queried by the strategies in this workspace.
pub trait Terrain: Debug {
    /// Returns the elevation at `point`.
    ///
    /// # Errors
    ///
    /// Returns an error if no elevation is available at `point`. The search
    /// aborts on the first such error.
    fn height(&self, point: &Point) -> Result<f64>;

    /// Returns `(width, height)` of the rectangle covered by the terrain.
    fn dimensions(&self) -> (f64, f64);
}

impl<T: Terrain + ?Sized> Terrain for &T {
    fn height(&self, point: &Point) -> Result<f64> {
        (**self).height(point)
    }

    fn dimensions(&self) -> (f64, f64) {
        (**self).dimensions()
    }
}

/// A terrain backed by a closure.
///
/// # Examples
///
/// ```rust
/// use summitopt_core::prelude::*;
///
/// let hill = FnTerrain::new(10.0, 10.0, |p: &Point| -((p.x - 5.0).powi(2) + (p.y - 5.0).powi(2)));
/// assert_eq!(hill.height(&point(5.0, 5.0)).unwrap(), 0.0);
/// assert_eq!(hill.dimensions(), (10.0, 10.0));
/// ```
pub struct FnTerrain<F> {
    width: f64,
    height: f64,
    f: F,
}

impl<F> FnTerrain<F>
where
    F: Fn(&Point) -> f64,
{
    /// Creates a terrain of the given extent whose elevation is `f`.
    pub fn new(width: f64, height: f64, f: F) -> Self {
        Self { width, height, f }
    }
}

impl<F> Debug for FnTerrain<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTerrain")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl<F> Terrain for FnTerrain<F>
where
    F: Fn(&Point) -> f64,
{
    fn height(&self, point: &Point) -> Result<f64> {
        Ok((self.f)(point))
    }

    fn dimensions(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}
