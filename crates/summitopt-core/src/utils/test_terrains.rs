//! Common test terrains for use in unit tests, integration tests and benches.
//!
//! This module provides small analytic height oracles with known summits so
//! that strategies can be checked without real elevation data.

#![cfg(any(test, feature = "test-utils"))]

use crate::core::{
    error::{Result, SearchError},
    terrain::Terrain,
    types::{point, Point},
};
use std::cell::Cell;

/// An inverted paraboloid `-((x - cx)^2 + (y - cy)^2)` with its summit,
/// of height zero, at `(cx, cy)`.
#[derive(Debug, Clone)]
pub struct Paraboloid {
    width: f64,
    height: f64,
    summit: Point,
}

impl Paraboloid {
    /// Creates a `width` x `height` paraboloid peaking at `summit`.
    pub fn new(width: f64, height: f64, summit: Point) -> Self {
        Self {
            width,
            height,
            summit,
        }
    }

    /// The 10 x 10 paraboloid with its summit in the centre.
    pub fn centered() -> Self {
        Self::new(10.0, 10.0, point(5.0, 5.0))
    }

    /// Location of the summit.
    pub fn summit(&self) -> Point {
        self.summit
    }
}

impl Terrain for Paraboloid {
    fn height(&self, p: &Point) -> Result<f64> {
        Ok(-(p - self.summit).norm_squared())
    }

    fn dimensions(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

/// A terrain of constant height.
#[derive(Debug, Clone)]
pub struct FlatTerrain {
    width: f64,
    height: f64,
    elevation: f64,
}

impl FlatTerrain {
    /// Creates a `width` x `height` terrain at constant `elevation`.
    pub fn new(width: f64, height: f64, elevation: f64) -> Self {
        Self {
            width,
            height,
            elevation,
        }
    }
}

impl Terrain for FlatTerrain {
    fn height(&self, _p: &Point) -> Result<f64> {
        Ok(self.elevation)
    }

    fn dimensions(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

/// Two Gaussian hills on a 100 x 100 map: a lower, narrower one near the
/// origin and the true summit, 1344 units high, near the opposite corner.
#[derive(Debug, Clone, Default)]
pub struct TwinPeaks;

impl TwinPeaks {
    /// Location of the higher hill.
    pub const SUMMIT: (f64, f64) = (70.0, 65.0);
    /// Peak height of the higher hill.
    pub const SUMMIT_HEIGHT: f64 = 1344.0;
    /// Location of the lower hill.
    pub const FOOTHILL: (f64, f64) = (20.0, 25.0);
    /// Peak height of the lower hill.
    pub const FOOTHILL_HEIGHT: f64 = 1000.0;

    fn hill(p: &Point, center: (f64, f64), peak: f64, spread: f64) -> f64 {
        let d2 = (p.x - center.0).powi(2) + (p.y - center.1).powi(2);
        peak * (-d2 / (2.0 * spread * spread)).exp()
    }
}

impl Terrain for TwinPeaks {
    fn height(&self, p: &Point) -> Result<f64> {
        Ok(Self::hill(p, Self::SUMMIT, Self::SUMMIT_HEIGHT, 15.0)
            + Self::hill(p, Self::FOOTHILL, Self::FOOTHILL_HEIGHT, 10.0))
    }

    fn dimensions(&self) -> (f64, f64) {
        (100.0, 100.0)
    }
}

/// A terrain that fails on its `n`-th query (counting from one).
#[derive(Debug)]
pub struct FailingTerrain {
    fail_on: usize,
    calls: Cell<usize>,
}

impl FailingTerrain {
    /// Creates a terrain whose `fail_on`-th and later queries fail.
    pub fn new(fail_on: usize) -> Self {
        Self {
            fail_on,
            calls: Cell::new(0),
        }
    }

    /// Number of queries received so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Terrain for FailingTerrain {
    fn height(&self, p: &Point) -> Result<f64> {
        let call = self.calls.get() + 1;
        self.calls.set(call);
        if call >= self.fail_on {
            Err(SearchError::oracle_failure(p.x, p.y, "elevation tile unavailable"))
        } else {
            Ok(p.x + p.y)
        }
    }

    fn dimensions(&self) -> (f64, f64) {
        (10.0, 10.0)
    }
}
