//! Rectangular search domain.
//!
//! The domain is the rectangle `[0, width] x [0, height]` supplied by the
//! terrain collaborator. Strategies use it to seed initial guesses, to pick
//! their initial step scale, and to keep every evaluated point inside the
//! rectangle.

use crate::core::{
    error::{Result, SearchError},
    terrain::Terrain,
    types::{point, Point},
};
use rand::Rng;

/// A rectangle with its lower corner at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundedDomain {
    width: f64,
    height: f64,
}

impl BoundedDomain {
    /// Creates a domain of the given extent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if either extent is not a positive,
    /// finite number.
    pub fn new(width: f64, height: f64) -> Result<Self> {
        for (name, value) in [("width", width), ("height", height)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SearchError::invalid_configuration(
                    "domain extents must be positive and finite",
                    name,
                    value.to_string(),
                ));
            }
        }
        Ok(Self { width, height })
    }

    /// Creates the domain covered by a terrain.
    pub fn from_terrain<T: Terrain + ?Sized>(terrain: &T) -> Result<Self> {
        let (width, height) = terrain.dimensions();
        Self::new(width, height)
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn range(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Lower corner, always the origin.
    pub fn lower(&self) -> Point {
        point(0.0, 0.0)
    }

    /// Upper corner `(width, height)`.
    pub fn upper(&self) -> Point {
        point(self.width, self.height)
    }

    /// Centre of the rectangle.
    pub fn center(&self) -> Point {
        point(0.5 * self.width, 0.5 * self.height)
    }

    /// Smaller of the two extents.
    pub fn min_extent(&self) -> f64 {
        self.width.min(self.height)
    }

    /// Draws a point uniformly from the rectangle.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        point(
            rng.gen_range(0.0..=self.width),
            rng.gen_range(0.0..=self.height),
        )
    }

    /// Returns `true` if `p` lies in the closed rectangle.
    pub fn contains(&self, p: &Point) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }

    /// Projects `p` onto the rectangle, coordinate by coordinate.
    ///
    /// Non-finite coordinates are mapped to the centre line so the result is
    /// always a valid query point.
    pub fn clip(&self, p: &Point) -> Point {
        point(
            clamp_coordinate(p.x, self.width),
            clamp_coordinate(p.y, self.height),
        )
    }
}

fn clamp_coordinate(value: f64, extent: f64) -> f64 {
    if value.is_nan() {
        0.5 * extent
    } else {
        value.clamp(0.0, extent)
    }
}
