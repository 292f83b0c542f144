//! Objective adapter turning a height oracle into a minimization problem.
//!
//! Strategies in this workspace minimize. The adapter negates the terrain
//! height so that the lowest error is the highest summit, and it keeps an
//! append-only log of every point it is asked about.
//!
//! # Recording
//!
//! The log is an owned value inside the adapter, and evaluation takes
//! `&mut self`, so one run has exactly one writer. Re-evaluations of the same
//! point are logged every time: the log reflects the optimizer's real query
//! pattern, not the set of distinct points.

use log::{trace, warn};

use crate::core::{
    error::{Result, SearchError},
    terrain::Terrain,
    types::{Point, DIMENSION},
};

/// Ordered record of every point handed to the objective during a run.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluationLog {
    points: Vec<Point>,
}

impl EvaluationLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Number of evaluations recorded.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if nothing has been evaluated yet.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The recorded points, in evaluation order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Iterates over the recorded points.
    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// The most recently evaluated point.
    pub fn last(&self) -> Option<&Point> {
        self.points.last()
    }
}

impl<'a> IntoIterator for &'a EvaluationLog {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl From<EvaluationLog> for Vec<Point> {
    fn from(log: EvaluationLog) -> Self {
        log.points
    }
}

/// Wraps a terrain as an error to be minimized.
///
/// `evaluate(p)` returns `-height(p)` and appends `p` to the evaluation log.
/// The adapter also remembers the best observed point, which is what every
/// strategy reports as its final answer when it has no better source.
///
/// # Examples
///
/// ```rust
/// use summitopt_core::prelude::*;
///
/// let hill = FnTerrain::new(10.0, 10.0, |p: &Point| 100.0 - p.x);
/// let mut objective = ObjectiveAdapter::new(&hill);
///
/// assert_eq!(objective.evaluate(&point(2.0, 3.0)).unwrap(), -98.0);
/// assert_eq!(objective.evaluate(&point(2.0, 3.0)).unwrap(), -98.0);
/// assert_eq!(objective.evaluations().len(), 2);
/// ```
#[derive(Debug)]
pub struct ObjectiveAdapter<'a, T: Terrain + ?Sized> {
    terrain: &'a T,
    log: EvaluationLog,
    best: Option<(Point, f64)>,
}

impl<'a, T: Terrain + ?Sized> ObjectiveAdapter<'a, T> {
    /// Creates an adapter with an empty evaluation log.
    pub fn new(terrain: &'a T) -> Self {
        Self {
            terrain,
            log: EvaluationLog::new(),
            best: None,
        }
    }

    /// Number of parameters the objective takes. Always 2.
    pub fn n_parameters(&self) -> usize {
        DIMENSION
    }

    /// Evaluates the error `-height(p)` and logs `p`.
    ///
    /// # Errors
    ///
    /// Returns `OracleFailure` if the terrain fails or returns a non-finite
    /// height. The point is logged before the oracle is queried, so a failing
    /// query still shows up as the last entry of the log.
    pub fn evaluate(&mut self, p: &Point) -> Result<f64> {
        self.log.push(*p);

        let height = self.terrain.height(p).map_err(|err| {
            warn!("Height oracle failed after {} evaluations: {}", self.log.len(), err);
            match err {
                SearchError::OracleFailure { .. } => err,
                other => SearchError::oracle_failure(p.x, p.y, other.to_string()),
            }
        })?;
        if !height.is_finite() {
            warn!("Non-finite height {} at ({}, {})", height, p.x, p.y);
            return Err(SearchError::oracle_failure(
                p.x,
                p.y,
                format!("height is not a finite number ({height})"),
            ));
        }
        trace!("height({:.6}, {:.6}) = {}", p.x, p.y, height);

        let error = -height;
        match self.best {
            Some((_, best_error)) if best_error <= error => {}
            _ => self.best = Some((*p, error)),
        }
        Ok(error)
    }

    /// The log of every evaluated point.
    pub fn evaluations(&self) -> &EvaluationLog {
        &self.log
    }

    /// Number of evaluations performed so far.
    pub fn evaluation_count(&self) -> usize {
        self.log.len()
    }

    /// Best observed point and its error (lowest error, i.e. highest point).
    ///
    /// Ties keep the first point observed.
    pub fn best_observed(&self) -> Option<(Point, f64)> {
        self.best
    }

    /// Consumes the adapter and returns its log.
    pub fn into_log(self) -> EvaluationLog {
        self.log
    }
}
