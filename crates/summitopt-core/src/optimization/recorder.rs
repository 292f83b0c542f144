//! Per-iteration trajectory recording.
//!
//! A strategy calls [`TrajectoryRecorder::record`] exactly once per completed
//! iteration with its current answer. What that answer is (the best point
//! observed so far, or the point the strategy's internal model believes in)
//! is decided by the strategy from a run-level [`TrackingMode`]; the recorder
//! itself only ever sees a point.

use crate::core::types::Point;

/// Which estimate a strategy reports and tracks each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackingMode {
    /// The point with the lowest evaluated error so far.
    Observed,
    /// The strategy's model estimate, e.g. a distribution mean.
    #[default]
    Guessed,
}

impl TrackingMode {
    /// Maps the `use_observed_best` flag to a tracking mode.
    pub fn from_observed_flag(use_observed_best: bool) -> Self {
        if use_observed_best {
            Self::Observed
        } else {
            Self::Guessed
        }
    }

    /// Returns `true` for [`TrackingMode::Observed`].
    pub fn uses_observed_best(self) -> bool {
        matches!(self, Self::Observed)
    }
}

/// Ordered per-iteration estimates of a run.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trajectory {
    points: Vec<Point>,
}

impl Trajectory {
    /// Creates an empty trajectory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded iterations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if no iteration has completed.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The recorded estimates, in iteration order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Iterates over the recorded estimates.
    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// Estimate of the last completed iteration.
    pub fn last(&self) -> Option<&Point> {
        self.points.last()
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl From<Trajectory> for Vec<Point> {
    fn from(trajectory: Trajectory) -> Self {
        trajectory.points
    }
}

/// Collects one estimate per completed iteration.
#[derive(Debug, Default)]
pub struct TrajectoryRecorder {
    trajectory: Trajectory,
}

impl TrajectoryRecorder {
    /// Creates a recorder with an empty trajectory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the estimate of the iteration that just completed.
    pub fn record(&mut self, estimate: Point) {
        self.trajectory.points.push(estimate);
    }

    /// Number of iterations recorded so far.
    pub fn iterations(&self) -> usize {
        self.trajectory.len()
    }

    /// The trajectory recorded so far.
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Consumes the recorder and returns its trajectory.
    pub fn into_trajectory(self) -> Trajectory {
        self.trajectory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::point;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tracking_mode_flag() {
        assert_eq!(TrackingMode::from_observed_flag(true), TrackingMode::Observed);
        assert_eq!(TrackingMode::from_observed_flag(false), TrackingMode::Guessed);
        assert_eq!(TrackingMode::default(), TrackingMode::Guessed);
        assert!(TrackingMode::Observed.uses_observed_best());
    }

    #[test]
    fn test_records_in_order() {
        let mut recorder = TrajectoryRecorder::new();
        assert_eq!(recorder.iterations(), 0);

        recorder.record(point(1.0, 2.0));
        recorder.record(point(1.0, 2.0));
        recorder.record(point(3.0, 4.0));

        let trajectory = recorder.into_trajectory();
        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory.last(), Some(&point(3.0, 4.0)));
        assert_eq!(
            Vec::from(trajectory),
            vec![point(1.0, 2.0), point(1.0, 2.0), point(3.0, 4.0)]
        );
    }
}
