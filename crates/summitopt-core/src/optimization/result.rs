//! Results of a maximum search.

use crate::core::types::{distance, Point};
use crate::optimization::{
    objective::EvaluationLog,
    recorder::Trajectory,
    stopping::{Termination, TerminationReason},
};
use std::time::Duration;

/// A local maximum reported by a strategy, in height terms.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalMaximum {
    /// Location of the local maximum
    pub point: Point,
    /// Terrain height at that location
    pub height: f64,
}

/// What a strategy hands back after its loop ends.
///
/// Values are in minimization terms (negated heights). The evaluation log
/// and trajectory stay with the adapter and the recorder until the run is
/// frozen into a [`SearchResult`].
#[derive(Debug, Clone)]
pub struct StrategyOutcome {
    /// The strategy's final answer
    pub best_point: Point,
    /// Error (negated height) at the final answer
    pub best_error: f64,
    /// Number of completed iterations
    pub iterations: usize,
    /// Which stopping rule ended the run
    pub termination: Termination,
    /// Local minima found along the way, best first, as (point, error)
    pub local_minima: Vec<(Point, f64)>,
}

/// Result of a complete search run.
///
/// Produced once at the end of a run and never mutated afterwards; all
/// fields are read through accessors. `best_value` is a height, already
/// un-negated.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchResult {
    strategy: String,
    best_point: Point,
    best_value: f64,
    evaluations: EvaluationLog,
    trajectory: Trajectory,
    termination_message: Option<String>,
    termination_reason: TerminationReason,
    iterations: usize,
    duration: Duration,
    local_maxima: Vec<LocalMaximum>,
}

impl SearchResult {
    /// Freezes a finished run.
    pub fn new(
        strategy: impl Into<String>,
        outcome: StrategyOutcome,
        evaluations: EvaluationLog,
        trajectory: Trajectory,
        duration: Duration,
    ) -> Self {
        let local_maxima = outcome
            .local_minima
            .iter()
            .map(|&(point, error)| LocalMaximum {
                point,
                height: -error,
            })
            .collect();

        Self {
            strategy: strategy.into(),
            best_point: outcome.best_point,
            best_value: -outcome.best_error,
            evaluations,
            trajectory,
            termination_message: Some(outcome.termination.message),
            termination_reason: outcome.termination.reason,
            iterations: outcome.iterations,
            duration,
            local_maxima,
        }
    }

    /// Name of the strategy that produced this result.
    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    /// Location of the best point found.
    pub fn best_point(&self) -> Point {
        self.best_point
    }

    /// Height at the best point found.
    pub fn best_value(&self) -> f64 {
        self.best_value
    }

    /// Every point the objective was evaluated at, in order.
    pub fn evaluations(&self) -> &EvaluationLog {
        &self.evaluations
    }

    /// One estimate per completed iteration.
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Why the search stopped, in words.
    pub fn termination_message(&self) -> Option<&str> {
        self.termination_message.as_deref()
    }

    /// Why the search stopped.
    pub fn termination_reason(&self) -> TerminationReason {
        self.termination_reason
    }

    /// Whether the strategy's normal stopping rule fired.
    pub fn converged(&self) -> bool {
        self.termination_reason.is_normal()
    }

    /// Number of completed iterations.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Number of objective evaluations.
    pub fn function_evaluations(&self) -> usize {
        self.evaluations.len()
    }

    /// Wall-clock duration of the run.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Local maxima found by the strategy, highest first.
    ///
    /// Empty for strategies that do not keep a pool of local optima.
    pub fn local_maxima(&self) -> &[LocalMaximum] {
        &self.local_maxima
    }

    /// Best height rounded to whole units, as shown to end users.
    pub fn summit_height(&self) -> i64 {
        self.best_value.round() as i64
    }

    /// Distance from the best point to `other`.
    pub fn distance_to(&self, other: &Point) -> f64 {
        distance(&self.best_point, other)
    }

    /// Splits the result into `(x, y, value, evaluations, trajectory)`.
    pub fn into_parts(self) -> (f64, f64, f64, EvaluationLog, Trajectory) {
        (
            self.best_point.x,
            self.best_point.y,
            self.best_value,
            self.evaluations,
            self.trajectory,
        )
    }
}
