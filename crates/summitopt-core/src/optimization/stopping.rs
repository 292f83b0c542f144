//! Stopping rules for maximum search.
//!
//! Every strategy keeps a history with one tracked minimization value per
//! completed iteration and asks its rules whether to stop after each
//! iteration. The rules differ in philosophy:
//!
//! - [`StagnationRule`]: no significant improvement over a trailing window
//! - [`PhaseConvergence`]: no improvement across a refinement phase boundary
//! - [`IterationCap`]: hard cap, the fatal fallback
//!
//! [`ConvergenceChecker`] evaluates a list of rules in order and reports the
//! first one that fires.

use crate::core::types::constants::DEFAULT_TOLERANCE;
use std::fmt::Debug;

/// Reason for termination of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminationReason {
    /// The tracked value stopped improving over the stagnation window
    Stagnated,
    /// The strategy's own convergence test passed
    Converged,
    /// The fatal iteration cap was reached
    MaxIterations,
}

impl TerminationReason {
    /// Returns `true` unless the search was forced to stop by a cap.
    pub fn is_normal(self) -> bool {
        !matches!(self, TerminationReason::MaxIterations)
    }
}

/// A polymorphic stopping test over the per-iteration history.
pub trait StoppingRule: Debug {
    /// Returns `true` if the search should stop after the last entry of
    /// `history`.
    fn should_stop(&self, history: &[f64]) -> bool;

    /// The termination reason reported when this rule fires.
    fn reason(&self) -> TerminationReason;

    /// Human-readable explanation reported when this rule fires.
    fn message(&self) -> String;
}

/// Minimum change that counts as an improvement on `reference`.
///
/// Relative to the reference magnitude above one, absolute below, so that
/// values close to zero can still stagnate.
fn significance(threshold: f64, reference: f64) -> f64 {
    threshold * reference.abs().max(1.0)
}

/// Stops when the tracked value has not improved significantly for a window
/// of iterations.
///
/// A reference value is set by the first iteration and reset whenever an
/// iteration improves on it by at least `threshold` (relative, see above).
/// The rule fires once the reference has been held for `window` iterations,
/// counting the iteration that set it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StagnationRule {
    /// Number of iterations without significant improvement
    pub window: usize,
    /// Relative improvement threshold
    pub threshold: f64,
}

impl Default for StagnationRule {
    fn default() -> Self {
        Self {
            window: 100,
            threshold: 0.01,
        }
    }
}

impl StagnationRule {
    /// Creates a stagnation rule.
    pub fn new(window: usize, threshold: f64) -> Self {
        Self { window, threshold }
    }

    /// Number of iterations the current reference value has been held.
    pub fn unchanged_iterations(&self, history: &[f64]) -> usize {
        let Some((&first, rest)) = history.split_first() else {
            return 0;
        };

        let mut reference = first;
        let mut held = 1;
        for &value in rest {
            if reference - value >= significance(self.threshold, reference) {
                reference = value;
                held = 1;
            } else {
                held += 1;
            }
        }
        held
    }
}

impl StoppingRule for StagnationRule {
    fn should_stop(&self, history: &[f64]) -> bool {
        self.unchanged_iterations(history) >= self.window
    }

    fn reason(&self) -> TerminationReason {
        TerminationReason::Stagnated
    }

    fn message(&self) -> String {
        format!("No significant change for {} iterations.", self.window)
    }
}

/// Stops when the best value did not improve between the last two phases.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseConvergence {
    /// Improvement below which two phases are considered equal
    pub tolerance: f64,
    /// Number of phases to complete before the test applies
    pub min_iterations: usize,
}

impl Default for PhaseConvergence {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            min_iterations: 2,
        }
    }
}

impl StoppingRule for PhaseConvergence {
    fn should_stop(&self, history: &[f64]) -> bool {
        if history.len() < self.min_iterations.max(2) {
            return false;
        }
        let previous = history[history.len() - 2];
        let current = history[history.len() - 1];
        previous - current <= significance(self.tolerance, previous)
    }

    fn reason(&self) -> TerminationReason {
        TerminationReason::Converged
    }

    fn message(&self) -> String {
        "Optimization terminated successfully: no improvement between refinement phases."
            .to_string()
    }
}

/// Stops after a fixed number of iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IterationCap {
    /// Maximum number of iterations
    pub max_iterations: usize,
}

impl IterationCap {
    /// Creates an iteration cap.
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }
}

impl StoppingRule for IterationCap {
    fn should_stop(&self, history: &[f64]) -> bool {
        history.len() >= self.max_iterations
    }

    fn reason(&self) -> TerminationReason {
        TerminationReason::MaxIterations
    }

    fn message(&self) -> String {
        format!(
            "Maximum number of iterations ({}) reached.",
            self.max_iterations
        )
    }
}

/// Outcome of a triggered stopping rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Termination {
    /// Why the search stopped
    pub reason: TerminationReason,
    /// Explanation for the reporting collaborator
    pub message: String,
}

/// Evaluates stopping rules in order.
pub struct ConvergenceChecker;

impl ConvergenceChecker {
    /// Returns the first rule that fires on `history`, if any.
    pub fn check(history: &[f64], rules: &[&dyn StoppingRule]) -> Option<Termination> {
        rules
            .iter()
            .find(|rule| rule.should_stop(history))
            .map(|rule| Termination {
                reason: rule.reason(),
                message: rule.message(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stagnation_on_flat_history() {
        let rule = StagnationRule::default();
        let flat = vec![0.0; 100];

        assert!(!rule.should_stop(&flat[..99]));
        assert!(rule.should_stop(&flat));
        assert_eq!(rule.unchanged_iterations(&flat), 100);
        assert_eq!(rule.unchanged_iterations(&[]), 0);
    }

    #[test]
    fn test_stagnation_resets_on_improvement() {
        let rule = StagnationRule::new(3, 0.01);

        // Small improvements below one percent do not reset the reference.
        assert!(rule.should_stop(&[-1000.0, -1005.0, -1009.0]));
        // A large improvement does.
        assert!(!rule.should_stop(&[-1000.0, -1005.0, -1200.0]));
        assert_eq!(rule.unchanged_iterations(&[-1000.0, -1005.0, -1200.0]), 1);
    }

    #[test]
    fn test_stagnation_is_absolute_near_zero() {
        let rule = StagnationRule::new(2, 0.01);
        assert!(!rule.should_stop(&[-0.5, -0.6]));
        assert!(rule.should_stop(&[-0.5, -0.505]));
    }

    #[test]
    fn test_phase_convergence() {
        let rule = PhaseConvergence::default();
        assert!(!rule.should_stop(&[-3.0]));
        assert!(!rule.should_stop(&[-3.0, -4.0]));
        assert!(rule.should_stop(&[-3.0, -4.0, -4.0]));

        let late = PhaseConvergence {
            tolerance: 1e-8,
            min_iterations: 4,
        };
        assert!(!late.should_stop(&[-3.0, -4.0, -4.0]));
    }

    #[test]
    fn test_iteration_cap() {
        let cap = IterationCap::new(3);
        assert!(!cap.should_stop(&[1.0, 1.0]));
        assert!(cap.should_stop(&[1.0, 1.0, 1.0]));
        assert_eq!(cap.message(), "Maximum number of iterations (3) reached.");
        assert!(!cap.reason().is_normal());
    }

    #[test]
    fn test_checker_reports_first_rule() {
        let stagnation = StagnationRule::new(2, 0.01);
        let cap = IterationCap::new(2);
        let history = [0.0, 0.0];

        let termination = ConvergenceChecker::check(&history, &[&stagnation, &cap]).unwrap();
        assert_eq!(termination.reason, TerminationReason::Stagnated);
        assert_eq!(termination.message, "No significant change for 2 iterations.");

        assert!(ConvergenceChecker::check(&history[..1], &[&stagnation, &cap]).is_none());
    }
}
