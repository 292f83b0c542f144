//! Optimizer strategy interface.
//!
//! A strategy runs a global search against an [`ObjectiveAdapter`] inside a
//! [`BoundedDomain`], records one estimate per iteration on a
//! [`TrajectoryRecorder`], and stops according to its own rules.
//!
//! [`OptimizerStrategy::search`] wraps a single run: it creates a fresh
//! adapter and recorder, drives [`OptimizerStrategy::optimize`], and freezes
//! everything into a [`SearchResult`].

use crate::{
    core::{error::Result, terrain::Terrain},
    domain::BoundedDomain,
    optimization::{
        objective::ObjectiveAdapter,
        recorder::TrajectoryRecorder,
        result::{SearchResult, StrategyOutcome},
    },
};
use std::fmt::Debug;
use std::time::Instant;

/// Trait for global search strategies over a bounded 2-D domain.
pub trait OptimizerStrategy: Debug {
    /// Returns the name of the strategy.
    fn name(&self) -> &str;

    /// Runs the search loop.
    ///
    /// Implementations evaluate points only through `objective`, keep every
    /// evaluated point inside `domain`, and call `recorder.record` exactly
    /// once per completed iteration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` before any evaluation if the strategy
    /// is misconfigured, and propagates oracle failures as they happen.
    fn optimize<T: Terrain + ?Sized>(
        &mut self,
        objective: &mut ObjectiveAdapter<'_, T>,
        domain: &BoundedDomain,
        recorder: &mut TrajectoryRecorder,
    ) -> Result<StrategyOutcome>;

    /// Runs one complete search on `terrain` inside `domain`.
    fn search<T: Terrain + ?Sized>(
        &mut self,
        terrain: &T,
        domain: &BoundedDomain,
    ) -> Result<SearchResult> {
        let start_time = Instant::now();
        let mut objective = ObjectiveAdapter::new(terrain);
        let mut recorder = TrajectoryRecorder::new();

        let outcome = self.optimize(&mut objective, domain, &mut recorder)?;

        Ok(SearchResult::new(
            self.name(),
            outcome,
            objective.into_log(),
            recorder.into_trajectory(),
            start_time.elapsed(),
        ))
    }
}
