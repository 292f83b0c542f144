//! Simplicial homology-style global search (SHGO).
//!
//! A deterministic space-partitioning strategy. The domain is sampled on a
//! regular lattice, each lattice cell is split into two simplices, and the
//! vertices that are lower than every vertex they share a simplex with (the
//! star minimizers) mark candidate basins. The most promising basins are
//! polished with a bounded Nelder-Mead search, and the lattice is refined
//! twice per side for the next iteration.
//!
//! # Triangulation
//!
//! Cells are split along the diagonal from `(i, j)` to `(i + 1, j + 1)`
//! (Kuhn triangulation), so vertex `(i, j)` shares a simplex with
//! `(i +- 1, j)`, `(i, j +- 1)`, `(i + 1, j + 1)` and `(i - 1, j - 1)`.
//!
//! # Determinism
//!
//! The strategy has no randomness. Ties between equal vertex values are
//! broken by lattice index, so the same terrain always yields the same
//! evaluations, trajectory and result.

use crate::nelder_mead::{self, NelderMeadConfig};
use log::{debug, info, warn};
use summitopt_core::{
    core::{
        error::{Result, SearchError},
        terrain::Terrain,
        types::{constants, distance, point, Point},
    },
    domain::BoundedDomain,
    optimization::{
        objective::ObjectiveAdapter,
        recorder::TrajectoryRecorder,
        result::StrategyOutcome,
        stopping::{ConvergenceChecker, IterationCap, PhaseConvergence},
        strategy::OptimizerStrategy,
    },
};
use std::cmp::Ordering;

/// Finest lattice the strategy will build, in subdivisions per side.
pub const MAX_LATTICE_SUBDIVISIONS: usize = 4096;

/// Configuration for the SHGO strategy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShgoConfig {
    /// Lattice subdivisions per side on the first iteration
    pub initial_subdivisions: usize,

    /// Fatal iteration cap
    pub max_iterations: usize,

    /// Maximum number of local searches started per iteration
    pub local_searches: usize,

    /// Improvement below which two iterations are considered equal
    pub tolerance: f64,

    /// Iterations to complete before convergence is tested
    pub min_iterations: usize,

    /// Settings of the local refinement
    pub local_search: NelderMeadConfig,
}

impl Default for ShgoConfig {
    fn default() -> Self {
        Self {
            initial_subdivisions: 8,
            max_iterations: 5,
            local_searches: 5,
            tolerance: constants::DEFAULT_TOLERANCE,
            min_iterations: 2,
            local_search: NelderMeadConfig::default(),
        }
    }
}

impl ShgoConfig {
    /// Creates a new configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of subdivisions per side of the first lattice.
    pub fn with_initial_subdivisions(mut self, subdivisions: usize) -> Self {
        self.initial_subdivisions = subdivisions;
        self
    }

    /// Sets the fatal iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the number of local searches per iteration.
    pub fn with_local_searches(mut self, local_searches: usize) -> Self {
        self.local_searches = local_searches;
        self
    }

    /// Sets the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the number of iterations before convergence is tested.
    pub fn with_min_iterations(mut self, min_iterations: usize) -> Self {
        self.min_iterations = min_iterations;
        self
    }

    /// Sets the local refinement settings.
    pub fn with_local_search(mut self, local_search: NelderMeadConfig) -> Self {
        self.local_search = local_search;
        self
    }

    /// Subdivisions per side of the finest lattice the run may build.
    fn finest_subdivisions(&self) -> Option<usize> {
        let doublings = u32::try_from(self.max_iterations.saturating_sub(1)).ok()?;
        let factor = 2usize.checked_pow(doublings)?;
        self.initial_subdivisions.checked_mul(factor)
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` naming the first offending parameter.
    pub fn validate(&self) -> Result<()> {
        if self.initial_subdivisions == 0 {
            return Err(SearchError::invalid_configuration(
                "lattice needs at least one subdivision per side",
                "initial_subdivisions",
                "0",
            ));
        }
        if self.max_iterations == 0 {
            return Err(SearchError::invalid_configuration(
                "iteration cap must be at least one",
                "max_iterations",
                "0",
            ));
        }
        match self.finest_subdivisions() {
            Some(n) if n <= MAX_LATTICE_SUBDIVISIONS => {}
            _ => {
                let reason = format!(
                    "refined lattice exceeds {MAX_LATTICE_SUBDIVISIONS} subdivisions per side"
                );
                return Err(SearchError::invalid_configuration(
                    reason,
                    "max_iterations",
                    self.max_iterations.to_string(),
                ));
            }
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(SearchError::invalid_configuration(
                "tolerance must be non-negative",
                "tolerance",
                self.tolerance.to_string(),
            ));
        }
        self.local_search.validate()
    }
}

/// Regular lattice of evaluated vertices, indexed `(i, j)` with `i` along x.
#[derive(Debug, Clone)]
struct Lattice {
    subdivisions: usize,
    width: f64,
    height: f64,
    values: Vec<f64>,
}

impl Lattice {
    /// Samples a fresh lattice, or refines `previous` to twice its
    /// subdivisions re-using the values it already holds.
    fn sample<T: Terrain + ?Sized>(
        objective: &mut ObjectiveAdapter<'_, T>,
        domain: &BoundedDomain,
        subdivisions: usize,
        previous: Option<&Lattice>,
    ) -> Result<Self> {
        let side = subdivisions + 1;
        let mut lattice = Self {
            subdivisions,
            width: domain.width(),
            height: domain.height(),
            values: Vec::with_capacity(side * side),
        };

        for j in 0..side {
            for i in 0..side {
                let cached = previous
                    .filter(|old| old.subdivisions * 2 == subdivisions && i % 2 == 0 && j % 2 == 0)
                    .map(|old| old.value(i / 2, j / 2));
                let value = match cached {
                    Some(value) => value,
                    None => objective.evaluate(&lattice.point(i, j))?,
                };
                lattice.values.push(value);
            }
        }
        Ok(lattice)
    }

    fn side(&self) -> usize {
        self.subdivisions + 1
    }

    fn index(&self, i: usize, j: usize) -> usize {
        j * self.side() + i
    }

    fn value(&self, i: usize, j: usize) -> f64 {
        self.values[self.index(i, j)]
    }

    fn point(&self, i: usize, j: usize) -> Point {
        let n = self.subdivisions as f64;
        point(self.width * (i as f64 / n), self.height * (j as f64 / n))
    }

    /// Smaller edge of a lattice cell.
    fn cell_size(&self) -> f64 {
        self.width.min(self.height) / self.subdivisions as f64
    }

    /// Vertices sharing a simplex with `(i, j)`.
    fn neighbours(&self, i: usize, j: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        const OFFSETS: [(isize, isize); 6] = [(-1, 0), (1, 0), (0, -1), (0, 1), (1, 1), (-1, -1)];
        let last = self.subdivisions as isize;
        OFFSETS.into_iter().filter_map(move |(di, dj)| {
            let (ni, nj) = (i as isize + di, j as isize + dj);
            let inside = (0..=last).contains(&ni) && (0..=last).contains(&nj);
            inside.then_some((ni as usize, nj as usize))
        })
    }

    /// Orders vertices by value, then by index.
    fn compare(&self, a: (usize, usize), b: (usize, usize)) -> Ordering {
        self.value(a.0, a.1)
            .total_cmp(&self.value(b.0, b.1))
            .then_with(|| self.index(a.0, a.1).cmp(&self.index(b.0, b.1)))
    }

    /// Star minimizers, lowest first.
    fn star_minimizers(&self) -> Vec<(usize, usize)> {
        let side = self.side();
        let mut minimizers: Vec<(usize, usize)> = (0..side)
            .flat_map(|j| (0..side).map(move |i| (i, j)))
            .filter(|&v| {
                self.neighbours(v.0, v.1)
                    .all(|u| self.compare(v, u) == Ordering::Less)
            })
            .collect();
        minimizers.sort_by(|&a, &b| self.compare(a, b));
        minimizers
    }
}

/// Pool of local minima found by the local searches.
#[derive(Debug, Default)]
struct MinimaPool {
    minima: Vec<(Point, f64)>,
    starts: Vec<Point>,
}

impl MinimaPool {
    /// Whether a search from `start` would repeat earlier work.
    fn is_refined(&self, start: &Point, radius: f64) -> bool {
        self.starts
            .iter()
            .chain(self.minima.iter().map(|(p, _)| p))
            .any(|p| distance(p, start) < radius)
    }

    /// Adds a local minimum, merging it with a known one closer than
    /// `radius`.
    fn merge(&mut self, found: Point, error: f64, radius: f64) {
        match self
            .minima
            .iter_mut()
            .find(|(p, _)| distance(p, &found) < radius)
        {
            Some(known) => {
                if error < known.1 {
                    *known = (found, error);
                }
            }
            None => self.minima.push((found, error)),
        }
    }

    fn sorted(mut self) -> Vec<(Point, f64)> {
        self.minima.sort_by(|a, b| {
            a.1.total_cmp(&b.1)
                .then_with(|| a.0.x.total_cmp(&b.0.x))
                .then_with(|| a.0.y.total_cmp(&b.0.y))
        });
        self.minima
    }
}

/// SHGO global search.
///
/// # Examples
///
/// ```rust
/// use summitopt_core::prelude::*;
/// use summitopt_optim::{Shgo, ShgoConfig};
///
/// let hill = FnTerrain::new(10.0, 10.0, |p: &Point| -((p.x - 3.0).powi(2) + (p.y - 7.0).powi(2)));
/// let domain = BoundedDomain::from_terrain(&hill).unwrap();
///
/// let mut shgo = Shgo::new(ShgoConfig::default());
/// let result = shgo.search(&hill, &domain).unwrap();
///
/// assert!(result.distance_to(&point(3.0, 7.0)) < 1e-3);
/// assert!(result.termination_message().is_some());
/// ```
#[derive(Debug, Default)]
pub struct Shgo {
    config: ShgoConfig,
}

impl Shgo {
    /// Creates a new SHGO strategy with the given configuration.
    pub fn new(config: ShgoConfig) -> Self {
        Self { config }
    }

    /// Returns the strategy configuration.
    pub fn config(&self) -> &ShgoConfig {
        &self.config
    }
}

impl OptimizerStrategy for Shgo {
    fn name(&self) -> &str {
        "SHGO"
    }

    fn optimize<T: Terrain + ?Sized>(
        &mut self,
        objective: &mut ObjectiveAdapter<'_, T>,
        domain: &BoundedDomain,
        recorder: &mut TrajectoryRecorder,
    ) -> Result<StrategyOutcome> {
        self.config.validate()?;

        info!(
            "SHGO: {} x {} lattice, up to {} iterations, {} local searches per iteration",
            self.config.initial_subdivisions,
            self.config.initial_subdivisions,
            self.config.max_iterations,
            self.config.local_searches
        );

        let phase = PhaseConvergence {
            tolerance: self.config.tolerance,
            min_iterations: self.config.min_iterations,
        };
        let cap = IterationCap::new(self.config.max_iterations);
        let merge_radius = 1e-4 * domain.min_extent();

        let mut pool = MinimaPool::default();
        let mut history = Vec::new();
        let mut lattice: Option<Lattice> = None;
        let mut subdivisions = self.config.initial_subdivisions;

        loop {
            let current = Lattice::sample(objective, domain, subdivisions, lattice.as_ref())?;
            let minimizers = current.star_minimizers();
            let step = current.cell_size();
            let refine_radius = 0.5 * step;

            let mut searches = 0;
            for &(i, j) in &minimizers {
                if searches == self.config.local_searches {
                    break;
                }
                let start = current.point(i, j);
                if pool.is_refined(&start, refine_radius) {
                    continue;
                }
                let local = nelder_mead::minimize(
                    objective,
                    domain,
                    &start,
                    step,
                    &self.config.local_search,
                )?;
                pool.starts.push(start);
                pool.merge(local.point, local.error, merge_radius);
                searches += 1;
            }

            let Some((best_point, best_error)) = objective.best_observed() else {
                return Err(SearchError::numerical_error("no lattice vertex was evaluated"));
            };
            recorder.record(best_point);
            history.push(best_error);

            debug!(
                "SHGO iteration {}: {} subdivisions, {} star minimizers, {} local searches, \
                 best = {:.6}",
                history.len(),
                subdivisions,
                minimizers.len(),
                searches,
                best_error
            );

            if let Some(termination) = ConvergenceChecker::check(&history, &[&phase, &cap]) {
                if !termination.reason.is_normal() {
                    warn!("SHGO: {}", termination.message);
                }
                info!(
                    "SHGO: stopped after {} iterations and {} evaluations: {}",
                    history.len(),
                    objective.evaluation_count(),
                    termination.message
                );
                return Ok(StrategyOutcome {
                    best_point,
                    best_error,
                    iterations: history.len(),
                    termination,
                    local_minima: pool.sorted(),
                });
            }

            lattice = Some(current);
            subdivisions *= 2;
        }
    }
}
