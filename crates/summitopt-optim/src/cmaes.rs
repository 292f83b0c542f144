//! Covariance Matrix Adaptation Evolution Strategy (CMA-ES).
//!
//! This module implements the population-based stochastic search. The
//! strategy maintains a bivariate normal search distribution (mean, global
//! step size, covariance) and moves it towards low-error regions of the
//! objective, one generation at a time.
//!
//! # Algorithm Overview
//!
//! Each iteration:
//! 1. Sample `population_size` candidates `x_k = m + sigma * B * D * z_k`
//! 2. Project every candidate onto the domain and evaluate it
//! 3. Recombine the best half into the new mean (weighted)
//! 4. Update the evolution paths, the covariance and the step size
//! 5. Record the iteration's estimate and test the stopping rules
//!
//! # Boundaries
//!
//! Candidates are projected onto the rectangle coordinate by coordinate
//! before evaluation, and the projected point is the one that enters the
//! update. Every evaluated point therefore lies inside the domain.
//!
//! # Tracking
//!
//! With [`TrackingMode::Observed`] the recorder receives the best point
//! evaluated so far and the stagnation rule watches its error. With
//! [`TrackingMode::Guessed`] the recorder receives the distribution mean and
//! the stagnation rule watches the best error of the current generation.
//! The final answer is always the best observed point of the whole run.

use log::{debug, info, warn};
use nalgebra::SymmetricEigen;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use summitopt_core::{
    core::{
        error::{Result, SearchError},
        terrain::Terrain,
        types::{constants, Matrix, Point, Vector, DIMENSION},
    },
    domain::BoundedDomain,
    optimization::{
        objective::ObjectiveAdapter,
        recorder::{TrackingMode, TrajectoryRecorder},
        result::StrategyOutcome,
        stopping::{ConvergenceChecker, IterationCap, StagnationRule},
        strategy::OptimizerStrategy,
    },
};

/// Configuration for the CMA-ES strategy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CmaesConfig {
    /// Number of candidates sampled per iteration
    pub population_size: usize,

    /// Initial step size as a fraction of the smaller domain extent
    pub initial_sigma_fraction: f64,

    /// Stagnation stopping rule
    pub stagnation: StagnationRule,

    /// Fatal iteration cap
    pub max_iterations: usize,

    /// Whether the trajectory and stopping rule follow the best observed
    /// point or the distribution mean
    pub tracking: TrackingMode,

    /// Seed for reproducible runs (None = seeded from entropy)
    pub seed: Option<u64>,

    /// Starting mean (None = uniform sample from the domain)
    pub initial_point: Option<Point>,
}

impl Default for CmaesConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            initial_sigma_fraction: 0.5,
            stagnation: StagnationRule::new(100, 0.01),
            max_iterations: 10_000,
            tracking: TrackingMode::Guessed,
            seed: None,
            initial_point: None,
        }
    }
}

impl CmaesConfig {
    /// Creates a new configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    /// Sets the initial step size as a fraction of the smaller extent.
    pub fn with_initial_sigma_fraction(mut self, fraction: f64) -> Self {
        self.initial_sigma_fraction = fraction;
        self
    }

    /// Sets the stagnation window and relative threshold.
    pub fn with_stagnation(mut self, window: usize, threshold: f64) -> Self {
        self.stagnation = StagnationRule::new(window, threshold);
        self
    }

    /// Sets the fatal iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the tracking mode.
    pub fn with_tracking(mut self, tracking: TrackingMode) -> Self {
        self.tracking = tracking;
        self
    }

    /// Tracks the best observed point (`true`) or the mean (`false`).
    pub fn with_observed_best(mut self, use_observed_best: bool) -> Self {
        self.tracking = TrackingMode::from_observed_flag(use_observed_best);
        self
    }

    /// Fixes the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fixes the starting mean instead of sampling it.
    pub fn with_initial_point(mut self, initial_point: Point) -> Self {
        self.initial_point = Some(initial_point);
        self
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` naming the first offending parameter.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(SearchError::invalid_configuration(
                "population must hold at least two candidates",
                "population_size",
                self.population_size.to_string(),
            ));
        }
        if !self.initial_sigma_fraction.is_finite() || self.initial_sigma_fraction <= 0.0 {
            return Err(SearchError::invalid_configuration(
                "initial step size fraction must be positive",
                "initial_sigma_fraction",
                self.initial_sigma_fraction.to_string(),
            ));
        }
        if self.stagnation.window == 0 {
            return Err(SearchError::invalid_configuration(
                "stagnation window must be at least one iteration",
                "stagnation.window",
                "0",
            ));
        }
        if !self.stagnation.threshold.is_finite() || self.stagnation.threshold < 0.0 {
            return Err(SearchError::invalid_configuration(
                "stagnation threshold must be non-negative",
                "stagnation.threshold",
                self.stagnation.threshold.to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(SearchError::invalid_configuration(
                "iteration cap must be at least one",
                "max_iterations",
                "0",
            ));
        }
        Ok(())
    }
}

/// Search distribution and strategy parameters of one run.
#[derive(Debug)]
struct CmaesState {
    mean: Vector,
    sigma: f64,
    initial_sigma: f64,
    max_sigma: f64,
    covariance: Matrix,
    p_c: Vector,
    p_sigma: Vector,
    weights: Vec<f64>,
    mu_eff: f64,
    c_c: f64,
    c_sigma: f64,
    c_1: f64,
    c_mu: f64,
    d_sigma: f64,
    expected_norm: f64,
    generation: usize,
}

impl CmaesState {
    /// Sets up the distribution with Hansen's default parameters.
    fn new(mean: Point, sigma: f64, max_sigma: f64, population_size: usize) -> Self {
        let n = DIMENSION as f64;
        let mu = population_size / 2;

        // Recombination weights: w_i = ln(mu + 0.5) - ln(i + 1), normalized
        let raw_weights: Vec<f64> = (0..mu)
            .map(|i| (mu as f64 + 0.5).ln() - ((i + 1) as f64).ln())
            .collect();
        let w_sum: f64 = raw_weights.iter().sum();
        let weights: Vec<f64> = raw_weights.iter().map(|w| w / w_sum).collect();

        let mu_eff = 1.0 / weights.iter().map(|w| w * w).sum::<f64>();

        let c_sigma = (mu_eff + 2.0) / (n + mu_eff + 5.0);
        let d_sigma = 1.0 + 2.0 * (((mu_eff - 1.0) / (n + 1.0)).sqrt() - 1.0).max(0.0) + c_sigma;
        let c_c = (4.0 + mu_eff / n) / (n + 4.0 + 2.0 * mu_eff / n);
        let c_1 = 2.0 / ((n + 1.3).powi(2) + mu_eff);
        let c_mu =
            (2.0 * (mu_eff - 2.0 + 1.0 / mu_eff) / ((n + 2.0).powi(2) + mu_eff)).min(1.0 - c_1);

        // E[||N(0, I)||]
        let expected_norm = n.sqrt() * (1.0 - 1.0 / (4.0 * n) + 1.0 / (21.0 * n.powi(2)));

        Self {
            mean: mean.coords,
            sigma,
            initial_sigma: sigma,
            max_sigma,
            covariance: Matrix::identity(),
            p_c: Vector::zeros(),
            p_sigma: Vector::zeros(),
            weights,
            mu_eff,
            c_c,
            c_sigma,
            c_1,
            c_mu,
            d_sigma,
            expected_norm,
            generation: 0,
        }
    }

    fn mu(&self) -> usize {
        self.weights.len()
    }

    fn mean_point(&self) -> Point {
        Point::from(self.mean)
    }

    /// Eigendecomposition `C = B * D^2 * B^T`, returning `(B, diag(D))`.
    fn decompose(&self) -> Result<(Matrix, Vector)> {
        let eigen = SymmetricEigen::new(self.covariance);
        if eigen.eigenvalues.iter().any(|v| !v.is_finite()) {
            return Err(SearchError::numerical_error(format!(
                "covariance has non-finite eigenvalues at generation {}",
                self.generation
            )));
        }
        let sqrt_eigenvalues = eigen
            .eigenvalues
            .map(|v| v.max(constants::MIN_EIGENVALUE).sqrt());
        Ok((eigen.eigenvectors, sqrt_eigenvalues))
    }

    /// Samples a generation and projects it onto the domain.
    fn sample_population(
        &self,
        rng: &mut SmallRng,
        domain: &BoundedDomain,
        population_size: usize,
    ) -> Result<Vec<Point>> {
        let (b, d) = self.decompose()?;
        let bd = b * Matrix::from_diagonal(&d);

        let population = (0..population_size)
            .map(|_| {
                let z = Vector::new(StandardNormal.sample(rng), StandardNormal.sample(rng));
                let candidate = Point::from(self.mean + self.sigma * (bd * z));
                domain.clip(&candidate)
            })
            .collect();
        Ok(population)
    }

    /// Performs one generation of the CMA-ES update.
    ///
    /// `errors[k]` is the objective value of `population[k]`.
    fn update(
        &mut self,
        population: &[Point],
        errors: &[f64],
        domain: &BoundedDomain,
    ) -> Result<()> {
        let n = DIMENSION as f64;

        // 1. Rank by error ascending (we minimize)
        let mut indices: Vec<usize> = (0..population.len()).collect();
        indices.sort_by(|&a, &b| errors[a].total_cmp(&errors[b]));

        // 2. Weighted mean of the top-mu candidates
        let old_mean = self.mean;
        let mut new_mean = Vector::zeros();
        for (w_idx, &pop_idx) in indices.iter().take(self.mu()).enumerate() {
            new_mean += self.weights[w_idx] * population[pop_idx].coords;
        }

        // 3. C^{-1/2} for the p_sigma update
        let (b, d) = self.decompose()?;
        let inv_d = Matrix::from_diagonal(&d.map(|v| 1.0 / v));
        let c_inv_sqrt = b * inv_d * b.transpose();

        let mean_diff = (new_mean - old_mean) / self.sigma;

        // 4. Step-size evolution path
        self.p_sigma = (1.0 - self.c_sigma) * self.p_sigma
            + (self.c_sigma * (2.0 - self.c_sigma) * self.mu_eff).sqrt() * (c_inv_sqrt * mean_diff);

        // 5. h_sigma: stalling indicator
        let gen_factor = 1.0 - (1.0 - self.c_sigma).powi(2 * (self.generation as i32 + 1));
        let p_sigma_norm = self.p_sigma.norm();
        let h_sigma_threshold = (1.4 + 2.0 / (n + 1.0)) * self.expected_norm * gen_factor.sqrt();
        let h_sigma = if p_sigma_norm < h_sigma_threshold {
            1.0
        } else {
            0.0
        };

        // 6. Covariance evolution path
        self.p_c = (1.0 - self.c_c) * self.p_c
            + h_sigma * (self.c_c * (2.0 - self.c_c) * self.mu_eff).sqrt() * mean_diff;

        // 7. Rank-mu component
        let mut rank_mu_update = Matrix::zeros();
        for (w_idx, &pop_idx) in indices.iter().take(self.mu()).enumerate() {
            let y_i = (population[pop_idx].coords - old_mean) / self.sigma;
            rank_mu_update += self.weights[w_idx] * y_i * y_i.transpose();
        }

        // 8. Covariance update
        let delta_h_sigma = (1.0 - h_sigma) * self.c_c * (2.0 - self.c_c);
        let base_weight = 1.0 - self.c_1 - self.c_mu + self.c_1 * delta_h_sigma;
        self.covariance = base_weight * self.covariance
            + self.c_1 * self.p_c * self.p_c.transpose()
            + self.c_mu * rank_mu_update;
        self.covariance = (self.covariance + self.covariance.transpose()) * 0.5;

        // 9. Step-size update
        self.sigma *=
            ((self.c_sigma / self.d_sigma) * (p_sigma_norm / self.expected_norm - 1.0)).exp();
        self.sigma = self.sigma.clamp(constants::MIN_STEP_SIZE, self.max_sigma);

        // 10. Move the mean
        self.mean = new_mean;

        if self.mean.iter().any(|v| !v.is_finite())
            || !self.sigma.is_finite()
            || self.covariance.iter().any(|v| !v.is_finite())
        {
            warn!(
                "CMA-ES generation {}: non-finite distribution, resetting around the domain centre",
                self.generation
            );
            self.reset_around(domain.center());
        }

        self.generation += 1;
        Ok(())
    }

    /// Resets the distribution around `center`; generation count is kept.
    fn reset_around(&mut self, center: Point) {
        self.mean = center.coords;
        self.sigma = self.initial_sigma;
        self.covariance = Matrix::identity();
        self.p_c = Vector::zeros();
        self.p_sigma = Vector::zeros();
    }
}

/// CMA-ES global search.
///
/// # Examples
///
/// ```rust
/// use summitopt_core::prelude::*;
/// use summitopt_optim::{Cmaes, CmaesConfig};
///
/// let hill = FnTerrain::new(10.0, 10.0, |p: &Point| -((p.x - 3.0).powi(2) + (p.y - 7.0).powi(2)));
/// let domain = BoundedDomain::from_terrain(&hill).unwrap();
///
/// let mut cmaes = Cmaes::new(CmaesConfig::new().with_seed(7).with_observed_best(true));
/// let result = cmaes.search(&hill, &domain).unwrap();
///
/// assert!(result.distance_to(&point(3.0, 7.0)) < 0.5);
/// ```
#[derive(Debug)]
pub struct Cmaes {
    config: CmaesConfig,
}

impl Cmaes {
    /// Creates a new CMA-ES strategy with the given configuration.
    pub fn new(config: CmaesConfig) -> Self {
        Self { config }
    }

    /// Returns the strategy configuration.
    pub fn config(&self) -> &CmaesConfig {
        &self.config
    }

    fn rng(&self) -> SmallRng {
        match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        }
    }
}

impl Default for Cmaes {
    fn default() -> Self {
        Self::new(CmaesConfig::default())
    }
}

impl OptimizerStrategy for Cmaes {
    fn name(&self) -> &str {
        "CMA-ES"
    }

    fn optimize<T: Terrain + ?Sized>(
        &mut self,
        objective: &mut ObjectiveAdapter<'_, T>,
        domain: &BoundedDomain,
        recorder: &mut TrajectoryRecorder,
    ) -> Result<StrategyOutcome> {
        self.config.validate()?;

        let mut rng = self.rng();
        let x0 = match self.config.initial_point {
            Some(p) => domain.clip(&p),
            None => domain.sample(&mut rng),
        };
        let sigma0 = self.config.initial_sigma_fraction * domain.min_extent();
        let max_sigma = 10.0 * domain.width().max(domain.height());
        let mut state = CmaesState::new(x0, sigma0, max_sigma, self.config.population_size);

        info!(
            "CMA-ES: start at ({:.3}, {:.3}), sigma0 = {:.3}, population = {}, tracking = {:?}",
            x0.x, x0.y, sigma0, self.config.population_size, self.config.tracking
        );

        let cap = IterationCap::new(self.config.max_iterations);
        let mut history = Vec::new();

        loop {
            let population =
                state.sample_population(&mut rng, domain, self.config.population_size)?;
            let mut errors = Vec::with_capacity(population.len());
            for candidate in &population {
                errors.push(objective.evaluate(candidate)?);
            }
            let generation_best = errors.iter().copied().fold(f64::INFINITY, f64::min);

            state.update(&population, &errors, domain)?;

            let Some((observed_point, observed_error)) = objective.best_observed() else {
                return Err(SearchError::numerical_error("no candidate was evaluated"));
            };
            let (estimate, tracked) = match self.config.tracking {
                TrackingMode::Observed => (observed_point, observed_error),
                TrackingMode::Guessed => (domain.clip(&state.mean_point()), generation_best),
            };
            recorder.record(estimate);
            history.push(tracked);

            debug!(
                "CMA-ES iteration {}: sigma = {:.3e}, tracked = {:.6}, best = {:.6}",
                history.len(),
                state.sigma,
                tracked,
                observed_error
            );

            if let Some(termination) =
                ConvergenceChecker::check(&history, &[&self.config.stagnation, &cap])
            {
                if !termination.reason.is_normal() {
                    warn!("CMA-ES: {}", termination.message);
                }
                info!(
                    "CMA-ES: stopped after {} iterations and {} evaluations: {}",
                    history.len(),
                    objective.evaluation_count(),
                    termination.message
                );
                return Ok(StrategyOutcome {
                    best_point: observed_point,
                    best_error: observed_error,
                    iterations: history.len(),
                    termination,
                    local_minima: Vec::new(),
                });
            }
        }
    }
}
