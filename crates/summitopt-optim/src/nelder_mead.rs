//! Bounded Nelder-Mead local search.
//!
//! Derivative-free simplex method used by the partition search to polish
//! promising lattice vertices. Every trial vertex is projected onto the
//! domain before it is evaluated, so the method never leaves the rectangle.
//! All evaluations go through the [`ObjectiveAdapter`] and are logged.

use log::debug;
use summitopt_core::{
    core::{
        error::{Result, SearchError},
        terrain::Terrain,
        types::{distance, Point, Vector},
    },
    domain::BoundedDomain,
    optimization::objective::ObjectiveAdapter,
};

/// Configuration for the Nelder-Mead local search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NelderMeadConfig {
    /// Maximum number of simplex iterations
    pub max_iterations: usize,
    /// Simplex diameter below which the search stops
    pub x_tolerance: f64,
    /// Spread of vertex errors below which the search stops
    pub f_tolerance: f64,
    /// Reflection coefficient
    pub reflection: f64,
    /// Expansion coefficient
    pub expansion: f64,
    /// Contraction coefficient
    pub contraction: f64,
    /// Shrink coefficient
    pub shrink: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            x_tolerance: 1e-6,
            f_tolerance: 1e-10,
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
        }
    }
}

impl NelderMeadConfig {
    /// Creates a new configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of simplex iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the position and value tolerances.
    pub fn with_tolerances(mut self, x_tolerance: f64, f_tolerance: f64) -> Self {
        self.x_tolerance = x_tolerance;
        self.f_tolerance = f_tolerance;
        self
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` naming the first offending parameter.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("local_search.reflection", self.reflection),
            ("local_search.expansion", self.expansion),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SearchError::invalid_configuration(
                    "coefficient must be positive",
                    name,
                    value.to_string(),
                ));
            }
        }
        let unit = [
            ("local_search.contraction", self.contraction),
            ("local_search.shrink", self.shrink),
        ];
        for (name, value) in unit {
            if !(value > 0.0 && value < 1.0) {
                return Err(SearchError::invalid_configuration(
                    "coefficient must lie in (0, 1)",
                    name,
                    value.to_string(),
                ));
            }
        }
        let tolerances = [
            ("local_search.x_tolerance", self.x_tolerance),
            ("local_search.f_tolerance", self.f_tolerance),
        ];
        for (name, value) in tolerances {
            if !value.is_finite() || value < 0.0 {
                return Err(SearchError::invalid_configuration(
                    "tolerance must be non-negative",
                    name,
                    value.to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Outcome of one local search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalSearchResult {
    /// Best vertex of the final simplex
    pub point: Point,
    /// Error at that vertex
    pub error: f64,
    /// Number of simplex iterations performed
    pub iterations: usize,
    /// Whether the tolerances were met before the iteration limit
    pub converged: bool,
}

#[derive(Debug, Clone, Copy)]
struct Vertex {
    point: Point,
    error: f64,
}

fn evaluate<T: Terrain + ?Sized>(
    objective: &mut ObjectiveAdapter<'_, T>,
    domain: &BoundedDomain,
    candidate: Vector,
) -> Result<Vertex> {
    let point = domain.clip(&Point::from(candidate));
    let error = objective.evaluate(&point)?;
    Ok(Vertex { point, error })
}

/// Minimizes the objective from `start` with an initial simplex of edge
/// `step`.
///
/// The initial simplex is `start` plus one step along each axis, taken
/// towards the interior when a positive step would cross the upper bound.
///
/// # Errors
///
/// Returns `InvalidConfiguration` for a bad configuration or a non-positive
/// step, and propagates oracle failures.
pub fn minimize<T: Terrain + ?Sized>(
    objective: &mut ObjectiveAdapter<'_, T>,
    domain: &BoundedDomain,
    start: &Point,
    step: f64,
    config: &NelderMeadConfig,
) -> Result<LocalSearchResult> {
    config.validate()?;
    if !step.is_finite() || step <= 0.0 {
        return Err(SearchError::invalid_configuration(
            "initial simplex step must be positive",
            "step",
            step.to_string(),
        ));
    }

    let start = domain.clip(start);
    let upper = domain.upper();
    let dx = if start.x + step <= upper.x { step } else { -step };
    let dy = if start.y + step <= upper.y { step } else { -step };

    let mut simplex = [
        evaluate(objective, domain, start.coords)?,
        evaluate(objective, domain, start.coords + Vector::new(dx, 0.0))?,
        evaluate(objective, domain, start.coords + Vector::new(0.0, dy))?,
    ];

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        simplex.sort_by(|a, b| a.error.total_cmp(&b.error));
        let [best, second, worst] = simplex;

        let diameter =
            distance(&best.point, &second.point).max(distance(&best.point, &worst.point));
        if diameter <= config.x_tolerance && worst.error - best.error <= config.f_tolerance {
            converged = true;
            break;
        }
        iterations += 1;

        let centroid = (best.point.coords + second.point.coords) * 0.5;

        let reflected = evaluate(
            objective,
            domain,
            centroid + config.reflection * (centroid - worst.point.coords),
        )?;

        if reflected.error < best.error {
            let expanded = evaluate(
                objective,
                domain,
                centroid + config.expansion * (reflected.point.coords - centroid),
            )?;
            simplex[2] = if expanded.error < reflected.error {
                expanded
            } else {
                reflected
            };
            continue;
        }

        if reflected.error < second.error {
            simplex[2] = reflected;
            continue;
        }

        let contracted = if reflected.error < worst.error {
            let outside = evaluate(
                objective,
                domain,
                centroid + config.contraction * (reflected.point.coords - centroid),
            )?;
            (outside.error <= reflected.error).then_some(outside)
        } else {
            let inside = evaluate(
                objective,
                domain,
                centroid + config.contraction * (worst.point.coords - centroid),
            )?;
            (inside.error < worst.error).then_some(inside)
        };

        match contracted {
            Some(vertex) => simplex[2] = vertex,
            None => {
                for vertex in simplex.iter_mut().skip(1) {
                    *vertex = evaluate(
                        objective,
                        domain,
                        best.point.coords
                            + config.shrink * (vertex.point.coords - best.point.coords),
                    )?;
                }
            }
        }
    }

    simplex.sort_by(|a, b| a.error.total_cmp(&b.error));
    let best = simplex[0];

    debug!(
        "Nelder-Mead from ({:.3}, {:.3}): {} iterations, error = {:.6}, converged = {}",
        start.x, start.y, iterations, best.error, converged
    );

    Ok(LocalSearchResult {
        point: best.point,
        error: best.error,
        iterations,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use summitopt_core::{
        core::types::point,
        test_terrains::{FailingTerrain, Paraboloid},
    };

    #[test]
    fn test_finds_interior_summit() {
        let terrain = Paraboloid::centered();
        let domain = BoundedDomain::from_terrain(&terrain).unwrap();
        let mut objective = ObjectiveAdapter::new(&terrain);

        let result = minimize(
            &mut objective,
            &domain,
            &point(1.0, 2.0),
            1.0,
            &NelderMeadConfig::default(),
        )
        .unwrap();

        assert!(result.converged);
        assert!(distance(&result.point, &point(5.0, 5.0)) < 1e-3);
        assert_relative_eq!(result.error, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_stays_inside_domain() {
        // Summit outside the rectangle: the best point is on the edge.
        let terrain = Paraboloid::new(10.0, 10.0, point(14.0, 5.0));
        let domain = BoundedDomain::from_terrain(&terrain).unwrap();
        let mut objective = ObjectiveAdapter::new(&terrain);

        let result = minimize(
            &mut objective,
            &domain,
            &point(9.5, 9.5),
            1.0,
            &NelderMeadConfig::default(),
        )
        .unwrap();

        assert!(objective.evaluations().iter().all(|p| domain.contains(p)));
        assert!(result.point.x > 9.9);
        assert!((result.point.y - 5.0).abs() < 0.5);
    }

    #[test]
    fn test_iteration_limit() {
        let terrain = Paraboloid::centered();
        let domain = BoundedDomain::from_terrain(&terrain).unwrap();
        let mut objective = ObjectiveAdapter::new(&terrain);
        let config = NelderMeadConfig::new().with_max_iterations(3);

        let result = minimize(&mut objective, &domain, &point(0.0, 0.0), 0.1, &config).unwrap();

        assert_eq!(result.iterations, 3);
        assert!(!result.converged);
    }

    #[test]
    fn test_is_deterministic() {
        let terrain = Paraboloid::new(8.0, 6.0, point(2.0, 4.5));
        let domain = BoundedDomain::from_terrain(&terrain).unwrap();

        let run = || {
            let mut objective = ObjectiveAdapter::new(&terrain);
            let result = minimize(
                &mut objective,
                &domain,
                &point(6.0, 1.0),
                0.5,
                &NelderMeadConfig::default(),
            )
            .unwrap();
            (result, objective.into_log())
        };

        let (a, log_a) = run();
        let (b, log_b) = run();
        assert_eq!(a, b);
        assert_eq!(log_a, log_b);
    }

    #[test]
    fn test_rejects_bad_step() {
        let terrain = Paraboloid::centered();
        let domain = BoundedDomain::from_terrain(&terrain).unwrap();
        let mut objective = ObjectiveAdapter::new(&terrain);

        let err = minimize(
            &mut objective,
            &domain,
            &point(1.0, 1.0),
            0.0,
            &NelderMeadConfig::default(),
        )
        .unwrap_err();

        assert!(err.is_configuration_error());
        assert!(objective.evaluations().is_empty());
    }

    #[test]
    fn test_propagates_oracle_failure() {
        let terrain = FailingTerrain::new(5);
        let domain = BoundedDomain::from_terrain(&terrain).unwrap();
        let mut objective = ObjectiveAdapter::new(&terrain);

        let err = minimize(
            &mut objective,
            &domain,
            &point(5.0, 5.0),
            1.0,
            &NelderMeadConfig::default(),
        )
        .unwrap_err();

        assert!(err.is_oracle_failure());
        assert_eq!(terrain.calls(), 5);
    }

    proptest! {
        #[test]
        fn prop_local_search_stays_in_domain(
            x in 0.0..=10.0f64,
            y in 0.0..=6.0f64,
            step in 0.05..4.0f64,
        ) {
            let terrain = Paraboloid::new(10.0, 6.0, point(12.0, -3.0));
            let domain = BoundedDomain::from_terrain(&terrain).unwrap();
            let mut objective = ObjectiveAdapter::new(&terrain);
            let config = NelderMeadConfig::new().with_max_iterations(50);

            let start = point(x, y);
            let start_error = -terrain.height(&start).unwrap();
            let result = minimize(&mut objective, &domain, &start, step, &config).unwrap();

            prop_assert!(objective.evaluations().iter().all(|p| domain.contains(p)));
            prop_assert!(result.error <= start_error);
        }
    }
}
