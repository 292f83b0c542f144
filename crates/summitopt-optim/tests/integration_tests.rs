//! Integration tests for summitopt-optim
//!
//! These tests run both strategies end to end through
//! `OptimizerStrategy::search` and check the run invariants on the
//! returned results.

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use summitopt_core::{
    prelude::*,
    test_terrains::{FailingTerrain, FlatTerrain, Paraboloid, TwinPeaks},
};
use summitopt_optim::{Cmaes, CmaesConfig, Shgo, ShgoConfig};

fn assert_run_invariants(result: &SearchResult, domain: &BoundedDomain) {
    assert!(!result.trajectory().is_empty());
    assert!(result.evaluations().len() >= result.trajectory().len());
    assert_eq!(result.trajectory().len(), result.iterations());
    for p in result.evaluations() {
        assert!(domain.contains(p), "evaluated outside the domain: {:?}", p);
    }
    for p in result.trajectory().iter() {
        assert!(domain.contains(p), "recorded outside the domain: {:?}", p);
    }
    assert!(result.termination_message().is_some());
}

fn max_evaluated_height<T: Terrain>(terrain: &T, result: &SearchResult) -> f64 {
    result
        .evaluations()
        .iter()
        .map(|p| terrain.height(p).unwrap())
        .fold(f64::NEG_INFINITY, f64::max)
}

#[test]
fn test_cmaes_paraboloid() {
    let terrain = Paraboloid::centered();
    let domain = BoundedDomain::from_terrain(&terrain).unwrap();

    for (seed, observed) in [(1, false), (2, true), (3, false)] {
        let mut cmaes = Cmaes::new(
            CmaesConfig::new()
                .with_seed(seed)
                .with_observed_best(observed),
        );
        let result = cmaes.search(&terrain, &domain).unwrap();

        assert_run_invariants(&result, &domain);
        let distance = result.distance_to(&terrain.summit());
        assert!(distance < 0.5, "Distance to summit: {}", distance);
        assert_relative_eq!(result.best_value(), 0.0, epsilon = 0.25);
        assert_eq!(result.strategy(), "CMA-ES");
    }
}

#[test]
fn test_cmaes_best_value_is_best_evaluated() {
    let terrain = Paraboloid::new(30.0, 12.0, point(21.0, 2.5));
    let domain = BoundedDomain::from_terrain(&terrain).unwrap();

    for observed in [false, true] {
        let mut cmaes = Cmaes::new(CmaesConfig::new().with_seed(17).with_observed_best(observed));
        let result = cmaes.search(&terrain, &domain).unwrap();

        assert_eq!(result.best_value(), max_evaluated_height(&terrain, &result));
        assert_eq!(
            terrain.height(&result.best_point()).unwrap(),
            result.best_value()
        );
    }
}

#[test]
fn test_cmaes_flat_terrain_stagnates() {
    let terrain = FlatTerrain::new(50.0, 20.0, 812.0);
    let domain = BoundedDomain::from_terrain(&terrain).unwrap();

    let result = Cmaes::new(CmaesConfig::new().with_seed(9))
        .search(&terrain, &domain)
        .unwrap();

    assert_run_invariants(&result, &domain);
    assert_eq!(result.termination_reason(), TerminationReason::Stagnated);
    assert_eq!(result.iterations(), 100);
    assert_eq!(
        result.termination_message(),
        Some("No significant change for 100 iterations.")
    );
    assert_eq!(result.best_value(), 812.0);
}

#[test]
fn test_cmaes_guessed_trajectory_follows_mean() {
    let terrain = Paraboloid::centered();
    let domain = BoundedDomain::from_terrain(&terrain).unwrap();

    let result = Cmaes::new(CmaesConfig::new().with_seed(4))
        .search(&terrain, &domain)
        .unwrap();

    // The mean is never evaluated, so the late trajectory need not be an
    // evaluated point, but it does close in on the summit.
    let last = result.trajectory().last().unwrap();
    assert!(distance(last, &terrain.summit()) < 0.5);
}

#[test]
fn test_shgo_paraboloid() {
    let terrain = Paraboloid::centered();
    let domain = BoundedDomain::from_terrain(&terrain).unwrap();

    let result = Shgo::default().search(&terrain, &domain).unwrap();

    assert_run_invariants(&result, &domain);
    assert!(result.distance_to(&terrain.summit()) < 0.5);
    assert_relative_eq!(result.best_value(), 0.0, epsilon = 1e-6);
    assert!(result.converged());
    assert_eq!(result.strategy(), "SHGO");
}

#[test]
fn test_shgo_is_deterministic() {
    let terrain = Paraboloid::new(17.0, 9.0, point(4.2, 7.9));
    let domain = BoundedDomain::from_terrain(&terrain).unwrap();

    let a = Shgo::default().search(&terrain, &domain).unwrap();
    let b = Shgo::default().search(&terrain, &domain).unwrap();

    assert_eq!(a.best_point(), b.best_point());
    assert_eq!(a.best_value(), b.best_value());
    assert_eq!(a.trajectory(), b.trajectory());
    assert_eq!(a.evaluations(), b.evaluations());
    assert_eq!(a.local_maxima(), b.local_maxima());
}

#[test]
fn test_shgo_trajectory_is_monotone() {
    let terrain = TwinPeaks;
    let domain = BoundedDomain::from_terrain(&terrain).unwrap();

    let result = Shgo::default().search(&terrain, &domain).unwrap();
    let heights: Vec<f64> = result
        .trajectory()
        .iter()
        .map(|p| terrain.height(p).unwrap())
        .collect();

    assert!(heights.windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(*heights.last().unwrap(), result.best_value());
}

#[test]
fn test_both_strategies_find_the_higher_peak() {
    let terrain = TwinPeaks;
    let domain = BoundedDomain::from_terrain(&terrain).unwrap();
    let (sx, sy) = TwinPeaks::SUMMIT;
    let summit = point(sx, sy);

    let shgo = Shgo::default().search(&terrain, &domain).unwrap();
    assert!(shgo.distance_to(&summit) < 1.0);
    assert_eq!(shgo.summit_height(), 1344);

    let cmaes = Cmaes::new(CmaesConfig::new().with_seed(21))
        .search(&terrain, &domain)
        .unwrap();
    assert!(cmaes.distance_to(&summit) < 1.0);
    assert!(cmaes.best_value() > TwinPeaks::FOOTHILL_HEIGHT);
}

#[test]
fn test_iteration_caps() {
    let terrain = Paraboloid::centered();
    let domain = BoundedDomain::from_terrain(&terrain).unwrap();

    let cmaes = Cmaes::new(
        CmaesConfig::new()
            .with_seed(2)
            .with_population_size(20)
            .with_max_iterations(7),
    )
    .search(&terrain, &domain)
    .unwrap();
    assert_eq!(cmaes.termination_reason(), TerminationReason::MaxIterations);
    assert_eq!(cmaes.iterations(), 7);
    assert_eq!(cmaes.function_evaluations(), 140);

    let shgo = Shgo::new(ShgoConfig::new().with_max_iterations(1))
        .search(&terrain, &domain)
        .unwrap();
    assert_eq!(shgo.termination_reason(), TerminationReason::MaxIterations);
    assert_eq!(
        shgo.termination_message(),
        Some("Maximum number of iterations (1) reached.")
    );
}

#[test]
fn test_oracle_failure_aborts_search() {
    let terrain = FailingTerrain::new(30);
    let domain = BoundedDomain::from_terrain(&terrain).unwrap();

    let err = Cmaes::new(CmaesConfig::new().with_seed(1))
        .search(&terrain, &domain)
        .unwrap_err();
    assert!(err.is_oracle_failure());
    assert_eq!(terrain.calls(), 30);

    let terrain = FailingTerrain::new(30);
    let err = Shgo::default().search(&terrain, &domain).unwrap_err();
    assert!(err.is_oracle_failure());
    assert_eq!(terrain.calls(), 30);
}

#[test]
fn test_invalid_configuration_evaluates_nothing() {
    let terrain = FailingTerrain::new(1);
    let domain = BoundedDomain::from_terrain(&terrain).unwrap();

    let err = Cmaes::new(CmaesConfig::new().with_population_size(1))
        .search(&terrain, &domain)
        .unwrap_err();
    assert!(err.is_configuration_error());

    let err = Shgo::new(ShgoConfig::new().with_initial_subdivisions(0))
        .search(&terrain, &domain)
        .unwrap_err();
    assert!(err.is_configuration_error());

    assert_eq!(terrain.calls(), 0);
}
