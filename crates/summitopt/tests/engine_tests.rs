//! Integration tests for the search engine facade.

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use summitopt::prelude::*;
use summitopt_core::test_terrains::{FailingTerrain, FlatTerrain, Paraboloid, TwinPeaks};

fn engine() -> SearchEngine {
    SearchEngine::new(EngineConfig::new().with_cmaes(CmaesConfig::new().with_seed(5)))
}

#[test]
fn test_paraboloid_with_both_strategies() {
    let terrain = Paraboloid::centered();
    let domain = BoundedDomain::new(10.0, 10.0).unwrap();

    for choice in [
        StrategyChoice::StochasticPopulation,
        StrategyChoice::DeterministicPartition,
    ] {
        for use_observed_best in [false, true] {
            let result = engine()
                .run(&terrain, &domain, choice, use_observed_best)
                .unwrap();

            assert!(result.distance_to(&point(5.0, 5.0)) < 0.5, "{choice}");
            assert_relative_eq!(result.best_value(), 0.0, epsilon = 0.25);
            assert!(!result.trajectory().is_empty());
            assert!(result.evaluations().len() >= result.trajectory().len());
            assert!(result.evaluations().iter().all(|p| domain.contains(p)));
            assert!(result.termination_message().is_some());
        }
    }
}

#[test]
fn test_zero_width_domain_is_rejected() {
    assert!(BoundedDomain::new(0.0, 10.0)
        .unwrap_err()
        .is_configuration_error());

    let zero_width = FlatTerrain::new(0.0, 10.0, 1.0);
    let err = engine()
        .run_on_terrain(&zero_width, StrategyChoice::DeterministicPartition, false)
        .unwrap_err();
    assert!(err.is_configuration_error());
}

#[test]
fn test_observed_tracking_records_evaluated_points() {
    let terrain = Paraboloid::new(20.0, 20.0, point(13.0, 4.0));
    let result = engine()
        .run_on_terrain(&terrain, StrategyChoice::StochasticPopulation, true)
        .unwrap();

    for p in result.trajectory().iter() {
        assert!(result.evaluations().iter().any(|e| e == p));
    }
    // Observed tracking never moves away from a better point.
    let heights: Vec<f64> = result
        .trajectory()
        .iter()
        .map(|p| terrain.height(p).unwrap())
        .collect();
    assert!(heights.windows(2).all(|w| w[1] >= w[0]));
}

#[test]
fn test_engine_returns_strategy_result_unmodified() {
    let terrain = TwinPeaks;
    let domain = BoundedDomain::from_terrain(&terrain).unwrap();

    let direct = Shgo::default().search(&terrain, &domain).unwrap();
    let via_engine = SearchEngine::default()
        .run(&terrain, &domain, StrategyChoice::DeterministicPartition, false)
        .unwrap();

    assert_eq!(via_engine.best_point(), direct.best_point());
    assert_eq!(via_engine.best_value(), direct.best_value());
    assert_eq!(via_engine.trajectory(), direct.trajectory());
    assert_eq!(via_engine.evaluations(), direct.evaluations());
    assert_eq!(via_engine.termination_message(), direct.termination_message());
}

#[test]
fn test_oracle_failure_is_propagated() {
    let terrain = FailingTerrain::new(12);
    let err = engine()
        .run_on_terrain(&terrain, StrategyChoice::StochasticPopulation, false)
        .unwrap_err();

    assert!(err.is_oracle_failure());
    assert_eq!(terrain.calls(), 12);
}

#[test]
fn test_invalid_engine_config() {
    let terrain = FailingTerrain::new(1);
    let engine = SearchEngine::new(
        EngineConfig::new().with_shgo(ShgoConfig::new().with_initial_subdivisions(0)),
    );

    assert!(engine.config().validate().is_err());
    let err = engine
        .run_on_terrain(&terrain, StrategyChoice::DeterministicPartition, false)
        .unwrap_err();
    assert!(err.is_configuration_error());
    assert_eq!(terrain.calls(), 0);

    // The CMA-ES settings are still usable on their own.
    let err = engine
        .run_on_terrain(&terrain, StrategyChoice::StochasticPopulation, false)
        .unwrap_err();
    assert!(err.is_oracle_failure());
}

#[test]
fn test_unknown_strategy_name() {
    let err = "gradient-descent".parse::<StrategyChoice>().unwrap_err();
    assert!(err.is_configuration_error());
}

#[cfg(feature = "serde")]
#[test]
fn test_result_serializes_to_json() {
    let terrain = Paraboloid::centered();
    let result = engine()
        .run_on_terrain(&terrain, StrategyChoice::DeterministicPartition, false)
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("trajectory").is_some());
    assert!(json.get("evaluations").is_some());
}
