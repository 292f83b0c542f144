//! Search engine facade.
//!
//! The engine wires a terrain to a fresh objective adapter and recorder,
//! dispatches to the selected strategy, and hands back the strategy's result
//! unmodified. It never retries: the first failure ends the run.

use crate::config::EngineConfig;
use log::info;
use std::fmt;
use std::str::FromStr;
use summitopt_core::{
    core::terrain::Terrain,
    optimization::{result::SearchResult, strategy::OptimizerStrategy},
    BoundedDomain, Result, SearchError,
};
use summitopt_optim::{Cmaes, Shgo};

/// Which search strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StrategyChoice {
    /// CMA-ES population-based stochastic search
    #[default]
    StochasticPopulation,
    /// SHGO deterministic partition search
    DeterministicPartition,
}

impl StrategyChoice {
    /// Short name, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyChoice::StochasticPopulation => "cmaes",
            StrategyChoice::DeterministicPartition => "shgo",
        }
    }
}

impl fmt::Display for StrategyChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyChoice {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "cmaes" | "cma-es" | "stochastic" | "stochastic-population" => {
                Ok(StrategyChoice::StochasticPopulation)
            }
            "shgo" | "deterministic" | "deterministic-partition" => {
                Ok(StrategyChoice::DeterministicPartition)
            }
            _ => Err(SearchError::invalid_configuration(
                "unknown search strategy",
                "strategy",
                s,
            )),
        }
    }
}

/// Runs maximum searches on terrains.
///
/// # Examples
///
/// ```rust
/// use summitopt::prelude::*;
///
/// let hill = FnTerrain::new(10.0, 10.0, |p: &Point| 50.0 - (p.x - 2.0).powi(2) - (p.y - 8.0).powi(2));
/// let engine = SearchEngine::default();
///
/// let result = engine.run_on_terrain(&hill, StrategyChoice::DeterministicPartition, false)?;
/// assert!(result.distance_to(&point(2.0, 8.0)) < 0.5);
/// assert_eq!(result.summit_height(), 50);
/// # Ok::<(), SearchError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    config: EngineConfig,
}

impl SearchEngine {
    /// Creates an engine with the given strategy settings.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Searches `terrain` inside `domain` with the chosen strategy.
    ///
    /// `use_observed_best` selects what the CMA-ES trajectory follows: the
    /// best evaluated point (`true`) or the distribution mean (`false`). The
    /// partition search always tracks its best point and ignores the flag.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` before any evaluation if the selected
    /// strategy is misconfigured, and propagates the first oracle failure.
    pub fn run<T: Terrain + ?Sized>(
        &self,
        terrain: &T,
        domain: &BoundedDomain,
        choice: StrategyChoice,
        use_observed_best: bool,
    ) -> Result<SearchResult> {
        info!(
            "Searching {} x {} domain with {} (observed best: {})",
            domain.width(),
            domain.height(),
            choice,
            use_observed_best
        );

        let result = match choice {
            StrategyChoice::StochasticPopulation => {
                let config = self
                    .config
                    .cmaes
                    .clone()
                    .with_observed_best(use_observed_best);
                Cmaes::new(config).search(terrain, domain)?
            }
            StrategyChoice::DeterministicPartition => {
                Shgo::new(self.config.shgo.clone()).search(terrain, domain)?
            }
        };

        let best = result.best_point();
        info!(
            "{} found height {:.2} at ({:.2}, {:.2}) after {} iterations, {} evaluations in {:?}",
            result.strategy(),
            result.best_value(),
            best.x,
            best.y,
            result.iterations(),
            result.function_evaluations(),
            result.duration()
        );
        Ok(result)
    }

    /// Searches the whole rectangle covered by `terrain`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the terrain's extent is not a
    /// positive, finite rectangle, and otherwise behaves like
    /// [`run`](Self::run).
    pub fn run_on_terrain<T: Terrain + ?Sized>(
        &self,
        terrain: &T,
        choice: StrategyChoice,
        use_observed_best: bool,
    ) -> Result<SearchResult> {
        let domain = BoundedDomain::from_terrain(terrain)?;
        self.run(terrain, &domain, choice, use_observed_best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_strategy_choice() {
        for text in ["cmaes", "CMA-ES", " stochastic_population ", "stochastic"] {
            assert_eq!(
                text.parse::<StrategyChoice>().unwrap(),
                StrategyChoice::StochasticPopulation
            );
        }
        for text in ["shgo", "SHGO", "deterministic-partition", "deterministic"] {
            assert_eq!(
                text.parse::<StrategyChoice>().unwrap(),
                StrategyChoice::DeterministicPartition
            );
        }
    }

    #[test]
    fn test_unknown_strategy() {
        let err = "simulated-annealing".parse::<StrategyChoice>().unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("simulated-annealing"));
    }

    #[test]
    fn test_display_round_trips() {
        for choice in [
            StrategyChoice::StochasticPopulation,
            StrategyChoice::DeterministicPartition,
        ] {
            assert_eq!(choice.to_string().parse::<StrategyChoice>().unwrap(), choice);
        }
        assert_eq!(StrategyChoice::default(), StrategyChoice::StochasticPopulation);
    }
}
