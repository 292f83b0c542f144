//! Engine configuration.
//!
//! One value bundling the settings of every strategy the engine can run.
//! Each part keeps its own defaults, so only what differs needs to be set.

use summitopt_core::Result;
use summitopt_optim::{CmaesConfig, ShgoConfig};

/// Settings for every strategy the [`SearchEngine`](crate::SearchEngine)
/// can dispatch to.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Settings of the population-based stochastic search
    pub cmaes: CmaesConfig,
    /// Settings of the deterministic partition search
    pub shgo: ShgoConfig,
}

impl EngineConfig {
    /// Creates a configuration with default settings for every strategy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the CMA-ES settings.
    pub fn with_cmaes(mut self, cmaes: CmaesConfig) -> Self {
        self.cmaes = cmaes;
        self
    }

    /// Sets the SHGO settings.
    pub fn with_shgo(mut self, shgo: ShgoConfig) -> Self {
        self.shgo = shgo;
        self
    }

    /// Checks every strategy's settings.
    ///
    /// # Errors
    ///
    /// Returns the first `InvalidConfiguration` found.
    pub fn validate(&self) -> Result<()> {
        self.cmaes.validate()?;
        self.shgo.validate()
    }
}
