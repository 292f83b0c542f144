//! # SummitOpt
//!
//! Find the highest point of a terrain you can only query one point at a
//! time.
//!
//! The terrain is a black-box height oracle over a rectangle. SummitOpt
//! turns "find the summit" into a bounded minimization problem, runs one of
//! two global search strategies on it, and returns the answer together with
//! every evaluated point and one running estimate per iteration, so that a
//! reporting layer can plot how the search moved.
//!
//! ## Strategies
//!
//! - **CMA-ES** ([`StrategyChoice::StochasticPopulation`]): adapts a
//!   bivariate normal search distribution; stops when the tracked value
//!   stagnates
//! - **SHGO** ([`StrategyChoice::DeterministicPartition`]): refines a
//!   triangulated lattice and polishes its star minimizers with Nelder-Mead;
//!   stops when a refinement brings no improvement
//!
//! ## Example
//!
//! ```rust
//! use summitopt::prelude::*;
//!
//! let terrain = FnTerrain::new(200.0, 100.0, |p: &Point| {
//!     900.0 - 0.01 * ((p.x - 120.0).powi(2) + (p.y - 40.0).powi(2))
//! });
//!
//! let engine = SearchEngine::new(
//!     EngineConfig::new().with_cmaes(CmaesConfig::new().with_seed(12)),
//! );
//! let result = engine.run_on_terrain(&terrain, "cmaes".parse()?, false)?;
//!
//! assert!(result.distance_to(&point(120.0, 40.0)) < 1.0);
//! assert!(result.evaluations().len() >= result.trajectory().len());
//! # Ok::<(), SearchError>(())
//! ```
//!
//! ## Crate Organization
//!
//! - `summitopt-core`: terrain trait, domain, objective adapter, recorder,
//!   stopping rules and results
//! - `summitopt-optim`: the strategies and the bounded Nelder-Mead search
//! - `summitopt`: this facade

pub mod config;
pub mod engine;

pub use config::EngineConfig;
pub use engine::{SearchEngine, StrategyChoice};

// Re-export commonly used items from the member crates
pub use summitopt_core::{BoundedDomain, Result, SearchError};
pub use summitopt_optim::OptimizerStrategy;

// Re-export key dependencies
pub use nalgebra;

/// Prelude module for convenient imports.
///
/// ```rust
/// use summitopt::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::{SearchEngine, StrategyChoice};
    pub use summitopt_core::prelude::*;
    pub use summitopt_optim::{
        Cmaes, CmaesConfig, DeterministicPartitionSearch, NelderMeadConfig, Shgo, ShgoConfig,
        StochasticPopulationSearch,
    };
}
