//! SummitOpt Optimization - Global search strategies for bounded maximum search.
//!
//! This crate provides the concrete strategies that drive an
//! [`ObjectiveAdapter`](summitopt_core::optimization::objective::ObjectiveAdapter)
//! inside a [`BoundedDomain`](summitopt_core::BoundedDomain).
//!
//! # Available Strategies
//!
//! - **CMA-ES**: Population-based stochastic search adapting a bivariate
//!   normal distribution
//! - **SHGO**: Deterministic lattice partitioning with star minimizers and
//!   local Nelder-Mead refinement
//!
//! # Examples
//!
//! ```rust
//! use summitopt_core::prelude::*;
//! use summitopt_optim::{Cmaes, CmaesConfig};
//!
//! let terrain = FnTerrain::new(100.0, 80.0, |p: &Point| 1000.0 - (p.x - 40.0).abs() - (p.y - 20.0).abs());
//! let domain = BoundedDomain::from_terrain(&terrain)?;
//!
//! let mut cmaes = Cmaes::new(
//!     CmaesConfig::new()
//!         .with_population_size(40)
//!         .with_seed(1)
//! );
//! let result = cmaes.search(&terrain, &domain)?;
//!
//! assert!(result.evaluations().iter().all(|p| domain.contains(p)));
//! # Ok::<(), SearchError>(())
//! ```

pub mod cmaes;
pub mod nelder_mead;
pub mod shgo;

// Re-export main strategies for convenience
pub use cmaes::{Cmaes, CmaesConfig};
pub use nelder_mead::{LocalSearchResult, NelderMeadConfig};
pub use shgo::{Shgo, ShgoConfig};

/// Population-based stochastic search.
pub type StochasticPopulationSearch = Cmaes;

/// Deterministic space-partitioning search.
pub type DeterministicPartitionSearch = Shgo;

// Re-export commonly used items from core
pub use summitopt_core::optimization::{
    recorder::TrackingMode,
    stopping::{IterationCap, PhaseConvergence, StagnationRule},
    strategy::OptimizerStrategy,
};
