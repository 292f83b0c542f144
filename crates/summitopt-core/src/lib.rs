//! Core traits and types for bounded maximum search.
//!
//! This crate provides the building blocks shared by every search strategy:
//! the height oracle interface, the rectangular search domain, the objective
//! adapter that turns "find the highest point" into a minimization problem,
//! and the instrumentation recording every evaluation and every iteration.
//!
//! # Key Concepts
//!
//! - **Terrain**: a black-box height oracle over a rectangle
//! - **Objective**: the negated height, logged on every evaluation
//! - **Trajectory**: one "current answer" per optimizer iteration
//! - **Stopping rules**: stagnation windows, phase convergence, hard caps
//!
//! # Modules
//!
//! - [`core`]: Errors, point types and the terrain trait
//! - [`domain`]: The bounded search rectangle
//! - [`optimization`]: Objective adapter, recorder, stopping rules,
//!   strategy trait and results

pub mod core;
pub mod domain;
pub mod optimization;
pub mod utils;

// Re-export commonly used items at the crate root
pub use crate::core::error::{Result, SearchError};
pub use domain::BoundedDomain;

#[cfg(any(test, feature = "test-utils"))]
pub use utils::test_terrains;

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use summitopt_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::error::{Result, SearchError};
    pub use crate::core::terrain::{FnTerrain, Terrain};
    pub use crate::core::types::{constants, distance, point, Matrix, Point, Vector, DIMENSION};
    pub use crate::domain::BoundedDomain;
    pub use crate::optimization::objective::{EvaluationLog, ObjectiveAdapter};
    pub use crate::optimization::recorder::{Trajectory, TrackingMode, TrajectoryRecorder};
    pub use crate::optimization::result::{LocalMaximum, SearchResult, StrategyOutcome};
    pub use crate::optimization::stopping::{
        ConvergenceChecker, IterationCap, PhaseConvergence, StagnationRule, StoppingRule,
        Termination, TerminationReason,
    };
    pub use crate::optimization::strategy::OptimizerStrategy;
}
