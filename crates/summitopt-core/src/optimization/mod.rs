//! Search framework: objective, recording, stopping rules and strategies.

pub mod objective;
pub mod recorder;
pub mod result;
pub mod stopping;
pub mod strategy;

pub use objective::*;
pub use recorder::*;
pub use result::*;
pub use stopping::*;
pub use strategy::*;
