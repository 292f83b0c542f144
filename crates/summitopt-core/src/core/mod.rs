//! Core traits and types for maximum search.

pub mod error;
pub mod terrain;
pub mod types;

// Re-export core types
pub use error::*;
pub use terrain::*;
pub use types::*;
