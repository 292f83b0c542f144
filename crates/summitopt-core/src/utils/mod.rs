//! Utilities shared by tests and benches.

#[cfg(any(test, feature = "test-utils"))]
pub mod test_terrains;
