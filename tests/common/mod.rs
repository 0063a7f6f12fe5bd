//! Common test utilities for gh-artifact-dl integration tests

#[allow(dead_code)]
pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::*;
pub use github::*;
