//! Shared fixtures for integration tests

#![allow(dead_code)]

pub mod fixtures;
pub mod strategies;
pub mod test_doubles;

#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use test_doubles::*;
