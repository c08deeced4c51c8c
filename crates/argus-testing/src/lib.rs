//! Testing infrastructure for argus tests.
//!
//! - `fixtures`: canned traces for the scenarios the analyzer recognises
//! - `assertions`: invariants every logged trace must satisfy
//! - `TestWorld`: temp directory plus CLI runner for end-to-end tests

pub mod assertions;
pub mod fixtures;
pub mod world;

pub use world::{CliResult, TestWorld};
