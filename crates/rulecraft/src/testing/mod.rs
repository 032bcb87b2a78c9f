//! # Testing Utilities
//!
//! Helpers for testing grammars: [`SampleGenerator`] expands a rule into
//! sample inputs for property-based tests, and can mutate them into
//! near-miss inputs for fuzzing.

pub mod generators;

pub use generators::{GeneratorConfig, SampleGenerator};
