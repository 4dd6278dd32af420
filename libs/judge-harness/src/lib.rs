//! Per-test execution and result aggregation for a single candidate function.
//!
//! The pieces, in the order a run uses them:
//! - [`loader`] decodes the transport-encoded suite
//! - [`registry`] resolves the function under test by name
//! - [`engine`] invokes it once per case inside a [`capture`] scope
//! - [`evaluator`] compares each result with [`equality`] and builds the report
//! - [`unit`] wires all of it to the environment protocol of an execution unit

pub mod capture;
pub mod engine;
pub mod equality;
pub mod evaluator;
pub mod error;
pub mod finite;
pub mod loader;
pub mod registry;
pub mod unit;

#[cfg(test)]
mod engine_tests;

pub use capture::Capture;
pub use engine::Engine;
pub use error::HarnessError;
pub use registry::{Args, ArgumentError, Registry};
