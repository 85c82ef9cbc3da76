//! Expose teiform's command implementations for use in integration tests.
pub mod batch;
pub mod cli;
pub mod stats;
