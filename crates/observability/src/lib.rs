//! Tracing/logging initialization.

pub mod tracing_init;

pub use tracing_init::init;
