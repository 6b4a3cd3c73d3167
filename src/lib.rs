//! Host resource sampling for status-bar indicators.
//!
//! Reads CPU, memory and network counters from procfs, turns them into
//! percentages and byte rates, and publishes one [`SampleResult`] per cycle.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod monitor;
pub mod scheduler;
#[cfg(test)]
mod tests;
pub mod ui;

pub use engine::SampleEngine;
pub use error::SampleError;
pub use model::{SampleEvent, SampleResult};
pub use scheduler::Scheduler;
