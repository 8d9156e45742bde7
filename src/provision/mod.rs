//! Provisioning pipeline for whisperup.
//!
//! Turns validated settings into an ordered list of stages and runs
//! them, failing fast on the first error.

mod pipeline;
mod steps;

pub use pipeline::Pipeline;
pub use steps::{ProvisionContext, ProvisionStep, WhisperSource};
