//! Foundation utilities shared across the pipeline

pub mod logging;
pub mod math;
