//! # Lightstream Bench
//!
//! Benchmarking utilities for Lightstream performance testing.

pub mod fixtures;
pub mod latency;
pub mod throughput;
