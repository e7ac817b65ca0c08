//! Throughput measurement over recorded frames.

use bytes::Bytes;
use std::time::{Duration, Instant};

/// Result of a throughput run.
#[derive(Debug, Clone)]
pub struct ThroughputResult {
    /// Total messages processed.
    pub messages: u64,
    /// Total bytes processed.
    pub bytes: u64,
    /// Total duration.
    pub duration: Duration,
}

impl ThroughputResult {
    /// Returns messages per second.
    #[must_use]
    pub fn messages_per_second(&self) -> f64 {
        self.messages as f64 / self.duration.as_secs_f64()
    }

    /// Returns megabytes per second.
    #[must_use]
    pub fn mb_per_second(&self) -> f64 {
        self.bytes as f64 / self.duration.as_secs_f64() / (1024.0 * 1024.0)
    }
}

/// Feeds every frame to `process` once and measures the total time.
pub fn replay<F>(frames: &[Bytes], mut process: F) -> ThroughputResult
where
    F: FnMut(&[u8]),
{
    let start = Instant::now();
    for frame in frames {
        process(frame);
    }
    let duration = start.elapsed();

    ThroughputResult {
        messages: frames.len() as u64,
        bytes: frames.iter().map(|f| f.len() as u64).sum(),
        duration,
    }
}
