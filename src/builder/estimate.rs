//! Remaining-time estimation for chunked runs.

use std::time::Duration;

/// Weight of the most recent chunk in the moving average.
pub const DEFAULT_WEIGHT: f64 = 0.9;

/// Exponentially weighted moving average of chunk durations:
/// `estimate' = estimate * (1 - w) + duration * w`, starting from zero.
#[derive(Debug, Clone)]
pub struct DurationEstimator {
    weight: f64,
    estimate: Duration,
    samples: usize,
}

impl DurationEstimator {
    pub fn new() -> Self {
        Self::with_weight(DEFAULT_WEIGHT)
    }

    /// Create an estimator with a custom weight, clamped to `0.0..=1.0`.
    pub fn with_weight(weight: f64) -> Self {
        let weight = if weight.is_finite() {
            weight.clamp(0.0, 1.0)
        } else {
            DEFAULT_WEIGHT
        };

        DurationEstimator {
            weight,
            estimate: Duration::ZERO,
            samples: 0,
        }
    }

    /// Fold one chunk duration into the average and return the new estimate.
    pub fn observe(&mut self, duration: Duration) -> Duration {
        self.estimate = self.estimate.mul_f64(1.0 - self.weight) + duration.mul_f64(self.weight);
        self.samples += 1;
        self.estimate
    }

    /// Current per-chunk estimate; `None` until a chunk has been observed.
    pub fn estimate(&self) -> Option<Duration> {
        (self.samples > 0).then_some(self.estimate)
    }

    /// Estimated time for `chunks_left` more chunks.
    pub fn remaining(&self, chunks_left: usize) -> Option<Duration> {
        self.estimate()
            .map(|estimate| estimate.mul_f64(chunks_left as f64))
    }
}

impl Default for DurationEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a duration for progress output.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else if secs < 3600.0 {
        format!("{:.1}m", secs / 60.0)
    } else {
        format!("{:.1}h", secs / 3600.0)
    }
}
