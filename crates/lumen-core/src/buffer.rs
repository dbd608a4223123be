//! Buffered-fraction tracking
//!
//! Only the end of the last buffered range counts. Earlier ranges are
//! ignored rather than summed, matching contiguous-from-start buffering of
//! the media backend.

use tracing::debug;

/// A buffered time range reported by the surface, in seconds
pub type BufferedRange = (f64, f64);

/// End of the last reported range, if any
pub fn last_range_end(ranges: &[BufferedRange]) -> Option<f64> {
    ranges.last().map(|&(_, end)| end)
}

/// Tracks the buffered fraction of the current source
#[derive(Debug, Clone, Default)]
pub struct BufferTracker {
    buffered_end: Option<f64>,
    fraction: f64,
}

impl BufferTracker {
    /// Create a tracker with nothing buffered
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute `buffered_end / duration`, clamped to [0, 1]
    pub fn compute(buffered_end: Option<f64>, duration: f64) -> f64 {
        match buffered_end {
            Some(end) if duration > 0.0 && duration.is_finite() && end.is_finite() => {
                (end / duration).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// Record a new buffered end reported by the surface
    pub fn update(&mut self, buffered_end: Option<f64>, duration: f64) -> f64 {
        self.buffered_end = buffered_end;
        self.fraction = Self::compute(buffered_end, duration);
        debug!(
            buffered_end = ?buffered_end,
            duration = duration,
            fraction = self.fraction,
            "Buffer progress"
        );
        self.fraction
    }

    /// Record a full range list; only the last range is used
    pub fn update_from_ranges(&mut self, ranges: &[BufferedRange], duration: f64) -> f64 {
        self.update(last_range_end(ranges), duration)
    }

    /// Recompute after the duration changed
    pub fn rescale(&mut self, duration: f64) -> f64 {
        self.fraction = Self::compute(self.buffered_end, duration);
        self.fraction
    }

    /// Forget buffered data, e.g. after loading a new source
    pub fn reset(&mut self) {
        self.buffered_end = None;
        self.fraction = 0.0;
    }

    /// Current buffered fraction
    pub fn fraction(&self) -> f64 {
        self.fraction
    }
}
