//! Fingertip smoothing filters.
//!
//! Hand landmarks jitter by a few pixels between frames, which makes a
//! fingertip resting on a region edge flicker in and out of it. These filters
//! smooth the canvas-space fingertip before hit testing.

use crate::{Error, Result};
use std::collections::VecDeque;

/// Trait for all point filters
pub trait PointFilter: Send + Sync {
    /// Apply filter to a canvas-space point
    fn apply(&mut self, x: f32, y: f32) -> (f32, f32);

    /// Reset filter state
    fn reset(&mut self);
}

/// No-op filter that passes through values unchanged
pub struct NoFilter;

impl PointFilter for NoFilter {
    fn apply(&mut self, x: f32, y: f32) -> (f32, f32) {
        (x, y)
    }

    fn reset(&mut self) {}
}

/// Exponential smoothing filter
pub struct ExponentialFilter {
    alpha: f32,
    last: Option<(f32, f32)>,
}

impl ExponentialFilter {
    /// # Errors
    ///
    /// Returns an error if alpha is outside (0, 1]
    pub fn new(alpha: f32) -> Result<Self> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(Error::FilterError(format!("Alpha must be in (0, 1], got {alpha}")));
        }
        Ok(Self { alpha, last: None })
    }
}

impl PointFilter for ExponentialFilter {
    fn apply(&mut self, x: f32, y: f32) -> (f32, f32) {
        let filtered = match self.last {
            Some((lx, ly)) => (
                self.alpha * x + (1.0 - self.alpha) * lx,
                self.alpha * y + (1.0 - self.alpha) * ly,
            ),
            None => (x, y),
        };
        self.last = Some(filtered);
        filtered
    }

    fn reset(&mut self) {
        self.last = None;
    }
}

/// Moving average filter
pub struct MovingAverageFilter {
    window_size: usize,
    buffer: VecDeque<(f32, f32)>,
}

impl MovingAverageFilter {
    /// # Errors
    ///
    /// Returns an error if the window is empty
    pub fn new(window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(Error::FilterError("Window size must be greater than 0".to_string()));
        }
        Ok(Self {
            window_size,
            buffer: VecDeque::with_capacity(window_size),
        })
    }
}

impl PointFilter for MovingAverageFilter {
    #[allow(clippy::cast_precision_loss)] // window sizes are tiny
    fn apply(&mut self, x: f32, y: f32) -> (f32, f32) {
        if self.buffer.len() >= self.window_size {
            self.buffer.pop_front();
        }
        self.buffer.push_back((x, y));

        let n = self.buffer.len() as f32;
        let (sx, sy) = self.buffer.iter().fold((0.0, 0.0), |(ax, ay), (px, py)| (ax + px, ay + py));
        (sx / n, sy / n)
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }
}

/// Create a point filter from a `name[:param]` setting
///
/// # Errors
///
/// Returns an error for unknown names or out-of-range parameters
pub fn create_filter(setting: &str) -> Result<Box<dyn PointFilter>> {
    let lowered = setting.to_lowercase();
    let (name, param) = match lowered.split_once(':') {
        Some((name, param)) => (name, Some(param)),
        None => (lowered.as_str(), None),
    };

    match name {
        "none" | "nofilter" => Ok(Box::new(NoFilter)),
        "exponential" => {
            let alpha = match param {
                Some(p) => p
                    .parse::<f32>()
                    .map_err(|_| Error::FilterError(format!("Invalid alpha: {p}")))?,
                None => 0.5,
            };
            Ok(Box::new(ExponentialFilter::new(alpha)?))
        }
        "moving_average" | "movingaverage" => {
            let window = match param {
                Some(p) => p
                    .parse::<usize>()
                    .map_err(|_| Error::FilterError(format!("Invalid window size: {p}")))?,
                None => 3,
            };
            Ok(Box::new(MovingAverageFilter::new(window)?))
        }
        _ => Err(Error::FilterError(format!("Unknown filter type: {setting}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filter() {
        let mut filter = NoFilter;
        assert_eq!(filter.apply(10.0, 20.0), (10.0, 20.0));
    }

    #[test]
    fn test_exponential_filter() {
        let mut filter = ExponentialFilter::new(0.5).unwrap();

        // First value passes through
        assert_eq!(filter.apply(10.0, 20.0), (10.0, 20.0));

        // Second value is smoothed
        assert_eq!(filter.apply(20.0, 30.0), (15.0, 25.0));

        filter.reset();
        assert_eq!(filter.apply(100.0, 100.0), (100.0, 100.0));
    }

    #[test]
    fn test_moving_average() {
        let mut filter = MovingAverageFilter::new(2).unwrap();
        assert_eq!(filter.apply(10.0, 20.0), (10.0, 20.0));
        assert_eq!(filter.apply(20.0, 30.0), (15.0, 25.0));
        // Window is full, oldest value is dropped
        assert_eq!(filter.apply(40.0, 50.0), (30.0, 40.0));
    }

    #[test]
    fn test_create_filter() {
        assert!(create_filter("none").is_ok());
        assert!(create_filter("exponential:0.3").is_ok());
        assert!(create_filter("MovingAverage:4").is_ok());
        assert!(create_filter("kalman").is_err());
        assert!(create_filter("exponential:2.0").is_err());
        assert!(create_filter("moving_average:0").is_err());
        assert!(create_filter("moving_average:abc").is_err());
    }
}
