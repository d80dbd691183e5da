use crate::pages::YEAR_RADIUS;
use std::time::Duration;
use thiserror::Error;

/// Pages from either end of a batch window at which it is rebuilt
pub const DEFAULT_EDGE_THRESHOLD: usize = 4;

/// How long a programmatic scroll is given to finish before scroll offsets are
/// treated as user gestures again
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(300);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PagerConfig {
    page_width: f64,
    edge_threshold: usize,
    settle_delay: Duration,
    batch_radius: usize,
}

impl PagerConfig {
    pub fn new(page_width: f64) -> PagerConfig {
        PagerConfig {
            page_width,
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
            settle_delay: DEFAULT_SETTLE_DELAY,
            batch_radius: YEAR_RADIUS,
        }
    }

    #[must_use]
    pub fn with_page_width(mut self, page_width: f64) -> PagerConfig {
        self.page_width = page_width;
        self
    }

    #[must_use]
    pub fn with_edge_threshold(mut self, edge_threshold: usize) -> PagerConfig {
        self.edge_threshold = edge_threshold;
        self
    }

    #[must_use]
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> PagerConfig {
        self.settle_delay = settle_delay;
        self
    }

    #[must_use]
    pub fn with_batch_radius(mut self, batch_radius: usize) -> PagerConfig {
        self.batch_radius = batch_radius;
        self
    }

    pub fn page_width(&self) -> f64 {
        self.page_width
    }

    pub fn edge_threshold(&self) -> usize {
        self.edge_threshold
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    pub fn batch_radius(&self) -> usize {
        self.batch_radius
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.page_width.is_finite() && self.page_width > 0.0) {
            return Err(ConfigError::PageWidth(self.page_width));
        }
        if self.batch_radius <= self.edge_threshold {
            return Err(ConfigError::RadiusTooSmall {
                radius: self.batch_radius,
                threshold: self.edge_threshold,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("page width must be positive and finite, got {0}")]
    PageWidth(f64),
    #[error("batch radius {radius} must be larger than the edge threshold {threshold}")]
    RadiusTooSmall { radius: usize, threshold: usize },
}
