use serde::{Deserialize, Serialize};

use crate::budget;
use crate::controller::ControllerConfig;
use crate::quality::QualityTier;

/// Construction-time configuration for a [`FrameGovernor`](super::FrameGovernor).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GovernorConfig {
    /// Starting tier; `None` seeds from the device recommendation
    pub initial_quality: Option<QualityTier>,
    /// Controller tuning (bounds, hysteresis, cadence)
    pub controller: ControllerConfig,
    /// Rolling frame-sample window size
    pub window_size: usize,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            initial_quality: None,
            controller: ControllerConfig::default(),
            window_size: budget::DEFAULT_WINDOW_SIZE,
        }
    }
}

/// Aggregate counters for the governor since construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GovernorMetrics {
    /// Ticks dispatched
    pub frames: u64,
    /// Smoothed frames per second over the rolling window
    pub fps: f64,
    pub dropped_frames: u64,
    pub skipped_updates: u64,
    pub callback_panics: u64,
    pub quality_changes: u64,
    pub current_quality: QualityTier,
    /// Wall time since the governor was constructed, in milliseconds
    pub uptime_ms: f64,
}
