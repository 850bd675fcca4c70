//! Frame budget tracker.
//!
//! Rolling-window accounting of observed frame durations against the active
//! tier's frame period. The tracker only observes; deciding what to do about
//! a blown budget belongs to the [`controller`](crate::controller).

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};


/// Number of frame samples retained in the rolling window.
pub const DEFAULT_WINDOW_SIZE: usize = 60;

/// Frames slower than this instantaneous rate count as dropped.
pub const DROP_FPS_THRESHOLD: f64 = 30.0;

/// Fraction of the target frame time below which the tracker reports
/// headroom. The 30% margin keeps marginal frames from flapping between
/// "room to spare" and "over budget".
pub const HEADROOM_RATIO: f64 = 0.7;

/// Derived budget signal for the current window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameBudgetState {
    /// Frame period the active tier is expected to sustain, in milliseconds
    pub target_ms: f64,
    /// Mean duration of the sampled frames, in milliseconds
    pub current_ms: f64,
    /// Smoothed frames per second, `1000 / current_ms`
    pub fps: f64,
    pub is_over_budget: bool,
    pub has_headroom: bool,
    /// Frames in a row below [`DROP_FPS_THRESHOLD`]
    pub consecutive_drops: u32,
    /// Total frames observed below the drop threshold
    pub dropped_frames: u64,
}

/// Maintains the rolling window of frame durations.
#[derive(Debug, Clone)]
pub struct FrameBudgetTracker {
    window: VecDeque<f64>,
    window_size: usize,
    target_ms: f64,
    current_ms: f64,
    dropped_frames: u64,
    consecutive_drops: u32,
    frames_recorded: u64,
}

impl FrameBudgetTracker {
    /// Create a tracker targeting `target_fps` with the default window.
    pub fn new(target_fps: f64) -> Self {
        Self::with_window(target_fps, DEFAULT_WINDOW_SIZE)
    }

    /// Create a tracker with an explicit window size (clamped to at least 1).
    pub fn with_window(target_fps: f64, window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            window: VecDeque::with_capacity(window_size),
            window_size,
            target_ms: 1000.0 / target_fps.max(1.0),
            current_ms: 0.0,
            dropped_frames: 0,
            consecutive_drops: 0,
            frames_recorded: 0,
        }
    }

    /// Record one observed frame duration in milliseconds.
    ///
    /// Negative durations are treated as zero.
    pub fn record_frame(&mut self, duration_ms: f64) {
        let duration_ms = duration_ms.max(0.0);
        if self.window.len() == self.window_size {
            self.window.pop_front();
        }
        self.window.push_back(duration_ms);
        self.frames_recorded += 1;

        let sum: f64 = self.window.iter().sum();
        self.current_ms = sum / self.window.len() as f64;

        let drop_threshold_ms = 1000.0 / DROP_FPS_THRESHOLD;
        if duration_ms > drop_threshold_ms {
            self.dropped_frames += 1;
            self.consecutive_drops += 1;
        } else {
            self.consecutive_drops = 0;
        }
    }

    /// Retarget the tracker when the active tier's `target_fps` changes.
    ///
    /// The sample window is deliberately kept: the observed cost of recent
    /// frames is still real, only the deadline moved.
    pub fn set_target_fps(&mut self, target_fps: f64) {
        self.target_ms = 1000.0 / target_fps.max(1.0);
    }

    /// Mean frame time over the window, in milliseconds.
    pub fn current_ms(&self) -> f64 {
        self.current_ms
    }

    pub fn target_ms(&self) -> f64 {
        self.target_ms
    }

    /// Smoothed frames per second; 0 until a frame has been recorded.
    pub fn fps(&self) -> f64 {
        if self.current_ms > 0.0 {
            1000.0 / self.current_ms
        } else {
            0.0
        }
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    pub fn consecutive_drops(&self) -> u32 {
        self.consecutive_drops
    }

    /// Number of samples currently in the window.
    pub fn samples(&self) -> usize {
        self.window.len()
    }

    /// Total frames recorded since construction or the last reset.
    pub fn frames_recorded(&self) -> u64 {
        self.frames_recorded
    }

    /// Current derived signal.
    ///
    /// An empty window reports neither overrun nor headroom: no data is not
    /// evidence of spare capacity.
    pub fn state(&self) -> FrameBudgetState {
        let has_samples = !self.window.is_empty();
        FrameBudgetState {
            target_ms: self.target_ms,
            current_ms: self.current_ms,
            fps: self.fps(),
            is_over_budget: has_samples && self.current_ms > self.target_ms,
            has_headroom: has_samples && self.current_ms < self.target_ms * HEADROOM_RATIO,
            consecutive_drops: self.consecutive_drops,
            dropped_frames: self.dropped_frames,
        }
    }

    /// Clear the window and all derived counters; the target is untouched.
    pub fn reset_metrics(&mut self) {
        self.window.clear();
        self.current_ms = 0.0;
        self.dropped_frames = 0;
        self.consecutive_drops = 0;
        self.frames_recorded = 0;
    }
}
