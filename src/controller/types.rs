use serde::{Deserialize, Serialize};

use crate::quality::QualityTier;

/// Why the controller moved (or was moved) to a new tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionReason {
    /// Sustained frame-time overrun
    OverBudget,
    /// Sustained frame-time headroom
    Headroom,
    /// Thermal throttling reported by the platform
    ThermalThrottle,
    /// Battery critically low and discharging
    BatteryPressure,
    /// OS low-power mode engaged
    LowPowerMode,
    /// Caller called `set_quality`
    Manual,
    /// Caller called `force_quality`
    Forced,
}

/// Ephemeral record of one accepted tier change.
///
/// Emitted to subscribers and kept in a short history ring; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityTransition {
    pub from: QualityTier,
    pub to: QualityTier,
    pub reason: TransitionReason,
    /// Host clock timestamp of the tick that accepted the change, in ms
    pub timestamp_ms: f64,
}

/// Tuning for the adaptive quality controller.
///
/// The defaults are the empirically chosen values from the source system;
/// they are surfaced here as overridable fields rather than re-derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Lowest tier auto-adjustment may select
    pub min_quality: QualityTier,
    /// Highest tier auto-adjustment may select
    pub max_quality: QualityTier,
    /// Whether the controller adjusts the tier at all
    pub auto_adjust: bool,
    /// Consecutive over-/under-budget observations required before acting
    pub adjustment_threshold: u32,
    /// Minimum time between accepted tier changes, in milliseconds
    pub min_adjust_interval_ms: f64,
}

impl ControllerConfig {
    /// Normalize a caller-supplied configuration.
    ///
    /// Inverted quality bounds are swapped and a zero threshold is raised to
    /// one; invalid configuration is repaired, never rejected.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.min_quality > self.max_quality {
            std::mem::swap(&mut self.min_quality, &mut self.max_quality);
        }
        self.adjustment_threshold = self.adjustment_threshold.max(1);
        self.min_adjust_interval_ms = self.min_adjust_interval_ms.max(0.0);
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            min_quality: QualityTier::Minimal,
            max_quality: QualityTier::Ultra,
            auto_adjust: true,
            adjustment_threshold: super::DEFAULT_ADJUSTMENT_THRESHOLD,
            min_adjust_interval_ms: super::DEFAULT_ADJUST_INTERVAL_MS,
        }
    }
}
