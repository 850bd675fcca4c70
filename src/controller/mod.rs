//! Adaptive quality controller.
//!
//! A hysteresis state machine over the five tiers. Frame-time pressure must
//! persist for [`ControllerConfig::adjustment_threshold`] consecutive
//! observations before the tier moves, moves are a single step at a time,
//! and no two accepted changes land closer together than
//! [`ControllerConfig::min_adjust_interval_ms`]. Power pressure (thermal
//! throttle, critical battery, low-power mode) skips the frame-time
//! hysteresis but still honors the interval gate, so a hot device steps down
//! promptly without free-falling to minimal in one frame's worth of ticks.

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::budget::FrameBudgetState;
use crate::device::types::DeviceProfile;
use crate::quality::QualityTier;

mod types;

pub use types::{ControllerConfig, QualityTransition, TransitionReason};

#[cfg(test)]
mod tests;

/// Default minimum spacing between tier changes. Empirically chosen in the
/// source system; override through [`ControllerConfig`].
pub const DEFAULT_ADJUST_INTERVAL_MS: f64 = 2000.0;

/// Default consecutive-observation threshold before a frame-time step.
pub const DEFAULT_ADJUSTMENT_THRESHOLD: u32 = 30;

/// Battery fraction at or below which, while discharging, the controller
/// forces a downgrade regardless of frame-time hysteresis.
pub const PRESSURE_BATTERY_LEVEL: f64 = 0.2;

/// Number of transitions retained for callers to inspect.
pub const TRANSITION_HISTORY_LEN: usize = 32;

/// The tier state machine.
#[derive(Debug)]
pub struct AdaptiveQualityController {
    config: ControllerConfig,
    active: QualityTier,
    forced: Option<QualityTier>,
    over_budget_streak: u32,
    headroom_streak: u32,
    last_change_ms: Option<f64>,
    quality_changes: u64,
    history: VecDeque<QualityTransition>,
}

impl AdaptiveQualityController {
    /// Create a controller starting at `initial`, clamped into the
    /// configured bounds.
    pub fn new(initial: QualityTier, config: ControllerConfig) -> Self {
        let config = config.normalized();
        Self {
            active: initial.clamp_to(config.min_quality, config.max_quality),
            config,
            forced: None,
            over_budget_streak: 0,
            headroom_streak: 0,
            last_change_ms: None,
            quality_changes: 0,
            history: VecDeque::with_capacity(TRANSITION_HISTORY_LEN),
        }
    }

    pub fn active(&self) -> QualityTier {
        self.active
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Total accepted tier changes, including manual and forced ones.
    pub fn quality_changes(&self) -> u64 {
        self.quality_changes
    }

    /// Whether the controller is currently allowed to move the tier itself.
    pub fn is_auto_adjusting(&self) -> bool {
        self.forced.is_none() && self.config.auto_adjust
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &QualityTransition> {
        self.history.iter()
    }

    /// Enable or disable auto-adjustment without touching the tier.
    pub fn set_auto_adjust(&mut self, enabled: bool) {
        self.config.auto_adjust = enabled;
        if !enabled {
            self.reset_streaks();
        }
    }

    /// Set the active tier directly, clamped into bounds. Idempotent.
    pub fn set_quality(&mut self, tier: QualityTier, now_ms: f64) -> Option<QualityTransition> {
        let target = tier.clamp_to(self.config.min_quality, self.config.max_quality);
        self.transition_to(target, TransitionReason::Manual, now_ms)
    }

    /// Pin the tier, disabling auto-adjustment, or clear the pin.
    ///
    /// Clearing resumes auto-adjustment (if configured on) from the tier
    /// that was forced.
    pub fn force_quality(&mut self, tier: Option<QualityTier>, now_ms: f64) -> Option<QualityTransition> {
        match tier {
            Some(t) => {
                let target = t.clamp_to(self.config.min_quality, self.config.max_quality);
                self.forced = Some(target);
                self.reset_streaks();
                self.transition_to(target, TransitionReason::Forced, now_ms)
            },
            None => {
                self.forced = None;
                self.reset_streaks();
                None
            },
        }
    }

    pub fn forced_quality(&self) -> Option<QualityTier> {
        self.forced
    }

    /// Feed one observation and possibly step the tier.
    ///
    /// Called once per tick by the scheduler; the scheduler guarantees this
    /// never runs while paused or with zero registered consumers.
    pub fn observe(
        &mut self,
        now_ms: f64,
        budget: &FrameBudgetState,
        profile: &DeviceProfile,
    ) -> Option<QualityTransition> {
        if !self.is_auto_adjusting() {
            return None;
        }

        if budget.is_over_budget {
            self.over_budget_streak += 1;
            self.headroom_streak = 0;
        } else if budget.has_headroom {
            self.headroom_streak += 1;
            self.over_budget_streak = 0;
        } else {
            self.over_budget_streak = 0;
            self.headroom_streak = 0;
        }

        if !self.interval_elapsed(now_ms) {
            return None;
        }

        if let Some(reason) = power_pressure(profile) {
            return self.step_down(reason, now_ms);
        }

        if self.over_budget_streak >= self.config.adjustment_threshold {
            return self.step_down(TransitionReason::OverBudget, now_ms);
        }
        if self.headroom_streak >= self.config.adjustment_threshold {
            return self.step_up(TransitionReason::Headroom, now_ms);
        }
        None
    }

    fn interval_elapsed(&self, now_ms: f64) -> bool {
        match self.last_change_ms {
            Some(last) => now_ms - last >= self.config.min_adjust_interval_ms,
            None => true,
        }
    }

    fn step_down(&mut self, reason: TransitionReason, now_ms: f64) -> Option<QualityTransition> {
        let target = self
            .active
            .step_down()
            .clamp_to(self.config.min_quality, self.config.max_quality);
        let result = self.transition_to(target, reason, now_ms);
        // Already at the floor: drop the streaks anyway so the counter does
        // not wind up unbounded while pressure persists.
        self.reset_streaks();
        result
    }

    fn step_up(&mut self, reason: TransitionReason, now_ms: f64) -> Option<QualityTransition> {
        let target = self
            .active
            .step_up()
            .clamp_to(self.config.min_quality, self.config.max_quality);
        let result = self.transition_to(target, reason, now_ms);
        self.reset_streaks();
        result
    }

    fn transition_to(
        &mut self,
        target: QualityTier,
        reason: TransitionReason,
        now_ms: f64,
    ) -> Option<QualityTransition> {
        if target == self.active {
            return None;
        }
        let transition = QualityTransition {
            from: self.active,
            to: target,
            reason,
            timestamp_ms: now_ms,
        };
        info!(from = %transition.from, to = %transition.to, ?reason, "quality tier changed");
        self.active = target;
        self.quality_changes += 1;
        self.last_change_ms = Some(now_ms);
        self.reset_streaks();
        if self.history.len() == TRANSITION_HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(transition);
        Some(transition)
    }

    fn reset_streaks(&mut self) {
        self.over_budget_streak = 0;
        self.headroom_streak = 0;
    }
}

/// The power condition, if any, that forces an immediate downgrade.
fn power_pressure(profile: &DeviceProfile) -> Option<TransitionReason> {
    if profile.is_thermal_throttled {
        return Some(TransitionReason::ThermalThrottle);
    }
    if profile.is_low_power_mode {
        return Some(TransitionReason::LowPowerMode);
    }
    let discharging = !profile.is_charging.unwrap_or(true);
    if discharging && profile.battery_level.is_some_and(|level| level <= PRESSURE_BATTERY_LEVEL) {
        debug!(level = ?profile.battery_level, "battery pressure downgrade");
        return Some(TransitionReason::BatteryPressure);
    }
    None
}
