use super::*;
use crate::budget::FrameBudgetState;
use crate::device::types::DeviceProfile;
use crate::quality::QualityTier;

fn over_budget() -> FrameBudgetState {
    FrameBudgetState {
        target_ms: 16.67,
        current_ms: 25.0,
        fps: 40.0,
        is_over_budget: true,
        has_headroom: false,
        consecutive_drops: 0,
        dropped_frames: 0,
    }
}

fn headroom() -> FrameBudgetState {
    FrameBudgetState {
        target_ms: 16.67,
        current_ms: 8.0,
        fps: 125.0,
        is_over_budget: false,
        has_headroom: true,
        consecutive_drops: 0,
        dropped_frames: 0,
    }
}

fn steady() -> FrameBudgetState {
    FrameBudgetState {
        target_ms: 16.67,
        current_ms: 14.0,
        fps: 71.4,
        is_over_budget: false,
        has_headroom: false,
        consecutive_drops: 0,
        dropped_frames: 0,
    }
}

fn quick_config() -> ControllerConfig {
    ControllerConfig {
        adjustment_threshold: 3,
        min_adjust_interval_ms: 100.0,
        ..ControllerConfig::default()
    }
}

#[test]
fn overrun_must_persist_before_stepping_down() {
    let mut controller = AdaptiveQualityController::new(QualityTier::High, quick_config());
    let profile = DeviceProfile::default();

    assert!(controller.observe(0.0, &over_budget(), &profile).is_none());
    assert!(controller.observe(16.0, &over_budget(), &profile).is_none());
    let transition = controller.observe(32.0, &over_budget(), &profile).unwrap();
    assert_eq!(transition.from, QualityTier::High);
    assert_eq!(transition.to, QualityTier::Medium);
    assert_eq!(transition.reason, TransitionReason::OverBudget);
    assert_eq!(controller.active(), QualityTier::Medium);
    assert_eq!(controller.quality_changes(), 1);
}

#[test]
fn a_steady_frame_breaks_the_streak() {
    let mut controller = AdaptiveQualityController::new(QualityTier::High, quick_config());
    let profile = DeviceProfile::default();

    assert!(controller.observe(0.0, &over_budget(), &profile).is_none());
    assert!(controller.observe(16.0, &over_budget(), &profile).is_none());
    assert!(controller.observe(32.0, &steady(), &profile).is_none());
    // Streak restarted; two more overruns are not enough.
    assert!(controller.observe(48.0, &over_budget(), &profile).is_none());
    assert!(controller.observe(64.0, &over_budget(), &profile).is_none());
    assert_eq!(controller.active(), QualityTier::High);
}

#[test]
fn headroom_steps_up_one_tier() {
    let mut controller = AdaptiveQualityController::new(QualityTier::Medium, quick_config());
    let profile = DeviceProfile::default();

    for i in 0..2 {
        assert!(controller.observe(f64::from(i) * 16.0, &headroom(), &profile).is_none());
    }
    let transition = controller.observe(48.0, &headroom(), &profile).unwrap();
    assert_eq!(transition.to, QualityTier::High);
    assert_eq!(transition.reason, TransitionReason::Headroom);
}

#[test]
fn step_up_clamps_at_max_quality() {
    let config = ControllerConfig {
        max_quality: QualityTier::Medium,
        ..quick_config()
    };
    let mut controller = AdaptiveQualityController::new(QualityTier::Medium, config);
    let profile = DeviceProfile::default();

    for i in 0..10 {
        controller.observe(f64::from(i) * 16.0, &headroom(), &profile);
    }
    assert_eq!(controller.active(), QualityTier::Medium);
    assert_eq!(controller.quality_changes(), 0);
}

#[test]
fn changes_respect_the_minimum_interval() {
    let mut controller = AdaptiveQualityController::new(QualityTier::Ultra, quick_config());
    let profile = DeviceProfile::default();

    for i in 0..3 {
        controller.observe(f64::from(i), &over_budget(), &profile);
    }
    assert_eq!(controller.active(), QualityTier::High);

    // Plenty of further overruns, but inside the 100ms interval: hold.
    for i in 3..9 {
        assert!(controller.observe(f64::from(i) * 10.0, &over_budget(), &profile).is_none());
    }
    assert_eq!(controller.active(), QualityTier::High);

    // Past the interval the streak has long since met the threshold.
    let transition = controller.observe(200.0, &over_budget(), &profile);
    assert!(transition.is_some());
    assert_eq!(controller.active(), QualityTier::Medium);
}

#[test]
fn thermal_pressure_skips_the_hysteresis() {
    let mut controller = AdaptiveQualityController::new(QualityTier::Ultra, quick_config());
    let mut profile = DeviceProfile::default();
    profile.is_thermal_throttled = true;

    // First observation, no streak at all: still steps down.
    let transition = controller.observe(0.0, &steady(), &profile).unwrap();
    assert_eq!(transition.reason, TransitionReason::ThermalThrottle);
    assert_eq!(controller.active(), QualityTier::High);

    // But the interval gate still applies.
    assert!(controller.observe(50.0, &steady(), &profile).is_none());
    assert!(controller.observe(150.0, &steady(), &profile).is_some());
}

#[test]
fn critical_battery_forces_a_downgrade() {
    let mut controller = AdaptiveQualityController::new(QualityTier::High, quick_config());
    let mut profile = DeviceProfile::default();
    profile.battery_level = Some(PRESSURE_BATTERY_LEVEL);
    profile.is_charging = Some(false);

    let transition = controller.observe(0.0, &steady(), &profile).unwrap();
    assert_eq!(transition.reason, TransitionReason::BatteryPressure);

    // Plugged in, the same level is no longer pressure.
    let mut controller = AdaptiveQualityController::new(QualityTier::High, quick_config());
    profile.is_charging = Some(true);
    assert!(controller.observe(0.0, &steady(), &profile).is_none());
}

#[test]
fn set_quality_is_clamped_and_idempotent() {
    let config = ControllerConfig {
        min_quality: QualityTier::Low,
        max_quality: QualityTier::High,
        ..ControllerConfig::default()
    };
    let mut controller = AdaptiveQualityController::new(QualityTier::Medium, config);

    let transition = controller.set_quality(QualityTier::Ultra, 0.0).unwrap();
    assert_eq!(transition.to, QualityTier::High);
    assert_eq!(transition.reason, TransitionReason::Manual);

    // Same request again: no transition, no counter movement.
    assert!(controller.set_quality(QualityTier::Ultra, 1.0).is_none());
    assert_eq!(controller.quality_changes(), 1);

    let transition = controller.set_quality(QualityTier::Minimal, 2.0).unwrap();
    assert_eq!(transition.to, QualityTier::Low);
}

#[test]
fn forced_quality_disables_auto_adjustment() {
    let mut controller = AdaptiveQualityController::new(QualityTier::High, quick_config());
    let profile = DeviceProfile::default();

    controller.force_quality(Some(QualityTier::Low), 0.0);
    assert!(!controller.is_auto_adjusting());
    assert_eq!(controller.active(), QualityTier::Low);
    assert_eq!(controller.forced_quality(), Some(QualityTier::Low));

    // Sustained overrun does nothing while forced.
    for i in 0..20 {
        assert!(controller
            .observe(200.0 + f64::from(i) * 16.0, &over_budget(), &profile)
            .is_none());
    }
    assert_eq!(controller.active(), QualityTier::Low);

    // Clearing resumes auto-adjustment from the forced tier.
    controller.force_quality(None, 600.0);
    assert!(controller.is_auto_adjusting());
    assert_eq!(controller.active(), QualityTier::Low);
}

#[test]
fn clearing_force_respects_configured_auto_adjust() {
    let config = ControllerConfig {
        auto_adjust: false,
        ..quick_config()
    };
    let mut controller = AdaptiveQualityController::new(QualityTier::High, config);
    controller.force_quality(Some(QualityTier::Medium), 0.0);
    controller.force_quality(None, 1.0);
    assert!(!controller.is_auto_adjusting());
}

#[test]
fn inverted_bounds_are_swapped() {
    let config = ControllerConfig {
        min_quality: QualityTier::High,
        max_quality: QualityTier::Low,
        ..ControllerConfig::default()
    };
    let controller = AdaptiveQualityController::new(QualityTier::Ultra, config);
    assert_eq!(controller.config().min_quality, QualityTier::Low);
    assert_eq!(controller.config().max_quality, QualityTier::High);
    assert_eq!(controller.active(), QualityTier::High);
}

#[test]
fn transitions_land_in_history() {
    let mut controller = AdaptiveQualityController::new(QualityTier::High, quick_config());
    controller.set_quality(QualityTier::Medium, 5.0);
    controller.set_quality(QualityTier::Low, 10.0);

    let history: Vec<_> = controller.history().collect();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].to, QualityTier::Medium);
    assert_eq!(history[1].to, QualityTier::Low);
    assert_eq!(history[1].timestamp_ms, 10.0);
}
