use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use frame_governor::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A 60fps-capable governor with fast adjustment for test purposes.
fn responsive_governor() -> FrameGovernor {
    init_tracing();
    let config = GovernorConfig {
        initial_quality: Some(QualityTier::High),
        controller: ControllerConfig {
            adjustment_threshold: 30,
            min_adjust_interval_ms: 500.0,
            ..ControllerConfig::default()
        },
        ..GovernorConfig::default()
    };
    FrameGovernor::with_config(&HeadlessPlatform, config)
}

#[test]
fn critical_work_always_precedes_low_priority_work() {
    let mut governor = responsive_governor();
    let order = Arc::new(Mutex::new(Vec::new()));

    let log = order.clone();
    governor.register(
        "background-sparkles",
        Box::new(move |_| log.lock().push("low")),
        RegistrationOptions::with_priority(Priority::Low),
    );
    let log = order.clone();
    governor.register(
        "avatar-pose",
        Box::new(move |_| log.lock().push("critical")),
        RegistrationOptions::with_priority(Priority::Critical),
    );

    governor.tick(0.0);

    let order = order.lock();
    let critical_index = order.iter().position(|s| *s == "critical").unwrap();
    let low_index = order.iter().position(|s| *s == "low").unwrap();
    assert!(critical_index <= low_index);
}

#[test]
fn sustained_overrun_never_raises_the_tier() {
    let mut governor = responsive_governor();
    governor.register("anim", Box::new(|_| {}), RegistrationOptions::default());
    assert_eq!(governor.current_quality(), QualityTier::High);

    // 35 consecutive 40ms frames: over budget at High (16.67ms) and still
    // over budget after the step down to Medium (33.33ms).
    for i in 0..35 {
        governor.record_frame(40.0);
        governor.tick(f64::from(i) * 25.0);
    }
    assert!(governor.current_quality() <= QualityTier::High);

    // And with the hysteresis threshold met, it has actually stepped down.
    let state = governor.frame_budget_state();
    assert!(state.is_over_budget);
    assert!(governor.current_quality() < QualityTier::High);
}

#[test]
fn recovery_steps_back_up_after_headroom() {
    let mut governor = responsive_governor();
    governor.register("anim", Box::new(|_| {}), RegistrationOptions::default());
    governor.set_quality(QualityTier::Medium);

    let mut now = 0.0;
    // Fast frames: 4ms against a 16.67ms budget is comfortable headroom.
    for _ in 0..80 {
        now += 16.0;
        governor.record_frame(4.0);
        governor.tick(now);
    }
    assert!(governor.current_quality() > QualityTier::Medium);
}

#[test]
fn min_interval_is_honored_across_ticks() {
    let mut governor = responsive_governor();
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    governor.register(
        "blink",
        Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
        RegistrationOptions::with_priority(Priority::Normal).min_interval_ms(100.0),
    );

    governor.tick(0.0);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    governor.tick(16.0);
    assert_eq!(runs.load(Ordering::SeqCst), 1, "must not re-run at t=16");
    governor.tick(100.0);
    assert_eq!(runs.load(Ordering::SeqCst), 2, "must re-run at t=100");
}

#[test]
fn flush_settles_every_callback_exactly_once() {
    let mut governor = responsive_governor();
    let a = Arc::new(AtomicUsize::new(0));
    let b = Arc::new(AtomicUsize::new(0));

    let counter = a.clone();
    governor.register(
        "a",
        Box::new(move |delta| {
            assert_eq!(delta, 0.0);
            counter.fetch_add(1, Ordering::SeqCst);
        }),
        RegistrationOptions::with_priority(Priority::Idle).min_interval_ms(60_000.0),
    );
    let counter = b.clone();
    governor.register(
        "b",
        Box::new(move |delta| {
            assert_eq!(delta, 0.0);
            counter.fetch_add(1, Ordering::SeqCst);
        }),
        RegistrationOptions::with_priority(Priority::Critical),
    );

    governor.pause();
    governor.flush();
    assert_eq!(a.load(Ordering::SeqCst), 1);
    assert_eq!(b.load(Ordering::SeqCst), 1);
}

#[test]
fn forced_quality_survives_any_pressure() {
    let mut governor = responsive_governor();
    governor.register("anim", Box::new(|_| {}), RegistrationOptions::default());

    governor.force_quality(Some(QualityTier::Ultra));
    governor.profiler().set_thermal_throttled(true);
    governor.profiler().update_battery(0.05, false);

    let mut now = 0.0;
    for _ in 0..100 {
        now += 25.0;
        governor.record_frame(40.0);
        governor.tick(now);
    }
    assert_eq!(governor.current_quality(), QualityTier::Ultra);
    assert!(!governor.is_auto_adjusting());

    // Clearing the pin re-enables the machinery; thermal pressure now bites.
    governor.force_quality(None);
    governor.tick(now + 25.0);
    assert!(governor.current_quality() < QualityTier::Ultra);
}

#[test]
fn weak_and_strong_profiles_recommend_sensibly() {
    let weak = DeviceProfile {
        gpu_tier: GpuTier::Unknown,
        memory_gb: 1.0,
        cores: 2,
        ..DeviceProfile::default()
    };
    assert!(frame_governor::quality::recommend(&weak) <= QualityTier::Low);

    let strong = DeviceProfile {
        gpu_tier: GpuTier::High,
        memory_gb: 8.0,
        cores: 8,
        battery_level: Some(0.9),
        is_charging: Some(true),
        ..DeviceProfile::default()
    };
    assert!(frame_governor::quality::recommend(&strong) >= QualityTier::High);
}

#[test]
fn snapshots_serialize_for_telemetry() {
    let governor = responsive_governor();

    let profile = serde_json::to_value(governor.profile()).unwrap();
    assert_eq!(profile["gpu_tier"], "unknown");

    let settings = serde_json::to_value(governor.current_settings()).unwrap();
    assert_eq!(settings["quality"], "high");

    let metrics = serde_json::to_value(governor.metrics()).unwrap();
    assert_eq!(metrics["frames"], 0);
}

#[test]
fn quality_transitions_reach_subscribers_with_reasons() {
    let mut governor = responsive_governor();
    governor.register("anim", Box::new(|_| {}), RegistrationOptions::default());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    governor.on_quality_change(Box::new(move |transition| {
        sink.lock().push((transition.from, transition.to, transition.reason));
    }));

    governor.profiler().set_low_power_mode(true);
    governor.tick(0.0);

    let seen = seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, QualityTier::High);
    assert_eq!(seen[0].1, QualityTier::Medium);
    assert_eq!(seen[0].2, TransitionReason::LowPowerMode);
}

#[tokio::test]
async fn battery_watch_drives_the_profile_end_to_end() {
    init_tracing();
    let profiler = DeviceProfiler::detect(&HeadlessPlatform);
    assert_eq!(profiler.snapshot().battery_level, None);

    profiler.update_battery(0.15, false);
    let governor = FrameGovernor::from_profiler(profiler.clone(), GovernorConfig::default());
    assert_eq!(governor.profile().battery_level, Some(0.15));
}
