//! Quality tier model.
//!
//! Maps the five ordered tiers to concrete render settings and computes an
//! advisory tier recommendation from a device profile. The recommendation
//! seeds the initial tier on startup; live adjustment is driven by the
//! [`controller`](crate::controller) instead.

use once_cell::sync::Lazy;

use crate::device::types::{DeviceProfile, GpuTier};

mod types;

pub use types::{QualitySettings, QualityTier};


/// Score contribution of the GPU tier, out of [`SCORE_MAX`].
pub const SCORE_GPU_HIGH: f64 = 45.0;
pub const SCORE_GPU_MEDIUM: f64 = 28.0;
pub const SCORE_GPU_LOW: f64 = 12.0;
/// An unidentified GPU scores between the low and medium buckets.
pub const SCORE_GPU_UNKNOWN: f64 = 18.0;
/// Maximum contribution of installed memory.
pub const SCORE_MEMORY_MAX: f64 = 30.0;
/// Maximum contribution of logical core count.
pub const SCORE_CORES_MAX: f64 = 25.0;
pub const SCORE_MAX: f64 = 100.0;

/// Penalty applied when the battery is below [`BATTERY_LOW_FRACTION`] and not
/// charging. Empirically chosen; override by adjusting the recommendation's
/// inputs, not by re-deriving the weight.
pub const PENALTY_BATTERY_LOW: f64 = 15.0;
pub const PENALTY_THERMAL_THROTTLE: f64 = 30.0;
pub const PENALTY_LOW_POWER_MODE: f64 = 20.0;
pub const PENALTY_HIGH_DENSITY: f64 = 5.0;

/// Battery fraction below which the discharge penalty applies.
pub const BATTERY_LOW_FRACTION: f64 = 0.5;
/// Screen densities above this many device pixels per CSS pixel cost score.
pub const HIGH_DENSITY_THRESHOLD: f64 = 3.0;

/// Memory and core counts at or above these saturate their score buckets.
const MEMORY_SATURATION_GB: f64 = 8.0;
const CORES_SATURATION: f64 = 8.0;

static TIER_SETTINGS: Lazy<[QualitySettings; 5]> = Lazy::new(|| {
    [
        QualitySettings {
            quality: QualityTier::Minimal,
            resolution_scale: 0.5,
            target_fps: 30.0,
            shadows: false,
            reflections: false,
            particles: false,
            post_processing: false,
            antialiasing: false,
            antialiasing_level: 0,
        },
        QualitySettings {
            quality: QualityTier::Low,
            resolution_scale: 0.7,
            target_fps: 30.0,
            shadows: false,
            reflections: false,
            particles: false,
            post_processing: false,
            antialiasing: false,
            antialiasing_level: 0,
        },
        QualitySettings {
            quality: QualityTier::Medium,
            resolution_scale: 0.85,
            target_fps: 60.0,
            shadows: true,
            reflections: false,
            particles: true,
            post_processing: false,
            antialiasing: true,
            antialiasing_level: 2,
        },
        QualitySettings {
            quality: QualityTier::High,
            resolution_scale: 1.0,
            target_fps: 60.0,
            shadows: true,
            reflections: false,
            particles: true,
            post_processing: true,
            antialiasing: true,
            antialiasing_level: 4,
        },
        QualitySettings {
            quality: QualityTier::Ultra,
            resolution_scale: 1.0,
            target_fps: 60.0,
            shadows: true,
            reflections: true,
            particles: true,
            post_processing: true,
            antialiasing: true,
            antialiasing_level: 8,
        },
    ]
});

/// Look up the render settings for a tier.
pub fn settings_for(tier: QualityTier) -> QualitySettings {
    TIER_SETTINGS[tier as usize]
}

/// Composite 0–100 capability score for a device profile.
///
/// Weighted hardware signals (GPU tier, memory, cores) minus penalties for
/// power pressure and very dense screens. Exposed separately from
/// [`recommend`] so hosts can log or display the raw score.
pub fn capability_score(profile: &DeviceProfile) -> f64 {
    let gpu = match profile.gpu_tier {
        GpuTier::High => SCORE_GPU_HIGH,
        GpuTier::Medium => SCORE_GPU_MEDIUM,
        GpuTier::Low => SCORE_GPU_LOW,
        GpuTier::Unknown => SCORE_GPU_UNKNOWN,
    };
    let memory = (profile.memory_gb.min(MEMORY_SATURATION_GB) / MEMORY_SATURATION_GB) * SCORE_MEMORY_MAX;
    let cores = (f64::from(profile.cores).min(CORES_SATURATION) / CORES_SATURATION) * SCORE_CORES_MAX;

    let mut score = gpu + memory + cores;

    let discharging = !profile.is_charging.unwrap_or(true);
    if discharging && profile.battery_level.is_some_and(|level| level < BATTERY_LOW_FRACTION) {
        score -= PENALTY_BATTERY_LOW;
    }
    if profile.is_thermal_throttled {
        score -= PENALTY_THERMAL_THROTTLE;
    }
    if profile.is_low_power_mode {
        score -= PENALTY_LOW_POWER_MODE;
    }
    if profile.screen_density > HIGH_DENSITY_THRESHOLD {
        score -= PENALTY_HIGH_DENSITY;
    }

    score.clamp(0.0, SCORE_MAX)
}

/// Advisory tier recommendation for a device profile.
///
/// Score bands: ≥80 ultra, ≥60 high, ≥40 medium, ≥20 low, else minimal.
pub fn recommend(profile: &DeviceProfile) -> QualityTier {
    match capability_score(profile) {
        s if s >= 80.0 => QualityTier::Ultra,
        s if s >= 60.0 => QualityTier::High,
        s if s >= 40.0 => QualityTier::Medium,
        s if s >= 20.0 => QualityTier::Low,
        _ => QualityTier::Minimal,
    }
}
