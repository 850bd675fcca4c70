//! Device profiler.
//!
//! One-shot detection of host capability with asynchronous battery refresh.
//! Detection never fails: every [`HostPlatform`] probe that errors is recovered
//! here to a conservative default, so the caller always gets a usable
//! [`DeviceProfile`]. GPU classification works off renderer/vendor substring
//! heuristics, the same way capability scoring sites classify mobile adapters.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::debug;

use crate::platform::HostPlatform;

pub mod types;

pub use types::{DeviceProfile, GpuTier};


/// Sentinel vendor/renderer string used when no graphics context exists.
pub const UNKNOWN_ADAPTER: &str = "unavailable";

/// Viewport assumed when the platform reports none.
pub const DEFAULT_VIEWPORT: (u32, u32) = (1280, 720);

/// Renderer substrings that mark known low-end adapters.
const LOW_END_RENDERERS: &[&str] = &[
    "mali-4",
    "mali-t",
    "adreno 3",
    "adreno 4",
    "adreno 5",
    "powervr",
    "sgx",
    "videocore",
    "intel hd",
    "swiftshader",
    "llvmpipe",
];

/// Renderer substrings that mark known flagship adapters.
const FLAGSHIP_RENDERERS: &[&str] = &[
    "apple a1",
    "apple m",
    "apple gpu",
    "adreno 7",
    "mali-g7",
    "mali-g8",
    "immortalis",
    "geforce rtx",
    "radeon rx",
];

/// Memory estimate used when the platform does not report `device_memory_gb`.
pub(crate) fn fallback_memory_gb(tier: GpuTier) -> f64 {
    match tier {
        GpuTier::High => 8.0,
        GpuTier::Medium => 4.0,
        GpuTier::Low | GpuTier::Unknown => 2.0,
    }
}

/// Core-count estimate used when the platform does not report concurrency.
pub(crate) fn fallback_cores(tier: GpuTier) -> u32 {
    match tier {
        GpuTier::High => 8,
        GpuTier::Medium => 4,
        GpuTier::Low | GpuTier::Unknown => 2,
    }
}

/// Classify an adapter by vendor/renderer substrings.
///
/// Low-end matches win over flagship matches so that e.g. a "Mali-T" part
/// inside a longer string is never promoted.
fn classify_adapter(vendor: &str, renderer: &str) -> GpuTier {
    let haystack = format!("{} {}", vendor.to_lowercase(), renderer.to_lowercase());
    if LOW_END_RENDERERS.iter().any(|s| haystack.contains(s)) {
        return GpuTier::Low;
    }
    if FLAGSHIP_RENDERERS.iter().any(|s| haystack.contains(s)) {
        return GpuTier::High;
    }
    GpuTier::Medium
}

/// Owns the detected [`DeviceProfile`] and its dynamic power signals.
///
/// Cloning is cheap and shares the underlying profile, which is how the
/// battery watch pushes updates while the render loop reads snapshots.
#[derive(Debug, Clone)]
pub struct DeviceProfiler {
    profile: Arc<RwLock<DeviceProfile>>,
}

impl Default for DeviceProfiler {
    fn default() -> Self {
        Self {
            profile: Arc::new(RwLock::new(DeviceProfile::default())),
        }
    }
}

impl DeviceProfiler {
    /// Probe the platform and build the initial profile.
    ///
    /// Never fails: each probe error is logged and replaced with a
    /// conservative default. Battery state starts out as `None`; call
    /// [`refresh_battery`](Self::refresh_battery) or attach a
    /// [`BatteryWatch`] to populate it.
    pub fn detect(platform: &dyn HostPlatform) -> Self {
        let (gpu_tier, vendor, renderer, second_gen, float_tex) = match platform.graphics_adapter() {
            Ok(adapter) => {
                let tier = classify_adapter(&adapter.vendor, &adapter.renderer);
                (
                    tier,
                    adapter.vendor,
                    adapter.renderer,
                    adapter.supports_second_gen_api,
                    adapter.supports_float_textures,
                )
            },
            Err(e) => {
                debug!(error = %e, "graphics adapter probe failed, classifying as unknown");
                (
                    GpuTier::Unknown,
                    UNKNOWN_ADAPTER.to_string(),
                    UNKNOWN_ADAPTER.to_string(),
                    false,
                    false,
                )
            },
        };

        let memory_gb = platform.device_memory_gb().unwrap_or_else(|e| {
            debug!(error = %e, "device memory unreported, using tier estimate");
            fallback_memory_gb(gpu_tier)
        });
        let cores = platform.hardware_concurrency().unwrap_or_else(|e| {
            debug!(error = %e, "core count unreported, using tier estimate");
            fallback_cores(gpu_tier)
        });
        let (viewport_width, viewport_height) = platform.viewport().unwrap_or(DEFAULT_VIEWPORT);
        let screen_density = platform.screen_density().unwrap_or(1.0);
        let is_low_power_mode = platform.is_low_power_mode().unwrap_or(false);

        let profile = DeviceProfile {
            gpu_tier,
            gpu_vendor: vendor,
            gpu_renderer: renderer,
            supports_second_gen_api: second_gen,
            supports_float_textures: float_tex,
            memory_gb,
            cores,
            viewport_width,
            viewport_height,
            screen_density,
            battery_level: None,
            is_charging: None,
            is_thermal_throttled: false,
            is_low_power_mode,
        };

        debug!(
            gpu = %profile.gpu_tier,
            renderer = %profile.gpu_renderer,
            memory_gb = profile.memory_gb,
            cores = profile.cores,
            "device profile detected"
        );

        Self {
            profile: Arc::new(RwLock::new(profile)),
        }
    }

    /// Read-only copy of the current profile.
    pub fn snapshot(&self) -> DeviceProfile {
        self.profile.read().clone()
    }

    /// Push a battery reading into the profile.
    ///
    /// `level` is clamped into `0.0..=1.0`.
    pub fn update_battery(&self, level: f64, charging: bool) {
        let mut profile = self.profile.write();
        profile.battery_level = Some(level.clamp(0.0, 1.0));
        profile.is_charging = Some(charging);
    }

    /// Flag or clear thermal throttling.
    pub fn set_thermal_throttled(&self, throttled: bool) {
        self.profile.write().is_thermal_throttled = throttled;
    }

    /// Flag or clear OS low-power mode.
    pub fn set_low_power_mode(&self, enabled: bool) {
        self.profile.write().is_low_power_mode = enabled;
    }

    /// Query the platform's battery API once and fold the result in.
    ///
    /// A missing or failing battery API leaves the battery fields untouched
    /// (`None` if never populated) instead of erroring.
    pub async fn refresh_battery(&self, platform: &dyn HostPlatform) {
        match platform.battery().await {
            Ok(snapshot) => self.update_battery(snapshot.level, snapshot.charging),
            Err(e) => debug!(error = %e, "battery probe failed, leaving battery state as-is"),
        }
    }

    /// Start a periodic battery refresh task.
    ///
    /// Stands in for the platform's battery change events on hosts that only
    /// expose a polling API. The returned [`BatteryWatch`] cancels the task
    /// when dropped.
    pub fn watch_battery(&self, platform: Arc<dyn HostPlatform>, interval: Duration) -> BatteryWatch {
        let profiler = self.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                profiler.refresh_battery(platform.as_ref()).await;
            }
        });
        BatteryWatch { handle }
    }
}

/// Handle to a running battery refresh task; aborts the task on drop.
#[derive(Debug)]
pub struct BatteryWatch {
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for BatteryWatch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
