use serde::{Deserialize, Serialize};

/// Coarse classification of the host's graphics processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GpuTier {
    High,
    Medium,
    Low,
    /// No graphics context, or the adapter could not be classified
    Unknown,
}

impl GpuTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for GpuTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of detected device capability.
///
/// The static fields are computed once by
/// [`DeviceProfiler::detect`](crate::device::DeviceProfiler::detect) and are
/// read-only thereafter; the power fields (`battery_level`, `is_charging`,
/// `is_thermal_throttled`, `is_low_power_mode`) are refreshed asynchronously
/// through the profiler's narrow mutation API. Callers always receive a copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub gpu_tier: GpuTier,
    pub gpu_vendor: String,
    pub gpu_renderer: String,
    pub supports_second_gen_api: bool,
    pub supports_float_textures: bool,
    /// Installed memory in gigabytes; tier-derived estimate when the platform
    /// does not report it
    pub memory_gb: f64,
    /// Logical core count; tier-derived estimate when unreported
    pub cores: u32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Device pixels per CSS pixel
    pub screen_density: f64,
    /// Charge fraction in `0.0..=1.0`, `None` when no battery API is available
    pub battery_level: Option<f64>,
    /// `None` when no battery API is available
    pub is_charging: Option<bool>,
    pub is_thermal_throttled: bool,
    pub is_low_power_mode: bool,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            gpu_tier: GpuTier::Unknown,
            gpu_vendor: super::UNKNOWN_ADAPTER.to_string(),
            gpu_renderer: super::UNKNOWN_ADAPTER.to_string(),
            supports_second_gen_api: false,
            supports_float_textures: false,
            memory_gb: super::fallback_memory_gb(GpuTier::Unknown),
            cores: super::fallback_cores(GpuTier::Unknown),
            viewport_width: super::DEFAULT_VIEWPORT.0,
            viewport_height: super::DEFAULT_VIEWPORT.1,
            screen_density: 1.0,
            battery_level: None,
            is_charging: None,
            is_thermal_throttled: false,
            is_low_power_mode: false,
        }
    }
}
