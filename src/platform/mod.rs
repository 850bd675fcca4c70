//! Host platform seam.
//!
//! Every platform query the governor depends on goes through the
//! [`HostPlatform`] trait: graphics adapter identification, memory and core
//! counts, viewport geometry, power signals. Hosts embed the governor by
//! implementing this trait over whatever their environment provides (a browser
//! bridge, a native windowing layer, a test double). All methods return
//! `Result`; the device profiler is the recovery boundary and converts any
//! failure into a conservative default, so a broken probe can never take the
//! render loop down with it.

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identification strings and capability flags for the host's graphics adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphicsAdapter {
    /// Adapter vendor string as reported by the graphics context
    pub vendor: String,
    /// Renderer string as reported by the graphics context
    pub renderer: String,
    /// Whether the second-generation graphics API is available
    pub supports_second_gen_api: bool,
    /// Whether float textures are supported
    pub supports_float_textures: bool,
}

/// A point-in-time battery reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatterySnapshot {
    /// Charge level in `0.0..=1.0`
    pub level: f64,
    /// Whether the device is currently charging
    pub charging: bool,
}

/// Platform queries consumed by the device profiler.
///
/// Synchronous for everything that can be answered immediately; battery state
/// is asynchronous because the platforms that expose it do so behind a
/// promise-shaped API.
#[automock]
#[async_trait]
pub trait HostPlatform: Send + Sync {
    /// Query the graphics context for adapter identity and capabilities.
    fn graphics_adapter(&self) -> Result<GraphicsAdapter>;

    /// Installed device memory in gigabytes.
    fn device_memory_gb(&self) -> Result<f64>;

    /// Number of logical cores available to the client.
    fn hardware_concurrency(&self) -> Result<u32>;

    /// Current viewport size in physical pixels, `(width, height)`.
    fn viewport(&self) -> Result<(u32, u32)>;

    /// Device pixel ratio of the active screen.
    fn screen_density(&self) -> Result<f64>;

    /// Whether the OS reports a low-power / battery-saver mode.
    fn is_low_power_mode(&self) -> Result<bool>;

    /// Resolve the current battery state, if the host exposes one.
    async fn battery(&self) -> Result<BatterySnapshot>;
}

/// A platform with no graphics context and no power signals.
///
/// Useful for tests and for server-side rendering hosts: the profiler falls
/// back to its conservative defaults for everything this type cannot answer.
#[derive(Debug, Default, Clone)]
pub struct HeadlessPlatform;

#[async_trait]
impl HostPlatform for HeadlessPlatform {
    fn graphics_adapter(&self) -> Result<GraphicsAdapter> {
        Err(Error::not_available("no graphics context"))
    }

    fn device_memory_gb(&self) -> Result<f64> {
        Err(Error::not_available("device memory not reported"))
    }

    fn hardware_concurrency(&self) -> Result<u32> {
        std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .map_err(|e| Error::probe_failed(e.to_string()))
    }

    fn viewport(&self) -> Result<(u32, u32)> {
        Err(Error::not_available("no viewport"))
    }

    fn screen_density(&self) -> Result<f64> {
        Err(Error::not_available("no screen"))
    }

    fn is_low_power_mode(&self) -> Result<bool> {
        Ok(false)
    }

    async fn battery(&self) -> Result<BatterySnapshot> {
        Err(Error::not_available("battery API not supported"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_platform_has_no_adapter() {
        let platform = HeadlessPlatform;
        assert!(matches!(platform.graphics_adapter(), Err(Error::NotAvailable(_))));
        assert!(matches!(platform.screen_density(), Err(Error::NotAvailable(_))));
    }

    #[test]
    fn headless_platform_reports_cores() {
        let platform = HeadlessPlatform;
        assert!(platform.hardware_concurrency().unwrap() >= 1);
    }

    #[tokio::test]
    async fn headless_platform_has_no_battery() {
        let platform = HeadlessPlatform;
        assert!(platform.battery().await.is_err());
    }

    #[test]
    fn mock_platform_serves_adapter() {
        let mut mock = MockHostPlatform::new();
        mock.expect_graphics_adapter().returning(|| {
            Ok(GraphicsAdapter {
                vendor: "Apple Inc.".to_string(),
                renderer: "Apple M2".to_string(),
                supports_second_gen_api: true,
                supports_float_textures: true,
            })
        });
        let adapter = mock.graphics_adapter().unwrap();
        assert_eq!(adapter.vendor, "Apple Inc.");
        assert!(adapter.supports_second_gen_api);
    }
}
