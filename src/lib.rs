//! Frame Governor - adaptive frame-budget scheduling for animated clients
//!
//! This crate keeps an animated view responsive on hardware it cannot choose:
//! it profiles the host device, tracks what every frame actually costs,
//! selects one of five visual-quality tiers with hysteresis, and dispatches
//! registered per-frame callbacks by priority inside a hard per-frame time
//! budget. When the device cannot keep up, the experience degrades one tier
//! at a time instead of janking.
//!
//! # Components
//!
//! - **[`device`]**: one-shot capability detection (GPU class, memory, cores,
//!   screen) with asynchronous battery/thermal refresh
//! - **[`quality`]**: the static tier table and the advisory recommendation
//!   that seeds the starting tier
//! - **[`budget`]**: rolling-window accounting of observed frame durations
//! - **[`controller`]**: the hysteresis state machine that steps the tier
//! - **[`batcher`]**: the priority dispatch loop that enforces the budget
//! - **[`scheduler`]**: [`FrameGovernor`](scheduler::FrameGovernor), the
//!   explicit handle wiring it all together
//!
//! # Examples
//!
//! ```rust
//! use frame_governor::prelude::*;
//!
//! let mut governor = FrameGovernor::new(&HeadlessPlatform);
//! governor.register(
//!     "avatar",
//!     Box::new(|delta_ms| {
//!         let _ = delta_ms; // advance the avatar animation
//!     }),
//!     RegistrationOptions::with_priority(Priority::Critical),
//! );
//!
//! // Host frame clock: one tick per display refresh.
//! governor.tick(0.0);
//! governor.tick(16.7);
//!
//! let settings = governor.current_settings();
//! assert!(settings.resolution_scale > 0.0 && settings.resolution_scale <= 1.0);
//! ```
//!
//! # Error Handling
//!
//! There are no fatal errors in this crate. Platform probes return
//! [`Result`] and every failure is recovered at the profiler boundary to a
//! conservative default (`unknown` GPU tier, `None` battery, low memory/core
//! estimates); invalid configuration is clamped rather than rejected; a
//! panicking animation callback is contained and logged without aborting the
//! frame.
//!
//! # Concurrency
//!
//! The governor runs on a single cooperative timeline: all mutation happens
//! inside [`tick`](scheduler::FrameGovernor::tick) or an explicit control
//! call. The one exception is the device profile's power fields, which a
//! battery watch may update from another task; they sit behind a lock inside
//! [`DeviceProfiler`](device::DeviceProfiler) and every reader gets a
//! consistent snapshot.

pub mod error;

pub mod batcher;
pub mod budget;
pub mod controller;
pub mod device;
pub mod platform;
pub mod quality;
pub mod scheduler;

pub use error::{Error, Result};

/// Re-export of the types most hosts need.
pub mod prelude {
    pub use crate::batcher::{BatcherMetrics, Priority, RegistrationOptions};
    pub use crate::budget::FrameBudgetState;
    pub use crate::controller::{ControllerConfig, QualityTransition, TransitionReason};
    pub use crate::device::{DeviceProfile, DeviceProfiler, GpuTier};
    pub use crate::error::{Error, Result};
    pub use crate::platform::{BatterySnapshot, GraphicsAdapter, HeadlessPlatform, HostPlatform};
    pub use crate::quality::{recommend, settings_for, QualitySettings, QualityTier};
    pub use crate::scheduler::{FrameGovernor, GovernorConfig, GovernorMetrics};
}
