//! The governor facade.
//!
//! [`FrameGovernor`] wires the profiler, the budget tracker, the quality
//! controller, and the animation batcher into one explicit handle. There is
//! deliberately no process-wide shared instance: whichever component
//! constructs the governor owns its lifecycle and hands the handle to
//! consumers.
//!
//! The host drives the governor from its frame clock: one
//! [`tick`](FrameGovernor::tick) per display refresh with the clock's
//! monotonically increasing timestamp. Everything the governor mutates is
//! mutated inside that call or inside an explicit synchronous control call;
//! the only cross-thread state is the device profile's battery fields.
//!
//! A tier change accepted during a tick applies to the *next* tick: dispatch
//! has already happened by the time the controller runs, so a tick always
//! observes a single consistent tier.

use std::time::Instant;

use crate::batcher::{AnimationBatcher, AnimationCallback, RegistrationOptions, TickReport};
use crate::budget::{FrameBudgetState, FrameBudgetTracker};
use crate::controller::{AdaptiveQualityController, QualityTransition};
use crate::device::{DeviceProfile, DeviceProfiler};
use crate::platform::HostPlatform;
use crate::quality::{self, QualitySettings, QualityTier};

mod types;

pub use types::{GovernorConfig, GovernorMetrics};


/// Hook invoked after every accepted quality transition.
pub type QualityChangeHook = Box<dyn FnMut(&QualityTransition) + Send>;

/// Hook invoked when a tick exhausts its frame budget.
pub type BudgetExceededHook = Box<dyn FnMut(&FrameBudgetState) + Send>;

/// The adaptive frame-budget scheduler.
pub struct FrameGovernor {
    profiler: DeviceProfiler,
    tracker: FrameBudgetTracker,
    controller: AdaptiveQualityController,
    batcher: AnimationBatcher,
    visible: bool,
    last_now_ms: f64,
    external_frame_reported: bool,
    quality_hooks: Vec<QualityChangeHook>,
    budget_hooks: Vec<BudgetExceededHook>,
    started: Instant,
}

impl std::fmt::Debug for FrameGovernor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameGovernor")
            .field("quality", &self.controller.active())
            .field("visible", &self.visible)
            .field("paused", &self.batcher.is_paused())
            .field("registered", &self.batcher.len())
            .finish_non_exhaustive()
    }
}

impl FrameGovernor {
    /// Probe the platform and build a governor with default configuration.
    pub fn new(platform: &dyn HostPlatform) -> Self {
        Self::with_config(platform, GovernorConfig::default())
    }

    /// Probe the platform and build a governor.
    ///
    /// The initial tier is the caller's `initial_quality` if given, otherwise
    /// the profile recommendation, in either case clamped into the configured
    /// bounds.
    pub fn with_config(platform: &dyn HostPlatform, config: GovernorConfig) -> Self {
        Self::from_profiler(DeviceProfiler::detect(platform), config)
    }

    /// Build a governor around an existing profiler.
    ///
    /// Useful when the host already runs a battery watch against the
    /// profiler before the render loop starts.
    pub fn from_profiler(profiler: DeviceProfiler, config: GovernorConfig) -> Self {
        let controller_config = config.controller.normalized();
        let initial = config
            .initial_quality
            .unwrap_or_else(|| quality::recommend(&profiler.snapshot()))
            .clamp_to(controller_config.min_quality, controller_config.max_quality);
        let settings = quality::settings_for(initial);

        Self {
            profiler,
            tracker: FrameBudgetTracker::with_window(settings.target_fps, config.window_size),
            controller: AdaptiveQualityController::new(initial, controller_config),
            batcher: AnimationBatcher::new(settings.target_frame_ms()),
            visible: true,
            last_now_ms: 0.0,
            external_frame_reported: false,
            quality_hooks: Vec::new(),
            budget_hooks: Vec::new(),
            started: Instant::now(),
        }
    }

    // ---- snapshots ----

    /// Read-only copy of the device profile.
    pub fn profile(&self) -> DeviceProfile {
        self.profiler.snapshot()
    }

    /// Shared handle to the profiler, for battery watches and power-signal
    /// pushes.
    pub fn profiler(&self) -> &DeviceProfiler {
        &self.profiler
    }

    pub fn current_quality(&self) -> QualityTier {
        self.controller.active()
    }

    /// Render settings for the active tier.
    pub fn current_settings(&self) -> QualitySettings {
        quality::settings_for(self.controller.active())
    }

    pub fn frame_budget_state(&self) -> FrameBudgetState {
        self.tracker.state()
    }

    pub fn metrics(&self) -> GovernorMetrics {
        let batcher = self.batcher.metrics();
        GovernorMetrics {
            frames: batcher.frames,
            fps: self.tracker.fps(),
            dropped_frames: self.tracker.dropped_frames(),
            skipped_updates: batcher.skipped_updates,
            callback_panics: batcher.callback_panics,
            quality_changes: self.controller.quality_changes(),
            current_quality: self.controller.active(),
            uptime_ms: self.started.elapsed().as_secs_f64() * 1000.0,
        }
    }

    /// Recent quality transitions, oldest first.
    pub fn transition_history(&self) -> Vec<QualityTransition> {
        self.controller.history().copied().collect()
    }

    pub fn is_auto_adjusting(&self) -> bool {
        self.controller.is_auto_adjusting()
    }

    pub fn is_paused(&self) -> bool {
        self.batcher.is_paused()
    }

    // ---- imperative controls ----

    /// Set the active tier directly; clamped and idempotent.
    pub fn set_quality(&mut self, tier: QualityTier) {
        if let Some(transition) = self.controller.set_quality(tier, self.last_now_ms) {
            self.apply_transition(transition);
        }
    }

    /// Pin the tier and disable auto-adjustment, or clear the pin.
    pub fn force_quality(&mut self, tier: Option<QualityTier>) {
        if let Some(transition) = self.controller.force_quality(tier, self.last_now_ms) {
            self.apply_transition(transition);
        }
    }

    pub fn forced_quality(&self) -> Option<QualityTier> {
        self.controller.forced_quality()
    }

    /// Enable or disable auto-adjustment without touching the tier.
    pub fn set_auto_adjust(&mut self, enabled: bool) {
        self.controller.set_auto_adjust(enabled);
    }

    /// Stop dispatching frames; the registry survives.
    pub fn pause(&mut self) {
        self.batcher.pause();
    }

    pub fn resume(&mut self) {
        self.batcher.resume();
    }

    /// Visibility signal from the host; a hidden view suspends ticking the
    /// same way `pause` does, without touching the paused flag.
    pub fn set_visible(&mut self, visible: bool) {
        if visible && !self.visible {
            // The hidden span must not become the first delta after unhiding.
            self.batcher.reset_tick_clock();
        }
        self.visible = visible;
    }

    /// Clear the frame window and derived counters; the tier is untouched.
    pub fn reset_metrics(&mut self) {
        self.tracker.reset_metrics();
    }

    // ---- batcher controls ----

    /// Register a per-frame callback under `id`.
    pub fn register(&mut self, id: impl Into<String>, callback: AnimationCallback, options: RegistrationOptions) {
        self.batcher.register(id, callback, options);
    }

    /// Remove a callback; unknown ids are a no-op.
    pub fn unregister(&mut self, id: &str) {
        self.batcher.unregister(id);
    }

    /// Run every registered callback once with a zero delta, ignoring
    /// budget, intervals, and pause state.
    pub fn flush(&mut self) {
        self.batcher.flush();
    }

    /// Empty the registry and zero the batcher counters.
    pub fn clear(&mut self) {
        self.batcher.clear();
    }

    // ---- event hooks ----

    pub fn on_quality_change(&mut self, hook: QualityChangeHook) {
        self.quality_hooks.push(hook);
    }

    pub fn on_budget_exceeded(&mut self, hook: BudgetExceededHook) {
        self.budget_hooks.push(hook);
    }

    // ---- frame clock ----

    /// Drive one frame at host timestamp `now_ms`.
    ///
    /// Dispatches due callbacks within the adaptive budget, feeds the
    /// measured cost back into the tracker, and then lets the controller
    /// consider a tier step. Returns `None` while paused or hidden.
    pub fn tick(&mut self, now_ms: f64) -> Option<TickReport> {
        if !self.visible {
            return None;
        }
        self.last_now_ms = now_ms;

        let report = self.batcher.tick(now_ms)?;
        if self.external_frame_reported {
            // The host measured this frame itself (dispatch included); the
            // tick's own measurement would double-count it.
            self.external_frame_reported = false;
        } else {
            self.tracker.record_frame(report.duration_ms);
            self.batcher.observe_frame(report.duration_ms);
        }

        if report.budget_exhausted {
            let state = self.tracker.state();
            for hook in &mut self.budget_hooks {
                hook(&state);
            }
        }

        // No registered consumers means no quality signal: idle ticks must
        // not drift the tier.
        if !self.batcher.is_empty() {
            let profile = self.profiler.snapshot();
            let state = self.tracker.state();
            if let Some(transition) = self.controller.observe(now_ms, &state, &profile) {
                self.apply_transition(transition);
            }
        }

        Some(report)
    }

    /// Report an externally measured frame cost.
    ///
    /// For hosts that measure the whole frame themselves (rendering plus
    /// dispatch). A tick following such a report skips its own dispatch
    /// measurement to avoid counting the frame twice. Does not trigger
    /// adjustment by itself; the controller only acts inside `tick`.
    pub fn record_frame(&mut self, duration_ms: f64) {
        self.tracker.record_frame(duration_ms);
        self.batcher.observe_frame(duration_ms);
        self.external_frame_reported = true;
    }

    fn apply_transition(&mut self, transition: QualityTransition) {
        let settings = quality::settings_for(transition.to);
        self.tracker.set_target_fps(settings.target_fps);
        self.batcher.set_nominal_budget(settings.target_frame_ms());
        for hook in &mut self.quality_hooks {
            hook(&transition);
        }
    }
}
