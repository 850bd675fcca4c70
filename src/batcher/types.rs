use serde::{Deserialize, Serialize};

/// Dispatch priority for a registered callback.
///
/// Higher classes run earlier within a tick; `Critical` entries are the only
/// ones still attempted once the frame budget is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Normal,
    Low,
    Idle,
}

impl Priority {
    /// Sort weight; descending weight is dispatch order.
    pub const fn weight(self) -> u8 {
        match self {
            Self::Critical => 5,
            Self::High => 4,
            Self::Normal => 3,
            Self::Low => 2,
            Self::Idle => 1,
        }
    }

    /// Default re-run interval for the class, in milliseconds.
    ///
    /// Latency-sensitive classes run every tick; background classes default
    /// to a coarser cadence so they never crowd a tight frame.
    pub const fn default_min_interval_ms(self) -> f64 {
        match self {
            Self::Critical | Self::High | Self::Normal => 0.0,
            Self::Low => 33.0,
            Self::Idle => 250.0,
        }
    }
}

/// Per-registration options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationOptions {
    pub priority: Option<Priority>,
    /// Minimum time between runs; defaults per priority class when `None`
    pub min_interval_ms: Option<f64>,
}

impl RegistrationOptions {
    pub fn with_priority(priority: Priority) -> Self {
        Self {
            priority: Some(priority),
            min_interval_ms: None,
        }
    }

    #[must_use]
    pub fn min_interval_ms(mut self, interval_ms: f64) -> Self {
        self.min_interval_ms = Some(interval_ms);
        self
    }
}

/// Counters accumulated by the batcher since construction or `clear()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatcherMetrics {
    /// Ticks dispatched
    pub frames: u64,
    /// Callback runs completed (panicking runs included)
    pub runs: u64,
    /// Entries skipped because the budget was exhausted
    pub skipped_updates: u64,
    /// Callback runs that panicked and were contained
    pub callback_panics: u64,
}

/// Outcome of one tick, handed back to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Wall time the dispatch took, in milliseconds
    pub duration_ms: f64,
    /// Delta handed to callbacks this tick, in milliseconds
    pub delta_ms: f64,
    /// Callbacks run this tick
    pub ran: usize,
    /// Callbacks skipped for budget this tick
    pub skipped: usize,
    /// Whether the budget ran out before the dispatch list did
    pub budget_exhausted: bool,
}
