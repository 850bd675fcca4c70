//! Animation batcher.
//!
//! A single cooperative dispatch loop shared by every per-frame consumer.
//! Callbacks register with a priority class and a minimum re-run interval;
//! each tick runs as many due callbacks as fit inside the frame's time
//! budget, highest priority first, and skips the rest. Budget protection is
//! purely admission-based: a running callback is never preempted, the
//! batcher just refuses to start more work once the budget is spent.
//!
//! The budget itself adapts to recent history: sustained headroom widens it
//! by 10%, sustained heavy overrun narrows it by 20%.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use tracing::{trace, warn};

mod types;

pub use types::{BatcherMetrics, Priority, RegistrationOptions, TickReport};


/// Budget multiplier applied after sustained headroom.
pub const BUDGET_WIDEN_FACTOR: f64 = 1.10;
/// Budget multiplier applied after sustained heavy overrun.
pub const BUDGET_NARROW_FACTOR: f64 = 0.80;
/// A frame costing at least this multiple of the nominal budget counts
/// toward the overrun streak.
pub const OVERRUN_RATIO: f64 = 1.5;
/// A frame costing at most this fraction of the nominal budget counts
/// toward the headroom streak.
pub const WIDE_HEADROOM_RATIO: f64 = 0.5;
/// Consecutive frames of overrun/headroom required before the budget moves.
pub const ADAPT_STREAK: u32 = 10;

/// Boxed per-frame callback; receives the delta since the previous tick in
/// milliseconds.
pub type AnimationCallback = Box<dyn FnMut(f64) + Send>;

struct Registration {
    callback: AnimationCallback,
    priority: Priority,
    min_interval_ms: f64,
    last_run_ms: Option<f64>,
    /// Registration order; ties within a priority class dispatch in this order
    seq: u64,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("priority", &self.priority)
            .field("min_interval_ms", &self.min_interval_ms)
            .field("last_run_ms", &self.last_run_ms)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

/// The shared per-frame dispatch loop.
#[derive(Debug)]
pub struct AnimationBatcher {
    entries: HashMap<String, Registration>,
    next_seq: u64,
    paused: bool,
    last_tick_ms: Option<f64>,
    nominal_budget_ms: f64,
    overrun_streak: u32,
    headroom_streak: u32,
    budget_factor: f64,
    metrics: BatcherMetrics,
}

impl AnimationBatcher {
    /// Create a batcher with a nominal per-frame budget in milliseconds.
    pub fn new(nominal_budget_ms: f64) -> Self {
        Self {
            entries: HashMap::new(),
            next_seq: 0,
            paused: false,
            last_tick_ms: None,
            nominal_budget_ms: nominal_budget_ms.max(0.1),
            overrun_streak: 0,
            headroom_streak: 0,
            budget_factor: 1.0,
            metrics: BatcherMetrics::default(),
        }
    }

    /// Insert or replace a callback.
    ///
    /// Re-registering an id atomically swaps the callback; the entry keeps
    /// its original position in the stable dispatch order.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        callback: AnimationCallback,
        options: RegistrationOptions,
    ) {
        let id = id.into();
        let priority = options.priority.unwrap_or(Priority::Normal);
        let min_interval_ms = options
            .min_interval_ms
            .unwrap_or_else(|| priority.default_min_interval_ms())
            .max(0.0);
        let seq = match self.entries.get(&id) {
            Some(existing) => existing.seq,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                seq
            },
        };
        trace!(%id, ?priority, min_interval_ms, "callback registered");
        self.entries.insert(
            id,
            Registration {
                callback,
                priority,
                min_interval_ms,
                last_run_ms: None,
                seq,
            },
        );
    }

    /// Remove a callback; unknown ids are a no-op.
    pub fn unregister(&mut self, id: &str) {
        if self.entries.remove(id).is_some() {
            trace!(%id, "callback unregistered");
        }
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop dispatching ticks; the registry is untouched.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
        // Forget the previous tick so the first frame after resume does not
        // see the whole pause as its delta.
        self.reset_tick_clock();
    }

    /// Forget the previous tick timestamp so the next delta starts from zero.
    ///
    /// For callers that suspend dispatch without pausing, e.g. while the view
    /// is hidden.
    pub fn reset_tick_clock(&mut self) {
        self.last_tick_ms = None;
    }

    /// Empty the registry and zero the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.metrics = BatcherMetrics::default();
        self.last_tick_ms = None;
        self.overrun_streak = 0;
        self.headroom_streak = 0;
        self.budget_factor = 1.0;
    }

    pub fn metrics(&self) -> BatcherMetrics {
        self.metrics
    }

    /// Set the nominal budget, normally the active tier's frame period.
    pub fn set_nominal_budget(&mut self, budget_ms: f64) {
        self.nominal_budget_ms = budget_ms.max(0.1);
    }

    /// The budget a tick will admit work against, after adaptation.
    pub fn adaptive_budget_ms(&self) -> f64 {
        self.nominal_budget_ms * self.budget_factor
    }

    /// Fold one completed frame's cost into the adaptive budget history.
    pub fn observe_frame(&mut self, duration_ms: f64) {
        if duration_ms >= self.nominal_budget_ms * OVERRUN_RATIO {
            self.overrun_streak += 1;
            self.headroom_streak = 0;
        } else if duration_ms <= self.nominal_budget_ms * WIDE_HEADROOM_RATIO {
            self.headroom_streak += 1;
            self.overrun_streak = 0;
        } else {
            self.overrun_streak = 0;
            self.headroom_streak = 0;
        }

        if self.overrun_streak >= ADAPT_STREAK {
            self.budget_factor = BUDGET_NARROW_FACTOR;
        } else if self.headroom_streak >= ADAPT_STREAK {
            self.budget_factor = BUDGET_WIDEN_FACTOR;
        } else {
            self.budget_factor = 1.0;
        }
    }

    /// Dispatch one frame at host timestamp `now_ms`.
    ///
    /// Returns `None` while paused. Within the tick, callbacks run in
    /// descending priority order, stable for equal priority; entries inside
    /// their re-run interval are passed over without counting as skipped.
    pub fn tick(&mut self, now_ms: f64) -> Option<TickReport> {
        if self.paused {
            return None;
        }

        let delta_ms = self.last_tick_ms.map_or(0.0, |prev| (now_ms - prev).max(0.0));
        self.last_tick_ms = Some(now_ms);

        let mut order: Vec<(u8, u64, String)> = self
            .entries
            .iter()
            .map(|(id, reg)| (reg.priority.weight(), reg.seq, id.clone()))
            .collect();
        order.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let started = Instant::now();
        let budget_ms = self.adaptive_budget_ms();
        let mut ran = 0usize;
        let mut skipped = 0usize;
        let mut budget_exhausted = false;
        let mut critical_ran = false;

        for (_, _, id) in order {
            let Some(entry) = self.entries.get_mut(&id) else {
                continue;
            };

            if let Some(last_run) = entry.last_run_ms {
                if now_ms - last_run < entry.min_interval_ms {
                    continue;
                }
            }

            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            if elapsed_ms >= budget_ms {
                budget_exhausted = true;
                // One critical entry always gets through, budget or not.
                if entry.priority != Priority::Critical || critical_ran {
                    skipped += 1;
                    self.metrics.skipped_updates += 1;
                    continue;
                }
            }

            entry.last_run_ms = Some(now_ms);
            if entry.priority == Priority::Critical {
                critical_ran = true;
            }
            let panicked = catch_unwind(AssertUnwindSafe(|| (entry.callback)(delta_ms))).is_err();
            ran += 1;
            self.metrics.runs += 1;
            if panicked {
                self.metrics.callback_panics += 1;
                warn!(%id, "animation callback panicked; continuing dispatch");
            }
        }

        self.metrics.frames += 1;
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        Some(TickReport {
            duration_ms,
            delta_ms,
            ran,
            skipped,
            budget_exhausted,
        })
    }

    /// Run every registered callback exactly once with a zero delta.
    ///
    /// Ignores the budget, the re-run intervals, and the paused state; used
    /// for deterministic one-shot settles. Does not count as a tick and does
    /// not consume the entries' intervals.
    pub fn flush(&mut self) {
        let mut order: Vec<(u8, u64, String)> = self
            .entries
            .iter()
            .map(|(id, reg)| (reg.priority.weight(), reg.seq, id.clone()))
            .collect();
        order.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        for (_, _, id) in order {
            let Some(entry) = self.entries.get_mut(&id) else {
                continue;
            };
            if catch_unwind(AssertUnwindSafe(|| (entry.callback)(0.0))).is_err() {
                self.metrics.callback_panics += 1;
                warn!(%id, "animation callback panicked during flush");
            }
        }
    }
}
