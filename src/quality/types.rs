use serde::{Deserialize, Serialize};

/// One of the five visual-quality presets, totally ordered from
/// [`QualityTier::Minimal`] to [`QualityTier::Ultra`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Minimal,
    Low,
    Medium,
    High,
    Ultra,
}

impl QualityTier {
    /// All tiers in ascending order.
    pub const ALL: [QualityTier; 5] = [
        QualityTier::Minimal,
        QualityTier::Low,
        QualityTier::Medium,
        QualityTier::High,
        QualityTier::Ultra,
    ];

    /// The next tier up, saturating at `Ultra`.
    #[must_use]
    pub fn step_up(self) -> Self {
        match self {
            Self::Minimal => Self::Low,
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High | Self::Ultra => Self::Ultra,
        }
    }

    /// The next tier down, saturating at `Minimal`.
    #[must_use]
    pub fn step_down(self) -> Self {
        match self {
            Self::Ultra => Self::High,
            Self::High => Self::Medium,
            Self::Medium => Self::Low,
            Self::Low | Self::Minimal => Self::Minimal,
        }
    }

    /// Clamp this tier into `[min, max]`.
    ///
    /// A caller-supplied range with `min > max` is normalized by swapping the
    /// bounds rather than rejected.
    #[must_use]
    pub fn clamp_to(self, min: QualityTier, max: QualityTier) -> Self {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        if self < lo {
            lo
        } else if self > hi {
            hi
        } else {
            self
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Ultra => "ultra",
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete render settings for one tier.
///
/// These are immutable constants: looked up through
/// [`settings_for`](crate::quality::settings_for), never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualitySettings {
    /// Tier these settings belong to
    pub quality: QualityTier,
    /// Render-target scale relative to the viewport, in `(0, 1]`
    pub resolution_scale: f64,
    /// Frame rate the tier is expected to sustain
    pub target_fps: f64,
    pub shadows: bool,
    pub reflections: bool,
    pub particles: bool,
    pub post_processing: bool,
    pub antialiasing: bool,
    /// MSAA sample count: 0, 2, 4 or 8
    pub antialiasing_level: u8,
}

impl QualitySettings {
    /// Frame period implied by `target_fps`, in milliseconds.
    pub fn target_frame_ms(&self) -> f64 {
        1000.0 / self.target_fps
    }
}
