//! Volume-reactive animator: baseline tracking and visual parameter mapping.
//!
//! The animator consumes one frequency snapshot per animation tick, keeps a
//! running mean of the normalized volume across the whole source-so-far, and
//! maps the deviation from that mean into the visual parameters of a
//! spinning record: rotation speed, color saturation, grain opacity, and
//! transient ripples on detected peaks.
//!
//! Nothing is rendered here and nothing is persisted; all state belongs to
//! one audio-source lifetime and is wiped by [`VolumeAnimator::reset`].

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::ripple::RippleField;
use crate::spectrum::normalized_mean;
use crate::visual::{VisualFrame, INITIAL_GRAIN_OPACITY, INITIAL_SATURATION};

const SATURATION_GAIN: f32 = 2.0;
const SATURATION_MIN: f32 = 0.5;
const SATURATION_MAX: f32 = 1.5;

// Grain reads like vinyl static: more deviation, more grain.
const GRAIN_BASE: f32 = 0.08;
const GRAIN_GAIN: f32 = 0.3;
const GRAIN_MIN: f32 = 0.05;
const GRAIN_MAX: f32 = 0.15;

/// Tuning for the sampling/baseline loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorConfig {
    /// Samples required before the baseline is considered defined.
    pub warmup_samples: u64,
    /// Deviation above baseline that qualifies as a peak.
    pub peak_threshold: f32,
    /// Degrees of rotation per tick at zero deviation.
    pub base_rotation_speed: f32,
    /// Extra degrees per tick per unit of deviation.
    pub rotation_gain: f32,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            warmup_samples: 10,
            peak_threshold: 0.05,
            base_rotation_speed: 0.5,
            rotation_gain: 200.0,
        }
    }
}

/// Per-source animator state shared by the sampling and decay loops.
#[derive(Debug)]
pub struct VolumeAnimator {
    config: AnimatorConfig,

    /// Cumulative normalized volume across the source-so-far.
    volume_sum: f64,
    /// Samples ingested since the last reset.
    sample_count: u64,
    /// Volume of the previous baselined tick; stays 0 through warm-up.
    previous_volume: f32,
    /// Volume of the most recent tick.
    current_volume: f32,

    rotation_angle: f32,
    saturation: f32,
    grain_opacity: f32,

    ripples: RippleField,
}

impl VolumeAnimator {
    /// Create an animator in its initial (pre-source) state.
    pub fn new(config: AnimatorConfig) -> Self {
        Self {
            config,
            volume_sum: 0.0,
            sample_count: 0,
            previous_volume: 0.0,
            current_volume: 0.0,
            rotation_angle: 0.0,
            saturation: INITIAL_SATURATION,
            grain_opacity: INITIAL_GRAIN_OPACITY,
            ripples: RippleField::new(),
        }
    }

    /// Ingest one frequency snapshot.
    ///
    /// Returns the visual frame for this tick, or `None` while the baseline
    /// is still undefined (fewer than `warmup_samples` ingested). During
    /// warm-up nothing moves: no rotation, no ripples, initial saturation
    /// and grain.
    pub fn ingest(&mut self, bins: &[u8]) -> Option<VisualFrame> {
        if bins.is_empty() {
            // Collaborator contract violation; ignore rather than poison the
            // running sums.
            return None;
        }

        let volume = normalized_mean(bins);
        self.current_volume = volume;
        self.volume_sum += f64::from(volume);
        self.sample_count += 1;

        if self.sample_count < self.config.warmup_samples {
            return None;
        }

        let baseline = (self.volume_sum / self.sample_count as f64) as f32;
        let deviation = volume - baseline;

        // Edge-triggered peak detection: above threshold AND still rising.
        // previous_volume is the raw volume of the last baselined tick; see
        // the module docs for the warm-up quirk this inherits.
        if deviation > self.config.peak_threshold && volume > self.previous_volume {
            let id = self.ripples.spawn();
            trace!(id, volume, deviation, "peak detected, ripple spawned");
        }
        self.previous_volume = volume;

        self.saturation =
            (INITIAL_SATURATION + deviation * SATURATION_GAIN).clamp(SATURATION_MIN, SATURATION_MAX);
        self.grain_opacity =
            (GRAIN_BASE + deviation.abs() * GRAIN_GAIN).clamp(GRAIN_MIN, GRAIN_MAX);

        let speed = self.config.base_rotation_speed + deviation * self.config.rotation_gain;
        self.rotation_angle += speed;
        // One tick never moves a full turn, so a single correction keeps the
        // angle in [0, 360). Negative deviations can drive the sum below
        // zero, hence the explicit branch instead of `%`.
        if self.rotation_angle >= 360.0 {
            self.rotation_angle -= 360.0;
        } else if self.rotation_angle < 0.0 {
            self.rotation_angle += 360.0;
        }

        Some(VisualFrame {
            rotation_angle: self.rotation_angle,
            saturation: self.saturation,
            grain_opacity: self.grain_opacity,
            volume,
            baseline,
            deviation,
            ripples: self.ripples.snapshot(),
        })
    }

    /// One ripple decay tick; see [`crate::ripple`] for the constants.
    pub fn decay_ripples(&mut self) {
        self.ripples.advance();
    }

    /// Running baseline, or `None` during warm-up.
    pub fn baseline(&self) -> Option<f32> {
        (self.sample_count >= self.config.warmup_samples)
            .then(|| (self.volume_sum / self.sample_count as f64) as f32)
    }

    /// Deviation of the most recent tick, or `None` during warm-up.
    pub fn deviation(&self) -> Option<f32> {
        self.baseline().map(|b| self.current_volume - b)
    }

    /// Samples ingested since the last reset.
    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    /// Whether any ripples are alive.
    pub fn has_ripples(&self) -> bool {
        !self.ripples.is_empty()
    }

    /// Number of live ripples.
    pub fn ripple_count(&self) -> usize {
        self.ripples.len()
    }

    /// Visual frame for the most recent tick, or `None` during warm-up.
    pub fn frame(&self) -> Option<VisualFrame> {
        let baseline = self.baseline()?;
        Some(VisualFrame {
            rotation_angle: self.rotation_angle,
            saturation: self.saturation,
            grain_opacity: self.grain_opacity,
            volume: self.current_volume,
            baseline,
            deviation: self.current_volume - baseline,
            ripples: self.ripples.snapshot(),
        })
    }

    /// Wipe all per-source state. Called exactly when a new audio source is
    /// attached; there is no other reset trigger.
    pub fn reset(&mut self) {
        self.volume_sum = 0.0;
        self.sample_count = 0;
        self.previous_volume = 0.0;
        self.current_volume = 0.0;
        self.rotation_angle = 0.0;
        self.saturation = INITIAL_SATURATION;
        self.grain_opacity = INITIAL_GRAIN_OPACITY;
        self.ripples.reset();

        debug!("animator reset");
    }
}

impl Default for VolumeAnimator {
    fn default() -> Self {
        Self::new(AnimatorConfig::default())
    }
}
