//! Frame-local visual state handed to rendering consumers.

use serde::{Deserialize, Serialize};

use crate::ripple::Ripple;

/// Saturation multiplier shown before any deviation is known.
pub const INITIAL_SATURATION: f32 = 1.0;

/// Grain overlay opacity shown before any deviation is known.
pub const INITIAL_GRAIN_OPACITY: f32 = 0.08;

/// Derived visual parameters for one animation frame.
///
/// Produced by the animator once its baseline is defined and consumed by the
/// rendering surface (the WebSocket feed); the animator itself never touches
/// rendering primitives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualFrame {
    /// Record rotation in degrees, always within `[0, 360)`.
    pub rotation_angle: f32,
    /// Color saturation multiplier, clamped to `[0.5, 1.5]`.
    pub saturation: f32,
    /// Film-grain overlay opacity, clamped to `[0.05, 0.15]`.
    pub grain_opacity: f32,
    /// Normalized volume of the tick that produced this frame.
    pub volume: f32,
    /// Running baseline volume at this tick.
    pub baseline: f32,
    /// `volume - baseline`.
    pub deviation: f32,
    /// Live ripples at this tick.
    pub ripples: Vec<Ripple>,
}
