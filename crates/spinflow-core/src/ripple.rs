//! Transient ripple events spawned by volume peaks.
//!
//! Ripples age on their own fixed cadence ([`DECAY_TICK`]), independent of
//! the sampling rate: their lifetime is a visual constant, not a function of
//! how fast audio snapshots arrive.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Opacity of a freshly spawned ripple.
pub const SPAWN_OPACITY: f32 = 0.8;

/// Ring growth per decay tick, in logical pixels.
pub const GROWTH_PER_TICK: f32 = 10.0;

/// Opacity lost per decay tick.
pub const OPACITY_FADE_PER_TICK: f32 = 0.02;

/// Size bound past which a ripple is culled.
pub const MAX_SIZE: f32 = 1000.0;

/// Cadence of the decay loop (~60 updates/second).
pub const DECAY_TICK: Duration = Duration::from_millis(16);

// Repeated subtraction of 0.02 leaves ~1e-8 of float dust at the zero
// crossing; anything below this counts as fully faded.
const OPACITY_DUST: f32 = 1e-6;

/// A single expanding ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ripple {
    /// Monotonically increasing id, scoped to one audio-source lifetime.
    pub id: u64,
    /// Ring diameter in logical pixels.
    pub size: f32,
    /// Ring opacity in `[0, 1]`.
    pub opacity: f32,
}

/// The live ripple collection for one audio-source lifetime.
#[derive(Debug, Default)]
pub struct RippleField {
    ripples: Vec<Ripple>,
    next_id: u64,
}

impl RippleField {
    /// Create an empty field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fresh ripple, returning its id.
    pub fn spawn(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.ripples.push(Ripple {
            id,
            size: 0.0,
            opacity: SPAWN_OPACITY,
        });
        id
    }

    /// One decay tick: grow and fade every ripple, then cull the expired.
    pub fn advance(&mut self) {
        for ripple in &mut self.ripples {
            ripple.size += GROWTH_PER_TICK;
            ripple.opacity = (ripple.opacity - OPACITY_FADE_PER_TICK).max(0.0);
        }
        self.ripples
            .retain(|r| r.opacity > OPACITY_DUST && r.size < MAX_SIZE);
    }

    /// Number of live ripples.
    pub fn len(&self) -> usize {
        self.ripples.len()
    }

    /// Whether the field holds no ripples.
    pub fn is_empty(&self) -> bool {
        self.ripples.is_empty()
    }

    /// Iterate over the live ripples.
    pub fn iter(&self) -> impl Iterator<Item = &Ripple> {
        self.ripples.iter()
    }

    /// Owned copy of the live ripples, for handing to consumers.
    pub fn snapshot(&self) -> Vec<Ripple> {
        self.ripples.clone()
    }

    /// Drop all ripples and restart the id counter.
    pub fn reset(&mut self) {
        self.ripples.clear();
        self.next_id = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_ids_are_monotonic() {
        let mut field = RippleField::new();
        assert_eq!(field.spawn(), 0);
        assert_eq!(field.spawn(), 1);
        assert_eq!(field.spawn(), 2);
        assert_eq!(field.len(), 3);

        field.reset();
        assert!(field.is_empty());
        assert_eq!(field.spawn(), 0);
    }

    #[test]
    fn test_opacity_expires_after_forty_ticks() {
        let mut field = RippleField::new();
        field.spawn();

        for tick in 1..40 {
            field.advance();
            assert_eq!(field.len(), 1, "culled early at tick {}", tick);
        }

        field.advance();
        assert!(field.is_empty(), "ripple should be gone after 40 ticks");
    }

    #[test]
    fn test_size_bound_culls_at_hundred_ticks() {
        let mut field = RippleField::new();
        // A ripple that never fades, so only the size bound applies.
        field.ripples.push(Ripple {
            id: 0,
            size: 0.0,
            opacity: 100.0,
        });

        for tick in 1..100 {
            field.advance();
            assert_eq!(field.len(), 1, "culled early at tick {}", tick);
        }

        field.advance();
        assert!(field.is_empty(), "size bound should cull at 1000");
    }

    #[test]
    fn test_advance_grows_and_fades() {
        let mut field = RippleField::new();
        field.spawn();
        field.advance();

        let ripple = field.iter().next().unwrap();
        assert_eq!(ripple.size, GROWTH_PER_TICK);
        assert!((ripple.opacity - (SPAWN_OPACITY - OPACITY_FADE_PER_TICK)).abs() < 1e-6);
    }

    #[test]
    fn test_opacity_never_negative() {
        let mut field = RippleField::new();
        field.ripples.push(Ripple {
            id: 0,
            size: 0.0,
            opacity: 0.01,
        });
        field.advance();
        assert!(field.is_empty());
    }
}
