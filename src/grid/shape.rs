use std::time::Duration;

use rand::{Rng, RngCore};

use crate::animation::ease::Easing;
use crate::color::model::Hsl;

/// Randomization ranges for freshly created shapes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeParams {
    /// Base lightness period in milliseconds; each shape draws its own period from
    /// `[timing / 2, timing * 2]`.
    pub animation_timing_ms: f64,
    /// Maximum lightness amplitude in percent.
    pub max_lightness_change: f64,
}

/// Animation state of one grid cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    /// Palette anchor sampled for this shape's row. Replaced when a palette transition commits.
    pub original_color: Hsl,
    /// Anchor blended toward the transition target; equals `original_color` outside transitions.
    pub color: Hsl,
    /// `color` after the lightness oscillation. This is what gets painted.
    pub displayed: Hsl,
    /// `true` while lightness is easing upward.
    pub animation_direction: bool,
    /// Multiplicative lightness factor (`>= 1`), fixed for the shape's lifetime.
    pub max_lightness_change: f64,
    /// Length of one half-cycle of the oscillation, fixed for the shape's lifetime.
    pub animation_offset: Duration,
    /// Time spent in the current half-cycle.
    pub progress: Duration,
}

impl Shape {
    /// Create a shape anchored to `anchor` with randomized timing.
    pub fn random(anchor: Hsl, params: &ShapeParams, rng: &mut dyn RngCore) -> Self {
        let max_percent = params.max_lightness_change.round().max(0.0) as u32;
        let lo = (params.animation_timing_ms / 2.0).round().max(1.0) as u64;
        let hi = (params.animation_timing_ms * 2.0).round().max(lo as f64) as u64;

        Self {
            original_color: anchor,
            color: anchor,
            displayed: anchor,
            animation_direction: rng.r#gen::<bool>(),
            max_lightness_change: f64::from(rng.gen_range(0..=max_percent)) / 100.0 + 1.0,
            animation_offset: Duration::from_millis(rng.gen_range(lo..=hi)),
            progress: Duration::ZERO,
        }
    }

    /// Advance the lightness clock; flips direction once a half-cycle is exceeded.
    pub fn advance(&mut self, delta: Duration) {
        self.progress = self.progress.saturating_add(delta);
        if self.progress > self.animation_offset {
            self.animation_direction = !self.animation_direction;
            self.progress = Duration::ZERO;
        }
    }

    /// Lightness of `color` after applying the oscillation at the current progress.
    ///
    /// The swing is centered on the base lightness: it spans
    /// `[base - max_increase / 2, base + max_increase / 2]`.
    pub fn oscillated_lightness(&self, easing: &Easing) -> f64 {
        let base = self.color.l;
        let max_increase = base * self.max_lightness_change - base;
        let p = if self.animation_offset.is_zero() {
            0.0
        } else {
            self.progress.as_secs_f64() / self.animation_offset.as_secs_f64()
        };
        let eased = easing.apply(p);

        let delta = if self.animation_direction {
            eased * max_increase
        } else {
            (1.0 - eased) * max_increase
        };
        base + delta - max_increase / 2.0
    }

    pub(crate) fn refresh_displayed(&mut self, easing: &Easing) {
        self.displayed = self.color.with_lightness(self.oscillated_lightness(easing));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/grid/shape.rs"]
mod tests;
