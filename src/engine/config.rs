use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::animation::ease::{CubicBezier, Easing};
use crate::color::swatch::{Swatch, default_swatches};
use crate::foundation::core::millis;
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::grid::shape::ShapeParams;

/// Tag of the built-in two-triangles-per-cell routine.
pub const TRIANGLE: &str = "triangle";
/// Tag of the built-in axis-aligned square routine.
pub const SQUARE: &str = "square";

/// Engine configuration.
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```json
/// { "shape_width": 32, "blur_radius": 1.5, "lightness_easing": "in_out_cubic" }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Cell width in pixels.
    pub shape_width: f64,
    /// Cell height in pixels.
    pub shape_height: f64,
    /// Swatches the palette cross-fades between. One is drawn at random at start.
    pub gradients: Vec<Swatch>,
    /// Base lightness oscillation period in milliseconds.
    pub animation_timing: f64,
    /// Hold time between palette transitions, and the duration of each transition, in
    /// milliseconds.
    pub color_animation_timing: f64,
    /// Curve applied to the lightness oscillation.
    pub lightness_easing: Easing,
    /// Curve applied to palette transitions.
    pub gradient_transition_easing: Easing,
    /// Maximum lightness amplitude in percent.
    pub max_lightness_change: f64,
    /// Box blur radius in pixels; `0` disables the pass.
    pub blur_radius: f64,
    /// Registry tag of the shape routine.
    pub shape_type: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shape_width: 20.0,
            shape_height: 20.0 * 3f64.sqrt() / 2.0,
            gradients: default_swatches(),
            animation_timing: 3000.0,
            color_animation_timing: 5000.0,
            lightness_easing: CubicBezier {
                x1: 0.54,
                y1: 0.0,
                x2: 1.0,
                y2: 1.0,
            }
            .into(),
            gradient_transition_easing: CubicBezier {
                x1: 0.47,
                y1: 0.0,
                x2: 0.745,
                y2: 0.715,
            }
            .into(),
            max_lightness_change: 35.0,
            blur_radius: 0.0,
            shape_type: TRIANGLE.to_owned(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON configuration and validate it.
    pub fn from_json_str(s: &str) -> TesseraResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> TesseraResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every numeric range and easing. The shape type is checked against a registry when
    /// the engine handle is initialized.
    pub fn validate(&self) -> TesseraResult<()> {
        positive("shape_width", self.shape_width)?;
        positive("shape_height", self.shape_height)?;
        positive("animation_timing", self.animation_timing)?;
        positive("color_animation_timing", self.color_animation_timing)?;

        if self.gradients.is_empty() {
            return Err(TesseraError::validation("gradients must not be empty"));
        }
        if !(0.0..=100.0).contains(&self.max_lightness_change) {
            return Err(TesseraError::validation(format!(
                "max_lightness_change must be within [0, 100], got {}",
                self.max_lightness_change
            )));
        }
        if !self.blur_radius.is_finite() || self.blur_radius < 0.0 {
            return Err(TesseraError::validation(format!(
                "blur_radius must be >= 0, got {}",
                self.blur_radius
            )));
        }
        if self.shape_type.trim().is_empty() {
            return Err(TesseraError::validation("shape_type must not be empty"));
        }

        self.lightness_easing
            .validate()
            .map_err(|e| e.within("lightness_easing"))?;
        self.gradient_transition_easing
            .validate()
            .map_err(|e| e.within("gradient_transition_easing"))?;
        Ok(())
    }

    /// Randomization ranges handed to freshly created shapes.
    pub fn shape_params(&self) -> ShapeParams {
        ShapeParams {
            animation_timing_ms: self.animation_timing,
            max_lightness_change: self.max_lightness_change,
        }
    }

    /// `color_animation_timing` as a duration.
    pub fn color_timing(&self) -> Duration {
        millis(self.color_animation_timing)
    }
}

fn positive(field: &str, v: f64) -> TesseraResult<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(TesseraError::validation(format!(
            "{field} must be > 0, got {v}"
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/config.rs"]
mod tests;
