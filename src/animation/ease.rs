use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{TesseraError, TesseraResult};

/// Easing presets used to map normalized animation progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Linear interpolation.
    Linear,
    /// Quadratic ease-in.
    InQuad,
    /// Quadratic ease-out.
    OutQuad,
    /// Quadratic ease-in/out.
    InOutQuad,
    /// Cubic ease-in (`t³`).
    InCubic,
    /// Cubic ease-out.
    OutCubic,
    /// Cubic ease-in/out.
    InOutCubic,
}

impl Ease {
    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }
}

/// CSS-style `cubic-bezier(x1, y1, x2, y2)` timing curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    /// First control point x.
    pub x1: f64,
    /// First control point y.
    pub y1: f64,
    /// Second control point x.
    pub x2: f64,
    /// Second control point y.
    pub y2: f64,
}

impl CubicBezier {
    /// Build a validated curve. All control values must lie in `[0, 1]` so the curve is a
    /// function of `x` and its output stays inside `[0, 1]`.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> TesseraResult<Self> {
        let curve = Self { x1, y1, x2, y2 };
        curve.validate()?;
        Ok(curve)
    }

    fn validate(&self) -> TesseraResult<()> {
        for (name, v) in [
            ("x1", self.x1),
            ("y1", self.y1),
            ("x2", self.x2),
            ("y2", self.y2),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(TesseraError::validation(format!(
                    "cubic_bezier {name} must be within [0, 1], got {v}"
                )));
            }
        }
        Ok(())
    }

    /// Solve `bx(u) = x` for `u`, then return `by(u)`.
    pub fn apply(&self, x: f64) -> f64 {
        if x.is_nan() || x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }

        fn sample_curve(a1: f64, a2: f64, t: f64) -> f64 {
            let omt = 1.0 - t;
            3.0 * omt * omt * t * a1 + 3.0 * omt * t * t * a2 + t * t * t
        }
        fn sample_curve_derivative(a1: f64, a2: f64, t: f64) -> f64 {
            let omt = 1.0 - t;
            3.0 * omt * omt * a1 + 6.0 * omt * t * (a2 - a1) + 3.0 * t * t * (1.0 - a2)
        }

        // Newton-Raphson with bisection refinement (fixed iteration counts).
        let mut t = x;
        for _ in 0..8 {
            let x_t = sample_curve(self.x1, self.x2, t) - x;
            let d = sample_curve_derivative(self.x1, self.x2, t);
            if d.abs() < 1e-7 {
                break;
            }
            t = (t - x_t / d).clamp(0.0, 1.0);
        }

        let mut lo = 0.0;
        let mut hi = 1.0;
        for _ in 0..16 {
            if (sample_curve(self.x1, self.x2, t) - x).abs() < 1e-9 {
                break;
            }
            if sample_curve(self.x1, self.x2, t) < x {
                lo = t;
            } else {
                hi = t;
            }
            t = 0.5 * (lo + hi);
        }

        sample_curve(self.y1, self.y2, t).clamp(0.0, 1.0)
    }
}

/// User-supplied easing function. Its output is clamped into `[0, 1]`.
#[derive(Clone)]
pub struct CustomEase(Arc<dyn Fn(f64) -> f64 + Send + Sync>);

impl fmt::Debug for CustomEase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomEase(..)")
    }
}

/// Any easing the engine accepts: a preset, a cubic-bezier curve, or a custom function.
///
/// JSON forms: `"in_cubic"` or `{"cubic_bezier": [x1, y1, x2, y2]}`.
#[derive(Clone, Debug)]
pub enum Easing {
    /// One of the [`Ease`] presets.
    Preset(Ease),
    /// A cubic-bezier timing curve.
    CubicBezier(CubicBezier),
    /// A function supplied from code; not serializable.
    Custom(CustomEase),
}

impl Easing {
    /// Wrap a closure as an easing.
    pub fn custom(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::Custom(CustomEase(Arc::new(f)))
    }

    /// Map progress `t` (clamped to `[0, 1]`) through the curve. The result is within `[0, 1]`.
    pub fn apply(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Preset(ease) => ease.apply(t),
            Self::CubicBezier(curve) => curve.apply(t),
            Self::Custom(CustomEase(f)) => {
                let v = f(t);
                if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
            }
        }
    }

    pub(crate) fn validate(&self) -> TesseraResult<()> {
        match self {
            Self::CubicBezier(curve) => curve.validate(),
            Self::Preset(_) | Self::Custom(_) => Ok(()),
        }
    }
}

impl From<Ease> for Easing {
    fn from(ease: Ease) -> Self {
        Self::Preset(ease)
    }
}

impl From<CubicBezier> for Easing {
    fn from(curve: CubicBezier) -> Self {
        Self::CubicBezier(curve)
    }
}

impl Serialize for Easing {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        #[derive(Serialize)]
        struct BezierRepr {
            cubic_bezier: [f64; 4],
        }

        match self {
            Self::Preset(ease) => ease.serialize(serializer),
            Self::CubicBezier(c) => BezierRepr {
                cubic_bezier: [c.x1, c.y1, c.x2, c.y2],
            }
            .serialize(serializer),
            Self::Custom(_) => Err(serde::ser::Error::custom(
                "custom easing functions cannot be serialized",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Easing {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Str(String),
            CubicBezier { cubic_bezier: [f64; 4] },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Str(s) => {
                let ease = Ease::deserialize(serde::de::value::StrDeserializer::<D::Error>::new(
                    s.as_str(),
                ))
                .map_err(|_| serde::de::Error::custom(format!("unknown easing \"{s}\"")))?;
                Ok(Self::Preset(ease))
            }
            Repr::CubicBezier { cubic_bezier: [x1, y1, x2, y2] } => {
                CubicBezier::new(x1, y1, x2, y2)
                    .map(Self::CubicBezier)
                    .map_err(serde::de::Error::custom)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
