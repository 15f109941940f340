use crate::color::model::{Hsl, Rgb, rgb_to_hsl};
use crate::foundation::error::{TesseraError, TesseraResult};

/// Blend weight of the foreground color, guaranteed to lie in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Opacity(f64);

impl Opacity {
    /// Fully background.
    pub const TRANSPARENT: Self = Self(0.0);
    /// Fully foreground.
    pub const OPAQUE: Self = Self(1.0);

    /// Validate an opacity. Values outside `[0, 1]` (or NaN) are a caller bug and are rejected
    /// rather than clamped.
    pub fn new(value: f64) -> TesseraResult<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TesseraError::invariant(format!(
                "opacity must be within [0, 1], got {value}"
            )))
        }
    }

    /// The raw weight.
    pub fn get(self) -> f64 {
        self.0
    }
}

/// Linearly composite `fg` over `bg` channel-wise (`bg * (1 - o) + fg * o`), rounding each
/// channel, and return the result as HSL.
pub fn calculate_transparency(fg: Rgb, bg: Rgb, opacity: Opacity) -> Hsl {
    let o = opacity.get();
    let mix = |f: u8, b: u8| -> u8 {
        (f64::from(b) * (1.0 - o) + f64::from(f) * o)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    rgb_to_hsl(Rgb::new(mix(fg.r, bg.r), mix(fg.g, bg.g), mix(fg.b, bg.b)))
}

#[cfg(test)]
#[path = "../../tests/unit/color/blend.rs"]
mod tests;
