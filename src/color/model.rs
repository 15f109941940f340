use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{TesseraError, TesseraResult};

/// 8-bit RGB color with a straight alpha in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Straight alpha in `[0, 1]`.
    pub a: f64,
}

impl Rgb {
    /// Opaque color from its three channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Return this color with `a` clamped into `[0, 1]`.
    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: clamp_unit(a),
            ..self
        }
    }

    /// Parse `#rgb`, `#rrggbb`, `rgb` or `rrggbb` (case-insensitive).
    pub fn from_hex(s: &str) -> TesseraResult<Self> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid_hex(s));
        }

        fn hex_byte(pair: &str) -> Option<u8> {
            u8::from_str_radix(pair, 16).ok()
        }

        let (r, g, b) = match digits.len() {
            3 => {
                let expand = |i: usize| hex_byte(&digits[i..i + 1].repeat(2));
                (expand(0), expand(1), expand(2))
            }
            6 => (
                hex_byte(&digits[0..2]),
                hex_byte(&digits[2..4]),
                hex_byte(&digits[4..6]),
            ),
            _ => return Err(invalid_hex(s)),
        };

        match (r, g, b) {
            (Some(r), Some(g), Some(b)) => Ok(Self::new(r, g, b)),
            _ => Err(invalid_hex(s)),
        }
    }

    /// Lowercase `#rrggbb`; alpha is not encoded.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a < 1.0 {
            write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        } else {
            write!(f, "rgb({},{},{})", self.r, self.g, self.b)
        }
    }
}

fn invalid_hex(s: &str) -> TesseraError {
    TesseraError::validation(format!(
        "invalid hex color \"{s}\": expected #rgb or #rrggbb"
    ))
}

/// HSL color: hue in degrees `[0, 360)`, saturation and lightness in percent `[0, 100]`.
///
/// Every constructor normalizes: hue wraps around the circle, the other components clamp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    /// Hue in degrees.
    pub h: f64,
    /// Saturation in percent.
    pub s: f64,
    /// Lightness in percent.
    pub l: f64,
    /// Straight alpha in `[0, 1]`.
    pub a: f64,
}

impl Hsl {
    /// Opaque normalized color.
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self::with_alpha(h, s, l, 1.0)
    }

    /// Normalized color with alpha.
    pub fn with_alpha(h: f64, s: f64, l: f64, a: f64) -> Self {
        let h = if h.is_finite() { h.rem_euclid(360.0) } else { 0.0 };
        Self {
            h,
            s: clamp_percent(s),
            l: clamp_percent(l),
            a: clamp_unit(a),
        }
    }

    /// Same hue and saturation with a different lightness.
    pub fn with_lightness(self, l: f64) -> Self {
        Self::with_alpha(self.h, self.s, l, self.a)
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({},{}%,{}%)", self.h, self.s, self.l)
    }
}

fn clamp_percent(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 100.0) }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 1.0 } else { v.clamp(0.0, 1.0) }
}

fn to_channel(unit: f64) -> u8 {
    (unit * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Convert HSL to RGB, rounding each channel to the nearest integer.
pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
    let h = hsl.h / 360.0;
    let s = (hsl.s / 100.0).max(0.0);
    let l = hsl.l / 100.0;

    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    Rgb {
        r: to_channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        g: to_channel(hue_to_rgb(p, q, h)),
        b: to_channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
        a: hsl.a,
    }
}

fn hue_to_rgb(p: f64, q: f64, mut h: f64) -> f64 {
    if h < 0.0 {
        h += 1.0;
    } else if h > 1.0 {
        h -= 1.0;
    }

    if h * 6.0 < 1.0 {
        p + (q - p) * h * 6.0
    } else if h * 2.0 < 1.0 {
        q
    } else if h * 3.0 < 2.0 {
        p + (q - p) * (2.0 / 3.0 - h) * 6.0
    } else {
        p
    }
}

/// Convert RGB to HSL rounded to integer degrees and percent.
pub fn rgb_to_hsl(rgb: Rgb) -> Hsl {
    let r = f64::from(rgb.r) / 255.0;
    let g = f64::from(rgb.g) / 255.0;
    let b = f64::from(rgb.b) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = max - min;
    let add = max + min;

    let h = if diff == 0.0 {
        0.0
    } else if r == max {
        ((g - b) / diff / 6.0 + 1.0).rem_euclid(1.0)
    } else if g == max {
        (b - r) / diff / 6.0 + 1.0 / 3.0
    } else {
        (r - g) / diff / 6.0 + 2.0 / 3.0
    };

    let l = 0.5 * add;
    let s = if l == 0.0 || l == 1.0 {
        0.0
    } else if l <= 0.5 {
        diff / add
    } else {
        diff / (2.0 - add)
    };

    Hsl::with_alpha(
        (h * 360.0).round(),
        (s * 100.0).round(),
        (l * 100.0).round(),
        rgb.a,
    )
}

/// Parse a hex color straight into HSL.
pub fn hex_to_hsl(hex: &str) -> TesseraResult<Hsl> {
    Ok(rgb_to_hsl(Rgb::from_hex(hex)?))
}

#[cfg(test)]
#[path = "../../tests/unit/color/model.rs"]
mod tests;
