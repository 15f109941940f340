use std::time::Duration;

use crate::foundation::error::{TesseraError, TesseraResult};

pub use kurbo::{BezPath, Point};

/// Absolute 0-based frame index produced by a refresh source.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> TesseraResult<Self> {
        if den == 0 {
            return Err(TesseraError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(TesseraError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame.
    pub fn frame_duration(self) -> Duration {
        self.timestamp_of(FrameIndex(1))
    }

    /// Timestamp at which frame `idx` is presented, measured from frame 0.
    pub fn timestamp_of(self, idx: FrameIndex) -> Duration {
        if self.num == 0 {
            return Duration::ZERO;
        }
        let nanos =
            u128::from(idx.0) * u128::from(self.den) * 1_000_000_000 / u128::from(self.num);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Number of whole frames that fit in `span`.
    pub fn frames_in(self, span: Duration) -> u64 {
        if self.den == 0 {
            return 0;
        }
        let frames = span.as_nanos() * u128::from(self.num)
            / (u128::from(self.den) * 1_000_000_000);
        u64::try_from(frames).unwrap_or(u64::MAX)
    }
}

/// Viewport dimensions in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Return `true` when either dimension is zero; nothing can be painted on such a canvas.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Convert a floating-point millisecond count from configuration into a [`Duration`].
pub(crate) fn millis(ms: f64) -> Duration {
    Duration::from_nanos((ms.max(0.0) * 1_000_000.0).round() as u64)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
