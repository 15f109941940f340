//! Color model: RGB/HSL conversions, linear blending and gradient swatches.

/// Linear blending between RGB colors.
pub mod blend;
/// `Rgb`/`Hsl` types and conversions.
pub mod model;
/// Named gradient swatches.
pub mod swatch;
