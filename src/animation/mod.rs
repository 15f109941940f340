/// Easing presets, cubic-bezier curves and custom easing functions.
pub mod ease;
