/// The shape grid: sentinel columns, per-row partners, resize that preserves state.
pub mod layout;
/// Per-cell animation state.
pub mod shape;
