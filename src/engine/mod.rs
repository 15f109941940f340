/// Engine configuration and its JSON form.
pub mod config;
/// Timers, transitions and per-shape color updates.
pub mod state;
