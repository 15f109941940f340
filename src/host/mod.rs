//! Host bootstrap: the collaborator-facing handle and a refresh loop that feeds frame sinks.

/// Refresh sources, cancellation and the frame loop.
pub mod driver;
/// `initialize` / `handle_resize` / `dispose` / `on_frame`.
pub mod handle;
