//! Frame sinks: in-memory capture, PNG sequences and MP4 through the system `ffmpeg`.

/// `ffmpeg`-based MP4 sink.
pub mod ffmpeg;
/// Sink trait and file/memory sinks.
pub mod sink;
