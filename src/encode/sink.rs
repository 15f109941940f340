use std::path::{Path, PathBuf};

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::render::frame::FrameRGBA;

/// Stream parameters handed to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Viewport width when the stream starts.
    pub width: u32,
    /// Viewport height when the stream starts.
    pub height: u32,
    /// Nominal frame rate.
    pub fps: Fps,
}

/// Consumer of painted frames.
///
/// `push_frame` receives strictly increasing indices between one `begin` and its `end`. Frames
/// can change size when the viewport is resized; sinks that cannot handle that reject the frame.
pub trait FrameSink: Send {
    /// Called once before any frame.
    fn begin(&mut self, cfg: SinkConfig) -> TesseraResult<()>;
    /// Consume one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TesseraResult<()>;
    /// Called once after the last frame, including after cancellation.
    fn end(&mut self) -> TesseraResult<()>;
}

/// Keeps every frame in memory.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured by `begin`.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Return `true` once `end` was called.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> TesseraResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TesseraResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> TesseraResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Writes each frame as `<dir>/<prefix><index:05>.png`.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
    background: [u8; 3],
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    /// Write into `dir` with the `frame_` prefix.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: "frame_".to_owned(),
            background: [0, 0, 0],
            written: Vec::new(),
        }
    }

    /// Use a different file name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Color translucent pixels are flattened onto.
    pub fn with_background(mut self, rgb: [u8; 3]) -> Self {
        self.background = rgb;
        self
    }

    /// Path of frame `idx`.
    pub fn path_for(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("{}{:05}.png", self.prefix, idx.0))
    }

    /// Files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, _cfg: SinkConfig) -> TesseraResult<()> {
        ensure_dir(&self.dir)?;
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TesseraResult<()> {
        let path = self.path_for(idx);
        write_png(&path, frame, self.background)?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> TesseraResult<()> {
        tracing::debug!(
            frames = self.written.len(),
            dir = %self.dir.display(),
            "png sequence written"
        );
        Ok(())
    }
}

/// Encode `frame` as an opaque PNG at `path`, creating parent directories.
pub fn write_png(path: &Path, frame: &FrameRGBA, background: [u8; 3]) -> TesseraResult<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let rgba = frame.to_opaque_rgba8(background)?;
    image::save_buffer_with_format(
        path,
        &rgba,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| TesseraError::render(format!("failed to write '{}': {e}", path.display())))
}

pub(crate) fn ensure_dir(dir: &Path) -> TesseraResult<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    use anyhow::Context as _;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
