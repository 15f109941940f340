use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::TesseraResult;
use crate::host::handle::EngineHandle;

/// Shared cancellation flag for a refresh loop.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Return `true` once [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Event delivered by a [`RefreshSource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// Paint a frame at this timestamp.
    Frame(Duration),
    /// The viewport changed size.
    Resize(Canvas),
}

/// Source of refresh ticks and resize notifications, standing in for a display's frame clock.
pub trait RefreshSource {
    /// Nominal frame rate, reported to sinks.
    fn fps(&self) -> Fps;
    /// Next event, or `None` when the source is exhausted.
    fn next_event(&mut self) -> Option<HostEvent>;
}

/// Emits `frame_count` frames at a fixed rate, optionally resizing before given frames.
#[derive(Clone, Debug)]
pub struct FixedRateSource {
    fps: Fps,
    frame_count: u64,
    next: u64,
    resizes: BTreeMap<u64, Canvas>,
}

impl FixedRateSource {
    /// `frame_count` frames, the first at timestamp zero.
    pub fn new(fps: Fps, frame_count: u64) -> Self {
        Self {
            fps,
            frame_count,
            next: 0,
            resizes: BTreeMap::new(),
        }
    }

    /// As many frames as fit in `span`.
    pub fn for_duration(fps: Fps, span: Duration) -> Self {
        Self::new(fps, fps.frames_in(span))
    }

    /// Resize the viewport to `canvas` right before frame `at` is painted.
    pub fn with_resize_at(mut self, at: FrameIndex, canvas: Canvas) -> Self {
        self.resizes.insert(at.0, canvas);
        self
    }

    /// Frames still to be emitted.
    pub fn remaining(&self) -> u64 {
        self.frame_count.saturating_sub(self.next)
    }
}

impl RefreshSource for FixedRateSource {
    fn fps(&self) -> Fps {
        self.fps
    }

    fn next_event(&mut self) -> Option<HostEvent> {
        if self.next >= self.frame_count {
            return None;
        }
        if let Some(canvas) = self.resizes.remove(&self.next) {
            return Some(HostEvent::Resize(canvas));
        }
        let ts = self.fps.timestamp_of(FrameIndex(self.next));
        self.next += 1;
        Some(HostEvent::Frame(ts))
    }
}

/// Replays a fixed list of events. Useful for tests and recorded sessions.
#[derive(Clone, Debug)]
pub struct ScriptedSource {
    fps: Fps,
    events: VecDeque<HostEvent>,
}

impl ScriptedSource {
    /// Replay `events` in order.
    pub fn new(fps: Fps, events: impl IntoIterator<Item = HostEvent>) -> Self {
        Self {
            fps,
            events: events.into_iter().collect(),
        }
    }
}

impl RefreshSource for ScriptedSource {
    fn fps(&self) -> Fps {
        self.fps
    }

    fn next_event(&mut self) -> Option<HostEvent> {
        self.events.pop_front()
    }
}

/// Counters reported by [`run_loop`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Frames painted and pushed to the sink.
    pub frames_rendered: u64,
    /// Frame events whose paint was skipped.
    pub frames_skipped: u64,
    /// Resize events applied.
    pub resizes: u64,
    /// Whether the loop stopped on cancellation rather than source exhaustion.
    pub cancelled: bool,
}

/// Drive `handle` from `source` until the source runs dry or the loop is cancelled, pushing
/// every painted frame into `sink`.
///
/// Cancellation is observed between events, through either `cancel` or the handle's own token
/// (set by [`EngineHandle::dispose`]). The sink is finalized in both cases. A failing
/// `push_frame` aborts the loop after finalizing the sink.
#[tracing::instrument(skip_all)]
pub fn run_loop(
    handle: &mut EngineHandle,
    source: &mut dyn RefreshSource,
    sink: &mut dyn FrameSink,
    cancel: &CancelToken,
) -> TesseraResult<LoopStats> {
    let canvas = handle.engine().canvas();
    sink.begin(SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps: source.fps(),
    })?;

    let own = handle.cancel_token();
    let mut stats = LoopStats::default();
    let mut index = 0u64;

    while let Some(event) = source.next_event() {
        if cancel.is_cancelled() || own.is_cancelled() {
            stats.cancelled = true;
            break;
        }
        match event {
            HostEvent::Resize(canvas) => {
                handle.handle_resize(canvas.width, canvas.height);
                stats.resizes += 1;
            }
            HostEvent::Frame(ts) => match handle.on_frame(ts) {
                Some(frame) => {
                    if let Err(err) = sink.push_frame(FrameIndex(index), &frame) {
                        if let Err(end_err) = sink.end() {
                            tracing::warn!(%end_err, "sink end failed after push error");
                        }
                        return Err(err);
                    }
                    index += 1;
                    stats.frames_rendered += 1;
                }
                None => stats.frames_skipped += 1,
            },
        }
    }

    sink.end()?;
    tracing::debug!(
        rendered = stats.frames_rendered,
        skipped = stats.frames_skipped,
        resizes = stats.resizes,
        cancelled = stats.cancelled,
        "refresh loop finished"
    );
    Ok(stats)
}

#[cfg(test)]
#[path = "../../tests/unit/host/driver.rs"]
mod tests;
