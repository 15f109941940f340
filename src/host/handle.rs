use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::RngCore;

use crate::engine::config::EngineConfig;
use crate::engine::state::Engine;
use crate::foundation::core::Canvas;
use crate::foundation::error::TesseraResult;
use crate::host::driver::CancelToken;
use crate::render::blur::radius_px;
use crate::render::cpu::CpuRenderer;
use crate::render::frame::FrameRGBA;
use crate::render::routine::{ShapeRegistry, ShapeRoutine};

/// Everything a host needs to drive one animated background: the engine, its renderer and the
/// resolved shape routine.
///
/// ```no_run
/// use rand::SeedableRng;
/// use tessera::{Canvas, EngineConfig, EngineHandle, ShapeRegistry};
///
/// let mut handle = EngineHandle::initialize(
///     EngineConfig::default(),
///     Canvas::new(640, 360),
///     &ShapeRegistry::default(),
///     Box::new(rand::rngs::StdRng::seed_from_u64(7)),
/// )?;
/// let frame = handle.on_frame(std::time::Duration::from_millis(16));
/// handle.handle_resize(800, 600);
/// handle.dispose();
/// # Ok::<(), tessera::TesseraError>(())
/// ```
pub struct EngineHandle {
    engine: Engine,
    renderer: CpuRenderer,
    routine: Arc<dyn ShapeRoutine>,
    cancel: CancelToken,
    disposed: bool,
    blur_radius: u32,
    frame_budget: Option<Duration>,
    skip_blur_next: bool,
    last_blur_skipped: bool,
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("engine", &self.engine)
            .field("disposed", &self.disposed)
            .field("blur_radius", &self.blur_radius)
            .field("frame_budget", &self.frame_budget)
            .finish_non_exhaustive()
    }
}

impl EngineHandle {
    /// Validate `config`, resolve its shape type in `registry` and build the engine for
    /// `canvas`. Configuration problems surface here, never during frames.
    #[tracing::instrument(skip(config, registry, rng))]
    pub fn initialize(
        config: EngineConfig,
        canvas: Canvas,
        registry: &ShapeRegistry,
        rng: Box<dyn RngCore + Send>,
    ) -> TesseraResult<Self> {
        config.validate()?;
        let routine = registry.get(&config.shape_type)?;
        let blur_radius = radius_px(config.blur_radius);
        let engine = Engine::new(config, canvas, rng)?;

        Ok(Self {
            engine,
            renderer: CpuRenderer::new(),
            routine,
            cancel: CancelToken::new(),
            disposed: false,
            blur_radius,
            frame_budget: None,
            skip_blur_next: false,
            last_blur_skipped: false,
        })
    }

    /// Frames slower than `budget` make the next frame skip the blur pass.
    pub fn with_frame_budget(mut self, budget: Duration) -> Self {
        self.frame_budget = Some(budget);
        self
    }

    /// Relayout for a new viewport size. Ignored after [`dispose`](Self::dispose).
    pub fn handle_resize(&mut self, width: u32, height: u32) {
        if self.disposed {
            return;
        }
        self.engine.resize(Canvas::new(width, height));
    }

    /// Cancel the refresh loop and release the drawing surface. Further frames return `None`.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.cancel.cancel();
        self.renderer = CpuRenderer::new();
        self.disposed = true;
        tracing::debug!("engine handle disposed");
    }

    /// Refresh callback: advance the engine to `timestamp` and paint a frame.
    ///
    /// Returns `None` once disposed, and when the paint had to be skipped (empty viewport or a
    /// render failure, both logged). Timers advance either way.
    pub fn on_frame(&mut self, timestamp: Duration) -> Option<FrameRGBA> {
        if self.disposed || self.cancel.is_cancelled() {
            return None;
        }
        self.engine.tick(timestamp);

        let canvas = self.engine.canvas();
        if canvas.is_empty() {
            tracing::warn!(
                width = canvas.width,
                height = canvas.height,
                "skipping paint of empty viewport"
            );
            return None;
        }

        let blur = if self.skip_blur_next {
            tracing::debug!("previous frame over budget, skipping blur");
            0
        } else {
            self.blur_radius
        };
        self.last_blur_skipped = self.blur_radius > 0 && blur == 0;

        let started = Instant::now();
        let frame = self
            .renderer
            .render(&self.engine, self.routine.as_ref(), blur);
        let elapsed = started.elapsed();
        self.skip_blur_next = blur > 0 && self.frame_budget.is_some_and(|b| elapsed > b);

        match frame {
            Ok(frame) => Some(frame),
            Err(err) => {
                tracing::warn!(%err, "skipping paint");
                None
            }
        }
    }

    /// The underlying engine.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Token cancelled by [`dispose`](Self::dispose).
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Return `true` after [`dispose`](Self::dispose).
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Return `true` if the most recent frame was painted without its configured blur.
    pub fn last_blur_skipped(&self) -> bool {
        self.last_blur_skipped
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/handle.rs"]
mod tests;
