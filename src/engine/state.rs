use std::fmt;
use std::time::Duration;

use rand::{Rng, RngCore};

use crate::color::blend::{Opacity, calculate_transparency};
use crate::color::model::{Hsl, hsl_to_rgb};
use crate::color::swatch::Swatch;
use crate::engine::config::EngineConfig;
use crate::foundation::core::Canvas;
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::grid::layout::{ShapeGrid, row_anchor};
use crate::palette::sampler::PaletteSampler;

/// Animation state machine: palette hold/transition timers plus the shape grid.
///
/// All state lives on the instance, so several engines can run side by side. Randomness comes
/// from the injected source only.
pub struct Engine {
    config: EngineConfig,
    canvas: Canvas,
    grid: ShapeGrid,
    sampler: PaletteSampler,
    swatch_index: usize,
    anchor_index: usize,
    hold: Duration,
    transition: Duration,
    transitioning: bool,
    last_timestamp: Option<Duration>,
    rng: Box<dyn RngCore + Send>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("canvas", &self.canvas)
            .field("cols", &self.grid.cols())
            .field("rows", &self.grid.rows())
            .field("swatch_index", &self.swatch_index)
            .field("hold", &self.hold)
            .field("transition", &self.transition)
            .field("transitioning", &self.transitioning)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Validate `config` and lay out a grid for `canvas` using a randomly drawn swatch.
    ///
    /// Fails with [`TesseraError::Validation`] when the grid would exceed [`MAX_GRID_SHAPES`].
    #[tracing::instrument(skip(config, rng), fields(shape_type = %config.shape_type))]
    pub fn new(
        config: EngineConfig,
        canvas: Canvas,
        mut rng: Box<dyn RngCore + Send>,
    ) -> TesseraResult<Self> {
        config.validate()?;
        let (cols, rows) = checked_grid_dimensions(canvas, &config)?;
        let swatch_index = rng.gen_range(0..config.gradients.len());
        let swatch = &config.gradients[swatch_index];

        let sampler = PaletteSampler::new(swatch.stops(), rows);
        let grid = ShapeGrid::build(cols, rows, &sampler, &config.shape_params(), rng.as_mut());
        tracing::debug!(cols, rows, swatch = swatch.name(), "engine created");

        let mut engine = Self {
            config,
            canvas,
            grid,
            sampler,
            swatch_index,
            anchor_index: swatch_index,
            hold: Duration::ZERO,
            transition: Duration::ZERO,
            transitioning: false,
            last_timestamp: None,
            rng,
        };
        engine.update_colors();
        Ok(engine)
    }

    /// Advance every timer to `timestamp` and recompute shape colors.
    ///
    /// The first call only records the timestamp. A timestamp earlier than the previous one
    /// counts as no elapsed time.
    pub fn tick(&mut self, timestamp: Duration) {
        let delta = self
            .last_timestamp
            .map_or(Duration::ZERO, |prev| timestamp.saturating_sub(prev));
        self.last_timestamp = Some(timestamp);
        self.advance(delta);
    }

    /// Advance every timer by `delta` and recompute shape colors.
    ///
    /// A transition started by this call begins at progress zero; `delta` only counts toward
    /// transitions that were already running.
    pub fn advance(&mut self, delta: Duration) {
        let timing = self.config.color_timing();
        let was_transitioning = self.transitioning;

        self.hold = self.hold.saturating_add(delta);
        if self.hold > timing {
            self.hold = Duration::ZERO;
            if !self.transitioning {
                self.start_transition();
            }
        }

        if was_transitioning {
            self.transition = self.transition.saturating_add(delta);
            if self.transition > timing {
                self.commit_transition();
            }
        }

        if self.grid.is_empty() {
            return;
        }
        for shape in self.grid.shapes_mut() {
            shape.advance(delta);
        }
        self.update_colors();
    }

    /// Lay the grid out for a new canvas.
    ///
    /// The sampler is rebuilt only when the row count changes. Shapes that exist at the same
    /// `(row, slot)` before and after keep their animation phase. New shapes are anchored to the
    /// palette the existing shapes are anchored to, so during a transition they fade in step
    /// with their neighbours.
    ///
    /// A canvas that would need more than [`MAX_GRID_SHAPES`] shapes is ignored with a warning.
    #[tracing::instrument(skip(self))]
    pub fn resize(&mut self, canvas: Canvas) {
        let (cols, rows) = match checked_grid_dimensions(canvas, &self.config) {
            Ok(dims) => dims,
            Err(err) => {
                tracing::warn!(%err, "ignoring resize");
                return;
            }
        };
        if rows != self.sampler.domain() {
            self.sampler = PaletteSampler::new(self.current_swatch().stops(), rows);
        }
        let anchors = if self.anchor_index == self.swatch_index {
            self.sampler.clone()
        } else {
            PaletteSampler::new(self.config.gradients[self.anchor_index].stops(), rows)
        };
        self.grid.resize(
            cols,
            rows,
            &anchors,
            &self.config.shape_params(),
            self.rng.as_mut(),
        );
        self.canvas = canvas;
        self.update_colors();
        tracing::debug!(cols, rows, "grid resized");
    }

    fn start_transition(&mut self) {
        let index = self.rng.gen_range(0..self.config.gradients.len());
        self.swatch_index = index;
        self.sampler = PaletteSampler::new(
            self.config.gradients[index].stops(),
            self.grid.rows(),
        );
        self.transition = Duration::ZERO;
        self.transitioning = true;
        tracing::debug!(
            swatch = self.config.gradients[index].name(),
            "palette transition started"
        );
    }

    fn commit_transition(&mut self) {
        for (y, row) in self.grid.rows_iter_mut().enumerate() {
            let target = row_anchor(&self.sampler, y);
            for shape in row {
                shape.original_color = target;
                shape.color = target;
            }
        }
        self.anchor_index = self.swatch_index;
        self.transitioning = false;
        self.hold = Duration::ZERO;
        self.transition = Duration::ZERO;
        tracing::debug!(swatch = self.current_swatch().name(), "palette transition committed");
    }

    fn update_colors(&mut self) {
        let opacity = match self.transition_progress() {
            Some(eased) => match Opacity::new(1.0 - eased) {
                Ok(o) => Some((o, eased)),
                Err(err) => {
                    tracing::warn!(%err, "skipping palette blend");
                    None
                }
            },
            None => None,
        };

        let easing = &self.config.lightness_easing;
        for (y, row) in self.grid.rows_iter_mut().enumerate() {
            let target = opacity.map(|_| row_anchor(&self.sampler, y));
            for shape in row {
                shape.color = match (opacity, target) {
                    (Some((o, eased)), Some(target)) => {
                        blend_toward(shape.original_color, target, o, eased)
                    }
                    _ => shape.original_color,
                };
                shape.refresh_displayed(easing);
            }
        }
    }

    /// Eased transition progress in `[0, 1]`, or `None` when no transition is running.
    pub fn transition_progress(&self) -> Option<f64> {
        if !self.transitioning {
            return None;
        }
        let timing = self.config.color_timing().as_secs_f64();
        let t = if timing > 0.0 {
            self.transition.as_secs_f64() / timing
        } else {
            1.0
        };
        Some(self.config.gradient_transition_easing.apply(t))
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Canvas the grid is laid out for.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// The shape grid.
    pub fn grid(&self) -> &ShapeGrid {
        &self.grid
    }

    /// Sampler for the current swatch.
    pub fn sampler(&self) -> &PaletteSampler {
        &self.sampler
    }

    /// Index of the current swatch in `config.gradients`. Switches when a transition starts.
    pub fn swatch_index(&self) -> usize {
        self.swatch_index
    }

    /// The current swatch; the background wash is drawn from it.
    pub fn current_swatch(&self) -> &Swatch {
        &self.config.gradients[self.swatch_index]
    }

    /// Return `true` while a palette transition is running.
    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Time since the last hold reset.
    pub fn hold_elapsed(&self) -> Duration {
        self.hold
    }

    /// Time into the running transition.
    pub fn transition_elapsed(&self) -> Duration {
        self.transition
    }
}

/// Upper bound on the shapes of one grid, sentinel columns included.
pub const MAX_GRID_SHAPES: usize = 1 << 22;

fn checked_grid_dimensions(
    canvas: Canvas,
    config: &EngineConfig,
) -> TesseraResult<(usize, usize)> {
    let (cols, rows) = grid_dimensions(canvas, config.shape_width, config.shape_height);
    let shapes = cols.saturating_add(2).saturating_mul(rows);
    if shapes > MAX_GRID_SHAPES {
        return Err(TesseraError::validation(format!(
            "{}x{} canvas with {}x{} cells needs {shapes} shapes, limit is {MAX_GRID_SHAPES}",
            canvas.width, canvas.height, config.shape_width, config.shape_height
        )));
    }
    Ok((cols, rows))
}

/// `(cols, rows)` needed to cover `canvas` with cells of the given size.
pub fn grid_dimensions(canvas: Canvas, shape_width: f64, shape_height: f64) -> (usize, usize) {
    let fit = |extent: u32, cell: f64| -> usize {
        if cell > 0.0 && cell.is_finite() {
            (f64::from(extent) / cell).ceil() as usize
        } else {
            0
        }
    };
    (
        fit(canvas.width, shape_width),
        fit(canvas.height, shape_height),
    )
}

/// Color of a shape `eased` of the way from `original` to `target`.
///
/// Hue and saturation come from an RGB mix; lightness moves linearly so it lands exactly on the
/// target.
pub(crate) fn blend_toward(original: Hsl, target: Hsl, opacity: Opacity, eased: f64) -> Hsl {
    let mixed = calculate_transparency(hsl_to_rgb(original), hsl_to_rgb(target), opacity);
    let diff = (original.l - target.l).abs();
    let l = if target.l < original.l {
        original.l - eased * diff
    } else {
        original.l + eased * diff
    };
    Hsl::with_alpha(mixed.h, mixed.s, l, original.a)
}

#[cfg(test)]
#[path = "../../tests/unit/engine/state.rs"]
mod tests;
