use std::collections::HashMap;
use std::sync::Arc;

use crate::color::model::{Hsl, Rgb, hsl_to_rgb};
use crate::color::swatch::Swatch;
use crate::engine::state::Engine;
use crate::foundation::core::{Canvas, Point};
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::grid::shape::Shape;
use crate::render::blur::{blur_in_place, box_kernel_q16};
use crate::render::frame::FrameRGBA;
use crate::render::routine::{Cell, ShapeRoutine};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct WashKey {
    stops: Vec<[u8; 3]>,
    width: u32,
    height: u32,
}

/// CPU rasterizer for engine frames, built on `vello_cpu`.
///
/// The render context, target pixmap, wash images and blur scratch space are kept between frames
/// and only reallocated when the canvas size changes.
pub struct CpuRenderer {
    ctx: Option<vello_cpu::RenderContext>,
    pixmap: Option<vello_cpu::Pixmap>,
    wash_cache: HashMap<WashKey, vello_cpu::Image>,
    blur_kernel_cache: HashMap<u32, Arc<Vec<u32>>>,
    blur_scratch: Vec<u8>,
}

impl Default for CpuRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CpuRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuRenderer")
            .field("cached_washes", &self.wash_cache.len())
            .finish_non_exhaustive()
    }
}

/// Draw calls available while a frame is being painted. See [`CpuRenderer::paint`].
pub struct Painter<'r> {
    ctx: &'r mut vello_cpu::RenderContext,
    wash_cache: &'r mut HashMap<WashKey, vello_cpu::Image>,
    canvas: Canvas,
}

impl Painter<'_> {
    /// Fill the whole viewport with a vertical gradient through the swatch's colors.
    pub fn draw_background_wash(&mut self, swatch: &Swatch) -> TesseraResult<()> {
        let image = wash_image(self.wash_cache, swatch.stops(), self.canvas)?;
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(image);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.canvas.width),
            f64::from(self.canvas.height),
        ));
        Ok(())
    }

    /// Fill the closed polygon through `points` with `color`. Fewer than three points draw
    /// nothing.
    pub fn draw_shape(&mut self, color: Hsl, points: &[Point]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        if rest.len() < 2 {
            return;
        }

        let mut path = vello_cpu::kurbo::BezPath::new();
        path.move_to(point_to_cpu(*first));
        for p in rest {
            path.line_to(point_to_cpu(*p));
        }
        path.close_path();

        let Rgb { r, g, b, a } = hsl_to_rgb(color);
        let alpha = (a.clamp(0.0, 1.0) * 255.0).round() as u8;
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, alpha));
        self.ctx.fill_path(&path);
    }

    /// Canvas being painted.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }
}

impl CpuRenderer {
    /// Create a renderer with empty caches.
    pub fn new() -> Self {
        Self {
            ctx: None,
            pixmap: None,
            wash_cache: HashMap::new(),
            blur_kernel_cache: HashMap::new(),
            blur_scratch: Vec::new(),
        }
    }

    /// Paint one frame of `canvas` through `draw`, then apply a box blur of `blur_radius`
    /// pixels (0 skips the pass) and read the pixels back.
    pub fn paint(
        &mut self,
        canvas: Canvas,
        blur_radius: u32,
        draw: impl FnOnce(&mut Painter<'_>) -> TesseraResult<()>,
    ) -> TesseraResult<FrameRGBA> {
        let (w, h) = surface_size(canvas)?;

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        self.wash_cache
            .retain(|k, _| k.width == canvas.width && k.height == canvas.height);

        let drawn = {
            let mut painter = Painter {
                ctx: &mut ctx,
                wash_cache: &mut self.wash_cache,
                canvas,
            };
            draw(&mut painter)
        };
        let frame = drawn.and_then(|()| {
            ctx.flush();
            if self
                .pixmap
                .as_ref()
                .is_none_or(|p| p.width() != w || p.height() != h)
            {
                self.pixmap = Some(vello_cpu::Pixmap::new(w, h));
            }
            let pixmap = self
                .pixmap
                .get_or_insert_with(|| vello_cpu::Pixmap::new(w, h));
            ctx.render_to_pixmap(pixmap);

            if blur_radius > 0 {
                let kernel = self
                    .blur_kernel_cache
                    .entry(blur_radius)
                    .or_insert_with(|| Arc::new(box_kernel_q16(blur_radius)))
                    .clone();
                blur_in_place(
                    pixmap.data_as_u8_slice_mut(),
                    &mut self.blur_scratch,
                    canvas.width,
                    canvas.height,
                    &kernel,
                )?;
            }

            Ok(FrameRGBA {
                width: canvas.width,
                height: canvas.height,
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            })
        });

        self.ctx = Some(ctx);
        frame
    }

    /// Paint the engine's current state: the wash of the current swatch, then every cell of the
    /// grid through `routine`, each polygon filled with its shape's displayed color.
    pub fn render(
        &mut self,
        engine: &Engine,
        routine: &dyn ShapeRoutine,
        blur_radius: u32,
    ) -> TesseraResult<FrameRGBA> {
        let config = engine.config();
        let grid = engine.grid();
        self.paint(engine.canvas(), blur_radius, |painter| {
            painter.draw_background_wash(engine.current_swatch())?;
            let mut draw = |shape: &Shape, points: &[Point]| {
                painter.draw_shape(shape.displayed, points);
            };
            for y in 0..grid.rows() {
                for slot in 0..grid.slots_per_row() {
                    let (Some(shape), Some(partner)) = (grid.slot(y, slot), grid.partner(y, slot))
                    else {
                        continue;
                    };
                    let cell = Cell {
                        x: slot as isize - 1,
                        y,
                        width: config.shape_width,
                        height: config.shape_height,
                        shape,
                        partner,
                    };
                    routine.emit(&cell, &mut draw);
                }
            }
            Ok(())
        })
    }
}

fn surface_size(canvas: Canvas) -> TesseraResult<(u16, u16)> {
    if canvas.is_empty() {
        return Err(TesseraError::render(format!(
            "cannot paint an empty {}x{} canvas",
            canvas.width, canvas.height
        )));
    }
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| TesseraError::render("canvas width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| TesseraError::render("canvas height exceeds u16"))?;
    Ok((w, h))
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

/// Position of stop `i` of `count` along the wash: the first stop sits at the top, stop `i > 0`
/// at `(i + 1) / count`.
pub(crate) fn wash_stop_offset(i: usize, count: usize) -> f64 {
    if i == 0 || count == 0 {
        0.0
    } else {
        ((i + 1) as f64 / count as f64).min(1.0)
    }
}

/// Color of the wash at vertical position `t` in `[0, 1]`.
pub(crate) fn wash_color_at(stops: &[Rgb], t: f64) -> [u8; 3] {
    let Some(first) = stops.first() else {
        return [0, 0, 0];
    };
    let mut prev = (0.0, *first);
    for (i, stop) in stops.iter().enumerate() {
        let offset = wash_stop_offset(i, stops.len());
        if t <= offset {
            let (p_off, p) = prev;
            let span = offset - p_off;
            let local = if span > 0.0 { (t - p_off) / span } else { 1.0 };
            let lerp = |a: u8, b: u8| -> u8 {
                let af = f64::from(a);
                let bf = f64::from(b);
                (af + (bf - af) * local).round().clamp(0.0, 255.0) as u8
            };
            return [lerp(p.r, stop.r), lerp(p.g, stop.g), lerp(p.b, stop.b)];
        }
        prev = (offset, *stop);
    }
    let last = prev.1;
    [last.r, last.g, last.b]
}

fn wash_image(
    cache: &mut HashMap<WashKey, vello_cpu::Image>,
    stops: &[Rgb],
    canvas: Canvas,
) -> TesseraResult<vello_cpu::Image> {
    let key = WashKey {
        stops: stops.iter().map(|c| [c.r, c.g, c.b]).collect(),
        width: canvas.width,
        height: canvas.height,
    };
    if let Some(img) = cache.get(&key).cloned() {
        return Ok(img);
    }

    let (w, h) = surface_size(canvas)?;
    let row_len = usize::from(w);
    let mut pixels = Vec::with_capacity(row_len * usize::from(h));
    for y in 0..h {
        let t = (f64::from(y) + 0.5) / f64::from(h);
        let [r, g, b] = wash_color_at(stops, t);
        let px = vello_cpu::peniko::color::PremulRgba8::from_u8_array([r, g, b, 255]);
        pixels.extend(std::iter::repeat_n(px, row_len));
    }
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, false);
    let img = vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    };
    cache.insert(key, img.clone());
    Ok(img)
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
