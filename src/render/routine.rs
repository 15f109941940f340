use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::engine::config::{SQUARE, TRIANGLE};
use crate::foundation::core::Point;
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::grid::shape::Shape;

/// One grid cell handed to a [`ShapeRoutine`].
#[derive(Clone, Copy, Debug)]
pub struct Cell<'a> {
    /// Logical column in `-1..=cols`.
    pub x: isize,
    /// Row index.
    pub y: usize,
    /// Cell width in pixels.
    pub width: f64,
    /// Cell height in pixels.
    pub height: f64,
    /// Shape stored at this cell.
    pub shape: &'a Shape,
    /// Shape selected by the cell's partner entry.
    pub partner: &'a Shape,
}

/// Callback receiving a shape and the closed polygon to fill with its displayed color.
pub type DrawFn<'d> = dyn FnMut(&Shape, &[Point]) + 'd;

/// Turns a grid cell into zero or more filled polygons.
///
/// Closures with the matching signature implement this trait, so a custom routine can be
/// registered without a named type.
pub trait ShapeRoutine: Send + Sync {
    /// Emit the polygons for `cell` through `draw`.
    fn emit(&self, cell: &Cell<'_>, draw: &mut DrawFn<'_>);
}

impl<F> ShapeRoutine for F
where
    F: Fn(&Cell<'_>, &mut DrawFn<'_>) + Send + Sync,
{
    fn emit(&self, cell: &Cell<'_>, draw: &mut DrawFn<'_>) {
        self(cell, draw)
    }
}

/// Two triangles per cell. Even rows shift left by half a cell so neighbouring rows interlock;
/// the downward-pointing triangle takes its color from the cell's partner shape.
#[derive(Clone, Copy, Debug, Default)]
pub struct Triangle;

impl ShapeRoutine for Triangle {
    fn emit(&self, cell: &Cell<'_>, draw: &mut DrawFn<'_>) {
        let (w, h) = (cell.width, cell.height);
        let shift = if cell.y % 2 == 1 { 0.0 } else { -w / 2.0 };
        let left = w * cell.x as f64 + shift;
        let top = h * cell.y as f64;
        let bottom = top + h;

        draw(
            cell.shape,
            &[
                Point::new(left + w / 2.0, top),
                Point::new(left + w, bottom),
                Point::new(left, bottom),
            ],
        );
        draw(
            cell.partner,
            &[
                Point::new(left + w / 2.0, top),
                Point::new(left + w, bottom),
                Point::new(left + w * 1.5, top),
            ],
        );
    }
}

/// One axis-aligned square per cell.
#[derive(Clone, Copy, Debug, Default)]
pub struct Square;

impl ShapeRoutine for Square {
    fn emit(&self, cell: &Cell<'_>, draw: &mut DrawFn<'_>) {
        let left = cell.width * cell.x as f64;
        let top = cell.height * cell.y as f64;
        let right = left + cell.width;
        let bottom = top + cell.height;
        draw(
            cell.shape,
            &[
                Point::new(left, top),
                Point::new(right, top),
                Point::new(right, bottom),
                Point::new(left, bottom),
            ],
        );
    }
}

/// Shape routines by tag. [`ShapeRegistry::default`] holds `triangle` and `square`.
#[derive(Clone)]
pub struct ShapeRegistry {
    routines: HashMap<String, Arc<dyn ShapeRoutine>>,
}

impl fmt::Debug for ShapeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(TRIANGLE, Triangle);
        registry.register(SQUARE, Square);
        registry
    }
}

impl ShapeRegistry {
    /// A registry without any routines.
    pub fn empty() -> Self {
        Self {
            routines: HashMap::new(),
        }
    }

    /// Add or replace the routine for `tag`.
    pub fn register(&mut self, tag: impl Into<String>, routine: impl ShapeRoutine + 'static) {
        self.routines.insert(tag.into(), Arc::new(routine));
    }

    /// Return `true` if `tag` has a routine.
    pub fn contains(&self, tag: &str) -> bool {
        self.routines.contains_key(tag)
    }

    /// Look up the routine for `tag`.
    pub fn get(&self, tag: &str) -> TesseraResult<Arc<dyn ShapeRoutine>> {
        self.routines.get(tag).cloned().ok_or_else(|| {
            TesseraError::validation(format!("unknown shape type \"{tag}\""))
        })
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.routines.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/routine.rs"]
mod tests;
