use rand::{Rng, RngCore};

use crate::color::model::{Hsl, rgb_to_hsl};
use crate::grid::shape::{Shape, ShapeParams};
use crate::palette::sampler::PaletteSampler;

/// Rectangular grid of [`Shape`]s indexed `[row][slot]`.
///
/// Each row holds `cols + 2` slots: slot 0 is the sentinel column at logical column `-1`, slots
/// `1..=cols` are the visible columns and slot `cols + 1` is the trailing sentinel. Every slot
/// also owns a partner entry, a slot index in `0..=cols` that shape routines may use to borrow a
/// second color for the same cell.
#[derive(Clone, Debug, Default)]
pub struct ShapeGrid {
    cols: usize,
    rows: usize,
    shapes: Vec<Vec<Shape>>,
    partners: Vec<Vec<usize>>,
}

impl ShapeGrid {
    /// Build a fresh grid, sampling one anchor color per row.
    pub fn build(
        cols: usize,
        rows: usize,
        sampler: &PaletteSampler,
        params: &ShapeParams,
        rng: &mut dyn RngCore,
    ) -> Self {
        let mut grid = Self {
            cols,
            ..Self::default()
        };
        grid.grow_to(cols, rows, sampler, params, rng);
        grid
    }

    /// Change the grid dimensions in place.
    ///
    /// Shapes whose `(row, slot)` exists in both the old and new grid keep their full state;
    /// positions that only exist in the new grid get fresh shapes anchored to the sampler's row
    /// color. Partner entries that still point inside the row are kept as well.
    pub fn resize(
        &mut self,
        cols: usize,
        rows: usize,
        sampler: &PaletteSampler,
        params: &ShapeParams,
        rng: &mut dyn RngCore,
    ) {
        self.shapes.truncate(rows);
        self.partners.truncate(rows);
        let slots = cols + 2;

        for (y, (row, partners)) in self
            .shapes
            .iter_mut()
            .zip(self.partners.iter_mut())
            .enumerate()
        {
            row.truncate(slots);
            partners.truncate(slots);
            for p in partners.iter_mut() {
                if *p > cols {
                    *p = rng.gen_range(0..=cols);
                }
            }
            if row.len() < slots {
                let anchor = row_anchor(sampler, y);
                while row.len() < slots {
                    row.push(Shape::random(anchor, params, rng));
                    partners.push(rng.gen_range(0..=cols));
                }
            }
        }

        self.cols = cols;
        self.grow_to(cols, rows, sampler, params, rng);
    }

    fn grow_to(
        &mut self,
        cols: usize,
        rows: usize,
        sampler: &PaletteSampler,
        params: &ShapeParams,
        rng: &mut dyn RngCore,
    ) {
        let slots = cols + 2;
        for y in self.shapes.len()..rows {
            let anchor = row_anchor(sampler, y);
            let mut row = Vec::with_capacity(slots);
            let mut partners = Vec::with_capacity(slots);
            for _ in 0..slots {
                row.push(Shape::random(anchor, params, rng));
                partners.push(rng.gen_range(0..=cols));
            }
            self.shapes.push(row);
            self.partners.push(partners);
        }
        self.rows = rows;
    }

    /// Number of visible columns (sentinels excluded).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Slots per row, sentinels included.
    pub fn slots_per_row(&self) -> usize {
        self.cols + 2
    }

    /// Return `true` when there is nothing to animate or draw.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Shape at a logical column in `-1..=cols`.
    pub fn get(&self, row: usize, col: isize) -> Option<&Shape> {
        let slot = usize::try_from(col + 1).ok()?;
        self.slot(row, slot)
    }

    /// Shape at a physical slot in `0..cols + 2`.
    pub fn slot(&self, row: usize, slot: usize) -> Option<&Shape> {
        self.shapes.get(row)?.get(slot)
    }

    /// Partner shape of the given slot.
    pub fn partner(&self, row: usize, slot: usize) -> Option<&Shape> {
        let p = *self.partners.get(row)?.get(slot)?;
        self.slot(row, p)
    }

    /// Partner slot index of the given slot.
    pub fn partner_slot(&self, row: usize, slot: usize) -> Option<usize> {
        self.partners.get(row)?.get(slot).copied()
    }

    /// All rows in order.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[Shape]> {
        self.shapes.iter().map(Vec::as_slice)
    }

    /// Mutable access to all rows.
    pub fn rows_iter_mut(&mut self) -> impl Iterator<Item = &mut [Shape]> {
        self.shapes.iter_mut().map(Vec::as_mut_slice)
    }

    /// Iterate every shape.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().flatten()
    }

    /// Iterate every shape mutably.
    pub fn shapes_mut(&mut self) -> impl Iterator<Item = &mut Shape> {
        self.shapes.iter_mut().flatten()
    }
}

/// Anchor color for row `y`.
pub(crate) fn row_anchor(sampler: &PaletteSampler, y: usize) -> Hsl {
    rgb_to_hsl(sampler.color_at(y))
}

#[cfg(test)]
#[path = "../../tests/unit/grid/layout.rs"]
mod tests;
