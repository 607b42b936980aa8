//! Uniform-grid broad phase
//!
//! Entities are bucketed by the cells their bounding box touches, so a query
//! only visits the few cells around the query circle instead of every enemy.
//! The grid stores caller-chosen keys (indices into the enemy vector) and
//! never owns entities. Exact circle tests are the caller's job.

use glam::Vec2;

use super::entity::Circle;
use crate::Bounds;

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(bounds: Bounds, cell_size: f32) -> Self {
        let cell_size = cell_size.max(1.0);
        let cols = ((bounds.width / cell_size).ceil() as usize).max(1);
        let rows = ((bounds.height / cell_size).ceil() as usize).max(1);
        Self {
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        }
    }

    /// Re-dimension for a new playfield (drops current contents)
    pub fn resize(&mut self, bounds: Bounds) {
        *self = Self::new(bounds, self.cell_size);
    }

    /// Empty every bucket, keeping their allocations for the next rebuild
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Inclusive cell ranges covered by a circle's bounding box, clamped to the grid
    fn cell_span(&self, center: Vec2, radius: f32) -> (usize, usize, usize, usize) {
        let clamp = |v: f32, max: usize| -> usize {
            let cell = (v / self.cell_size).floor();
            if cell <= 0.0 {
                0
            } else {
                (cell as usize).min(max - 1)
            }
        };
        (
            clamp(center.x - radius, self.cols),
            clamp(center.x + radius, self.cols),
            clamp(center.y - radius, self.rows),
            clamp(center.y + radius, self.rows),
        )
    }

    /// Insert `key` into every cell the circle's bounding box overlaps
    pub fn insert(&mut self, key: usize, center: Vec2, radius: f32) {
        let (x0, x1, y0, y1) = self.cell_span(center, radius);
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.cells[y * self.cols + x].push(key);
            }
        }
    }

    pub fn insert_circle<C: Circle>(&mut self, key: usize, entity: &C) {
        self.insert(key, entity.center(), entity.radius());
    }

    /// Keys sharing a cell with the circle's bounding box
    ///
    /// Each key appears once (ascending), however many cells it spans.
    pub fn query(&self, center: Vec2, radius: f32) -> Vec<usize> {
        let (x0, x1, y0, y1) = self.cell_span(center, radius);
        let mut found = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                found.extend_from_slice(&self.cells[y * self.cols + x]);
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    }

    pub fn query_circle<C: Circle>(&self, entity: &C) -> Vec<usize> {
        self.query(entity.center(), entity.radius())
    }
}
