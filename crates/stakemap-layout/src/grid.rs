//! Uniform spatial grid for skipping far-apart pairs.

use glam::DVec2;
use stakemap_core::LayoutBounds;

/// Upper bound on cells per axis.
const MAX_CELLS_PER_AXIS: usize = 1024;

/// Buckets entity indices by position.
///
/// Cells are stored densely in row-major order, and indices within a cell
/// stay in insertion order, so neighbour iteration is deterministic.
#[derive(Debug, Clone)]
pub(crate) struct SpatialGrid {
    cell_size: f64,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<usize>>,
}

impl SpatialGrid {
    /// Build a grid over `bounds` with at least `cell_size` per cell.
    pub(crate) fn build(positions: &[DVec2], bounds: LayoutBounds, cell_size: f64) -> Self {
        let extent = bounds.width.max(bounds.height).max(1.0);
        let cell_size = cell_size
            .max(extent / MAX_CELLS_PER_AXIS as f64)
            .max(f64::EPSILON);
        let cols = ((bounds.width / cell_size).ceil() as usize).clamp(1, MAX_CELLS_PER_AXIS);
        let rows = ((bounds.height / cell_size).ceil() as usize).clamp(1, MAX_CELLS_PER_AXIS);

        let mut grid = Self {
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        };
        for (i, p) in positions.iter().enumerate() {
            let (c, r) = grid.cell_of(*p);
            grid.cells[r * cols + c].push(i);
        }
        grid
    }

    fn cell_of(&self, p: DVec2) -> (usize, usize) {
        let axis = |v: f64, n: usize| {
            let idx = (v / self.cell_size).floor();
            if idx.is_nan() || idx < 0.0 {
                0
            } else {
                (idx as usize).min(n - 1)
            }
        };
        (axis(p.x, self.cols), axis(p.y, self.rows))
    }

    /// Indices in the 3x3 block of cells around `p`.
    ///
    /// Covers every entity within `cell_size` of `p`.
    pub(crate) fn neighbors(&self, p: DVec2) -> impl Iterator<Item = usize> + '_ {
        let (c, r) = self.cell_of(p);
        let c0 = c.saturating_sub(1);
        let c1 = (c + 1).min(self.cols - 1);
        let r0 = r.saturating_sub(1);
        let r1 = (r + 1).min(self.rows - 1);
        (r0..=r1).flat_map(move |row| {
            (c0..=c1).flat_map(move |col| self.cells[row * self.cols + col].iter().copied())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_cover_cell_size() {
        let positions = vec![
            DVec2::new(10.0, 10.0),
            DVec2::new(45.0, 10.0),
            DVec2::new(95.0, 95.0),
        ];
        let grid = SpatialGrid::build(&positions, LayoutBounds::new(100.0, 100.0), 40.0);
        let near: Vec<usize> = grid.neighbors(positions[0]).collect();
        assert!(near.contains(&0));
        assert!(near.contains(&1));
        assert!(!near.contains(&2));
    }

    #[test]
    fn test_out_of_bounds_positions_are_clamped() {
        let positions = vec![DVec2::new(-50.0, 500.0), DVec2::new(f64::NAN, 0.0)];
        let grid = SpatialGrid::build(&positions, LayoutBounds::new(100.0, 100.0), 10.0);
        assert_eq!(grid.neighbors(DVec2::new(0.0, 99.0)).count(), 1);
        assert_eq!(grid.neighbors(DVec2::ZERO).count(), 1);
    }
}
