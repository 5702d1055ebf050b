//! The cell matrix: construction, neighborhood linking and coordinate lookup.

use core::fmt;

use tracing::debug;

use crate::{Bounds, CellId, GridCell, GridConfig, GridError, GridResult, ObjectId};

/// A 2D uniform grid of cells stored row-major in one array.
///
/// Cells are never added, removed or resized after construction, so
/// neighborhoods are plain [`CellId`] indices into `cells`.
#[derive(Debug, Clone)]
pub struct SpatialGrid<T> {
    /// Map bounds in world units.
    bounds: Bounds,
    /// Cell size in world units.
    cell_width: i32,
    cell_height: i32,
    /// Grid height in cells.
    rows: u32,
    /// Grid width in cells.
    cols: u32,
    /// All cells, `row * cols + col`.
    cells: Vec<GridCell<T>>,
}

impl<T: ObjectId> SpatialGrid<T> {
    /// Build the grid and link every cell to its neighborhood.
    ///
    /// The last row and column are clipped to the map bounds when the map
    /// size is not a multiple of the cell size.
    pub fn new(config: &GridConfig) -> GridResult<Self> {
        config.validate()?;

        let rows = config.rows();
        let cols = config.cols();
        if u64::from(rows) * u64::from(cols) > u64::from(u32::MAX) {
            return Err(GridError::InvalidConfiguration(format!(
                "{rows}x{cols} cells exceed the cell id range"
            )));
        }

        let bounds = Bounds::new(
            config.origin_x,
            config.origin_y,
            config.max_x(),
            config.max_y(),
        );

        let mut cells = Vec::with_capacity(rows as usize * cols as usize);
        for row in 0..rows {
            for col in 0..cols {
                let min_x = bounds.min_x + col as i32 * config.cell_width;
                let min_y = bounds.min_y + row as i32 * config.cell_height;
                let cell_bounds = Bounds::new(
                    min_x,
                    min_y,
                    min_x.saturating_add(config.cell_width).min(bounds.max_x),
                    min_y.saturating_add(config.cell_height).min(bounds.max_y),
                );
                cells.push(GridCell::new(
                    CellId(row * cols + col),
                    row,
                    col,
                    cell_bounds,
                ));
            }
        }

        let mut grid = Self {
            bounds,
            cell_width: config.cell_width,
            cell_height: config.cell_height,
            rows,
            cols,
            cells,
        };
        grid.link_neighborhoods()?;

        debug!(
            rows,
            cols,
            cell_width = config.cell_width,
            cell_height = config.cell_height,
            "built spatial grid"
        );

        Ok(grid)
    }

    /// Link every cell to the in-bounds cells within one row and one column.
    fn link_neighborhoods(&mut self) -> GridResult<()> {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let id = self.index(row, col);
                for near_row in row.saturating_sub(1)..=(row + 1).min(self.rows - 1) {
                    for near_col in col.saturating_sub(1)..=(col + 1).min(self.cols - 1) {
                        let neighbor = self.index(near_row, near_col);
                        self.cells[id.index()].link_neighbor(neighbor)?;
                    }
                }
            }
        }
        Ok(())
    }

    #[inline]
    const fn index(&self, row: u32, col: u32) -> CellId {
        CellId(row * self.cols + col)
    }

    /// Get the cell containing world position `(x, y)`.
    ///
    /// Positions outside the map snap to the nearest border cell.
    #[must_use]
    pub fn cell_index_for(&self, x: i32, y: i32) -> CellId {
        let col = if x <= self.bounds.min_x {
            0
        } else if x >= self.bounds.max_x {
            self.cols - 1
        } else {
            ((x - self.bounds.min_x) / self.cell_width) as u32
        };
        let row = if y <= self.bounds.min_y {
            0
        } else if y >= self.bounds.max_y {
            self.rows - 1
        } else {
            ((y - self.bounds.min_y) / self.cell_height) as u32
        };
        self.index(row, col)
    }

    /// Get the cell containing world position `(x, y)`, clamped to the map.
    #[must_use]
    pub fn cell_at(&self, x: i32, y: i32) -> &GridCell<T> {
        &self.cells[self.cell_index_for(x, y).index()]
    }

    /// Get a cell by ID.
    ///
    /// # Panics
    ///
    /// If `id` was not produced by this grid.
    #[must_use]
    pub fn cell(&self, id: CellId) -> &GridCell<T> {
        &self.cells[id.index()]
    }

    /// Get a cell by ID for membership changes.
    ///
    /// # Panics
    ///
    /// If `id` was not produced by this grid.
    pub fn cell_mut(&mut self, id: CellId) -> &mut GridCell<T> {
        &mut self.cells[id.index()]
    }

    /// Get a cell by ID, or `None` when out of range.
    #[must_use]
    pub fn get(&self, id: CellId) -> Option<&GridCell<T>> {
        self.cells.get(id.index())
    }

    /// Get the cell at matrix position `(row, col)`.
    #[must_use]
    pub fn cell_at_row_col(&self, row: u32, col: u32) -> Option<&GridCell<T>> {
        if row < self.rows && col < self.cols {
            Some(&self.cells[self.index(row, col).index()])
        } else {
            None
        }
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[GridCell<T>] {
        &self.cells
    }

    /// Drop every cell's membership, keeping the grid's shape.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> u32 {
        self.cols
    }

    #[must_use]
    pub const fn cell_width(&self) -> i32 {
        self.cell_width
    }

    #[must_use]
    pub const fn cell_height(&self) -> i32 {
        self.cell_height
    }

    /// Get total number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if grid is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<T: ObjectId> fmt::Display for SpatialGrid<T> {
    /// One line per row, top row first, so the output reads like the map.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.rows).rev() {
            for col in 0..self.cols {
                write!(f, "{:>12}", self.cell(self.index(row, col)).to_string())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
