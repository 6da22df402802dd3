use crate::coordinate::Coordinate;
use crate::error::{Result, SandError};
use serde::{Deserialize, Serialize};

/// State of a single grid cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    /// Rock segment or floor
    Wall,
    /// A unit of sand at rest
    Settled,
}

impl Cell {
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

/// Fixed-size occupancy grid stored row-major
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    pub rows: i32,
    pub cols: i32,
    cells: Vec<Cell>,
    /// Revision number - incremented whenever a cell actually changes
    pub revision: u64,
}

impl Grid {
    /// Create a new grid with every cell empty
    pub fn new(rows: i32, cols: i32) -> Self {
        let rows = rows.max(0);
        let cols = cols.max(0);
        Grid {
            rows,
            cols,
            cells: vec![Cell::Empty; rows as usize * cols as usize],
            revision: 0,
        }
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.cols && y >= 0 && y < self.rows
    }

    /// Convert (x, y) coordinates to cell ID
    pub fn get_id(&self, x: i32, y: i32) -> i32 {
        x + y * self.cols
    }

    /// Convert cell ID to (x, y) coordinates
    pub fn get_coords(&self, id: i32) -> (i32, i32) {
        (id % self.cols, id / self.cols)
    }

    /// Cell at (x, y), or None outside the grid
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.cells[self.get_id(x, y) as usize])
    }

    /// Cell at (x, y), failing with OutOfBounds outside the grid
    pub fn cell(&self, x: i32, y: i32) -> Result<Cell> {
        self.get(x, y).ok_or(SandError::OutOfBounds { x, y })
    }

    pub fn cell_at(&self, c: Coordinate) -> Result<Cell> {
        self.cell(c.x, c.y)
    }

    /// Whether (x, y) exists and is empty
    pub fn is_free(&self, x: i32, y: i32) -> bool {
        self.get(x, y).map_or(false, Cell::is_empty)
    }

    pub fn set(&mut self, x: i32, y: i32, value: Cell) -> Result<()> {
        if !self.in_bounds(x, y) {
            return Err(SandError::OutOfBounds { x, y });
        }
        let id = self.get_id(x, y) as usize;
        if self.cells[id] != value {
            self.cells[id] = value;
            self.revision += 1;
        }
        Ok(())
    }

    pub fn set_at(&mut self, c: Coordinate, value: Cell) -> Result<()> {
        self.set(c.x, c.y, value)
    }

    /// Fill the inclusive axis-aligned segment between `a` and `b`
    pub fn fill_segment(&mut self, a: Coordinate, b: Coordinate, value: Cell) -> Result<()> {
        if a.x == b.x {
            for y in a.y.min(b.y)..=a.y.max(b.y) {
                self.set(a.x, y, value)?;
            }
        } else if a.y == b.y {
            for x in a.x.min(b.x)..=a.x.max(b.x) {
                self.set(x, a.y, value)?;
            }
        } else {
            return Err(SandError::NotAxisAligned { from: a, to: b });
        }
        Ok(())
    }

    /// Fill a whole row
    pub fn fill_row(&mut self, y: i32, value: Cell) -> Result<()> {
        if y < 0 || y >= self.rows {
            return Err(SandError::OutOfBounds { x: 0, y });
        }
        for x in 0..self.cols {
            self.set(x, y, value)?;
        }
        Ok(())
    }

    /// Iterate rows as slices, top to bottom
    pub fn rows_iter(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        // chunks() panics on 0, an empty grid simply has no rows
        self.cells.chunks(self.cols.max(1) as usize)
    }

    /// Number of cells in the given state
    pub fn count(&self, value: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == value).count()
    }

    /// Cell IDs in the given state, ascending
    pub fn ids_of(&self, value: Cell) -> Vec<i32> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == value)
            .map(|(id, _)| id as i32)
            .collect()
    }

    /// Get current grid revision number
    pub fn get_revision(&self) -> u64 {
        self.revision
    }
}
