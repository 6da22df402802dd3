use crate::builder::{Cave, Floor, MAX_CELLS};
use crate::coordinate::Coordinate;
use crate::error::{Result, SandError};
use crate::grid::{Cell, Grid};
use crate::simulator::Simulator;
use serde::{Deserialize, Serialize};
use std::fs;

/// Snapshot of a simulation in progress
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    /// Grid revision number
    pub grid_revision: u64,
    /// Grid dimensions
    pub grid_cols: i32,
    pub grid_rows: i32,
    /// Scan coordinate of grid cell (0, 0)
    pub origin: Coordinate,
    pub source: Coordinate,
    pub floor: Floor,
    /// Wall cells (stored as cell IDs)
    pub wall_cells: Vec<i32>,
    /// Sand cells (stored as cell IDs)
    pub settled_cells: Vec<i32>,
    pub settled_count: usize,
    pub drop_count: usize,
}

impl SaveState {
    pub fn from_simulator(sim: &Simulator) -> Self {
        let cave = sim.cave();
        SaveState {
            grid_revision: cave.grid.get_revision(),
            grid_cols: cave.grid.cols,
            grid_rows: cave.grid.rows,
            origin: cave.origin,
            source: cave.source,
            floor: cave.floor,
            wall_cells: cave.grid.ids_of(Cell::Wall),
            settled_cells: cave.grid.ids_of(Cell::Settled),
            settled_count: sim.settled_count(),
            drop_count: sim.drop_count(),
        }
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Rebuild the grid; fails if any stored cell lies outside it
    pub fn restore_grid(&self) -> Result<Grid> {
        if self.grid_rows <= 0 || self.grid_cols <= 0 {
            return Err(SandError::InvalidInput {
                line: 0,
                message: format!("saved grid has size {}x{}", self.grid_cols, self.grid_rows),
            });
        }
        let size = self.grid_rows as i64 * self.grid_cols as i64;
        if size > MAX_CELLS {
            return Err(SandError::InvalidInput {
                line: 0,
                message: format!("saved grid of {}x{} cells is too large", self.grid_cols, self.grid_rows),
            });
        }
        let mut grid = Grid::new(self.grid_rows, self.grid_cols);

        for (ids, value) in [(&self.wall_cells, Cell::Wall), (&self.settled_cells, Cell::Settled)] {
            for &cell_id in ids.iter() {
                if cell_id < 0 || cell_id as i64 >= size {
                    return Err(SandError::OutOfBounds { x: cell_id, y: 0 });
                }
                let (x, y) = grid.get_coords(cell_id);
                grid.set(x, y, value)?;
            }
        }

        grid.revision = self.grid_revision;
        Ok(grid)
    }

    /// Restore a simulator that continues where the snapshot left off
    pub fn restore_simulator(&self) -> Result<Simulator> {
        let grid = self.restore_grid()?;
        if !grid.in_bounds(self.source.x, self.source.y) {
            return Err(SandError::SourceOutOfBounds { x: self.source.x });
        }
        let cave = Cave {
            grid,
            source: self.source,
            origin: self.origin,
            floor: self.floor,
        };
        Ok(Simulator::resume(cave, self.settled_count, self.drop_count))
    }
}
