use crate::coordinate::Coordinate;
use crate::grid::{Cell, Grid};
use crate::simulator::Simulator;

pub const EMPTY: char = '.';
pub const WALL: char = '#';
pub const SAND: char = 'o';
pub const SOURCE: char = '+';

/// Render the grid one text line per row
/// - `.`: empty
/// - `#`: rock or floor
/// - `o`: sand at rest
/// - `+`: source, while nothing occupies it
pub fn grid_to_string(grid: &Grid, source: Coordinate) -> String {
    let mut result = String::with_capacity(((grid.cols + 1) * grid.rows) as usize);

    for (y, row) in grid.rows_iter().enumerate() {
        for (x, &cell) in row.iter().enumerate() {
            let symbol = match cell {
                Cell::Settled => SAND,
                Cell::Wall => WALL,
                Cell::Empty if source.x == x as i32 && source.y == y as i32 => SOURCE,
                Cell::Empty => EMPTY,
            };
            result.push(symbol);
        }
        result.push('\n');
    }

    result
}

/// Verbose block printed after each drop: header, grid, blank line
pub fn render_progress(sim: &Simulator) -> String {
    format!(
        "Result after {} drops:\n{}\n",
        sim.settled_count(),
        grid_to_string(sim.grid(), sim.source())
    )
}
