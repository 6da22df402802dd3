//! Grid builder - turns rock polylines into an occupancy grid and a source point
//!
//! Scan coordinates are shifted so the bounding box starts at (0, 0). The top
//! of the box is always y = 0 because the sand enters there, whatever the
//! rock data says.

use crate::coordinate::Coordinate;
use crate::error::{Result, SandError};
use crate::grid::{Cell, Grid};
use crate::scan::Polyline;
use serde::{Deserialize, Serialize};

/// Real-world column sand is poured from
pub const DEFAULT_SOURCE_X: i32 = 500;

/// Horizontal margin used by the original floor mode
pub const LEGACY_MARGIN: i32 = 250;

/// Upper bound on allocated cells
pub(crate) const MAX_CELLS: i64 = 1 << 28;

/// How far the grid is widened sideways when a floor is added below the rock
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarginPolicy {
    /// Widen by the floor offset, then far enough that the 45° pile spreading
    /// from the source stays clear of both side edges
    #[default]
    Derived,
    /// Widen by exactly this many columns on each side
    Fixed(i32),
}

/// Floor mode decoded from a floor offset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Floor {
    /// Negative offset: sand can fall out of the bottom
    Open,
    /// Offset 0: the lowest rock row becomes a full-width floor
    AtLowestRock,
    /// Positive offset: a floor this many rows below the lowest rock
    Below(i32),
}

impl Floor {
    pub fn from_offset(floor_offset: i32) -> Self {
        match floor_offset {
            o if o < 0 => Floor::Open,
            0 => Floor::AtLowestRock,
            o => Floor::Below(o),
        }
    }

    pub fn has_floor(self) -> bool {
        self != Floor::Open
    }
}

/// Parameters for [`build_cave`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    pub floor_offset: i32,
    pub source_x: i32,
    pub margin: MarginPolicy,
}

impl BuildOptions {
    pub fn new(floor_offset: i32) -> Self {
        BuildOptions {
            floor_offset,
            ..Default::default()
        }
    }

    pub fn with_source_x(mut self, source_x: i32) -> Self {
        self.source_x = source_x;
        self
    }

    pub fn with_margin(mut self, margin: MarginPolicy) -> Self {
        self.margin = margin;
        self
    }

    pub fn floor(&self) -> Floor {
        Floor::from_offset(self.floor_offset)
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            floor_offset: -1,
            source_x: DEFAULT_SOURCE_X,
            margin: MarginPolicy::Derived,
        }
    }
}

/// A built grid together with where sand enters it
#[derive(Clone, Debug, PartialEq)]
pub struct Cave {
    pub grid: Grid,
    /// Source in grid-local coordinates
    pub source: Coordinate,
    /// Scan coordinate of grid cell (0, 0)
    pub origin: Coordinate,
    pub floor: Floor,
}

impl Cave {
    pub fn to_scan(&self, local: Coordinate) -> Coordinate {
        Coordinate::new(local.x + self.origin.x, local.y + self.origin.y)
    }
}

/// Build the occupancy grid for a scan
pub fn build_cave(polylines: &[Polyline], options: &BuildOptions) -> Result<Cave> {
    if polylines.iter().all(|p| p.is_empty()) {
        return Err(SandError::InvalidInput {
            line: 0,
            message: "scan contains no rock paths".to_string(),
        });
    }

    // i64 so extreme scan or source values are rejected instead of overflowing
    let mut min_x = i64::MAX;
    let mut max_x = i64::MIN;
    let min_y = 0i64;
    let mut max_y = 0i64;

    for &c in polylines.iter().flatten() {
        if c.y < 0 {
            return Err(SandError::OutOfBounds { x: c.x, y: c.y });
        }
        min_x = min_x.min(c.x as i64);
        max_x = max_x.max(c.x as i64);
        max_y = max_y.max(c.y as i64);
    }

    let source_x = options.source_x as i64;
    let floor = options.floor();
    if let Floor::Below(offset) = floor {
        let offset = offset as i64;
        max_y += offset;
        let (left, right) = match options.margin {
            MarginPolicy::Fixed(margin) if margin < 0 => {
                return Err(SandError::InvalidInput {
                    line: 0,
                    message: format!("floor margin must not be negative, got {}", margin),
                })
            }
            MarginPolicy::Fixed(margin) => (margin as i64, margin as i64),
            MarginPolicy::Derived => {
                // widest sand row sits just above the floor
                let reach = max_y + 1;
                let left = offset.max(min_x - (source_x - reach));
                let right = offset.max(source_x + reach - max_x);
                (left, right)
            }
        };
        min_x -= left;
        max_x += right;
    }

    let rows = max_y - min_y + 1;
    let cols = max_x - min_x + 1;
    if rows > MAX_CELLS || cols > MAX_CELLS || rows * cols > MAX_CELLS {
        return Err(SandError::InvalidInput {
            line: 0,
            message: format!("grid of {}x{} cells is too large", cols, rows),
        });
    }

    let origin = Coordinate::new(narrow(min_x)?, narrow(min_y)?);
    let mut grid = Grid::new(narrow(rows)?, narrow(cols)?);

    for polyline in polylines {
        for pair in polyline.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.x != b.x && a.y != b.y {
                return Err(SandError::NotAxisAligned { from: a, to: b });
            }
            // every point lies inside the checked box, so the shift fits in i32
            grid.fill_segment(a.relative_to(origin), b.relative_to(origin), Cell::Wall)?;
        }
    }

    let local_x = source_x - min_x;
    if local_x < 0 || local_x >= cols {
        return Err(SandError::SourceOutOfBounds { x: options.source_x });
    }
    let source = Coordinate::new(narrow(local_x)?, 0);

    if floor.has_floor() {
        grid.fill_row(grid.rows - 1, Cell::Wall)?;
    }

    Ok(Cave {
        grid,
        source,
        origin,
        floor,
    })
}

/// Back to grid coordinates once the size check has passed
fn narrow(value: i64) -> Result<i32> {
    i32::try_from(value).map_err(|_| SandError::InvalidInput {
        line: 0,
        message: format!("coordinate {} is out of range", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::parse_scan;

    const CLASSIC: &str = "498,4 -> 498,6 -> 496,6\n503,4 -> 502,4 -> 502,9 -> 494,9";

    #[test]
    fn test_open_floor_bounding_box() {
        let cave = build_cave(&parse_scan(CLASSIC).unwrap(), &BuildOptions::new(-1)).unwrap();
        assert_eq!(cave.grid.cols, 10); // 494..=503
        assert_eq!(cave.grid.rows, 10); // 0..=9
        assert_eq!(cave.origin, Coordinate::new(494, 0));
        assert_eq!(cave.source, Coordinate::new(6, 0));
        assert_eq!(cave.grid.count(Cell::Wall), 20);
        assert_eq!(cave.floor, Floor::Open);
    }

    #[test]
    fn test_fixed_margin_floor() {
        let options = BuildOptions::new(2).with_margin(MarginPolicy::Fixed(LEGACY_MARGIN));
        let cave = build_cave(&parse_scan(CLASSIC).unwrap(), &options).unwrap();
        assert_eq!(cave.grid.rows, 12);
        assert_eq!(cave.grid.cols, 510);
        assert_eq!(cave.source, Coordinate::new(256, 0));
        let bottom: Vec<Cell> = cave.grid.rows_iter().last().unwrap().to_vec();
        assert!(bottom.iter().all(|&c| c == Cell::Wall));
    }

    #[test]
    fn test_derived_margin_covers_sand_cone() {
        let cave = build_cave(&parse_scan(CLASSIC).unwrap(), &BuildOptions::new(2)).unwrap();
        // floor at y = 11, cone reaches 500 +- 12
        assert_eq!(cave.origin.x, 488);
        assert_eq!(cave.grid.cols, 25);
        assert!(cave.source.x >= cave.grid.rows);
        assert!(cave.grid.cols - 1 - cave.source.x >= cave.grid.rows);
    }

    #[test]
    fn test_zero_offset_floors_lowest_rock_row() {
        let cave = build_cave(&parse_scan(CLASSIC).unwrap(), &BuildOptions::new(0)).unwrap();
        assert_eq!(cave.grid.rows, 10);
        assert_eq!(cave.grid.cols, 10);
        assert_eq!(cave.floor, Floor::AtLowestRock);
        for x in 0..cave.grid.cols {
            assert_eq!(cave.grid.get(x, 9), Some(Cell::Wall));
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let scan = parse_scan(CLASSIC).unwrap();
        let a = build_cave(&scan, &BuildOptions::new(2)).unwrap();
        let b = build_cave(&scan, &BuildOptions::new(2)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_diagonal_segment_is_rejected() {
        let err = build_cave(&parse_scan("498,4 -> 500,6").unwrap(), &BuildOptions::new(-1)).unwrap_err();
        match err {
            SandError::NotAxisAligned { from, to } => {
                assert_eq!(from, Coordinate::new(498, 4));
                assert_eq!(to, Coordinate::new(500, 6));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_rock_above_source_row_is_rejected() {
        let err = build_cave(&parse_scan("500,-1 -> 500,3").unwrap(), &BuildOptions::new(-1)).unwrap_err();
        assert!(matches!(err, SandError::OutOfBounds { x: 500, y: -1 }));
    }

    #[test]
    fn test_source_outside_rock_is_rejected() {
        let err = build_cave(&parse_scan("0,0 -> 0,5").unwrap(), &BuildOptions::new(-1)).unwrap_err();
        assert!(matches!(err, SandError::SourceOutOfBounds { x: 500 }));
    }

    #[test]
    fn test_custom_source_column() {
        let options = BuildOptions::new(-1).with_source_x(0);
        let cave = build_cave(&parse_scan("0,1 -> 0,5").unwrap(), &options).unwrap();
        assert_eq!(cave.source, Coordinate::new(0, 0));
        assert_eq!(cave.grid.cols, 1);
        assert_eq!(cave.grid.rows, 6);
    }

    #[test]
    fn test_empty_scan_is_rejected() {
        assert!(build_cave(&[], &BuildOptions::default()).is_err());
    }

    #[test]
    fn test_single_point_only_widens_bounds() {
        let cave = build_cave(&parse_scan("500,4 -> 500,4\n510,2").unwrap(), &BuildOptions::new(-1)).unwrap();
        assert_eq!(cave.grid.cols, 11);
        assert_eq!(cave.grid.count(Cell::Wall), 1);
    }

    #[test]
    fn test_extreme_rock_column_is_rejected() {
        let scan = parse_scan("-2147483648,5").unwrap();
        let err = build_cave(&scan, &BuildOptions::new(-1)).unwrap_err();
        assert!(matches!(err, SandError::SourceOutOfBounds { x: 500 }));
    }

    #[test]
    fn test_extreme_source_column_is_rejected() {
        let scan = parse_scan("1,2 -> 1,4").unwrap();
        let err = build_cave(&scan, &BuildOptions::new(-1).with_source_x(i32::MIN)).unwrap_err();
        assert!(matches!(err, SandError::SourceOutOfBounds { .. }));

        let options = BuildOptions::new(-1).with_source_x(i32::MAX);
        assert!(build_cave(&scan, &options).is_err());
    }

    #[test]
    fn test_derived_margin_with_extreme_source_is_rejected() {
        let scan = parse_scan("1,2 -> 1,4").unwrap();
        for source_x in [i32::MIN, i32::MIN + 3, i32::MAX] {
            let options = BuildOptions::new(2).with_source_x(source_x);
            assert!(matches!(
                build_cave(&scan, &options),
                Err(SandError::InvalidInput { .. })
            ));
        }
    }

    #[test]
    fn test_floor_offset_past_i32_range_is_rejected() {
        let scan = parse_scan("500,2147483647").unwrap();
        assert!(build_cave(&scan, &BuildOptions::new(i32::MAX)).is_err());
    }

    #[test]
    fn test_negative_fixed_margin_is_rejected() {
        let options = BuildOptions::new(2).with_margin(MarginPolicy::Fixed(-3));
        assert!(matches!(
            build_cave(&parse_scan(CLASSIC).unwrap(), &options),
            Err(SandError::InvalidInput { .. })
        ));
    }
}
