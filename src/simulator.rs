//! Fall simulator - pours sand one unit at a time into a [`Cave`]
//!
//! A falling unit tries, in order: straight down, down-left, down-right. If
//! all three are blocked it comes to rest. Leaving the grid through the
//! bottom or a side ends the whole run.

use crate::builder::{build_cave, BuildOptions, Cave};
use crate::coordinate::Coordinate;
use crate::error::Result;
use crate::grid::{Cell, Grid};
use crate::scan::Polyline;
use serde::{Deserialize, Serialize};

/// Which boundary a unit fell through
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscapeKind {
    Bottom,
    Left,
    Right,
}

/// Result of a single movement step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Moved(Coordinate),
    Escaped(EscapeKind),
    /// All three cells below are occupied
    Rest,
}

/// What happened to one dropped unit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropOutcome {
    /// Came to rest somewhere below the source
    Settled(Coordinate),
    /// Came to rest on the source itself; counted, but nothing more can be dropped
    SettledAtSource,
    /// The source cell was already occupied; nothing was dropped
    BlockedAtSource,
    /// Fell out of the grid; not counted
    Escaped(EscapeKind),
}

impl DropOutcome {
    /// Whether the run has to stop after this drop
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DropOutcome::Settled(_))
    }

    /// Whether this drop added to the settle counter
    pub fn is_counted(&self) -> bool {
        matches!(self, DropOutcome::Settled(_) | DropOutcome::SettledAtSource)
    }
}

/// Details of one drop, handed to observers of [`Simulator::run_with`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DropReport {
    /// 1-based index of the drop within this simulator
    pub unit: usize,
    pub outcome: DropOutcome,
    /// Number of cells moved before resting or escaping
    pub steps: usize,
    /// Last in-grid position of the unit
    pub last: Coordinate,
}

pub struct Simulator {
    cave: Cave,
    settled: usize,
    drops: usize,
}

impl Simulator {
    pub fn new(cave: Cave) -> Self {
        Simulator {
            cave,
            settled: 0,
            drops: 0,
        }
    }

    /// Parse-free entry point: build the cave and wrap it
    pub fn from_scan(polylines: &[Polyline], options: &BuildOptions) -> Result<Self> {
        Ok(Self::new(build_cave(polylines, options)?))
    }

    /// Resume from a saved grid, keeping its counters
    pub(crate) fn resume(cave: Cave, settled: usize, drops: usize) -> Self {
        Simulator {
            cave,
            settled,
            drops,
        }
    }

    pub fn cave(&self) -> &Cave {
        &self.cave
    }

    pub fn grid(&self) -> &Grid {
        &self.cave.grid
    }

    pub fn source(&self) -> Coordinate {
        self.cave.source
    }

    /// Units that have come to rest so far
    pub fn settled_count(&self) -> usize {
        self.settled
    }

    /// Drops attempted so far, including the one that ended the run
    pub fn drop_count(&self) -> usize {
        self.drops
    }

    /// Apply the descent rule once from `at`
    pub fn step(&self, at: Coordinate) -> Step {
        let grid = &self.cave.grid;
        let below = at.y + 1;

        if below >= grid.rows {
            return Step::Escaped(EscapeKind::Bottom);
        }
        if grid.is_free(at.x, below) {
            return Step::Moved(at.down());
        }
        if at.x == 0 {
            return Step::Escaped(EscapeKind::Left);
        }
        if grid.is_free(at.x - 1, below) {
            return Step::Moved(at.down_left());
        }
        if at.x + 1 >= grid.cols {
            return Step::Escaped(EscapeKind::Right);
        }
        if grid.is_free(at.x + 1, below) {
            return Step::Moved(at.down_right());
        }
        Step::Rest
    }

    /// Drop a single unit from the source and follow it until it rests or escapes
    pub fn drop_unit(&mut self) -> Result<DropReport> {
        self.drops += 1;
        let source = self.cave.source;

        if !self.cave.grid.cell_at(source)?.is_empty() {
            return Ok(DropReport {
                unit: self.drops,
                outcome: DropOutcome::BlockedAtSource,
                steps: 0,
                last: source,
            });
        }

        let mut position = source;
        let mut steps = 0;
        let outcome = loop {
            match self.step(position) {
                Step::Moved(next) => {
                    position = next;
                    steps += 1;
                }
                Step::Escaped(kind) => break DropOutcome::Escaped(kind),
                Step::Rest => {
                    self.cave.grid.set_at(position, Cell::Settled)?;
                    self.settled += 1;
                    if position == source {
                        break DropOutcome::SettledAtSource;
                    }
                    break DropOutcome::Settled(position);
                }
            }
        };

        Ok(DropReport {
            unit: self.drops,
            outcome,
            steps,
            last: position,
        })
    }

    /// Drop units until one escapes or the source fills up. Returns the settle count.
    pub fn run(&mut self) -> Result<usize> {
        self.run_with(|_, _| {})
    }

    /// Like [`run`](Self::run), calling `observer` after every drop
    pub fn run_with<F>(&mut self, mut observer: F) -> Result<usize>
    where
        F: FnMut(&Simulator, &DropReport),
    {
        loop {
            let report = self.drop_unit()?;
            observer(self, &report);
            if report.outcome.is_terminal() {
                return Ok(self.settled);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::parse_scan;

    const CLASSIC: &str = "498,4 -> 498,6 -> 496,6\n503,4 -> 502,4 -> 502,9 -> 494,9";

    fn classic(floor_offset: i32) -> Simulator {
        Simulator::from_scan(&parse_scan(CLASSIC).unwrap(), &BuildOptions::new(floor_offset)).unwrap()
    }

    #[test]
    fn test_first_unit_lands_on_ledge() {
        let mut sim = classic(-1);
        let report = sim.drop_unit().unwrap();
        // scan (500, 8), origin x = 494
        assert_eq!(report.outcome, DropOutcome::Settled(Coordinate::new(6, 8)));
        assert_eq!(report.steps, 8);
        assert_eq!(sim.settled_count(), 1);
    }

    #[test]
    fn test_second_unit_slides_left() {
        let mut sim = classic(-1);
        sim.drop_unit().unwrap();
        let report = sim.drop_unit().unwrap();
        assert_eq!(report.outcome, DropOutcome::Settled(Coordinate::new(5, 8)));
        let report = sim.drop_unit().unwrap();
        assert_eq!(report.outcome, DropOutcome::Settled(Coordinate::new(7, 8)));
    }

    #[test]
    fn test_classic_without_floor() {
        let mut sim = classic(-1);
        assert_eq!(sim.run().unwrap(), 24);
        assert_eq!(sim.drop_count(), 25);
    }

    #[test]
    fn test_classic_with_floor() {
        let mut sim = classic(2);
        assert_eq!(sim.run().unwrap(), 93);
        assert_eq!(sim.grid().get(sim.source().x, sim.source().y), Some(Cell::Settled));
    }

    #[test]
    fn test_classic_ends_when_unit_runs_off_the_left_edge() {
        // the grid is clipped to the rock, so the 25th unit slides off the
        // left end of the bottom ledge instead of reaching the last row
        let mut sim = classic(-1);
        let mut last = None;
        sim.run_with(|_, report| last = Some(*report)).unwrap();
        let last = last.unwrap();
        assert_eq!(last.outcome, DropOutcome::Escaped(EscapeKind::Left));
        assert_eq!(last.last, Coordinate::new(0, 8));
    }

    #[test]
    fn test_open_bottom_escape() {
        // lone point only stretches the grid to x = 501, y = 6
        let scan = parse_scan("499,3 -> 499,5\n501,6").unwrap();
        let options = BuildOptions::new(-1).with_source_x(501);
        let mut sim = Simulator::from_scan(&scan, &options).unwrap();
        let report = sim.drop_unit().unwrap();
        assert_eq!(report.outcome, DropOutcome::Escaped(EscapeKind::Bottom));
        assert_eq!(report.last, Coordinate::new(2, 6));
        assert_eq!(report.steps, 6);
        assert_eq!(sim.settled_count(), 0);
    }

    #[test]
    fn test_counter_moves_by_zero_or_one() {
        let mut sim = classic(2);
        let mut previous = 0;
        sim.run_with(|s, report| {
            let delta = s.settled_count() - previous;
            assert_eq!(delta, report.outcome.is_counted() as usize);
            previous = s.settled_count();
        })
        .unwrap();
    }

    #[test]
    fn test_floor_never_escapes() {
        let mut sim = classic(2);
        let mut outcomes = Vec::new();
        sim.run_with(|_, report| outcomes.push(report.outcome)).unwrap();
        assert!(outcomes.iter().all(|o| !matches!(o, DropOutcome::Escaped(_))));
        assert_eq!(outcomes.last(), Some(&DropOutcome::SettledAtSource));
    }

    #[test]
    fn test_step_priority() {
        // 3x3 grid whose bottom row is rock
        let scan = parse_scan("0,2 -> 2,2").unwrap();
        let options = BuildOptions::new(-1).with_source_x(1);
        let mut sim = Simulator::from_scan(&scan, &options).unwrap();
        assert_eq!(sim.step(Coordinate::new(1, 0)), Step::Moved(Coordinate::new(1, 1)));
        assert_eq!(sim.step(Coordinate::new(1, 1)), Step::Rest);
        assert_eq!(sim.step(Coordinate::new(0, 1)), Step::Escaped(EscapeKind::Left));
        assert_eq!(sim.step(Coordinate::new(2, 1)), Step::Escaped(EscapeKind::Right));
        assert_eq!(sim.step(Coordinate::new(1, 2)), Step::Escaped(EscapeKind::Bottom));

        let first = sim.drop_unit().unwrap();
        assert_eq!(first.outcome, DropOutcome::Settled(Coordinate::new(1, 1)));
        // down is now sand, down-left is free
        assert_eq!(sim.step(Coordinate::new(1, 0)), Step::Moved(Coordinate::new(0, 1)));
        let second = sim.drop_unit().unwrap();
        assert_eq!(second.outcome, DropOutcome::Escaped(EscapeKind::Left));
        assert_eq!(sim.settled_count(), 1);
    }

    #[test]
    fn test_single_column_wall_escapes_left() {
        let options = BuildOptions::new(-1).with_source_x(0);
        let mut sim = Simulator::from_scan(&parse_scan("0,2 -> 0,5").unwrap(), &options).unwrap();
        let report = sim.drop_unit().unwrap();
        assert_eq!(report.outcome, DropOutcome::Escaped(EscapeKind::Left));
        assert_eq!(report.last, Coordinate::new(0, 1));
        assert_eq!(sim.run().unwrap(), 0);
    }

    #[test]
    fn test_wall_on_source_blocks_everything() {
        let scan = parse_scan("499,0 -> 501,0 -> 501,3").unwrap();
        let mut sim = Simulator::from_scan(&scan, &BuildOptions::new(-1)).unwrap();
        let report = sim.drop_unit().unwrap();
        assert_eq!(report.outcome, DropOutcome::BlockedAtSource);
        assert_eq!(sim.settled_count(), 0);
    }
}
