pub mod builder;
pub mod compact_log;
pub mod config;
pub mod coordinate;
pub mod drop_log;
pub mod error;
pub mod grid;
pub mod render;
pub mod save_state;
pub mod scan;
pub mod simulator;

pub use builder::{build_cave, BuildOptions, Cave, Floor, MarginPolicy};
pub use coordinate::Coordinate;
pub use error::{Result, SandError};
pub use grid::{Cell, Grid};
pub use scan::{parse_scan, Polyline};
pub use simulator::{DropOutcome, DropReport, EscapeKind, Simulator, Step};

use drop_log::DropLog;

/// Build a cave and pour sand until the run ends; returns the settled count.
/// With `verbose` the grid is printed after every drop and once at the end.
pub fn solve(polylines: &[Polyline], options: &BuildOptions, verbose: bool) -> Result<usize> {
    Ok(simulate(polylines, options, verbose, None)?.settled_count())
}

/// Like [`solve`], recording the run into `log` and handing back the finished
/// simulator so its grid can be rendered or saved
pub fn simulate(
    polylines: &[Polyline],
    options: &BuildOptions,
    verbose: bool,
    mut log: Option<&mut DropLog>,
) -> Result<Simulator> {
    let mut sim = Simulator::from_scan(polylines, options)?;
    if let Some(log) = log.as_deref_mut() {
        log.log_build(sim.cave());
    }

    let settled = sim.run_with(|sim, report| {
        if let Some(log) = log.as_deref_mut() {
            log.log_drop(report);
        }
        if verbose {
            print!("{}", render::render_progress(sim));
        }
    })?;

    if let Some(log) = log {
        log.log_finish(settled);
    }
    if verbose {
        print!("{}", render::render_progress(&sim));
    }
    Ok(sim)
}

/// Run the no-floor and floor variants side by side, each on its own grid
pub fn solve_both(
    polylines: &[Polyline],
    part_one: &BuildOptions,
    part_two: &BuildOptions,
) -> Result<(usize, usize)> {
    std::thread::scope(|scope| {
        let first = scope.spawn(|| solve(polylines, part_one, false));
        let second = solve(polylines, part_two, false);
        let first = first
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        Ok((first?, second?))
    })
}
