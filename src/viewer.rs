//! Window that animates a run, a few drops per frame

use arboard::Clipboard;
use macroquad::prelude::*;
use sandfall::config::Config;
use sandfall::render::grid_to_string;
use sandfall::save_state::SaveState;
use sandfall::{BuildOptions, Cell, DropOutcome, Polyline, Simulator};

const MAX_WINDOW_WIDTH: f32 = 1600.0;
const MAX_WINDOW_HEIGHT: f32 = 1000.0;
const SNAPSHOT_PATH: &str = "sandfall_snapshot.json";

/// Visualization state
struct ViewState {
    sim: Simulator,
    polylines: Vec<Polyline>,
    options: BuildOptions,
    drops_per_frame: usize,
    paused: bool,
    finished: Option<DropOutcome>,
    background: Color,
}

impl ViewState {
    fn new(config: &Config, polylines: Vec<Polyline>, options: BuildOptions) -> sandfall::Result<Self> {
        let sim = Simulator::from_scan(&polylines, &options)?;
        Ok(ViewState {
            sim,
            polylines,
            options,
            drops_per_frame: config.visual.drops_per_frame.max(1),
            paused: false,
            finished: None,
            background: Color::from_rgba(
                config.visual.background_r,
                config.visual.background_g,
                config.visual.background_b,
                255,
            ),
        })
    }

    fn reset(&mut self) -> sandfall::Result<()> {
        self.sim = Simulator::from_scan(&self.polylines, &self.options)?;
        self.finished = None;
        Ok(())
    }

    /// Drop up to `count` units, stopping at the end of the run
    fn advance(&mut self, count: usize) -> sandfall::Result<()> {
        for _ in 0..count {
            if self.finished.is_some() {
                break;
            }
            let report = self.sim.drop_unit()?;
            if report.outcome.is_terminal() {
                println!("Run finished after {} drops: {:?}", report.unit, report.outcome);
                println!("Settled units: {}", self.sim.settled_count());
                self.finished = Some(report.outcome);
            }
        }
        Ok(())
    }

    fn copy_to_clipboard(&self) {
        let text = grid_to_string(self.sim.grid(), self.sim.source());
        match Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(text) {
                    println!("Failed to copy to clipboard: {}", e);
                } else {
                    println!("Grid copied to clipboard!");
                    // Keep clipboard alive for a moment to ensure clipboard managers can capture it
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
            Err(e) => {
                println!("Failed to access clipboard: {}", e);
            }
        }
    }

    fn save_snapshot(&self) {
        match SaveState::from_simulator(&self.sim).save_to_file(SNAPSHOT_PATH) {
            Ok(()) => println!("Snapshot saved to {}", SNAPSHOT_PATH),
            Err(e) => println!("{}", e),
        }
    }

    fn draw(&self) {
        clear_background(self.background);

        let grid = self.sim.grid();
        let cell_size = (screen_width() / grid.cols as f32).min(screen_height() / grid.rows as f32);
        let source = self.sim.source();

        for (y, row) in grid.rows_iter().enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                let color = match cell {
                    Cell::Empty => continue,
                    Cell::Wall => Color::from_rgba(120, 120, 130, 255),
                    Cell::Settled => Color::from_rgba(230, 190, 90, 255),
                };
                draw_rectangle(x as f32 * cell_size, y as f32 * cell_size, cell_size, cell_size, color);
            }
        }

        draw_rectangle(
            source.x as f32 * cell_size,
            source.y as f32 * cell_size,
            cell_size,
            cell_size,
            RED,
        );

        let status = match self.finished {
            Some(outcome) => format!("Finished: {:?}", outcome),
            None if self.paused => "Paused".to_string(),
            None => "Running".to_string(),
        };
        let lines = [
            format!("Settled: {}   Drops: {}", self.sim.settled_count(), self.sim.drop_count()),
            status,
            "Space: pause  N: single drop  R: reset".to_string(),
            "C: copy grid  S: save snapshot  Esc: close".to_string(),
        ];
        for (i, line) in lines.iter().enumerate() {
            draw_text(line, 10.0, 20.0 + i as f32 * 20.0, 20.0, WHITE);
        }
    }
}

fn window_conf(config: &Config, cols: i32, rows: i32) -> Conf {
    let cell_size = config.visual.cell_size;
    let width = (cols as f32 * cell_size).clamp(320.0, MAX_WINDOW_WIDTH);
    let height = (rows as f32 * cell_size).clamp(240.0, MAX_WINDOW_HEIGHT);
    Conf {
        window_title: config.visual.window_title.clone(),
        window_width: width as i32,
        window_height: height as i32,
        window_resizable: true,
        ..Default::default()
    }
}

async fn main_loop(mut state: ViewState) {
    loop {
        if is_key_pressed(KeyCode::Space) {
            state.paused = !state.paused;
        }
        if is_key_pressed(KeyCode::R) {
            if let Err(e) = state.reset() {
                eprintln!("Error: {}", e);
                break;
            }
        }
        if is_key_pressed(KeyCode::C) {
            state.copy_to_clipboard();
        }
        if is_key_pressed(KeyCode::S) {
            state.save_snapshot();
        }
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        let count = if state.paused {
            usize::from(is_key_pressed(KeyCode::N))
        } else {
            state.drops_per_frame
        };
        if let Err(e) = state.advance(count) {
            eprintln!("Error: {}", e);
            break;
        }

        state.draw();

        next_frame().await
    }
}

/// Open the window and block until it is closed
pub fn run(config: &Config, polylines: Vec<Polyline>, options: BuildOptions) -> sandfall::Result<()> {
    let state = ViewState::new(config, polylines, options)?;
    let conf = window_conf(config, state.sim.grid().cols, state.sim.grid().rows);
    macroquad::Window::from_config(conf, main_loop(state));
    Ok(())
}
