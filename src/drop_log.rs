use crate::builder::{Cave, Floor};
use crate::error::Result;
use crate::simulator::{DropOutcome, DropReport, EscapeKind};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Things worth recording during a run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Grid built (rows, cols, source in grid coordinates)
    BuildGrid {
        rows: i32,
        cols: i32,
        source_x: i32,
        source_y: i32,
        floor: Floor,
    },
    /// One unit dropped
    Drop {
        unit: usize,
        outcome: DropOutcome,
        steps: usize,
    },
    /// Run loop stopped
    RunFinished { settled: usize },
}

/// Logged event with timestamp
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// Milliseconds since start
    pub timestamp_ms: u64,
    pub event: Event,
}

/// Run logger
pub struct DropLog {
    start_time: Instant,
    events: Vec<LoggedEvent>,
}

impl Default for DropLog {
    fn default() -> Self {
        Self::new()
    }
}

impl DropLog {
    pub fn new() -> Self {
        DropLog {
            start_time: Instant::now(),
            events: Vec::new(),
        }
    }

    /// Log an event with the current timestamp
    pub fn log(&mut self, event: Event) {
        let timestamp_ms = self.start_time.elapsed().as_millis() as u64;
        self.events.push(LoggedEvent {
            timestamp_ms,
            event,
        });
    }

    pub fn log_build(&mut self, cave: &Cave) {
        self.log(Event::BuildGrid {
            rows: cave.grid.rows,
            cols: cave.grid.cols,
            source_x: cave.source.x,
            source_y: cave.source.y,
            floor: cave.floor,
        });
    }

    pub fn log_drop(&mut self, report: &DropReport) {
        self.log(Event::Drop {
            unit: report.unit,
            outcome: report.outcome,
            steps: report.steps,
        });
    }

    pub fn log_finish(&mut self, settled: usize) {
        self.log(Event::RunFinished { settled });
    }

    /// Get all logged events
    pub fn get_events(&self) -> &Vec<LoggedEvent> {
        &self.events
    }

    /// Save log to JSON file
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.events)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read back a JSON log written by [`save_to_file`](Self::save_to_file)
    pub fn load_from_file(path: &str) -> Result<Vec<LoggedEvent>> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        let mut settled = 0;
        let mut at_source = 0;
        let mut blocked = 0;
        let mut escaped_bottom = 0;
        let mut escaped_left = 0;
        let mut escaped_right = 0;
        let mut total_steps = 0;
        let mut drops = 0;

        for logged in &self.events {
            if let Event::Drop { outcome, steps, .. } = &logged.event {
                drops += 1;
                total_steps += steps;
                match outcome {
                    DropOutcome::Settled(_) => settled += 1,
                    DropOutcome::SettledAtSource => at_source += 1,
                    DropOutcome::BlockedAtSource => blocked += 1,
                    DropOutcome::Escaped(EscapeKind::Bottom) => escaped_bottom += 1,
                    DropOutcome::Escaped(EscapeKind::Left) => escaped_left += 1,
                    DropOutcome::Escaped(EscapeKind::Right) => escaped_right += 1,
                }
            }
        }

        let duration = self.events.last().map_or(0, |last| last.timestamp_ms);
        let avg_steps = if drops == 0 {
            0.0
        } else {
            total_steps as f64 / drops as f64
        };

        format!(
            "Run Duration: {}ms\n\
             Drops: {} ({} settled, {} at source, {} blocked)\n\
             Escapes: {} bottom, {} left, {} right\n\
             Average path length: {:.2} cells",
            duration,
            drops,
            settled,
            at_source,
            blocked,
            escaped_bottom,
            escaped_left,
            escaped_right,
            avg_steps
        )
    }
}
