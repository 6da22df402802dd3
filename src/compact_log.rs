use crate::builder::Floor;
use crate::coordinate::Coordinate;
use crate::drop_log::{Event, LoggedEvent};
use crate::error::{Result, SandError};
use crate::simulator::{DropOutcome, EscapeKind};

/// Compact binary drop log
///
/// Format:
/// - timestamp delta from the previous entry (varint)
/// - event type (1 byte): 1 = BuildGrid, 2 = Drop, 3 = RunFinished
/// - event fields: varints, with zigzag for signed values
///
/// A full run easily produces tens of thousands of drops; entries here take
/// 4-8 bytes instead of ~100 in the JSON log.
pub struct CompactLogWriter {
    buffer: Vec<u8>,
    last_timestamp: u64,
    entries: usize,
}

const EVENT_BUILD: u8 = 1;
const EVENT_DROP: u8 = 2;
const EVENT_FINISHED: u8 = 3;

const OUTCOME_SETTLED: u8 = 0;
const OUTCOME_AT_SOURCE: u8 = 1;
const OUTCOME_BLOCKED: u8 = 2;
const OUTCOME_BOTTOM: u8 = 3;
const OUTCOME_LEFT: u8 = 4;
const OUTCOME_RIGHT: u8 = 5;

impl Default for CompactLogWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CompactLogWriter {
    pub fn new() -> Self {
        CompactLogWriter {
            buffer: Vec::new(),
            last_timestamp: 0,
            entries: 0,
        }
    }

    /// Append one logged event
    pub fn write_event(&mut self, logged: &LoggedEvent) {
        let delta = logged.timestamp_ms.saturating_sub(self.last_timestamp);
        self.write_varint(delta);
        self.last_timestamp = logged.timestamp_ms;
        self.entries += 1;

        match &logged.event {
            Event::BuildGrid { rows, cols, source_x, source_y, floor } => {
                self.buffer.push(EVENT_BUILD);
                self.write_i32(*rows);
                self.write_i32(*cols);
                self.write_i32(*source_x);
                self.write_i32(*source_y);
                self.write_i32(floor_to_offset(*floor));
            }
            Event::Drop { unit, outcome, steps } => {
                self.buffer.push(EVENT_DROP);
                self.write_varint(*unit as u64);
                match outcome {
                    DropOutcome::Settled(at) => {
                        self.buffer.push(OUTCOME_SETTLED);
                        self.write_i32(at.x);
                        self.write_i32(at.y);
                    }
                    DropOutcome::SettledAtSource => self.buffer.push(OUTCOME_AT_SOURCE),
                    DropOutcome::BlockedAtSource => self.buffer.push(OUTCOME_BLOCKED),
                    DropOutcome::Escaped(EscapeKind::Bottom) => self.buffer.push(OUTCOME_BOTTOM),
                    DropOutcome::Escaped(EscapeKind::Left) => self.buffer.push(OUTCOME_LEFT),
                    DropOutcome::Escaped(EscapeKind::Right) => self.buffer.push(OUTCOME_RIGHT),
                }
                self.write_varint(*steps as u64);
            }
            Event::RunFinished { settled } => {
                self.buffer.push(EVENT_FINISHED);
                self.write_varint(*settled as u64);
            }
        }
    }

    /// Write variable-length integer (smaller values use fewer bytes)
    fn write_varint(&mut self, mut value: u64) {
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80; // More bytes follow
            }
            self.buffer.push(byte);
            if value == 0 {
                break;
            }
        }
    }

    /// ZigZag: 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, ...
    fn write_i32(&mut self, value: i32) {
        let encoded = ((value << 1) ^ (value >> 31)) as u32;
        self.write_varint(encoded as u64);
    }

    pub fn get_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        std::fs::write(path, &self.buffer)?;
        Ok(())
    }

    pub fn get_stats(&self) -> CompactLogStats {
        CompactLogStats {
            binary_size: self.buffer.len(),
            entry_count: self.entries,
        }
    }
}

pub struct CompactLogStats {
    pub binary_size: usize,
    pub entry_count: usize,
}

impl CompactLogStats {
    pub fn avg_bytes_per_entry(&self) -> f64 {
        if self.entry_count == 0 {
            0.0
        } else {
            self.binary_size as f64 / self.entry_count as f64
        }
    }
}

fn floor_to_offset(floor: Floor) -> i32 {
    match floor {
        Floor::Open => -1,
        Floor::AtLowestRock => 0,
        Floor::Below(offset) => offset,
    }
}

/// Reads logs produced by [`CompactLogWriter`]
pub struct CompactLogReader<'a> {
    data: &'a [u8],
    pos: usize,
    last_timestamp: u64,
}

impl<'a> CompactLogReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        CompactLogReader {
            data,
            pos: 0,
            last_timestamp: 0,
        }
    }

    /// Next event, or None at the end of the data
    pub fn read_event(&mut self) -> Result<Option<LoggedEvent>> {
        if self.pos >= self.data.len() {
            return Ok(None);
        }

        let delta = self.read_varint()?;
        self.last_timestamp = self
            .last_timestamp
            .checked_add(delta)
            .ok_or_else(|| SandError::Decode(format!("timestamp overflow at byte {}", self.pos)))?;

        let event = match self.read_u8()? {
            EVENT_BUILD => Event::BuildGrid {
                rows: self.read_i32()?,
                cols: self.read_i32()?,
                source_x: self.read_i32()?,
                source_y: self.read_i32()?,
                floor: Floor::from_offset(self.read_i32()?),
            },
            EVENT_DROP => {
                let unit = self.read_varint()? as usize;
                let outcome = match self.read_u8()? {
                    OUTCOME_SETTLED => {
                        let x = self.read_i32()?;
                        let y = self.read_i32()?;
                        DropOutcome::Settled(Coordinate::new(x, y))
                    }
                    OUTCOME_AT_SOURCE => DropOutcome::SettledAtSource,
                    OUTCOME_BLOCKED => DropOutcome::BlockedAtSource,
                    OUTCOME_BOTTOM => DropOutcome::Escaped(EscapeKind::Bottom),
                    OUTCOME_LEFT => DropOutcome::Escaped(EscapeKind::Left),
                    OUTCOME_RIGHT => DropOutcome::Escaped(EscapeKind::Right),
                    other => {
                        return Err(SandError::Decode(format!(
                            "unknown outcome {} at byte {}",
                            other,
                            self.pos - 1
                        )))
                    }
                };
                let steps = self.read_varint()? as usize;
                Event::Drop { unit, outcome, steps }
            }
            EVENT_FINISHED => Event::RunFinished {
                settled: self.read_varint()? as usize,
            },
            other => {
                return Err(SandError::Decode(format!(
                    "unknown event type {} at byte {}",
                    other,
                    self.pos - 1
                )))
            }
        };

        Ok(Some(LoggedEvent {
            timestamp_ms: self.last_timestamp,
            event,
        }))
    }

    /// Decode everything that is left
    pub fn read_all(&mut self) -> Result<Vec<LoggedEvent>> {
        let mut events = Vec::new();
        while let Some(event) = self.read_event()? {
            events.push(event);
        }
        Ok(events)
    }

    fn read_u8(&mut self) -> Result<u8> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or_else(|| SandError::Decode("unexpected end of data".to_string()))?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_varint(&mut self) -> Result<u64> {
        let mut result = 0u64;
        let mut shift = 0;

        loop {
            if shift >= 64 {
                return Err(SandError::Decode("varint too long".to_string()));
            }
            let byte = self.read_u8()?;
            result |= ((byte & 0x7F) as u64) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
        }

        Ok(result)
    }

    fn read_i32(&mut self) -> Result<i32> {
        let encoded = self.read_varint()? as u32;
        Ok(((encoded >> 1) as i32) ^ -((encoded & 1) as i32))
    }
}

/// One-line human readable form used by the decoder binary
pub fn describe(logged: &LoggedEvent) -> String {
    let text = match &logged.event {
        Event::BuildGrid { rows, cols, source_x, source_y, floor } => {
            format!("BuildGrid({}x{} source=({},{}) floor={:?})", cols, rows, source_x, source_y, floor)
        }
        Event::Drop { unit, outcome, steps } => match outcome {
            DropOutcome::Settled(at) => format!("Drop(#{} settled @({},{}) steps={})", unit, at.x, at.y, steps),
            DropOutcome::SettledAtSource => format!("Drop(#{} settled AT SOURCE steps={})", unit, steps),
            DropOutcome::BlockedAtSource => format!("Drop(#{} source blocked)", unit),
            DropOutcome::Escaped(kind) => format!("Drop(#{} escaped {:?} steps={})", unit, kind, steps),
        },
        Event::RunFinished { settled } => format!("RunFinished(settled={})", settled),
    };
    format!("[{:6}ms] {}", logged.timestamp_ms, text)
}
