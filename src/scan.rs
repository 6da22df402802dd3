//! Reading rock scans: one polyline per line, `x1,y1 -> x2,y2 -> ...`

use crate::coordinate::Coordinate;
use crate::error::{Result, SandError};
use std::fs;
use std::path::Path;

pub type Polyline = Vec<Coordinate>;

/// Parse a whole scan. Blank lines are skipped; line numbers in errors are 1-based.
pub fn parse_scan(text: &str) -> Result<Vec<Polyline>> {
    let mut polylines = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        polylines.push(parse_polyline(line, i + 1)?);
    }
    Ok(polylines)
}

/// Read and parse a scan file
pub fn load_scan(path: &Path) -> Result<Vec<Polyline>> {
    let contents = fs::read_to_string(path)?;
    parse_scan(&contents)
}

/// Parse a single `x,y -> x,y` line
pub fn parse_polyline(line: &str, line_no: usize) -> Result<Polyline> {
    line.split("->")
        .map(|point| parse_coordinate(point.trim(), line_no))
        .collect()
}

fn parse_coordinate(token: &str, line_no: usize) -> Result<Coordinate> {
    let (x, y) = token.split_once(',').ok_or_else(|| SandError::InvalidInput {
        line: line_no,
        message: format!("expected 'x,y' but found '{}'", token),
    })?;
    Ok(Coordinate::new(parse_int(x, line_no)?, parse_int(y, line_no)?))
}

fn parse_int(token: &str, line_no: usize) -> Result<i32> {
    let token = token.trim();
    token.parse::<i32>().map_err(|_| SandError::InvalidNumber {
        line: line_no,
        token: token.to_string(),
    })
}
