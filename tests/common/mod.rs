use sandfall::builder::LEGACY_MARGIN;
use sandfall::{parse_scan, solve, BuildOptions, MarginPolicy, Polyline};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One scan with the settled count it should produce
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SandCase {
    pub name: String,
    pub input: String,
    pub floor_offset: i32,
    #[serde(default = "default_source_x")]
    pub source_x: i32,
    pub expected_settled: usize,
}

fn default_source_x() -> i32 {
    500
}

/// Load a case from JSON file
pub fn load_case(path: &Path) -> Result<SandCase, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    let case: SandCase = serde_json::from_str(&contents)?;
    Ok(case)
}

/// Load every `.json` case in a directory, sorted by file name
pub fn load_cases(dir: &str) -> Vec<SandCase> {
    let mut entries: Vec<_> = match fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(Result::ok).collect(),
        Err(e) => panic!("Cannot read {}: {}", dir, e),
    };
    entries.sort_by_key(|e| e.file_name());

    entries
        .iter()
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .map(|p| load_case(&p).unwrap_or_else(|e| panic!("Bad case {}: {}", p.display(), e)))
        .collect()
}

/// Mirror the scan around x = 500
///
/// Only floor runs are symmetric: without a floor the left-before-right
/// rule changes where units escape.
pub fn mirror_case(case: &SandCase) -> SandCase {
    let polylines = parse_scan(&case.input).expect("case input parses");
    let input = polylines
        .iter()
        .map(|line| {
            line.iter()
                .map(|c| format!("{},{}", 1000 - c.x, c.y))
                .collect::<Vec<_>>()
                .join(" -> ")
        })
        .collect::<Vec<_>>()
        .join("\n");

    SandCase {
        name: format!("{}_mirrored", case.name),
        input,
        floor_offset: case.floor_offset,
        source_x: 1000 - case.source_x,
        expected_settled: case.expected_settled,
    }
}

pub fn options_for(case: &SandCase) -> BuildOptions {
    BuildOptions::new(case.floor_offset).with_source_x(case.source_x)
}

/// Run a case with the default options plus every variant that must agree.
/// Returns the name of the first failing variant with its count
pub fn run_case(case: &SandCase) -> Result<(), (String, usize)> {
    let mut variants: Vec<(String, Vec<Polyline>, BuildOptions)> = Vec::new();
    let polylines = parse_scan(&case.input).expect("case input parses");
    variants.push(("original".to_string(), polylines.clone(), options_for(case)));

    if case.floor_offset > 0 {
        variants.push((
            "fixed_margin".to_string(),
            polylines,
            options_for(case).with_margin(MarginPolicy::Fixed(LEGACY_MARGIN)),
        ));
        let mirrored = mirror_case(case);
        variants.push((
            "mirrored".to_string(),
            parse_scan(&mirrored.input).expect("mirrored input parses"),
            options_for(&mirrored),
        ));
    }

    for (variant, polylines, options) in variants {
        let settled = solve(&polylines, &options, false)
            .unwrap_or_else(|e| panic!("Case '{}' [{}] failed to run: {}", case.name, variant, e));
        if settled != case.expected_settled {
            return Err((variant, settled));
        }
    }
    Ok(())
}
