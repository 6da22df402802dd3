use crate::builder::{BuildOptions, MarginPolicy, DEFAULT_SOURCE_X, LEGACY_MARGIN};
use crate::error::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub visual: VisualConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct SimulationConfig {
    /// Negative: no floor. 0: floor on the lowest rock row. Positive: floor this far below it.
    #[serde(default = "default_floor_offset")]
    pub floor_offset: i32,
    #[serde(default = "default_source_x")]
    pub source_x: i32,
    #[serde(default)]
    pub margin: MarginMode,
    #[serde(default = "default_fixed_margin")]
    pub fixed_margin: i32,
    #[serde(default)]
    pub verbose: bool,
}

/// `margin = "derived"` or `margin = "fixed"`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginMode {
    #[default]
    Derived,
    /// Use `fixed_margin`
    Fixed,
}

#[derive(Debug, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_input_path")]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct VisualConfig {
    #[serde(default = "default_window_title")]
    pub window_title: String,
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    /// Units dropped per rendered frame in the viewer
    #[serde(default = "default_drops_per_frame")]
    pub drops_per_frame: usize,
    #[serde(default = "default_bg_r")]
    pub background_r: u8,
    #[serde(default = "default_bg_g")]
    pub background_g: u8,
    #[serde(default = "default_bg_b")]
    pub background_b: u8,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_drop_log: bool,
    #[serde(default = "default_drop_log_path")]
    pub drop_log_path: String,
    #[serde(default = "default_compact_log_path")]
    pub compact_log_path: String,
}

// Default values
fn default_floor_offset() -> i32 { 2 }
fn default_source_x() -> i32 { DEFAULT_SOURCE_X }
fn default_fixed_margin() -> i32 { LEGACY_MARGIN }
fn default_input_path() -> String { "input.txt".to_string() }
fn default_window_title() -> String { "sandfall".to_string() }
fn default_cell_size() -> f32 { 4.0 }
fn default_drops_per_frame() -> usize { 5 }
fn default_bg_r() -> u8 { 20 }
fn default_bg_g() -> u8 { 20 }
fn default_bg_b() -> u8 { 28 }
fn default_drop_log_path() -> String { "drop_log.json".to_string() }
fn default_compact_log_path() -> String { "drop_log.bin".to_string() }

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            floor_offset: default_floor_offset(),
            source_x: default_source_x(),
            margin: MarginMode::default(),
            fixed_margin: default_fixed_margin(),
            verbose: false,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
        }
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            window_title: default_window_title(),
            cell_size: default_cell_size(),
            drops_per_frame: default_drops_per_frame(),
            background_r: default_bg_r(),
            background_g: default_bg_g(),
            background_b: default_bg_b(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_drop_log: false,
            drop_log_path: default_drop_log_path(),
            compact_log_path: default_compact_log_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            input: InputConfig::default(),
            visual: VisualConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn margin_policy(&self) -> MarginPolicy {
        match self.margin {
            MarginMode::Derived => MarginPolicy::Derived,
            MarginMode::Fixed => MarginPolicy::Fixed(self.fixed_margin),
        }
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions::new(self.floor_offset)
            .with_source_x(self.source_x)
            .with_margin(self.margin_policy())
    }
}

impl Config {
    /// Load configuration from config.toml, or use defaults if it is missing or broken
    pub fn load() -> Self {
        let path = Path::new(CONFIG_FILE);
        if !path.exists() {
            println!("No {} found, using default configuration", CONFIG_FILE);
            return Config::default();
        }
        match Self::load_from(path) {
            Ok(config) => {
                println!("Loaded configuration from {}", CONFIG_FILE);
                config
            }
            Err(e) => {
                eprintln!("Warning: {}", e);
                eprintln!("Using default configuration");
                Config::default()
            }
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
