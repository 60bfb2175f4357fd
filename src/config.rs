use crate::error::{Result, TpsGridError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Substring that introduces a throughput figure on a benchmark log line.
pub const DEFAULT_MARKER: &str = "TPS";
/// Characters skipped after the start of the marker before the window opens.
pub const DEFAULT_WINDOW_OFFSET: usize = 5;
/// Width of the window searched for the number.
pub const DEFAULT_WINDOW_LEN: usize = 10;
/// Values per output row: one row per thread count, one column per configuration.
pub const DEFAULT_VALUES_PER_ROW: usize = 15;
/// Thread counts the chart renderers plot rows against.
pub const DEFAULT_THREAD_COUNTS: [u32; 8] = [1, 2, 4, 8, 16, 24, 32, 48];

pub const DEFAULT_INPUT: &str = "memcached_f2.txt";
pub const DEFAULT_OUTPUT: &str = "memcached_fig2.txt";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub extract: ExtractConfig,
    pub io: IoConfig,
    pub grid: GridConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub marker: String,
    pub window_offset: usize,
    pub window_len: usize,
    pub values_per_row: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IoConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub delete_input: bool,
    pub overwrite: bool,
    pub write_report: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GridConfig {
    pub thread_counts: Vec<u32>,
}

impl ExtractConfig {
    /// End of the extraction window, in characters from the marker.
    pub fn window_end(&self) -> usize {
        self.window_offset.saturating_add(self.window_len)
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            window_offset: DEFAULT_WINDOW_OFFSET,
            window_len: DEFAULT_WINDOW_LEN,
            values_per_row: DEFAULT_VALUES_PER_ROW,
        }
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            delete_input: false,
            overwrite: true,
            write_report: false,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            thread_counts: DEFAULT_THREAD_COUNTS.to_vec(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(TpsGridError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| TpsGridError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| TpsGridError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["tpsgrid.toml", ".tpsgrid.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref marker) = cli_args.marker {
            self.extract.marker = marker.clone();
        }

        if let Some(offset) = cli_args.window_offset {
            self.extract.window_offset = offset;
        }

        if let Some(len) = cli_args.window_len {
            self.extract.window_len = len;
        }

        if let Some(per_row) = cli_args.values_per_row {
            self.extract.values_per_row = per_row;
        }

        if let Some(ref input) = cli_args.input {
            self.io.input = input.clone();
        }

        if let Some(ref output) = cli_args.output {
            self.io.output = output.clone();
        }

        // Flags only ever switch these on; a config file can still enable them.
        if cli_args.delete_input {
            self.io.delete_input = true;
        }

        if cli_args.write_report {
            self.io.write_report = true;
        }

        if let Some(overwrite) = cli_args.overwrite {
            self.io.overwrite = overwrite;
        }

        if let Some(ref threads) = cli_args.thread_counts {
            self.grid.thread_counts = threads.clone();
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| TpsGridError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| TpsGridError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.extract.marker.is_empty() {
            return Err(TpsGridError::Config {
                message: "Marker must not be empty".to_string(),
            });
        }

        if self.extract.window_len == 0 {
            return Err(TpsGridError::Config {
                message: "Extraction window length must be greater than 0".to_string(),
            });
        }

        if self.extract.values_per_row == 0 {
            return Err(TpsGridError::Config {
                message: "Values per row must be greater than 0".to_string(),
            });
        }

        if self.grid.thread_counts.is_empty() {
            return Err(TpsGridError::Config {
                message: "At least one thread count must be specified".to_string(),
            });
        }

        if self.io.input == self.io.output {
            return Err(TpsGridError::Config {
                message: format!(
                    "Input and output must be different files: {}",
                    self.io.input.display()
                ),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub marker: Option<String>,
    pub window_offset: Option<usize>,
    pub window_len: Option<usize>,
    pub values_per_row: Option<usize>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub delete_input: bool,
    pub write_report: bool,
    pub overwrite: Option<bool>,
    pub thread_counts: Option<Vec<u32>>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_marker(mut self, marker: Option<String>) -> Self {
        self.marker = marker;
        self
    }

    pub fn with_window(mut self, offset: Option<usize>, len: Option<usize>) -> Self {
        self.window_offset = offset;
        self.window_len = len;
        self
    }

    pub fn with_values_per_row(mut self, per_row: Option<usize>) -> Self {
        self.values_per_row = per_row;
        self
    }

    pub fn with_input(mut self, input: Option<PathBuf>) -> Self {
        self.input = input;
        self
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub fn with_delete_input(mut self, delete: bool) -> Self {
        self.delete_input = delete;
        self
    }

    pub fn with_write_report(mut self, report: bool) -> Self {
        self.write_report = report;
        self
    }

    pub fn with_overwrite(mut self, overwrite: Option<bool>) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_thread_counts(mut self, threads: Option<Vec<u32>>) -> Self {
        self.thread_counts = threads;
        self
    }
}
