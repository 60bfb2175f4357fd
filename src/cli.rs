use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tpsgrid")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract throughput figures from benchmark logs into chart-ready rows")]
#[command(
    long_about = "tpsgrid scans a benchmark log for lines carrying a throughput marker (TPS by \
                  default), reads the number that follows it and writes the numbers as \
                  comma-separated rows, one row per group of configurations."
)]
#[command(after_help = "EXAMPLES:\n  \
    tpsgrid\n  \
    tpsgrid tpcc_f2.log --output result/data/tpcc_f2.txt --values-per-row 16\n  \
    tpsgrid memcached_f2.txt --delete-input --verify\n  \
    tpsgrid bench.log --marker QPS --window-offset 4 --window-len 12")]
pub struct Cli {
    /// Benchmark log to scan (defaults to memcached_f2.txt)
    pub input: Option<PathBuf>,

    /// File to write the throughput rows to (defaults to memcached_fig2.txt)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Substring that introduces a throughput figure
    #[arg(short, long, value_parser = validate_marker)]
    pub marker: Option<String>,

    /// Characters from the start of the marker to the start of the number window
    #[arg(long)]
    pub window_offset: Option<usize>,

    /// Width of the number window in characters
    #[arg(long)]
    pub window_len: Option<usize>,

    /// Values per output row
    #[arg(short = 'n', long)]
    pub values_per_row: Option<usize>,

    /// Thread counts the rows are plotted against (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub threads: Option<Vec<u32>>,

    /// Delete the input log after a successful extraction
    #[arg(long, help = "Delete the input log after the rows are written")]
    pub delete_input: bool,

    /// Refuse to replace an existing output file
    #[arg(long)]
    pub no_clobber: bool,

    /// Read the output back and check it against the thread counts
    #[arg(long)]
    pub verify: bool,

    /// Save a JSON run report next to the output file
    #[arg(long)]
    pub report: bool,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "Show what would be extracted without writing anything")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_marker(self.marker.clone())
            .with_window(self.window_offset, self.window_len)
            .with_values_per_row(self.values_per_row)
            .with_input(self.input.clone())
            .with_output(self.output.clone())
            .with_delete_input(self.delete_input)
            .with_write_report(self.report)
            .with_overwrite(self.no_clobber.then_some(false))
            .with_thread_counts(self.threads.clone())
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose > 0 && !self.quiet
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

pub fn validate_marker(s: &str) -> std::result::Result<String, String> {
    if s.is_empty() {
        return Err("Marker must not be empty".to_string());
    }

    // Lines are trimmed before scanning, so edge whitespace could never match
    if s.trim() != s {
        return Err("Marker must not start or end with whitespace".to_string());
    }

    if s.chars().any(|c| c.is_control()) {
        return Err("Marker must not contain control characters".to_string());
    }

    Ok(s.to_string())
}
