pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod grid;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, ExtractConfig, GridConfig, IoConfig};
pub use error::{Result, TpsGridError, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    ExtractedValue, ExtractionProgress, ExtractionReport, LogExtractor, RowWriter,
    ThroughputScanner,
};
pub use grid::{GridCheck, ThroughputGrid};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;

/// Main library interface for tpsgrid functionality
pub struct TpsGrid {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl TpsGrid {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        // Progress bars would interleave with JSON lines on stdout.
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    /// Create a TpsGrid instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        Ok(Self::new(
            config,
            OutputMode::from(cli_args.output_format),
            cli_args.verbosity_level(),
            cli_args.quiet,
        ))
    }

    /// Extract throughput rows from the configured input log
    pub fn extract(&self) -> Result<ExtractionReport> {
        let input = &self.config.io.input;
        let output = &self.config.io.output;

        self.output_formatter.start_operation(&format!(
            "Extracting {:?} figures from {}",
            self.config.extract.marker,
            input.display()
        ));

        let extractor = LogExtractor::from_config(&self.config)?;
        let mut progress = self.extract_lines(&extractor, input, output)?;
        self.output_formatter.debug(&format!(
            "{} of {} lines carried the marker",
            progress.lines_matched, progress.total_lines
        ));

        let mut report = ExtractionReport::new(&self.config, &progress);

        // The input goes last, once the rows and the report are both on disk.
        if self.config.io.write_report {
            report.extraction_summary.input_deleted = extractor.deletes_input();
            let report_path = report.save_json()?;
            self.output_formatter
                .info(&format!("Saved run report to {}", report_path.display()));
        }

        extractor.remove_input(input, &mut progress)?;
        report.extraction_summary.input_deleted = progress.input_deleted;

        self.output_formatter.print_extraction_summary(&progress);

        for warning in &report.warnings {
            self.output_formatter.warning(warning);
        }

        Ok(report)
    }

    fn extract_lines(
        &self,
        extractor: &LogExtractor,
        input: &Path,
        output: &Path,
    ) -> Result<ExtractionProgress> {
        let line_progress = self.progress_manager.create_line_progress(0);
        let progress_callback = {
            let pb = line_progress.clone();
            move |progress: &ExtractionProgress| {
                ui::progress::update_line_progress(&pb, progress);
            }
        };

        let result = extractor.write_rows(input, output, Some(&progress_callback));

        match &result {
            Ok(progress) => ui::progress::finish_progress_with_summary(
                &line_progress,
                &format!("Wrote {} rows to {}", progress.rows_completed, output.display()),
                progress.elapsed(),
            ),
            Err(_) => line_progress.abandon(),
        }
        self.progress_manager.clear();

        result
    }

    /// Load the written output and compare it with the configured thread counts
    pub fn verify_output(&self) -> Result<GridCheck> {
        let grid = ThroughputGrid::load(&self.config.io.output)?;
        let check = grid.check(&self.config.grid.thread_counts);

        tracing::debug!(
            rows = check.rows,
            width = ?check.width,
            aligned = check.is_aligned(),
            "verified throughput grid"
        );

        self.output_formatter.print_grid_check(&check);
        Ok(check)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &TpsGridError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Extract with default settings from `input` into `output`, leaving the input in place.
pub fn extract_rows_simple(input: &Path, output: &Path) -> Result<ExtractionProgress> {
    let config = Config::default();
    LogExtractor::new(&config.extract)?.extract_file(input, output, None)
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Get build information
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
        build_date: option_env!("BUILD_DATE").unwrap_or("unknown"),
        target: std::env::consts::ARCH.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_date: &'static str,
    pub target: String,
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tpsgrid {} ({}) built on {} for {}",
            self.version, self.git_hash, self.build_date, self.target
        )
    }
}
