use crate::config::Config;
use crate::error::{Result, TpsGridError};
use crate::extractor::ExtractionProgress;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub extraction_summary: ExtractionSummary,
    pub extraction_time: DateTime<Utc>,
    pub warnings: Vec<String>,
    pub config_used: ConfigSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub lines_read: usize,
    pub lines_matched: usize,
    pub bytes_read: u64,
    pub values_written: usize,
    pub rows_completed: usize,
    pub trailing_values: usize,
    pub input_deleted: bool,
    pub extraction_duration: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub marker: String,
    pub window_offset: usize,
    pub window_len: usize,
    pub values_per_row: usize,
    pub thread_counts: Vec<u32>,
}

impl ConfigSnapshot {
    pub fn window_end(&self) -> usize {
        self.window_offset.saturating_add(self.window_len)
    }
}

impl From<&Config> for ConfigSnapshot {
    fn from(config: &Config) -> Self {
        Self {
            marker: config.extract.marker.clone(),
            window_offset: config.extract.window_offset,
            window_len: config.extract.window_len,
            values_per_row: config.extract.values_per_row,
            thread_counts: config.grid.thread_counts.clone(),
        }
    }
}

impl From<&ExtractionProgress> for ExtractionSummary {
    fn from(progress: &ExtractionProgress) -> Self {
        Self {
            lines_read: progress.lines_processed,
            lines_matched: progress.lines_matched,
            bytes_read: progress.bytes_read,
            values_written: progress.values_written,
            rows_completed: progress.rows_completed,
            trailing_values: progress.trailing_values,
            input_deleted: progress.input_deleted,
            extraction_duration: progress.elapsed(),
        }
    }
}

impl ExtractionReport {
    pub fn new(config: &Config, progress: &ExtractionProgress) -> Self {
        let mut warnings = Vec::new();

        if progress.lines_matched == 0 {
            warnings.push(format!(
                "No lines contained the marker {:?}",
                config.extract.marker
            ));
        }

        if progress.trailing_values > 0 {
            warnings.push(format!(
                "Last row is incomplete: {} of {} values",
                progress.trailing_values, config.extract.values_per_row
            ));
        }

        Self {
            input: config.io.input.clone(),
            output: config.io.output.clone(),
            extraction_summary: ExtractionSummary::from(progress),
            extraction_time: Utc::now(),
            warnings,
            config_used: ConfigSnapshot::from(config),
        }
    }

    pub fn add_warning<S: Into<String>>(&mut self, warning: S) {
        self.warnings.push(warning.into());
    }

    /// Writes the report as pretty JSON and returns where it went.
    pub fn save_json(&self) -> Result<PathBuf> {
        let report_path = report_path_for(&self.output);
        let json_content =
            serde_json::to_string_pretty(self).map_err(|e| TpsGridError::Config {
                message: format!("Failed to serialize report to JSON: {}", e),
            })?;

        fs::write(&report_path, json_content).map_err(|source| {
            TpsGridError::OutputWriteFailed {
                path: report_path.display().to_string(),
                source,
            }
        })?;

        Ok(report_path)
    }
}

/// `rows.txt` -> `rows.txt.report.json`, in the same directory.
pub fn report_path_for(output: &Path) -> PathBuf {
    let file_name = output
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "tpsgrid".to_string());

    output.with_file_name(format!("{}.report.json", file_name))
}
