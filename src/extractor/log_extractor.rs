use crate::config::{Config, ExtractConfig};
use crate::error::{Result, TpsGridError};
use crate::extractor::line_scanner::{split_log_lines, ExtractedValue, ThroughputScanner};
use crate::extractor::row_writer::RowWriter;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

#[derive(Debug, Clone)]
pub struct ExtractionProgress {
    pub lines_processed: usize,
    pub total_lines: usize,
    pub lines_matched: usize,
    pub bytes_read: u64,
    pub values_written: usize,
    pub rows_completed: usize,
    pub trailing_values: usize,
    pub input_deleted: bool,
    pub start_time: Instant,
}

impl ExtractionProgress {
    pub fn new(total_lines: usize, bytes_read: u64) -> Self {
        Self {
            lines_processed: 0,
            total_lines,
            lines_matched: 0,
            bytes_read,
            values_written: 0,
            rows_completed: 0,
            trailing_values: 0,
            input_deleted: false,
            start_time: Instant::now(),
        }
    }

    pub fn update_line(&mut self, matched: bool) {
        self.lines_processed += 1;
        if matched {
            self.lines_matched += 1;
        }
    }

    pub fn percentage(&self) -> f64 {
        if self.total_lines == 0 {
            0.0
        } else {
            (self.lines_processed as f64 / self.total_lines as f64) * 100.0
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Turns a benchmark log into a file of grouped throughput values.
pub struct LogExtractor {
    scanner: ThroughputScanner,
    values_per_row: usize,
    delete_input: bool,
    overwrite: bool,
}

impl LogExtractor {
    pub fn new(config: &ExtractConfig) -> Result<Self> {
        Ok(Self {
            scanner: ThroughputScanner::new(config)?,
            values_per_row: config.values_per_row,
            delete_input: false,
            overwrite: true,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(&config.extract)?
            .with_delete_input(config.io.delete_input)
            .with_overwrite(config.io.overwrite))
    }

    /// Removes the input log once the output has been written.
    pub fn with_delete_input(mut self, delete: bool) -> Self {
        self.delete_input = delete;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn scanner(&self) -> &ThroughputScanner {
        &self.scanner
    }

    pub fn deletes_input(&self) -> bool {
        self.delete_input
    }

    /// Writes the rows and then removes the input when deletion is enabled.
    pub fn extract_file(
        &self,
        input: &Path,
        output: &Path,
        progress_callback: Option<&dyn Fn(&ExtractionProgress)>,
    ) -> Result<ExtractionProgress> {
        let mut progress = self.write_rows(input, output, progress_callback)?;
        self.remove_input(input, &mut progress)?;
        Ok(progress)
    }

    /// Scans the input and persists the grouped rows. Never touches the input.
    pub fn write_rows(
        &self,
        input: &Path,
        output: &Path,
        progress_callback: Option<&dyn Fn(&ExtractionProgress)>,
    ) -> Result<ExtractionProgress> {
        let content = read_input(input)?;
        let lines = split_log_lines(&content);
        let mut progress = ExtractionProgress::new(lines.len(), content.len() as u64);

        tracing::debug!(
            input = %input.display(),
            lines = lines.len(),
            marker = self.scanner.marker(),
            "scanning benchmark log"
        );

        // Everything is scanned before the output is touched, so a bad line
        // leaves no partial file behind.
        let mut values: Vec<ExtractedValue> = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            let value = self.scanner.scan_line(line, index + 1)?;
            progress.update_line(value.is_some());
            values.extend(value);

            if let Some(callback) = progress_callback {
                callback(&progress);
            }
        }

        if output.exists() && !self.overwrite {
            return Err(TpsGridError::OutputExists {
                path: output.display().to_string(),
            });
        }

        let mut writer = RowWriter::new(Vec::new(), self.values_per_row);
        for value in &values {
            writer.push(&value.digits)?;
        }
        progress.values_written = writer.values_written();
        progress.rows_completed = writer.rows_completed();
        progress.trailing_values = writer.trailing_values();

        let buffer = writer.finish()?;
        write_output(output, &buffer)?;

        tracing::info!(
            output = %output.display(),
            values = progress.values_written,
            rows = progress.rows_completed,
            "wrote throughput rows"
        );

        if let Some(callback) = progress_callback {
            callback(&progress);
        }

        Ok(progress)
    }

    /// Deletes the input log if enabled. Call only once every output is persisted.
    pub fn remove_input(&self, input: &Path, progress: &mut ExtractionProgress) -> Result<()> {
        if self.delete_input && !progress.input_deleted {
            fs::remove_file(input)?;
            progress.input_deleted = true;
            tracing::info!(input = %input.display(), "deleted benchmark log");
        }
        Ok(())
    }
}

fn read_input(input: &Path) -> Result<String> {
    if !input.exists() {
        return Err(TpsGridError::InputNotFound {
            path: input.display().to_string(),
        });
    }

    fs::read_to_string(input).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => TpsGridError::InputNotFound {
            path: input.display().to_string(),
        },
        _ => TpsGridError::Io(e),
    })
}

/// Stages the output next to its destination and renames it into place.
fn write_output(output: &Path, contents: &[u8]) -> Result<()> {
    let write_failed = |source: io::Error| TpsGridError::OutputWriteFailed {
        path: output.display().to_string(),
        source,
    };

    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(parent).map_err(write_failed)?;
    staged.write_all(contents).map_err(write_failed)?;
    staged.flush().map_err(write_failed)?;
    staged.persist(output).map_err(|e| write_failed(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    fn write_log(dir: &Path, name: &str, lines: &[String]) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    fn tps_lines(count: usize) -> Vec<String> {
        (0..count)
            .map(|i| format!("[run {}] TPS: {} ops/sec", i, 100 + i))
            .collect()
    }

    fn extractor() -> LogExtractor {
        LogExtractor::new(&ExtractConfig::default()).unwrap()
    }

    #[test]
    fn test_thirty_lines_make_two_rows() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_log(temp_dir.path(), "memcached_f2.txt", &tps_lines(30));
        let output = temp_dir.path().join("memcached_fig2.txt");

        let progress = extractor().extract_file(&input, &output, None).unwrap();

        assert_eq!(progress.values_written, 30);
        assert_eq!(progress.rows_completed, 2);
        assert_eq!(progress.trailing_values, 0);

        let text = fs::read_to_string(&output).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 2);
        assert!(text.ends_with(",\n"));
        assert_eq!(rows[0].split_terminator(',').count(), 15);
        assert!(rows[0].starts_with("100,101,"));
        assert!(rows[1].ends_with("129,"));
    }

    #[test]
    fn test_lines_without_marker_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let lines = vec![
            "warming up".to_string(),
            "TPS: 5".to_string(),
            "".to_string(),
            "latency 99us".to_string(),
            "   TPS: 6   ".to_string(),
        ];
        let input = write_log(temp_dir.path(), "log.txt", &lines);
        let output = temp_dir.path().join("rows.txt");

        let progress = extractor().extract_file(&input, &output, None).unwrap();

        assert_eq!(progress.lines_processed, 5);
        assert_eq!(progress.lines_matched, 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "5,6,");
    }

    #[test]
    fn test_carriage_return_separated_records() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("progress.log");
        fs::write(&input, "TPS: 11 a\rTPS: 22 b\rTPS: 33 c\n").unwrap();
        let output = temp_dir.path().join("rows.txt");

        let progress = extractor().extract_file(&input, &output, None).unwrap();

        assert_eq!(progress.total_lines, 3);
        assert_eq!(progress.values_written, 3);
        assert_eq!(fs::read_to_string(&output).unwrap(), "11,22,33,");
    }

    #[test]
    fn test_input_kept_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_log(temp_dir.path(), "log.txt", &tps_lines(3));
        let output = temp_dir.path().join("rows.txt");

        let progress = extractor().extract_file(&input, &output, None).unwrap();

        assert!(!progress.input_deleted);
        assert!(input.exists());
    }

    #[test]
    fn test_input_deleted_when_enabled() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_log(temp_dir.path(), "log.txt", &tps_lines(3));
        let output = temp_dir.path().join("rows.txt");

        let progress = extractor()
            .with_delete_input(true)
            .extract_file(&input, &output, None)
            .unwrap();

        assert!(progress.input_deleted);
        assert!(!input.exists());
        assert!(output.exists());
    }

    #[test]
    fn test_write_rows_leaves_input_for_later_removal() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_log(temp_dir.path(), "log.txt", &tps_lines(3));
        let output = temp_dir.path().join("rows.txt");
        let extractor = extractor().with_delete_input(true);

        let mut progress = extractor.write_rows(&input, &output, None).unwrap();
        assert!(input.exists());
        assert!(!progress.input_deleted);

        extractor.remove_input(&input, &mut progress).unwrap();
        assert!(!input.exists());
        assert!(progress.input_deleted);
    }

    #[test]
    fn test_missing_input_fails_before_output() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("missing.txt");
        let output = temp_dir.path().join("rows.txt");

        let result = extractor().extract_file(&input, &output, None);

        assert!(matches!(result, Err(TpsGridError::InputNotFound { .. })));
        assert!(!output.exists());
    }

    #[test]
    fn test_marker_without_number_fails() {
        let temp_dir = TempDir::new().unwrap();
        let lines = vec!["TPS: 10".to_string(), "TPS: n/a".to_string()];
        let input = write_log(temp_dir.path(), "log.txt", &lines);
        let output = temp_dir.path().join("rows.txt");

        let result = extractor()
            .with_delete_input(true)
            .extract_file(&input, &output, None);

        match result {
            Err(TpsGridError::NoMatchInWindow { line_number, .. }) => assert_eq!(line_number, 2),
            other => panic!("expected NoMatchInWindow, got {:?}", other),
        }
        assert!(!output.exists());
        assert!(input.exists());
    }

    #[test]
    fn test_unwritable_output_fails() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_log(temp_dir.path(), "log.txt", &tps_lines(2));
        let output = temp_dir.path().join("no_such_dir").join("rows.txt");

        let result = extractor()
            .with_delete_input(true)
            .extract_file(&input, &output, None);

        assert!(matches!(result, Err(TpsGridError::OutputWriteFailed { .. })));
        assert!(input.exists());
    }

    #[test]
    fn test_existing_output_without_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_log(temp_dir.path(), "log.txt", &tps_lines(2));
        let output = temp_dir.path().join("rows.txt");
        fs::write(&output, "old").unwrap();

        let result = extractor()
            .with_overwrite(false)
            .extract_file(&input, &output, None);
        assert!(matches!(result, Err(TpsGridError::OutputExists { .. })));
        assert_eq!(fs::read_to_string(&output).unwrap(), "old");

        extractor().extract_file(&input, &output, None).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "100,101,");
    }

    #[test]
    fn test_progress_callback_sees_every_line() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_log(temp_dir.path(), "log.txt", &tps_lines(4));
        let output = temp_dir.path().join("rows.txt");

        let calls = Cell::new(0usize);
        let callback = |p: &ExtractionProgress| {
            calls.set(calls.get() + 1);
            assert!(p.percentage() <= 100.0);
        };

        extractor()
            .extract_file(&input, &output, Some(&callback))
            .unwrap();

        // One call per line plus the final update.
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn test_progress_percentage() {
        let mut progress = ExtractionProgress::new(4, 100);
        assert_eq!(progress.percentage(), 0.0);

        progress.update_line(true);
        progress.update_line(false);
        assert_eq!(progress.percentage(), 50.0);
        assert_eq!(progress.lines_matched, 1);
    }
}
