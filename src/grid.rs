//! Reading extractor output back as a table of throughput values.
//!
//! Chart renderers load these files by fixed column ranges (one range per
//! group of benchmark configurations) and plot each row against a fixed list
//! of thread counts, so every row must be equally wide and there must be one
//! row per thread count.

use crate::error::{Result, TpsGridError};
use regex::Regex;
use serde::Serialize;
use std::ops::Range;
use std::path::Path;

/// Rows of digit runs, kept as the text the extractor wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThroughputGrid {
    rows: Vec<Vec<String>>,
}

/// Shape of a grid compared against the expected x-axis.
#[derive(Debug, Clone, Serialize)]
pub struct GridCheck {
    pub rows: usize,
    pub width: Option<usize>,
    pub expected_rows: usize,
    pub problems: Vec<String>,
}

impl GridCheck {
    pub fn is_aligned(&self) -> bool {
        self.problems.is_empty()
    }
}

impl ThroughputGrid {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TpsGridError::InputNotFound {
                path: path.display().to_string(),
            },
            _ => TpsGridError::Io(e),
        })?;

        Self::parse(&content)
    }

    /// Parses comma-separated rows. Empty fields (the trailing comma) and
    /// blank lines are ignored. A field must be a digit run of the same class
    /// the scanner extracts, of any length.
    pub fn parse(content: &str) -> Result<Self> {
        let digit_run = Regex::new(r"^\d+$").map_err(|e| TpsGridError::Config {
            message: format!("Failed to compile digit pattern: {}", e),
        })?;
        let mut rows = Vec::new();

        for (line_index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut row = Vec::new();
            for (column, field) in line.split(',').enumerate() {
                let field = field.trim();
                if field.is_empty() {
                    continue;
                }

                if !digit_run.is_match(field) {
                    return Err(TpsGridError::GridMismatch {
                        message: format!(
                            "line {} column {}: {:?} is not a digit run",
                            line_index + 1,
                            column + 1,
                            field
                        ),
                    });
                }
                row.push(field.to_string());
            }
            rows.push(row);
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Common row width, or `None` when rows differ or the grid is empty.
    pub fn width(&self) -> Option<usize> {
        let first = self.rows.first()?.len();
        self.rows
            .iter()
            .all(|row| row.len() == first)
            .then_some(first)
    }

    /// One series: the value of `index` in every row.
    pub fn column(&self, index: usize) -> Option<Vec<&str>> {
        self.rows
            .iter()
            .map(|row| row.get(index).map(String::as_str))
            .collect()
    }

    /// One series per column in `range`.
    pub fn columns(&self, range: Range<usize>) -> Option<Vec<Vec<&str>>> {
        range.map(|index| self.column(index)).collect()
    }

    pub fn check(&self, thread_counts: &[u32]) -> GridCheck {
        let mut problems = Vec::new();
        let width = self.width();

        if self.rows.is_empty() {
            problems.push("grid has no rows".to_string());
        } else if width.is_none() {
            let widths: Vec<String> = self.rows.iter().map(|r| r.len().to_string()).collect();
            problems.push(format!("rows have different widths: {}", widths.join(", ")));
        }

        if !self.rows.is_empty() && self.rows.len() != thread_counts.len() {
            problems.push(format!(
                "{} rows but {} thread counts ({})",
                self.rows.len(),
                thread_counts.len(),
                thread_counts
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            ));
        }

        GridCheck {
            rows: self.rows.len(),
            width,
            expected_rows: thread_counts.len(),
            problems,
        }
    }

    pub fn check_alignment(&self, thread_counts: &[u32]) -> Result<()> {
        let check = self.check(thread_counts);
        if check.is_aligned() {
            Ok(())
        } else {
            Err(TpsGridError::GridMismatch {
                message: check.problems.join("; "),
            })
        }
    }
}
