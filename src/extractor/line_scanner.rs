use crate::config::ExtractConfig;
use crate::error::{Result, TpsGridError};
use regex::Regex;

/// A throughput figure pulled from one log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedValue {
    /// 1-based line number in the input log.
    pub line_number: usize,
    /// The digit run exactly as it appeared in the log.
    pub digits: String,
}

/// Finds the marker on a log line and reads the number that follows it.
///
/// The window is measured in characters from the start of the first marker
/// occurrence: `[offset, offset + len)`, clamped to the end of the line.
pub struct ThroughputScanner {
    marker: String,
    window_offset: usize,
    window_len: usize,
    digits: Regex,
}

impl ThroughputScanner {
    pub fn new(config: &ExtractConfig) -> Result<Self> {
        if config.marker.is_empty() {
            return Err(TpsGridError::Config {
                message: "Marker must not be empty".to_string(),
            });
        }

        let digits = Regex::new(r"\d+").map_err(|e| TpsGridError::Config {
            message: format!("Failed to compile digit pattern: {}", e),
        })?;

        Ok(Self {
            marker: config.marker.clone(),
            window_offset: config.window_offset,
            window_len: config.window_len,
            digits,
        })
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Scans a single line. Returns `Ok(None)` when the marker is absent and
    /// fails with `NoMatchInWindow` when the marker is present without a number.
    pub fn scan_line(&self, line: &str, line_number: usize) -> Result<Option<ExtractedValue>> {
        let line = line.trim();
        let Some(marker_pos) = line.find(&self.marker) else {
            return Ok(None);
        };

        let window = self.window(&line[marker_pos..]);
        match self.digits.find(window) {
            Some(m) => {
                tracing::trace!(line_number, value = m.as_str(), "matched throughput line");
                Ok(Some(ExtractedValue {
                    line_number,
                    digits: m.as_str().to_string(),
                }))
            }
            None => Err(TpsGridError::NoMatchInWindow {
                line_number,
                window: window.to_string(),
            }),
        }
    }

    /// Scans every line in order, stopping at the first failure.
    pub fn scan_text(&self, text: &str) -> Result<Vec<ExtractedValue>> {
        let mut values = Vec::new();
        for (index, line) in split_log_lines(text).into_iter().enumerate() {
            if let Some(value) = self.scan_line(line, index + 1)? {
                values.push(value);
            }
        }
        Ok(values)
    }

    fn window<'a>(&self, from_marker: &'a str) -> &'a str {
        char_window(from_marker, self.window_offset, self.window_len)
    }
}

/// Splits log text into lines, treating `\n`, `\r\n` and a lone `\r` as line
/// breaks. A break at the very end does not start an extra empty line.
pub fn split_log_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        match rest.find(&['\n', '\r'][..]) {
            Some(pos) => {
                lines.push(&rest[..pos]);
                let skip = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[pos + skip..];
            }
            None => {
                lines.push(rest);
                break;
            }
        }
    }

    lines
}

/// Character-based slice `[start, start + len)` clamped to the string bounds.
fn char_window(s: &str, start: usize, len: usize) -> &str {
    if len == 0 {
        return "";
    }

    let mut boundaries = s
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(s.len()));

    let Some(begin) = boundaries.nth(start) else {
        return "";
    };
    let end = boundaries.nth(len - 1).unwrap_or(s.len());

    &s[begin..end]
}
