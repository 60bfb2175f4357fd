pub mod line_scanner;
pub mod log_extractor;
pub mod report;
pub mod row_writer;

pub use line_scanner::{split_log_lines, ExtractedValue, ThroughputScanner};
pub use log_extractor::{ExtractionProgress, LogExtractor};
pub use report::{report_path_for, ConfigSnapshot, ExtractionReport, ExtractionSummary};
pub use row_writer::{format_rows, RowWriter};
