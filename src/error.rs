use thiserror::Error;

#[derive(Error, Debug)]
pub enum TpsGridError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input file not found: {path}")]
    InputNotFound { path: String },

    #[error("No number within the extraction window on line {line_number}: {window:?}")]
    NoMatchInWindow { line_number: usize, window: String },

    #[error("Failed to write output file: {path}")]
    OutputWriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Output file already exists: {path}")]
    OutputExists { path: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Malformed throughput grid: {message}")]
    GridMismatch { message: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for TpsGridError {
    fn user_message(&self) -> String {
        match self {
            TpsGridError::InputNotFound { path } => {
                format!("Benchmark log not found: {}", path)
            }
            TpsGridError::NoMatchInWindow { line_number, window } => {
                format!(
                    "Line {} has a throughput marker but no number in {:?}",
                    line_number, window
                )
            }
            TpsGridError::OutputWriteFailed { path, source } => {
                format!("Cannot write {}: {}", path, source)
            }
            TpsGridError::OutputExists { path } => {
                format!("Output file already exists: {}", path)
            }
            TpsGridError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            TpsGridError::GridMismatch { message } => {
                format!("Throughput grid does not match the chart layout: {}", message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            TpsGridError::InputNotFound { .. } => Some(
                "Run the benchmark first or pass the log path as the first argument.".to_string()
            ),
            TpsGridError::NoMatchInWindow { .. } => Some(
                "Check the log format, or adjust --window-offset / --window-len to cover the number.".to_string()
            ),
            TpsGridError::OutputWriteFailed { .. } => Some(
                "Ensure the output directory exists and is writable, or choose another path with --output.".to_string()
            ),
            TpsGridError::OutputExists { .. } => Some(
                "Remove the existing file, choose another path with --output, or drop --no-clobber (io.overwrite = true) to replace it.".to_string()
            ),
            TpsGridError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all values are in range.".to_string()
            ),
            TpsGridError::GridMismatch { .. } => Some(
                "Make sure every benchmark configuration ran for each thread count.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for TpsGridError {
    fn from(error: toml::de::Error) -> Self {
        TpsGridError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TpsGridError>;
