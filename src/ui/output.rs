use crate::cli::OutputFormat;
use crate::error::{TpsGridError, UserFriendlyError};
use crate::extractor::{ExtractionProgress, ExtractionReport};
use crate::grid::GridCheck;
use crate::ui::progress::format_duration;
use console::{style, Emoji, Term};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl From<OutputFormat> for OutputMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    pub fn print_user_friendly_error(&self, error: &TpsGridError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    eprintln!();
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    pub fn print_extraction_summary(&self, progress: &ExtractionProgress) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_summary(progress),
            OutputMode::Json => self.print_json_summary(progress),
            OutputMode::Plain => self.print_plain_summary(progress),
        }
    }

    pub fn print_extraction_report(&self, report: &ExtractionReport) {
        if self.quiet && self.mode != OutputMode::Json {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_report(report),
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => self.print_plain_report(report),
        }
    }

    pub fn print_grid_check(&self, check: &GridCheck) {
        match self.mode {
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "grid_check",
                    "check": check,
                }));
            }
            _ => {
                let width = check
                    .width
                    .map(|w| w.to_string())
                    .unwrap_or_else(|| "uneven".to_string());
                self.info(&format!(
                    "Grid: {} rows x {} columns (expected {} rows)",
                    check.rows, width, check.expected_rows
                ));

                if check.is_aligned() {
                    self.success("Output matches the chart layout");
                } else {
                    for problem in &check.problems {
                        self.warning(problem);
                    }
                }
            }
        }
    }

    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", SPARKLES, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, kind: MessageType, message: &str) {
        let line = self.human_line(kind, message);
        match kind {
            MessageType::Error => eprintln!("{}", line),
            _ => println!("{}", line),
        }
    }

    fn human_line(&self, kind: MessageType, message: &str) -> String {
        if !self.use_colors {
            return format!("{} {}", kind.glyph(), message);
        }

        let styled = match kind {
            MessageType::Success => style(message).green().bold(),
            MessageType::Error => style(message).red().bold(),
            MessageType::Warning => style(message).yellow().bold(),
            MessageType::Info => style(message).cyan(),
        };
        format!("{}{}", kind.emoji(), styled)
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn styled_count(&self, value: String) -> String {
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value
        }
    }

    fn print_human_summary(&self, progress: &ExtractionProgress) {
        println!();
        self.print_separator();

        if self.use_colors {
            println!(
                "{} {}",
                style("Throughput extraction completed!").green().bold(),
                CHECKMARK
            );
        } else {
            println!("✓ Throughput extraction completed!");
        }

        println!();
        println!(
            "  Lines scanned:   {}",
            self.styled_count(progress.lines_processed.to_string())
        );
        println!(
            "  Lines matched:   {}",
            self.styled_count(progress.lines_matched.to_string())
        );
        println!(
            "  Rows written:    {}",
            self.styled_count(progress.rows_completed.to_string())
        );
        if progress.trailing_values > 0 {
            println!("  Partial row:     {} values", progress.trailing_values);
        }
        println!(
            "  Time taken:      {}",
            self.styled_count(format_duration(progress.elapsed()))
        );
        if progress.input_deleted {
            println!("  Input log:       deleted");
        }

        self.print_separator();
    }

    fn print_json_summary(&self, progress: &ExtractionProgress) {
        let summary = serde_json::json!({
            "type": "summary",
            "lines_processed": progress.lines_processed,
            "lines_matched": progress.lines_matched,
            "values_written": progress.values_written,
            "rows_completed": progress.rows_completed,
            "trailing_values": progress.trailing_values,
            "input_deleted": progress.input_deleted,
            "duration_ms": progress.elapsed().as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_plain_summary(&self, progress: &ExtractionProgress) {
        println!("COMPLETED: Throughput extraction");
        println!("Lines scanned: {}", progress.lines_processed);
        println!("Lines matched: {}", progress.lines_matched);
        println!("Values written: {}", progress.values_written);
        println!("Rows written: {}", progress.rows_completed);
        println!("Duration: {:?}", progress.elapsed());
    }

    fn print_human_report(&self, report: &ExtractionReport) {
        self.print_header("Extraction Report");

        println!("Input:  {}", report.input.display());
        println!("Output: {}", report.output.display());
        println!(
            "Extracted at: {}",
            report.extraction_time.format("%Y-%m-%d %H:%M UTC")
        );
        println!(
            "Marker {:?}, window +{}..+{}, {} values per row",
            report.config_used.marker,
            report.config_used.window_offset,
            report.config_used.window_end(),
            report.config_used.values_per_row
        );
        println!();

        if !report.warnings.is_empty() {
            println!("Issues encountered:");
            for warning in &report.warnings {
                println!("  - {}", warning);
            }
        }
    }

    fn print_plain_report(&self, report: &ExtractionReport) {
        println!("REPORT: Extraction completed");
        println!("Input: {}", report.input.display());
        println!("Output: {}", report.output.display());
        println!("Values: {}", report.extraction_summary.values_written);
        println!("Rows: {}", report.extraction_summary.rows_completed);
        println!(
            "Duration: {:?}",
            report.extraction_summary.extraction_duration
        );

        if !report.warnings.is_empty() {
            println!("Warnings: {}", report.warnings.len());
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

impl MessageType {
    fn emoji(self) -> Emoji<'static, 'static> {
        match self {
            MessageType::Success => CHECKMARK,
            MessageType::Error => CROSS,
            MessageType::Warning => WARNING,
            MessageType::Info => INFO,
        }
    }

    /// Prefix used when colours are off.
    fn glyph(self) -> &'static str {
        match self {
            MessageType::Success => "✓",
            MessageType::Error => "✗",
            MessageType::Warning => "!",
            MessageType::Info => "i",
        }
    }
}
