use clap::Parser;
use std::process;
use tpsgrid::{Cli, OutputFormatter, OutputMode, TpsGrid, TpsGridError, UserFriendlyError};
use tracing_subscriber::EnvFilter;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();
    setup_logging(&cli);

    tracing::debug!(?cli, "parsed CLI arguments");

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let tpsgrid = match TpsGrid::from_cli(&cli) {
        Ok(tpsgrid) => tpsgrid,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    if cli.dry_run {
        return handle_dry_run(&tpsgrid);
    }

    match tpsgrid.extract() {
        Ok(mut report) => {
            if cli.verify {
                match tpsgrid.verify_output() {
                    Ok(check) => {
                        for problem in check.problems {
                            report.add_warning(format!("Grid check: {}", problem));
                        }
                    }
                    Err(e) => {
                        tpsgrid.handle_error(&e);
                        return exit_code_for(&e);
                    }
                }
            }

            tpsgrid.output_formatter().print_extraction_report(&report);

            if report.warnings.is_empty() {
                0 // Success
            } else {
                2 // Success with warnings
            }
        }
        Err(e) => {
            tpsgrid.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &TpsGridError) -> i32 {
    match error {
        TpsGridError::InputNotFound { .. } => 3,
        TpsGridError::NoMatchInWindow { .. } => 4,
        TpsGridError::OutputWriteFailed { .. } => 5,
        TpsGridError::OutputExists { .. } => 6,
        TpsGridError::Config { .. } => 7,
        _ => 1, // General error
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "tpsgrid.toml".to_string());

    match TpsGrid::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  tpsgrid --config {}", config_path);
            println!("\nEdit the file to match your benchmark log format.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(tpsgrid: &TpsGrid) -> i32 {
    let formatter = tpsgrid.output_formatter();
    let config = tpsgrid.config();

    formatter.info("DRY RUN MODE - No files will be written or deleted");
    formatter.print_separator();

    if config.io.input.exists() {
        formatter.success(&format!("Input log found: {}", config.io.input.display()));
    } else {
        formatter.error(&format!("Input log not found: {}", config.io.input.display()));
        return 3;
    }

    formatter.info("Configuration that would be used:");
    println!("  Marker: {:?}", config.extract.marker);
    println!(
        "  Window: +{}..+{} characters from the marker",
        config.extract.window_offset,
        config.extract.window_end()
    );
    println!("  Values per row: {}", config.extract.values_per_row);
    println!(
        "  Thread counts: {}",
        config
            .grid
            .thread_counts
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Output: {}", config.io.output.display());

    if config.io.output.exists() && !config.io.overwrite {
        formatter.warning("Output file exists and would not be overwritten");
    }

    if config.io.delete_input {
        formatter.warning("Input log would be deleted after extraction");
    }

    formatter.print_separator();
    formatter.success("Dry run completed successfully");
    formatter.info("Run without --dry-run to perform the extraction");

    0
}

fn print_startup_error(error: &TpsGridError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

fn setup_logging(cli: &Cli) {
    let default_level = match cli.verbosity_level() {
        0 => "tpsgrid=warn",
        1 => "tpsgrid=info",
        2 => "tpsgrid=debug",
        _ => "tpsgrid=trace",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr so JSON output on stdout stays parseable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tpsgrid::Config;

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let cli = Cli::parse_from([
            "tpsgrid",
            "--generate-config",
            "--config",
            config_path.to_str().unwrap(),
        ]);

        let exit_code = handle_generate_config(&cli);
        assert_eq!(exit_code, 0);

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[extract]"));
        assert!(Config::load_from_file(&config_path).is_ok());
    }

    #[test]
    fn test_dry_run_mode() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("bench.log");
        fs::write(&input, "TPS: 10\n").unwrap();

        let mut config = Config::default();
        config.io.input = input.clone();
        config.io.output = temp_dir.path().join("rows.txt");
        config.io.delete_input = true;
        let tpsgrid = TpsGrid::new(config, OutputMode::Plain, 0, true);

        assert_eq!(handle_dry_run(&tpsgrid), 0);
        assert!(input.exists());
        assert!(!temp_dir.path().join("rows.txt").exists());
    }

    #[test]
    fn test_dry_run_missing_input() {
        let mut config = Config::default();
        config.io.input = "/nonexistent/bench.log".into();
        let tpsgrid = TpsGrid::new(config, OutputMode::Plain, 0, true);

        assert_eq!(handle_dry_run(&tpsgrid), 3);
    }

    #[test]
    fn test_exit_codes() {
        let not_found = TpsGridError::InputNotFound {
            path: "x".to_string(),
        };
        assert_eq!(exit_code_for(&not_found), 3);

        let no_match = TpsGridError::NoMatchInWindow {
            line_number: 1,
            window: String::new(),
        };
        assert_eq!(exit_code_for(&no_match), 4);

        let config = TpsGridError::Config {
            message: String::new(),
        };
        assert_eq!(exit_code_for(&config), 7);
    }
}
