// These Clippy lints are disabled because this is a CLI binary, not a library:
// - print_stdout/print_stderr: CLI tools are expected to print to stdout/stderr for user output.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use content_validator::{ValidationConfig, ValidationReport, output, validate_project};

/// Exit status when validation found one or more errors.
const EXIT_FAILED: u8 = 1;
/// Exit status when the configuration documents could not be loaded.
const EXIT_CONFIG: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

/// Check that categories, media types, item collections and category
/// reference lists agree with each other.
#[derive(Parser, Debug)]
#[command(name = "content-validator", version, about, long_about = None)]
struct Cli {
    /// Project directory containing `config/` and `data/`.
    #[arg(env = "PORTFOLIO_CONTENT_ROOT", default_value = ".")]
    path: PathBuf,

    /// Report format written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    /// Also check `config/languages.json` and translation key parity in `lang/`.
    #[arg(long)]
    translations: bool,

    /// Also check display fields, `config/app.json` and required item fields.
    #[arg(long)]
    schema: bool,

    /// Skip syntax-checking unloaded JSON files and reporting unused data files.
    #[arg(long)]
    no_sweep: bool,

    /// Glob pattern excluded from the sweep (repeatable).
    #[arg(long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Maximum size of a single file in bytes.
    #[arg(long, value_name = "BYTES")]
    max_file_size: Option<u64>,

    /// Disable colored status output.
    #[arg(long)]
    no_color: bool,

    /// Enable verbose logging on stderr. Repeat for more (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn validation_config(&self) -> ValidationConfig {
        let mut config = ValidationConfig::for_root(&self.path);
        config.check_translations = self.translations;
        config.check_schema = self.schema;
        config.sweep_files = !self.no_sweep;
        config.exclude.clone_from(&self.exclude);
        if let Some(max) = self.max_file_size {
            config.max_file_size = max;
        }
        config
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn write_report(report: &ValidationReport, format: OutputFormat) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Human => output::write_human(report, &mut out)?,
        OutputFormat::Json => output::write_json(report, &mut out)?,
    }
    out.flush()?;
    Ok(())
}

/// One-line verdict on stderr so stdout stays a clean, reproducible report.
fn print_verdict(report: &ValidationReport) {
    let verdict = if report.ok {
        format!(
            "content validation passed ({} warning(s))",
            report.warnings_count()
        )
        .green()
        .bold()
    } else {
        format!(
            "content validation failed: {} error(s), {} warning(s)",
            report.errors_count(),
            report.warnings_count()
        )
        .red()
        .bold()
    };
    eprintln!("{verdict}");
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.no_color || !std::io::stderr().is_terminal() {
        colored::control::set_override(false);
    }

    let config = cli.validation_config();
    tracing::debug!(root = %config.root.display(), "validating project");

    let report = match validate_project(&config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    if let Err(e) = write_report(&report, cli.format) {
        tracing::error!("{e:#}");
        return ExitCode::from(EXIT_FAILED);
    }

    if cli.format == OutputFormat::Human {
        print_verdict(&report);
    }

    if report.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAILED)
    }
}
