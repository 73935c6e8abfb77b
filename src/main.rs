//! Binary entry point for datesieve.
//!
//! Reads timestamped lines and prints the ones a retention policy keeps.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use datesieve::cli::SieveCommand;
use datesieve::config::RetentionSettings;
use datesieve::observability::{self, LoggingConfig};
use datesieve::{DateParser, DatesieveConfig, Error};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Datesieve - thin out timestamped lines with grandfather-father-son retention.
///
/// Each line must carry a timestamp. For every granularity with a capacity N,
/// the newest line of each of the N newest distinct periods is kept. A line
/// is printed if any granularity keeps it.
#[derive(Parser)]
#[command(name = "datesieve")]
#[command(author, version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Distinct seconds to keep.
    #[arg(long, value_name = "N", env = "DATESIEVE_SECONDS", allow_negative_numbers = true)]
    seconds: Option<i64>,

    /// Distinct minutes to keep.
    #[arg(long, value_name = "N", env = "DATESIEVE_MINUTES", allow_negative_numbers = true)]
    minutes: Option<i64>,

    /// Distinct hours to keep.
    #[arg(long, value_name = "N", env = "DATESIEVE_HOURS", allow_negative_numbers = true)]
    hours: Option<i64>,

    /// Distinct days to keep.
    #[arg(long, value_name = "N", env = "DATESIEVE_DAYS", allow_negative_numbers = true)]
    days: Option<i64>,

    /// Distinct weeks to keep.
    #[arg(long, value_name = "N", env = "DATESIEVE_WEEKS", allow_negative_numbers = true)]
    weeks: Option<i64>,

    /// Distinct months to keep.
    #[arg(long, value_name = "N", env = "DATESIEVE_MONTHS", allow_negative_numbers = true)]
    months: Option<i64>,

    /// Distinct years to keep.
    #[arg(long, value_name = "N", env = "DATESIEVE_YEARS", allow_negative_numbers = true)]
    years: Option<i64>,

    /// Week numbering: `iso` (ISO 8601) or `monday` (strftime %W).
    #[arg(long, value_name = "SCHEME", env = "DATESIEVE_WEEK_NUMBERING")]
    week_numbering: Option<String>,

    /// Parse each whole line with this strftime format instead of searching
    /// for a date.
    #[arg(long, value_name = "FORMAT")]
    strptime: Option<String>,

    /// Read ambiguous numeric dates as month-day-year.
    #[arg(long, conflicts_with = "dayfirst")]
    monthfirst: bool,

    /// Read ambiguous numeric dates as day-month-year (default).
    #[arg(long)]
    dayfirst: bool,

    /// Buffer and sort the whole input; input order does not matter.
    #[arg(long, overrides_with = "no_sort")]
    sort: bool,

    /// Stream the input even if the config file enables sorting.
    #[arg(long, overrides_with = "sort")]
    no_sort: bool,

    /// Print the lines that would be dropped instead of the kept ones.
    #[arg(long)]
    invert: bool,

    /// Accept streaming input that is not newest first.
    #[arg(long, conflicts_with = "sort")]
    no_order_check: bool,

    /// Read from this file instead of stdin (`-` for stdin).
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,
}

impl Cli {
    fn retention(&self) -> RetentionSettings {
        RetentionSettings {
            seconds: self.seconds,
            minutes: self.minutes,
            hours: self.hours,
            days: self.days,
            weeks: self.weeks,
            months: self.months,
            years: self.years,
            week_numbering: self.week_numbering.clone(),
        }
    }

    /// Applies command-line overrides on top of the loaded configuration.
    fn apply(&self, mut config: DatesieveConfig) -> DatesieveConfig {
        config.retention = config.retention.overlay(&self.retention());
        if let Some(format) = &self.strptime {
            config.input.strptime = Some(format.clone());
        }
        if self.monthfirst {
            config.input.dayfirst = Some(false);
        } else if self.dayfirst {
            config.input.dayfirst = Some(true);
        }
        if self.sort {
            config.input.sort = Some(true);
        } else if self.no_sort {
            config.input.sort = Some(false);
        }
        config
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match DatesieveConfig::load(cli.config.as_deref()) {
        Ok(config) => cli.apply(config),
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        },
    };

    let logging = LoggingConfig::from_settings(Some(&config.logging), cli.verbose);
    if let Err(e) = observability::init(&logging) {
        eprintln!("Warning: logging disabled: {e}");
    }

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli, config: &DatesieveConfig) -> datesieve::Result<()> {
    let command = SieveCommand::from_config(config)?
        .with_invert(cli.invert)
        .with_order_check(!cli.no_order_check);

    tracing::debug!(
        config = ?config.source,
        parser = %config.parser().describe(),
        policy = %command.policy(),
        "Starting sieve"
    );
    if matches!(config.parser(), DateParser::Strict { .. }) && (cli.dayfirst || cli.monthfirst) {
        tracing::warn!("--dayfirst/--monthfirst have no effect with --strptime");
    }

    let stdout = io::stdout();
    let mut output = stdout.lock();
    command.run(open_input(cli.input.as_deref())?, &mut output)?;
    Ok(())
}

fn open_input(path: Option<&Path>) -> datesieve::Result<Box<dyn BufRead>> {
    match path {
        None => Ok(Box::new(io::stdin().lock())),
        Some(path) if path == Path::new("-") => Ok(Box::new(io::stdin().lock())),
        Some(path) => {
            let file = File::open(path).map_err(|e| Error::OperationFailed {
                operation: "open_input".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;
            Ok(Box::new(BufReader::new(file)))
        },
    }
}
