//! # symdate CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use symdate_cli::calendar::{
    run_parts, run_shift, run_show, run_today, PartsArgs, ShiftArgs, ShowArgs, TodayArgs,
};
use symdate_cli::format::{run_format, FormatArgs};
use symdate_cli::revive::{run_revive, ReviveArgs};
use symdate_cli::{flush_output, Settings};

/// Calendar dates without a time of day.
///
/// Reads today's local calendar day, inspects and shifts `YYYY-MM-DD`
/// dates, formats them for a locale, and revives dates inside JSON.
#[derive(Parser, Debug)]
#[command(name = "symdate", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Pin "now" to an RFC 3339 instant instead of the system clock.
    #[arg(long, env = "SYMDATE_NOW", global = true, value_name = "RFC3339")]
    now: Option<String>,

    /// Locale tag for formatted output. Repeat or comma-separate for fallbacks.
    #[arg(
        long = "locale",
        env = "SYMDATE_LOCALE",
        global = true,
        value_delimiter = ',',
        value_name = "TAG"
    )]
    locales: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print today's local calendar date.
    Today(TodayArgs),

    /// Show the representations of a date.
    Show(ShowArgs),

    /// Build a date from year, zero-based month, and day, with rollover.
    Parts(PartsArgs),

    /// Move a date by years, months, and days.
    Shift(ShiftArgs),

    /// Format a date for a locale.
    Format(FormatArgs),

    /// Revive calendar-date strings in a JSON document.
    Revive(ReviveArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
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

    tracing::debug!("symdate CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let settings = Settings {
        now: cli.now,
        locales: cli.locales,
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let result = match cli.command {
        Commands::Today(args) => run_today(&args, &settings, &mut out),
        Commands::Show(args) => run_show(&args, &settings, &mut out),
        Commands::Parts(args) => run_parts(&args, &settings, &mut out),
        Commands::Shift(args) => run_shift(&args, &settings, &mut out),
        Commands::Format(args) => run_format(&args, &settings, &mut out),
        Commands::Revive(args) => run_revive(&args, &settings, &mut out),
    };
    let result = flush_output(result, &mut out);

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
