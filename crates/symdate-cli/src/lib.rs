//! # symdate-cli: Symbolic Date Command-Line Interface
//!
//! A thin clap front-end over `symdate-core`.
//!
//! ## Subcommands
//!
//! - `today`: the local calendar day
//! - `show`: inspect a `YYYY-MM-DD` date
//! - `parts`: build a date from year, month index, day with rollover
//! - `shift`: move a date by years, months, and days
//! - `format`: locale-aware formatting
//! - `revive`: turn calendar-date strings in JSON into dates
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handlers write to a caller-supplied sink and return an exit code, so
//!   they can be driven directly from tests.

pub mod calendar;
pub mod format;
pub mod revive;

use std::io::Write;

use anyhow::{Context, Result};
use symdate_core::{Clock, FixedClock, SymbolicDate, SystemClock};

/// Settings shared by every subcommand, resolved from global flags and
/// their environment fallbacks.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// RFC 3339 instant to pin the clock to.
    pub now: Option<String>,
    /// Locale tags for formatted output, in preference order.
    pub locales: Vec<String>,
}

impl Settings {
    /// The clock "today" is read from.
    pub fn clock(&self) -> Result<Box<dyn Clock>> {
        match &self.now {
            Some(now) => {
                let clock = FixedClock::parse_rfc3339(now)
                    .with_context(|| format!("--now is not an RFC 3339 timestamp: {now:?}"))?;
                tracing::debug!(now = %now, "clock pinned");
                Ok(Box::new(clock))
            }
            None => Ok(Box::new(SystemClock)),
        }
    }

    /// Locale tags as string slices.
    pub fn locale_tags(&self) -> Vec<&str> {
        self.locales.iter().map(String::as_str).collect()
    }
}

/// Flush handler output, turning a failed flush into an error result.
pub fn flush_output(result: Result<u8>, out: &mut dyn Write) -> Result<u8> {
    let code = result?;
    out.flush().context("failed to flush output")?;
    Ok(code)
}

/// Parse a date argument strictly, naming the argument on failure.
pub(crate) fn parse_date_arg(text: &str) -> Result<SymbolicDate> {
    text.parse::<SymbolicDate>()
        .with_context(|| format!("invalid date argument {text:?}"))
}
