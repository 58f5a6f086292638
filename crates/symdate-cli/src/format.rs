//! # Format Subcommand
//!
//! Locale-aware rendering of a calendar date.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use symdate_core::{DateFormatOptions, MonthStyle, NumericStyle, TextStyle};

use crate::{parse_date_arg, Settings};

/// Arguments for the `symdate format` subcommand.
#[derive(Args, Debug)]
pub struct FormatArgs {
    /// A calendar date, `YYYY-MM-DD`.
    #[arg(value_name = "DATE")]
    pub date: String,

    /// Weekday style: long, short, narrow.
    #[arg(long, value_name = "STYLE")]
    pub weekday: Option<TextStyle>,

    /// Year style: numeric, 2-digit.
    #[arg(long, value_name = "STYLE")]
    pub year: Option<NumericStyle>,

    /// Month style: numeric, 2-digit, long, short, narrow.
    #[arg(long, value_name = "STYLE")]
    pub month: Option<MonthStyle>,

    /// Day style: numeric, 2-digit.
    #[arg(long, value_name = "STYLE")]
    pub day: Option<NumericStyle>,
}

impl FormatArgs {
    fn options(&self) -> DateFormatOptions {
        DateFormatOptions {
            weekday: self.weekday,
            year: self.year,
            month: self.month,
            day: self.day,
        }
    }
}

/// Execute the format subcommand.
///
/// Locales come from the global `--locale` flag. An explicit locale list
/// with no known tag is an error rather than a silent fallback.
pub fn run_format(args: &FormatArgs, settings: &Settings, out: &mut dyn Write) -> Result<u8> {
    let date = parse_date_arg(&args.date)?;
    let tags = settings.locale_tags();
    let options = args.options();
    tracing::debug!(locales = ?tags, ?options, "formatting");

    let text = date
        .try_to_locale_string(&tags, &options)
        .with_context(|| format!("cannot format {}", args.date))?;
    writeln!(out, "{text}")?;
    Ok(0)
}
