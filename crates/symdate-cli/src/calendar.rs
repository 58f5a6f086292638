//! # Calendar Subcommands
//!
//! `today`, `show`, `parts`, and `shift`: construct a date one of the
//! supported ways and print it.

use std::io::Write;

use anyhow::{bail, Result};
use clap::Args;

use symdate_core::{DateArgs, SymbolicDate};

use crate::{parse_date_arg, Settings};

/// Arguments for the `symdate today` subcommand.
#[derive(Args, Debug)]
pub struct TodayArgs {
    /// Print the ISO form `YYYY-MM-DD` (the default).
    #[arg(long, conflicts_with = "text")]
    pub iso: bool,

    /// Print the human-readable form (`Thu Dec 01 2022`) instead of ISO.
    #[arg(long)]
    pub text: bool,
}

/// Arguments for the `symdate show` subcommand.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// A calendar date, `YYYY-MM-DD`.
    #[arg(value_name = "DATE")]
    pub date: String,
}

/// Arguments for the `symdate parts` subcommand.
#[derive(Args, Debug)]
pub struct PartsArgs {
    /// Full year. `0..=99` means `1900..=1999`.
    #[arg(allow_negative_numbers = true)]
    pub year: i64,
    /// Zero-based month index; out-of-range values roll over.
    #[arg(allow_negative_numbers = true)]
    pub month_index: i64,
    /// Day of month; out-of-range values roll over.
    #[arg(allow_negative_numbers = true)]
    pub day: i64,
}

/// Arguments for the `symdate shift` subcommand.
#[derive(Args, Debug)]
pub struct ShiftArgs {
    /// A calendar date, `YYYY-MM-DD`.
    #[arg(value_name = "DATE")]
    pub date: String,

    /// Years to add (may be negative).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub years: i64,

    /// Months to add (may be negative).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub months: i64,

    /// Days to add (may be negative).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub days: i64,
}

/// Execute the today subcommand.
pub fn run_today(args: &TodayArgs, settings: &Settings, out: &mut dyn Write) -> Result<u8> {
    let clock = settings.clock()?;
    let date = SymbolicDate::new_with(DateArgs::Today, &*clock);
    if args.text {
        writeln!(out, "{date}")?;
    } else {
        writeln!(out, "{}", date.to_iso_string()?)?;
    }
    Ok(0)
}

/// Execute the show subcommand.
///
/// Prints one `field: value` line per representation of the date.
pub fn run_show(args: &ShowArgs, _settings: &Settings, out: &mut dyn Write) -> Result<u8> {
    let date = parse_date_arg(&args.date)?;
    write_summary(&date, out)?;
    Ok(0)
}

/// Execute the parts subcommand.
pub fn run_parts(args: &PartsArgs, _settings: &Settings, out: &mut dyn Write) -> Result<u8> {
    let date = SymbolicDate::new(DateArgs::Parts(args.year, args.month_index, args.day));
    if !date.is_valid() {
        bail!(
            "({}, {}, {}) is outside the representable calendar range",
            args.year,
            args.month_index,
            args.day
        );
    }
    writeln!(out, "{}", date.to_iso_string()?)?;
    Ok(0)
}

/// Execute the shift subcommand.
///
/// Years are applied first, then months, then days, each through the
/// corresponding setter so that rollover happens at every step.
pub fn run_shift(args: &ShiftArgs, _settings: &Settings, out: &mut dyn Write) -> Result<u8> {
    let mut date = parse_date_arg(&args.date)?;

    if let Some(year) = date.full_year() {
        date.set_full_year(i64::from(year).saturating_add(args.years), None, None);
    }
    if let Some(month) = date.month() {
        date.set_month(i64::from(month).saturating_add(args.months), None);
    }
    if let Some(day) = date.date() {
        date.set_date(i64::from(day).saturating_add(args.days));
    }

    if !date.is_valid() {
        bail!("shifting {} leaves the representable calendar range", args.date);
    }
    tracing::info!(from = %args.date, years = args.years, months = args.months, days = args.days, "shifted date");
    writeln!(out, "{}", date.to_iso_string()?)?;
    Ok(0)
}

fn write_summary(date: &SymbolicDate, out: &mut dyn Write) -> Result<()> {
    let (Some(weekday), Some(millis)) = (date.day(), date.timestamp_millis()) else {
        bail!("invalid date");
    };
    writeln!(out, "iso: {}", date.to_iso_string()?)?;
    writeln!(out, "text: {date}")?;
    writeln!(out, "weekday: {weekday}")?;
    writeln!(out, "epoch_ms: {millis}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pinned(now: &str) -> Settings {
        Settings {
            now: Some(now.to_string()),
            ..Settings::default()
        }
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn today_reads_pinned_local_day() {
        // 23:00 UTC is already the next day at UTC+04:00.
        let settings = pinned("2022-12-01T03:00:00+04:00");
        let mut buf = Vec::new();
        let args = TodayArgs { iso: false, text: false };
        assert_eq!(run_today(&args, &settings, &mut buf).unwrap(), 0);
        assert_eq!(output(buf), "2022-12-01\n");
    }

    #[test]
    fn today_text_form() {
        let settings = pinned("2022-12-01T12:00:00Z");
        let mut buf = Vec::new();
        let args = TodayArgs { iso: false, text: true };
        run_today(&args, &settings, &mut buf).unwrap();
        assert_eq!(output(buf), "Thu Dec 01 2022\n");
    }

    #[test]
    fn today_rejects_malformed_now() {
        let settings = pinned("yesterday");
        let mut buf = Vec::new();
        let args = TodayArgs { iso: true, text: false };
        let err = run_today(&args, &settings, &mut buf).unwrap_err();
        assert!(format!("{err:#}").contains("--now"));
    }

    #[test]
    fn show_prints_every_representation() {
        let mut buf = Vec::new();
        let args = ShowArgs { date: "2022-12-01".into() };
        run_show(&args, &Settings::default(), &mut buf).unwrap();
        assert_eq!(
            output(buf),
            "iso: 2022-12-01\ntext: Thu Dec 01 2022\nweekday: 4\nepoch_ms: 1669852800000\n"
        );
    }

    #[test]
    fn show_fails_on_instant_string() {
        let mut buf = Vec::new();
        let args = ShowArgs { date: "2022-12-01T00:00:00Z".into() };
        assert!(run_show(&args, &Settings::default(), &mut buf).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn parts_rolls_over() {
        let mut buf = Vec::new();
        let args = PartsArgs { year: 2022, month_index: 12, day: 0 };
        run_parts(&args, &Settings::default(), &mut buf).unwrap();
        assert_eq!(output(buf), "2022-12-31\n");
    }

    #[test]
    fn parts_maps_two_digit_years() {
        let mut buf = Vec::new();
        let args = PartsArgs { year: 99, month_index: 0, day: 1 };
        run_parts(&args, &Settings::default(), &mut buf).unwrap();
        assert_eq!(output(buf), "1999-01-01\n");
    }

    #[test]
    fn parts_out_of_range_is_an_error() {
        let mut buf = Vec::new();
        let args = PartsArgs { year: i64::MAX, month_index: 0, day: 1 };
        assert!(run_parts(&args, &Settings::default(), &mut buf).is_err());
    }

    #[test]
    fn shift_applies_years_months_days_in_order() {
        let mut buf = Vec::new();
        let args = ShiftArgs {
            date: "2022-01-31".into(),
            years: 1,
            months: 1,
            days: 1,
        };
        run_shift(&args, &Settings::default(), &mut buf).unwrap();
        // 2023-01-31, then Feb 31 rolls to 2023-03-03, then +1 day.
        assert_eq!(output(buf), "2023-03-04\n");
    }

    #[test]
    fn shift_backwards_across_year_boundary() {
        let mut buf = Vec::new();
        let args = ShiftArgs {
            date: "2022-01-01".into(),
            years: 0,
            months: 0,
            days: -1,
        };
        run_shift(&args, &Settings::default(), &mut buf).unwrap();
        assert_eq!(output(buf), "2021-12-31\n");
    }
}
