//! # Revive Subcommand
//!
//! Reads a JSON document, turns every `YYYY-MM-DD` string into a date, and
//! either re-serializes the document or reports where the dates were found.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use symdate_core::parse_reviving_dates;

use crate::Settings;

/// Arguments for the `symdate revive` subcommand.
#[derive(Args, Debug)]
pub struct ReviveArgs {
    /// JSON file to read. Reads stdin when omitted or `-`.
    #[arg(value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Print `<json-pointer> <date>` for each revived date instead of the document.
    #[arg(long)]
    pub report: bool,

    /// Pretty-print the re-serialized document.
    #[arg(long, conflicts_with = "report")]
    pub pretty: bool,
}

impl ReviveArgs {
    fn reads_stdin(&self) -> bool {
        match &self.path {
            None => true,
            Some(path) => path.as_os_str() == "-",
        }
    }
}

/// Execute the revive subcommand, reading stdin when no file is given.
pub fn run_revive(args: &ReviveArgs, settings: &Settings, out: &mut dyn Write) -> Result<u8> {
    let mut stdin = std::io::stdin().lock();
    run_revive_from(args, settings, &mut stdin, out)
}

/// Execute the revive subcommand with an explicit stdin stand-in.
pub fn run_revive_from(
    args: &ReviveArgs,
    _settings: &Settings,
    stdin: &mut dyn Read,
    out: &mut dyn Write,
) -> Result<u8> {
    let text = match &args.path {
        Some(path) if !args.reads_stdin() => read_file(path)?,
        _ => {
            let mut buf = String::new();
            stdin.read_to_string(&mut buf).context("failed to read stdin")?;
            buf
        }
    };

    let revived = parse_reviving_dates(&text).context("input is not valid JSON")?;
    let dates = revived.dates();
    tracing::info!(count = dates.len(), "revived dates");

    if args.report {
        for (pointer, date) in dates {
            writeln!(out, "{pointer} {}", date.to_iso_string()?)?;
        }
        return Ok(0);
    }

    let json = revived.into_json()?;
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    writeln!(out, "{rendered}")?;
    Ok(0)
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
