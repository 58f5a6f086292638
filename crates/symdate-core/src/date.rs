//! # Symbolic Dates: Calendar Days Without a Clock
//!
//! Defines `SymbolicDate`, a calendar day (year, month, day) that carries no
//! time of day and no timezone. "December 1, 2022" stays December 1, 2022
//! whichever timezone the observer is in.
//!
//! ## Representation
//!
//! Logically a `SymbolicDate` is the instant at 00:00:00.000 UTC of the day
//! it names, so field extraction through UTC is timezone independent and
//! numeric coercion yields epoch milliseconds. Physically it is an
//! `Option<NaiveDate>`: `None` is the invalid sentinel.
//!
//! ## Invalid Sentinel
//!
//! Construction and mutation never fail. Input that does not describe a day
//! (a datetime string, an out-of-range field combination, a missing
//! argument) produces the invalid sentinel, which then propagates through
//! every accessor as `None` and through [`SymbolicDate::value_of`] as `NaN`.
//! Callers check [`SymbolicDate::is_valid`] explicitly. Only conversions that
//! must produce a string return [`DateError`].
//!
//! ## Rollover
//!
//! Field arithmetic follows host calendar rules: a month index of 12 is
//! January of the following year, day 0 is the last day of the previous
//! month, and so on in both directions. Results outside the range of
//! `chrono::NaiveDate` become the invalid sentinel.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Days, Local, NaiveDate, NaiveTime, Offset, TimeDelta, TimeZone, Utc,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::clock::{Clock, SystemClock};
use crate::error::DateError;

/// Length of a `YYYY-MM-DD` calendar-date string.
pub const ISO_DATE_LEN: usize = 10;

/// Text form of the invalid sentinel.
pub const INVALID_DATE_TEXT: &str = "Invalid Date";

/// The argument shapes a symbolic date can be constructed from.
///
/// Mirrors an overloaded constructor: no arguments, one calendar-date
/// string, or a `(year, month_index, day)` triple. Everything else is
/// [`DateArgs::Other`] and constructs the invalid sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateArgs<'a> {
    /// Today, in the observer's local timezone.
    Today,
    /// A `YYYY-MM-DD` calendar-date string.
    Text(&'a str),
    /// Year, zero-based month index, day of month.
    Parts(i64, i64, i64),
    /// Any other argument shape.
    Other,
}

impl<'a> DateArgs<'a> {
    /// Classify an untyped argument list.
    ///
    /// Zero arguments is `Today`, a single string is `Text`, three numbers
    /// are `Parts` (fractions truncated toward zero), anything else is
    /// `Other`.
    pub fn from_json(args: &'a [Value]) -> Self {
        match args {
            [] => Self::Today,
            [Value::String(text)] => Self::Text(text),
            [year, month, day] => match (json_integer(year), json_integer(month), json_integer(day)) {
                (Some(year), Some(month), Some(day)) => Self::Parts(year, month, day),
                _ => Self::Other,
            },
            _ => Self::Other,
        }
    }
}

fn json_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        _ => None,
    }
}

/// A calendar day anchored at UTC midnight, or the invalid sentinel.
///
/// # Construction
///
/// - [`SymbolicDate::today()`]: the local calendar day of the host clock.
/// - [`SymbolicDate::parse()`]: from `YYYY-MM-DD` text only.
/// - [`SymbolicDate::from_parts()`]: from year, month index, day with rollover.
/// - [`SymbolicDate::from_local_date()`] / [`SymbolicDate::from_utc_date()`]:
///   the day a `DateTime` falls on, locally or in UTC.
///
/// # Comparison
///
/// Equality and ordering behave like the numeric timestamp: two valid dates
/// compare by day, and the invalid sentinel is unequal to everything
/// (itself included) and unordered.
#[derive(Debug, Clone)]
pub struct SymbolicDate {
    day: Option<NaiveDate>,
}

impl SymbolicDate {
    /// Construct from one of the supported argument shapes, reading "today"
    /// from the host clock.
    pub fn new(args: DateArgs<'_>) -> Self {
        Self::new_with(args, &SystemClock)
    }

    /// Construct from one of the supported argument shapes, reading "today"
    /// from `clock`.
    pub fn new_with<C: Clock + ?Sized>(args: DateArgs<'_>, clock: &C) -> Self {
        match args {
            DateArgs::Today => Self::today_with(clock),
            DateArgs::Text(text) => Self::parse(text),
            DateArgs::Parts(year, month, day) => Self::from_parts(year, month, day),
            DateArgs::Other => Self::invalid(),
        }
    }

    /// Construct from an untyped argument list. See [`DateArgs::from_json`].
    pub fn from_json_args(args: &[Value]) -> Self {
        Self::new(DateArgs::from_json(args))
    }

    /// The calendar day the host clock currently shows in local time.
    pub fn today() -> Self {
        Self::today_with(&SystemClock)
    }

    /// The calendar day `clock` currently shows in its local offset.
    ///
    /// At 2022-11-30T23:00Z observed from UTC+04:00 this is 2022-12-01.
    pub fn today_with<C: Clock + ?Sized>(clock: &C) -> Self {
        Self::from_local_date(&clock.now())
    }

    /// Parse a `YYYY-MM-DD` calendar date.
    ///
    /// Only the bare calendar-date shape is accepted. Datetime strings such
    /// as `2022-12-01T12:00:00.000Z` produce the invalid sentinel even though
    /// they name a parseable instant, because the day they fall on depends on
    /// the reader's timezone.
    ///
    /// A month outside `01..=12` or a day outside `01..=31` is invalid. A
    /// day past the end of its month rolls over the way host date
    /// arithmetic does: `2022-02-30` is 2022-03-02.
    pub fn parse(text: &str) -> Self {
        match parse_rolling_date(text) {
            Ok(day) => Self { day: Some(day) },
            Err(e) => {
                tracing::trace!(input = text, error = %e, "calendar date text rejected");
                Self::invalid()
            }
        }
    }

    /// Build from a year, a zero-based month index, and a day of month.
    ///
    /// Out-of-range fields roll over: `from_parts(2022, 12, 1)` is
    /// 2023-01-01 and `from_parts(2022, 11, 0)` is 2022-11-30. A year in
    /// `0..=99` is read as `1900 + year`.
    pub fn from_parts(year: i64, month_index: i64, day: i64) -> Self {
        let year = if (0..=99).contains(&year) { 1900 + year } else { year };
        Self {
            day: make_day(year, month_index, day),
        }
    }

    /// The invalid sentinel.
    pub fn invalid() -> Self {
        Self { day: None }
    }

    /// The calendar day `instant` falls on in its own (local) timezone.
    pub fn from_local_date<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self {
            day: Some(instant.date_naive()),
        }
    }

    /// The calendar day `instant` falls on in UTC.
    pub fn from_utc_date<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self {
            day: Some(instant.naive_utc().date()),
        }
    }

    /// Returns `true` unless this is the invalid sentinel.
    pub fn is_valid(&self) -> bool {
        self.day.is_some()
    }

    /// The represented day, if valid.
    pub fn as_naive_date(&self) -> Option<NaiveDate> {
        self.day
    }

    /// Day of month, `1..=31`.
    pub fn date(&self) -> Option<u32> {
        self.day.map(|d| d.day())
    }

    /// Zero-based month index, `0..=11`.
    pub fn month(&self) -> Option<u32> {
        self.day.map(|d| d.month0())
    }

    /// Full year, e.g. `2022`.
    pub fn full_year(&self) -> Option<i32> {
        self.day.map(|d| d.year())
    }

    /// Zero-based day of week, `0` for Sunday.
    pub fn day(&self) -> Option<u32> {
        self.day.map(|d| d.weekday().num_days_from_sunday())
    }

    /// Set the day of month, rolling over into neighbouring months.
    pub fn set_date(&mut self, date: i64) -> &mut Self {
        let next = self
            .day
            .and_then(|d| make_day(d.year().into(), d.month0().into(), date));
        self.assign("set_date", next)
    }

    /// Set the month index and optionally the day of month.
    ///
    /// An omitted day keeps the current day of month, so setting February
    /// on January 31 lands in early March.
    pub fn set_month(&mut self, month_index: i64, date: Option<i64>) -> &mut Self {
        let next = self.day.and_then(|d| {
            make_day(
                d.year().into(),
                month_index,
                date.unwrap_or_else(|| d.day().into()),
            )
        });
        self.assign("set_month", next)
    }

    /// Set the year and optionally the month index and day of month.
    ///
    /// Omitted fields keep their current values. On the invalid sentinel the
    /// result stays invalid unless both month and day are supplied.
    pub fn set_full_year(
        &mut self,
        year: i64,
        month_index: Option<i64>,
        date: Option<i64>,
    ) -> &mut Self {
        let next = match (self.day, month_index, date) {
            (Some(d), month_index, date) => make_day(
                year,
                month_index.unwrap_or_else(|| d.month0().into()),
                date.unwrap_or_else(|| d.day().into()),
            ),
            (None, Some(month_index), Some(date)) => make_day(year, month_index, date),
            (None, _, _) => None,
        };
        self.assign("set_full_year", next)
    }

    fn assign(&mut self, op: &'static str, next: Option<NaiveDate>) -> &mut Self {
        if self.day.is_some() && next.is_none() {
            tracing::debug!(op, from = ?self.day, "date left the representable range");
        }
        self.day = next;
        self
    }

    /// The canonical `YYYY-MM-DD` form.
    ///
    /// Years outside `0..=9999` use the expanded `±YYYYYY-MM-DD` form.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::InvalidDate`] for the invalid sentinel.
    pub fn to_utc_string(&self) -> Result<String, DateError> {
        self.day.map(iso_calendar_string).ok_or(DateError::InvalidDate)
    }

    /// Same as [`SymbolicDate::to_utc_string`].
    pub fn to_iso_string(&self) -> Result<String, DateError> {
        self.to_utc_string()
    }

    /// The JSON form, identical to [`SymbolicDate::to_utc_string`].
    pub fn to_json(&self) -> Result<String, DateError> {
        self.to_utc_string()
    }

    /// Milliseconds since the Unix epoch of the UTC-midnight instant, or
    /// `NaN` for the invalid sentinel.
    pub fn value_of(&self) -> f64 {
        self.timestamp_millis().map_or(f64::NAN, |ms| ms as f64)
    }

    /// Milliseconds since the Unix epoch of the UTC-midnight instant.
    pub fn timestamp_millis(&self) -> Option<i64> {
        self.as_utc_midnight().map(|dt| dt.timestamp_millis())
    }

    /// Signed distance from `other` to `self`. `None` if either is invalid.
    pub fn difference(&self, other: &Self) -> Option<TimeDelta> {
        Some(self.day?.signed_duration_since(other.day?))
    }

    /// The UTC-midnight instant of the represented day.
    pub fn as_utc_midnight(&self) -> Option<DateTime<Utc>> {
        self.day.map(utc_midnight)
    }

    /// Local midnight of the represented day in the host timezone.
    pub fn as_local_midnight(&self) -> Option<DateTime<Local>> {
        self.as_midnight_in(&Local)
    }

    /// Midnight of the represented day in `tz`.
    ///
    /// When clocks skip over midnight, the wall time is read with the offset
    /// in effect before the transition, which lands just after the gap.
    pub fn as_midnight_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        let midnight = self.day?.and_time(NaiveTime::MIN);
        if let Some(dt) = tz.from_local_datetime(&midnight).earliest() {
            return Some(dt);
        }
        let before = midnight.checked_sub_signed(TimeDelta::days(1))?;
        let offset = tz.from_local_datetime(&before).earliest()?.offset().fix();
        let utc = midnight
            .checked_sub_signed(TimeDelta::seconds(offset.local_minus_utc().into()))?;
        Some(tz.from_utc_datetime(&utc))
    }
}

impl From<NaiveDate> for SymbolicDate {
    fn from(day: NaiveDate) -> Self {
        Self { day: Some(day) }
    }
}

impl PartialEq for SymbolicDate {
    fn eq(&self, other: &Self) -> bool {
        matches!((self.day, other.day), (Some(a), Some(b)) if a == b)
    }
}

impl PartialOrd for SymbolicDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.day?.cmp(&other.day?))
    }
}

impl Sub for &SymbolicDate {
    type Output = Option<TimeDelta>;

    fn sub(self, other: Self) -> Self::Output {
        self.difference(other)
    }
}

/// `Thu Dec 01 2022`, read from the UTC fields.
impl fmt::Display for SymbolicDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(day) = self.day else {
            return f.write_str(INVALID_DATE_TEXT);
        };
        let year = day.year();
        let sign = if year < 0 { "-" } else { "" };
        write!(f, "{} {sign}{:04}", day.format("%a %b %d"), year.unsigned_abs())
    }
}

/// Strict parse: unlike [`SymbolicDate::parse`], failure is an error and
/// days past the end of their month are rejected instead of rolled over.
impl FromStr for SymbolicDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_calendar_date(s).map(Self::from)
    }
}

impl Serialize for SymbolicDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = self.to_json().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for SymbolicDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_rolling_date(&text)
            .map(Self::from)
            .map_err(serde::de::Error::custom)
    }
}

/// Compiled check for `^\d{4}-[01]\d-[0-3]\d$`.
fn is_calendar_date_shape(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == ISO_DATE_LEN
        && b[..4].iter().all(u8::is_ascii_digit)
        && b[4] == b'-'
        && matches!(b[5], b'0' | b'1')
        && b[6].is_ascii_digit()
        && b[7] == b'-'
        && matches!(b[8], b'0'..=b'3')
        && b[9].is_ascii_digit()
}

/// Split shape-checked text into `(year, month, day)`.
fn calendar_fields(s: &str) -> Result<(u32, u32, u32), DateError> {
    if !is_calendar_date_shape(s) {
        return Err(DateError::Pattern(s.to_string()));
    }
    let b = s.as_bytes();
    Ok((digits(&b[0..4]), digits(&b[5..7]), digits(&b[8..10])))
}

fn parse_calendar_date(s: &str) -> Result<NaiveDate, DateError> {
    let (year, month, day) = calendar_fields(s)?;
    // Four digits always fit in i32.
    NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or_else(|| DateError::OutOfRange(s.to_string()))
}

/// Month must be `1..=12` and day `1..=31`; overflow past the month's
/// last day carries into the next month.
fn parse_rolling_date(s: &str) -> Result<NaiveDate, DateError> {
    let (year, month, day) = calendar_fields(s)?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(DateError::OutOfRange(s.to_string()));
    }
    make_day(i64::from(year), i64::from(month) - 1, i64::from(day))
        .ok_or_else(|| DateError::OutOfRange(s.to_string()))
}

fn digits(b: &[u8]) -> u32 {
    b.iter().fold(0, |acc, d| acc * 10 + u32::from(d - b'0'))
}

/// Day number arithmetic: normalize the month into the year, then count
/// days forward or back from the first of that month.
fn make_day(year: i64, month_index: i64, date: i64) -> Option<NaiveDate> {
    let year = year.checked_add(month_index.div_euclid(12))?;
    let month = month_index.rem_euclid(12) + 1;
    let first = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, u32::try_from(month).ok()?, 1)?;
    add_days(first, date.checked_sub(1)?)
}

fn add_days(day: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        day.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        day.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

fn utc_midnight(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}

fn iso_calendar_string(day: NaiveDate) -> String {
    let year = day.year();
    if (0..=9999).contains(&year) {
        format!("{year:04}-{:02}-{:02}", day.month(), day.day())
    } else {
        let sign = if year < 0 { '-' } else { '+' };
        format!(
            "{sign}{:06}-{:02}-{:02}",
            year.unsigned_abs(),
            day.month(),
            day.day()
        )
    }
}
