//! # Clock
//!
//! The wall clock is the only non-deterministic input to the crate. It is
//! read through the [`Clock`] trait so that "today" can be pinned to a
//! known instant and a known local offset.

use chrono::{DateTime, FixedOffset, Local, Utc};

/// Source of the current moment, expressed in the observer's local offset.
pub trait Clock {
    /// The current instant, carrying the local UTC offset in effect.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// The host wall clock in the host's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock frozen at one instant, observed from one fixed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<FixedOffset>);

impl FixedClock {
    /// Freeze the clock at `instant`, observed in the instant's own offset.
    pub fn new(instant: DateTime<FixedOffset>) -> Self {
        Self(instant)
    }

    /// Freeze the clock at a UTC instant, observed from `offset`.
    pub fn at(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self(instant.with_timezone(&offset))
    }

    /// Parse an RFC 3339 timestamp; its offset becomes the local offset.
    pub fn parse_rfc3339(s: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s).map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn fixed_clock_reports_local_fields() {
        let utc = Utc.with_ymd_and_hms(2022, 11, 30, 23, 0, 0).unwrap();
        let baku = FixedOffset::east_opt(4 * 3600).unwrap();
        let now = FixedClock::at(utc, baku).now();
        assert_eq!((now.year(), now.month(), now.day()), (2022, 12, 1));
        assert_eq!(now.hour(), 3);
        assert_eq!(now.with_timezone(&Utc), utc);
    }

    #[test]
    fn fixed_clock_parses_rfc3339() {
        let clock = FixedClock::parse_rfc3339("2022-12-01T03:00:00+04:00").unwrap();
        assert_eq!(clock.now().offset().local_minus_utc(), 4 * 3600);
        assert!(FixedClock::parse_rfc3339("2022-12-01").is_err());
    }

    #[test]
    fn system_clock_is_close_to_utc_now() {
        let before = Utc::now();
        let now = SystemClock.now().with_timezone(&Utc);
        let after = Utc::now();
        assert!(before <= now && now <= after);
    }
}
