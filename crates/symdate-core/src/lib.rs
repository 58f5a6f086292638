//! # symdate-core: Symbolic Calendar Dates
//!
//! A calendar day as a value: "December 1, 2022", with no time of day and no
//! timezone. The day is anchored at UTC midnight so it reads the same in
//! every timezone, while still converting to and from `chrono` instants and
//! round-tripping through JSON as `YYYY-MM-DD`.
//!
//! ## Key Design Principles
//!
//! 1. **Never raise while computing.** Construction and field arithmetic
//!    degrade to an invalid sentinel instead of failing, and the sentinel
//!    propagates through every accessor as `None`. Validity is checked
//!    explicitly with [`SymbolicDate::is_valid`].
//!
//! 2. **Calendar-date text only.** Parsing accepts `YYYY-MM-DD` and nothing
//!    else. Datetime strings are rejected because the day they fall on
//!    depends on who reads them.
//!
//! 3. **Explicit JSON revival.** Dates serialize as strings through `serde`.
//!    Turning strings back into dates is an explicit pass
//!    ([`parse_reviving_dates`]) over the parsed tree, children first.
//!
//! 4. **Injectable clock.** "Today" is read through [`Clock`], so the local
//!    day can be pinned in tests and tools.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod clock;
pub mod date;
pub mod error;
pub mod locale;
pub mod revive;

// Re-export primary types for ergonomic imports.
pub use clock::{Clock, FixedClock, SystemClock};
pub use date::{DateArgs, SymbolicDate, INVALID_DATE_TEXT, ISO_DATE_LEN};
pub use error::DateError;
pub use locale::{DateFormatOptions, MonthStyle, NumericStyle, TextStyle};
pub use revive::{
    parse_reviving_dates, parse_with_reviver, revive_symbolic_date, revive_value, RevivedValue,
};
