//! # Error Types
//!
//! Errors surfaced at the edges of the crate. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! Inside the value type an invalid date is a sentinel state, not an error:
//! construction and mutation never fail. `DateError` only appears where a
//! caller asks for something the sentinel cannot provide: a canonical
//! string, a serde value, a strict parse, or a locale lookup.

use thiserror::Error;

/// Error type for the symbolic date crate.
#[derive(Error, Debug)]
pub enum DateError {
    /// The date is the invalid sentinel and has no calendar representation.
    #[error("invalid date")]
    InvalidDate,

    /// Text does not have the `YYYY-MM-DD` calendar-date shape.
    #[error("not an ISO calendar date (expected YYYY-MM-DD): {0:?}")]
    Pattern(String),

    /// Text has the calendar-date shape but names no day of the calendar.
    #[error("calendar date out of range: {0:?}")]
    OutOfRange(String),

    /// None of the requested locale tags is known to the formatter.
    #[error("unknown locale: {0}")]
    UnknownLocale(String),

    /// The locale's date patterns use fields chrono cannot render
    /// (era years, alternative digits).
    #[error("locale cannot be rendered: {0}")]
    UnsupportedLocale(String),

    /// A formatting style name that is not one of the recognized values.
    #[error("unknown format style: {0:?}")]
    UnknownStyle(String),

    /// JSON parsing or serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
