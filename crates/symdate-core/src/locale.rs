//! # Locale Formatting
//!
//! Locale-aware rendering of a symbolic date through chrono's localized
//! formatter. The options bag mirrors a host date formatter's
//! `weekday`/`year`/`month`/`day` fields, and the instant formatted is always
//! the UTC midnight of the represented day, so the process timezone never
//! shifts the day shown.
//!
//! Field order and the numeric separator are taken from the locale's own
//! preferred date representation (`%x`).

use std::fmt::Write as _;
use std::str::FromStr;

use chrono::{DateTime, Locale, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::date::{SymbolicDate, INVALID_DATE_TEXT};
use crate::error::DateError;

/// Environment variables consulted for the host locale, highest priority first.
const LOCALE_ENV_VARS: [&str; 3] = ["LC_ALL", "LC_TIME", "LANG"];

/// Style for a textual field (weekday names).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    /// `Thursday`
    Long,
    /// `Thu`
    Short,
    /// `T`
    Narrow,
}

/// Style for a numeric field (year, day).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumericStyle {
    /// No padding: `1`, `2022`.
    #[serde(rename = "numeric")]
    Numeric,
    /// Two digits: `01`, `22`.
    #[serde(rename = "2-digit")]
    TwoDigit,
}

/// Style for the month, which may be numeric or textual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonthStyle {
    #[serde(rename = "numeric")]
    Numeric,
    #[serde(rename = "2-digit")]
    TwoDigit,
    #[serde(rename = "long")]
    Long,
    #[serde(rename = "short")]
    Short,
    #[serde(rename = "narrow")]
    Narrow,
}

impl FromStr for TextStyle {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            "narrow" => Ok(Self::Narrow),
            other => Err(DateError::UnknownStyle(other.to_string())),
        }
    }
}

impl FromStr for NumericStyle {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "numeric" => Ok(Self::Numeric),
            "2-digit" => Ok(Self::TwoDigit),
            other => Err(DateError::UnknownStyle(other.to_string())),
        }
    }
}

impl FromStr for MonthStyle {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "numeric" => Ok(Self::Numeric),
            "2-digit" => Ok(Self::TwoDigit),
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            "narrow" => Ok(Self::Narrow),
            other => Err(DateError::UnknownStyle(other.to_string())),
        }
    }
}

/// Which date fields to render, and how.
///
/// With every field unset the locale's preferred date representation is
/// used. Otherwise only the fields that are set appear in the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateFormatOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<TextStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<NumericStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<MonthStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<NumericStyle>,
}

impl DateFormatOptions {
    /// Returns true if no field is requested.
    pub fn is_empty(&self) -> bool {
        self.weekday.is_none() && self.year.is_none() && self.month.is_none() && self.day.is_none()
    }
}

impl SymbolicDate {
    /// Format for humans in the first known locale of `locales`.
    ///
    /// An empty or entirely unknown `locales` list falls back to the host
    /// locale, and a locale chrono cannot render falls back to `en_US`. The
    /// invalid sentinel renders as `Invalid Date`.
    pub fn to_locale_string(&self, locales: &[&str], options: &DateFormatOptions) -> String {
        let Some(midnight) = self.as_utc_midnight() else {
            return INVALID_DATE_TEXT.to_string();
        };
        let locale = resolve_locale(locales).unwrap_or_else(host_locale);
        format_midnight(&midnight, locale, options).unwrap_or_else(|e| {
            tracing::debug!(?locale, error = %e, "locale unsupported, formatting as en_US");
            format_midnight(&midnight, Locale::en_US, options).unwrap_or_else(|_| self.to_string())
        })
    }

    /// Like [`SymbolicDate::to_locale_string`], but fails instead of
    /// falling back.
    ///
    /// # Errors
    ///
    /// - [`DateError::InvalidDate`] for the invalid sentinel.
    /// - [`DateError::UnknownLocale`] if `locales` is non-empty and none of
    ///   its tags is known.
    /// - [`DateError::UnsupportedLocale`] if the locale's patterns use
    ///   fields chrono cannot render, such as `th_TH` era years.
    pub fn try_to_locale_string(
        &self,
        locales: &[&str],
        options: &DateFormatOptions,
    ) -> Result<String, DateError> {
        let midnight = self.as_utc_midnight().ok_or(DateError::InvalidDate)?;
        let locale = if locales.is_empty() {
            host_locale()
        } else {
            resolve_locale(locales).ok_or_else(|| DateError::UnknownLocale(locales.join(", ")))?
        };
        format_midnight(&midnight, locale, options)
    }
}

/// The first tag in `tags` that names a known locale.
///
/// Tags may use either separator (`en-US`, `en_US`) and may carry a codeset
/// (`de_DE.UTF-8`). A bare language picks its primary region (`fr` is
/// `fr_FR`, `en` is `en_US`).
pub fn resolve_locale(tags: &[&str]) -> Option<Locale> {
    tags.iter().find_map(|tag| lookup_tag(tag))
}

/// The locale named by the environment, or `en_US`.
pub fn host_locale() -> Locale {
    locale_from_env(|var| std::env::var(var).ok())
}

/// The first non-empty variable of `LC_ALL`, `LC_TIME`, `LANG` decides;
/// an unknown value there yields `en_US` rather than consulting the rest.
fn locale_from_env(lookup: impl Fn(&str) -> Option<String>) -> Locale {
    LOCALE_ENV_VARS
        .iter()
        .filter_map(|&var| lookup(var))
        .find(|value| !value.is_empty())
        .and_then(|value| lookup_tag(&value))
        .unwrap_or(Locale::en_US)
}

fn lookup_tag(tag: &str) -> Option<Locale> {
    let tag = tag.split(|c: char| c == '.' || c == '@').next().unwrap_or(tag);
    let mut parts = tag.split(|c: char| c == '-' || c == '_');
    let language = parts.next()?.to_ascii_lowercase();
    if language.is_empty() {
        return None;
    }
    let name = match (language.as_str(), parts.next()) {
        ("c" | "posix", None) => return Some(Locale::POSIX),
        ("en", None) => return Some(Locale::en_US),
        (_, Some(region)) => format!("{language}_{}", region.to_ascii_uppercase()),
        (_, None) => format!("{language}_{}", language.to_ascii_uppercase()),
    };
    Locale::try_from(name.as_str()).ok()
}

/// Render `pattern` in `locale`.
///
/// Chrono has no rendering for some locale pattern fields (`%Ey`, `%Od`)
/// and reports them as a formatting error, which surfaces here as
/// [`DateError::UnsupportedLocale`].
fn render(instant: &DateTime<Utc>, pattern: &str, locale: Locale) -> Result<String, DateError> {
    let mut out = String::new();
    write!(out, "{}", instant.format_localized(pattern, locale))
        .map_err(|_| DateError::UnsupportedLocale(format!("{locale:?} cannot render {pattern}")))?;
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Year,
    Month,
    Day,
}

/// Field order of a locale's numeric date, with the text that follows
/// each field. `trailing[2]` is whatever comes after the last field.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NumericLayout {
    order: [Field; 3],
    trailing: [String; 3],
}

impl NumericLayout {
    fn month_first(&self) -> bool {
        let position = |field| self.order.iter().position(|f| *f == field);
        position(Field::Month) < position(Field::Day)
    }

    /// Fields carry unit markers (`2022年12月1日`) instead of sitting
    /// between separators (`12/1/2022`).
    fn marks_fields(&self) -> bool {
        !self.trailing[2].trim().is_empty()
    }

    fn spaced(&self) -> bool {
        self.trailing.iter().any(|t| t.chars().any(char::is_whitespace))
    }
}

/// Render a sample day whose fields are distinguishable (1999-11-22) with the
/// locale's `%x` and read back where each field landed.
fn numeric_layout(locale: Locale) -> Result<NumericLayout, DateError> {
    let fallback = NumericLayout {
        order: [Field::Month, Field::Day, Field::Year],
        trailing: ["/".to_string(), "/".to_string(), String::new()],
    };
    let Some(sample) = Utc.with_ymd_and_hms(1999, 11, 22, 0, 0, 0).single() else {
        return Ok(fallback);
    };
    let text = render(&sample, "%x", locale)?;

    let year = text
        .find("1999")
        .map(|at| (at, 4))
        .or_else(|| text.find("99").map(|at| (at, 2)));
    let found = [
        (Field::Year, year),
        (Field::Month, text.find("11").map(|at| (at, 2))),
        (Field::Day, text.find("22").map(|at| (at, 2))),
    ];
    let mut located: Vec<(Field, usize, usize)> = found
        .iter()
        .filter_map(|(field, hit)| hit.map(|(at, len)| (*field, at, len)))
        .collect();
    if located.len() != 3 {
        return Ok(fallback);
    }
    located.sort_by_key(|(_, at, _)| *at);

    let between = |i: usize| {
        let (_, at, len) = located[i];
        let end = located.get(i + 1).map_or(text.len(), |(_, next, _)| *next);
        text.get(at + len..end).unwrap_or_default().to_string()
    };
    let inner = |i: usize| {
        let gap = between(i);
        if gap.is_empty() {
            "/".to_string()
        } else {
            gap
        }
    };

    Ok(NumericLayout {
        order: [located[0].0, located[1].0, located[2].0],
        trailing: [inner(0), inner(1), between(2)],
    })
}

fn initial(text: &str) -> String {
    text.chars().next().map(String::from).unwrap_or_default()
}

fn format_midnight(
    instant: &DateTime<Utc>,
    locale: Locale,
    options: &DateFormatOptions,
) -> Result<String, DateError> {
    let draw = |pattern: &str| render(instant, pattern, locale);
    if options.is_empty() {
        return draw("%x");
    }

    let layout = numeric_layout(locale)?;
    let weekday = options
        .weekday
        .map(|style| match style {
            TextStyle::Long => draw("%A"),
            TextStyle::Short => draw("%a"),
            TextStyle::Narrow => draw("%A").map(|name| initial(&name)),
        })
        .transpose()?;
    let year = options
        .year
        .map(|style| match style {
            NumericStyle::Numeric => draw("%Y"),
            NumericStyle::TwoDigit => draw("%y"),
        })
        .transpose()?;
    let day = options
        .day
        .map(|style| match style {
            NumericStyle::Numeric => draw("%-d"),
            NumericStyle::TwoDigit => draw("%d"),
        })
        .transpose()?;

    let body = match options.month {
        Some(MonthStyle::Long) => textual_body(&layout, draw("%B")?, day, year),
        Some(MonthStyle::Short) => textual_body(&layout, draw("%b")?, day, year),
        Some(MonthStyle::Narrow) => textual_body(&layout, initial(&draw("%B")?), day, year),
        Some(MonthStyle::Numeric) => numeric_body(&layout, Some(draw("%-m")?), day, year),
        Some(MonthStyle::TwoDigit) => numeric_body(&layout, Some(draw("%m")?), day, year),
        None => numeric_body(&layout, None, day, year),
    };

    Ok(match (weekday, body.is_empty()) {
        (Some(weekday), true) => weekday,
        (Some(weekday), false) => format!("{weekday}, {body}"),
        (None, _) => body,
    })
}

/// `December 1, 2022` where the locale puts the month first,
/// `1 December 2022` elsewhere. Locales that mark fields with units keep
/// their year and day markers around the month name (`2022年12月1日`).
fn textual_body(
    layout: &NumericLayout,
    month: String,
    day: Option<String>,
    year: Option<String>,
) -> String {
    if layout.marks_fields() {
        let joiner = if layout.spaced() { " " } else { "" };
        return layout
            .order
            .iter()
            .zip(&layout.trailing)
            .filter_map(|(field, trailing)| match field {
                Field::Year => year.as_ref().map(|y| format!("{y}{}", trailing.trim())),
                Field::Month => Some(month.clone()),
                Field::Day => day.as_ref().map(|d| format!("{d}{}", trailing.trim())),
            })
            .collect::<Vec<_>>()
            .join(joiner);
    }
    if layout.month_first() {
        let month_day = match day {
            Some(day) => format!("{month} {day}"),
            None => month,
        };
        match year {
            Some(year) => format!("{month_day}, {year}"),
            None => month_day,
        }
    } else {
        [day, Some(month), year]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Requested fields in the locale's order. Each field but the last keeps
/// the text that follows it; the last keeps its own only when that text is
/// a unit marker rather than a separator.
fn numeric_body(
    layout: &NumericLayout,
    month: Option<String>,
    day: Option<String>,
    year: Option<String>,
) -> String {
    let present: Vec<(&str, &str)> = layout
        .order
        .iter()
        .zip(&layout.trailing)
        .filter_map(|(field, trailing)| {
            let value = match field {
                Field::Year => year.as_deref(),
                Field::Month => month.as_deref(),
                Field::Day => day.as_deref(),
            }?;
            Some((value, trailing.as_str()))
        })
        .collect();

    let last = present.len().saturating_sub(1);
    let mut out = String::new();
    for (i, (value, trailing)) in present.into_iter().enumerate() {
        out.push_str(value);
        if i < last || layout.marks_fields() {
            out.push_str(trailing);
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn december_first() -> SymbolicDate {
        SymbolicDate::parse("2022-12-01")
    }

    fn long_date() -> DateFormatOptions {
        DateFormatOptions {
            weekday: Some(TextStyle::Long),
            year: Some(NumericStyle::Numeric),
            month: Some(MonthStyle::Long),
            day: Some(NumericStyle::Numeric),
        }
    }

    #[test]
    fn test_default_uses_locale_date_representation() {
        let opts = DateFormatOptions::default();
        assert_eq!(december_first().to_locale_string(&["en-US"], &opts), "12/01/2022");
        assert_eq!(december_first().to_locale_string(&["de-DE"], &opts), "01.12.2022");
    }

    #[test]
    fn test_long_date_english() {
        assert_eq!(
            december_first().to_locale_string(&["en-US"], &long_date()),
            "Thursday, December 1, 2022"
        );
    }

    #[test]
    fn test_long_date_day_first_locale() {
        let opts = DateFormatOptions { weekday: None, ..long_date() };
        let text = december_first().to_locale_string(&["de-DE"], &opts);
        assert!(text.starts_with("1 "), "got {text:?}");
        assert!(text.ends_with(" 2022"), "got {text:?}");
    }

    #[test]
    fn test_weekday_only() {
        let opts = DateFormatOptions { weekday: Some(TextStyle::Long), ..Default::default() };
        assert_eq!(december_first().to_locale_string(&["fr-FR"], &opts), "jeudi");

        let opts = DateFormatOptions { weekday: Some(TextStyle::Narrow), ..Default::default() };
        assert_eq!(december_first().to_locale_string(&["en-US"], &opts), "T");
    }

    #[test]
    fn test_numeric_subset_keeps_locale_order() {
        let opts = DateFormatOptions {
            month: Some(MonthStyle::Numeric),
            day: Some(NumericStyle::Numeric),
            ..Default::default()
        };
        assert_eq!(december_first().to_locale_string(&["en-US"], &opts), "12/1");

        let opts = DateFormatOptions {
            month: Some(MonthStyle::TwoDigit),
            day: Some(NumericStyle::TwoDigit),
            ..Default::default()
        };
        assert_eq!(december_first().to_locale_string(&["de-DE"], &opts), "01.12");
    }

    #[test]
    fn test_two_digit_year() {
        let opts = DateFormatOptions { year: Some(NumericStyle::TwoDigit), ..Default::default() };
        assert_eq!(december_first().to_locale_string(&["en-US"], &opts), "22");
    }

    #[test]
    fn test_first_known_tag_wins() {
        let opts = DateFormatOptions::default();
        assert_eq!(
            december_first().to_locale_string(&["xx-YY", "de-DE", "en-US"], &opts),
            "01.12.2022"
        );
    }

    #[test]
    fn test_unknown_locale() {
        let opts = DateFormatOptions::default();
        assert!(!december_first().to_locale_string(&["xx-YY"], &opts).is_empty());
        assert!(matches!(
            december_first().try_to_locale_string(&["xx-YY"], &opts),
            Err(DateError::UnknownLocale(_))
        ));
    }

    #[test]
    fn test_invalid_date() {
        let opts = DateFormatOptions::default();
        assert_eq!(SymbolicDate::invalid().to_locale_string(&["en-US"], &opts), "Invalid Date");
        assert!(matches!(
            SymbolicDate::invalid().try_to_locale_string(&["en-US"], &opts),
            Err(DateError::InvalidDate)
        ));
    }

    #[test]
    fn test_lookup_tag_forms() {
        assert_eq!(lookup_tag("en-US"), Some(Locale::en_US));
        assert_eq!(lookup_tag("de_DE.UTF-8"), Some(Locale::de_DE));
        assert_eq!(lookup_tag("fr"), Some(Locale::fr_FR));
        assert_eq!(lookup_tag("en"), Some(Locale::en_US));
        assert_eq!(lookup_tag("C"), Some(Locale::POSIX));
        assert_eq!(lookup_tag(""), None);
        assert_eq!(lookup_tag("zz"), None);
    }

    #[test]
    fn test_numeric_layout_from_short_pattern() {
        let us = numeric_layout(Locale::en_US).unwrap();
        assert_eq!(us.order, [Field::Month, Field::Day, Field::Year]);
        assert_eq!(us.trailing, ["/".to_string(), "/".to_string(), String::new()]);
        assert!(us.month_first());
        assert!(!us.marks_fields());

        let de = numeric_layout(Locale::de_DE).unwrap();
        assert_eq!(de.order, [Field::Day, Field::Month, Field::Year]);
        assert_eq!(de.trailing[0], ".");
        assert!(!de.month_first());

        let ja = numeric_layout(Locale::ja_JP).unwrap();
        assert_eq!(ja.order, [Field::Year, Field::Month, Field::Day]);
        assert_eq!(ja.trailing, ["年".to_string(), "月".to_string(), "日".to_string()]);
        assert!(ja.marks_fields());
    }

    #[test]
    fn test_unit_marked_numeric_dates() {
        let opts = DateFormatOptions {
            year: Some(NumericStyle::Numeric),
            month: Some(MonthStyle::Numeric),
            day: Some(NumericStyle::Numeric),
            ..Default::default()
        };
        let date = december_first();
        assert_eq!(date.to_locale_string(&["ja-JP"], &opts), "2022年12月1日");
        assert_eq!(date.to_locale_string(&["zh-CN"], &opts), "2022年12月1日");
        assert_eq!(date.to_locale_string(&["ko-KR"], &opts), "2022년 12월 1일");

        let month_day = DateFormatOptions { year: None, ..opts };
        assert_eq!(date.to_locale_string(&["ja-JP"], &month_day), "12月1日");

        let long = DateFormatOptions { month: Some(MonthStyle::Long), ..opts };
        assert_eq!(date.to_locale_string(&["ja-JP"], &long), "2022年12月1日");
    }

    #[test]
    fn test_unrenderable_locale_falls_back() {
        let date = december_first();
        for tag in ["th-TH", "fa-IR"] {
            for opts in [
                DateFormatOptions::default(),
                DateFormatOptions { month: Some(MonthStyle::Numeric), ..Default::default() },
            ] {
                assert_eq!(
                    date.to_locale_string(&[tag], &opts),
                    date.to_locale_string(&["en-US"], &opts),
                    "{tag} {opts:?}"
                );
                assert!(
                    matches!(date.try_to_locale_string(&[tag], &opts), Err(DateError::UnsupportedLocale(_))),
                    "{tag} {opts:?}"
                );
            }
        }
    }

    #[test]
    fn test_render_reports_unsupported_fields() {
        let midnight = december_first().as_utc_midnight().unwrap();
        assert_eq!(render(&midnight, "%Y", Locale::th_TH).unwrap(), "2022");
        assert!(matches!(
            render(&midnight, "%x", Locale::th_TH),
            Err(DateError::UnsupportedLocale(_))
        ));
    }

    #[test]
    fn test_locale_from_env_priority() {
        fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
            move |var: &str| pairs.iter().find(|(name, _)| *name == var).map(|(_, value)| value.to_string())
        }

        let all = [("LC_ALL", "de_DE.UTF-8"), ("LC_TIME", "fr_FR.UTF-8"), ("LANG", "ja_JP.UTF-8")];
        assert_eq!(locale_from_env(env(&all)), Locale::de_DE);
        assert_eq!(locale_from_env(env(&all[1..])), Locale::fr_FR);
        assert_eq!(locale_from_env(env(&all[2..])), Locale::ja_JP);
        assert_eq!(locale_from_env(env(&[("LC_ALL", ""), ("LANG", "th_TH.UTF-8")])), Locale::th_TH);
        assert_eq!(locale_from_env(env(&[("LC_ALL", "klingon")])), Locale::en_US);
        assert_eq!(locale_from_env(env(&[])), Locale::en_US);
    }

    #[test]
    fn test_host_locale_reads_process_env() {
        std::env::set_var("LC_ALL", "de_DE.UTF-8");
        std::env::set_var("LC_TIME", "fr_FR.UTF-8");
        std::env::set_var("LANG", "th_TH.UTF-8");
        let with_all = host_locale();
        std::env::remove_var("LC_ALL");
        let with_time = host_locale();
        std::env::remove_var("LC_TIME");
        let with_lang = host_locale();
        // th_TH from the environment must not panic the lenient path.
        let text = december_first().to_locale_string(&[], &DateFormatOptions::default());
        std::env::remove_var("LANG");

        assert_eq!(with_all, Locale::de_DE);
        assert_eq!(with_time, Locale::fr_FR);
        assert_eq!(with_lang, Locale::th_TH);
        assert_eq!(text, "12/01/2022");
    }

    #[test]
    fn test_options_deserialize_like_host_bag() {
        let opts: DateFormatOptions =
            serde_json::from_str(r#"{"weekday":"short","month":"2-digit","day":"numeric"}"#).unwrap();
        assert_eq!(opts.weekday, Some(TextStyle::Short));
        assert_eq!(opts.month, Some(MonthStyle::TwoDigit));
        assert_eq!(opts.day, Some(NumericStyle::Numeric));
        assert_eq!(opts.year, None);
    }

    #[test]
    fn test_style_from_str() {
        assert_eq!("narrow".parse::<TextStyle>().unwrap(), TextStyle::Narrow);
        assert_eq!("2-digit".parse::<NumericStyle>().unwrap(), NumericStyle::TwoDigit);
        assert_eq!("short".parse::<MonthStyle>().unwrap(), MonthStyle::Short);
        assert!("wide".parse::<MonthStyle>().is_err());
    }
}
