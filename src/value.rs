//! Cell values and their coercions.
//!
//! A [`Value`] is a closed sum type over the scalars a loosely-typed row
//! can hold: number, string, boolean, date or null. Every coercion the
//! analyzer needs (to number, to string, to date) is a total function on
//! this type, so type detection is an exhaustive match rather than a chain
//! of runtime guards.
//!
//! # Coercion rules
//!
//! | Variant | as number | as string | as date |
//! |---------|-----------|-----------|---------|
//! | `Null` | none | `"null"` | none |
//! | `Number` | itself (NaN → none) | shortest round-trip form | none |
//! | `Text` | full parse, finite only | itself | generic date parse |
//! | `Bool` | none | `"true"` / `"false"` | none |
//! | `DateTime` | none | ISO-8601 (ms, `Z`) | itself |
//!
//! # Example
//!
//! ```
//! use u_eda::value::Value;
//!
//! assert_eq!(Value::from(" 42 ").as_number(), Some(42.0));
//! assert_eq!(Value::from("0x1F").as_number(), Some(31.0));
//! assert_eq!(Value::from("abc").as_number(), None);
//! assert_eq!(Value::from(3.0).to_display_string(), "3");
//! assert!(Value::from("2024-01-15").as_datetime().is_some());
//! ```

use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

// ── Value ─────────────────────────────────────────────────────────────

/// A single cell of a row.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Missing value (JSON `null` or an absent key).
    #[default]
    Null,
    /// Floating-point number. May hold `NaN` when built from Rust.
    Number(f64),
    /// Free-form string. Numeric, boolean and date strings are recognized
    /// during type detection.
    Text(String),
    /// Boolean.
    Bool(bool),
    /// Instant in time, always valid.
    DateTime(DateTime<Utc>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Coerces the value to a number.
    ///
    /// Numbers pass through (`NaN` yields `None`). Strings must parse
    /// fully, after trimming, to a finite number. Every other variant
    /// yields `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if !n.is_nan() => Some(*n),
            Self::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// Returns `true` if the value counts as numeric for type detection:
    /// any `Number` (even `NaN`), or a string that parses to a finite number.
    pub fn is_numeric_like(&self) -> bool {
        match self {
            Self::Number(_) => true,
            Self::Text(s) => parse_number(s).is_some(),
            _ => false,
        }
    }

    /// Returns `true` for a boolean or the exact strings `"true"` / `"false"`.
    pub fn is_boolean_like(&self) -> bool {
        match self {
            Self::Bool(_) => true,
            Self::Text(s) => s == "true" || s == "false",
            _ => false,
        }
    }

    /// Coerces the value to an instant. Only dates and parseable date
    /// strings succeed.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(d) => Some(*d),
            Self::Text(s) => parse_datetime(s),
            _ => None,
        }
    }

    /// String form used for frequency keys and string ordering.
    pub fn to_display_string(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed("null"),
            Self::Number(n) => Cow::Owned(format_number(*n)),
            Self::Text(s) => Cow::Borrowed(s.as_str()),
            Self::Bool(true) => Cow::Borrowed("true"),
            Self::Bool(false) => Cow::Borrowed("false"),
            Self::DateTime(d) => Cow::Owned(format_iso(d)),
        }
    }

    /// Identity used to count distinct values.
    ///
    /// `0.0` and `-0.0` collapse, every `NaN` collapses, and a number is
    /// never equal to its string form.
    pub(crate) fn distinct_key(&self) -> Option<DistinctKey<'_>> {
        match self {
            Self::Null => None,
            Self::Number(n) => {
                let bits = if *n == 0.0 {
                    0f64.to_bits()
                } else if n.is_nan() {
                    f64::NAN.to_bits()
                } else {
                    n.to_bits()
                };
                Some(DistinctKey::Number(bits))
            }
            Self::Text(s) => Some(DistinctKey::Text(s.as_str())),
            Self::Bool(b) => Some(DistinctKey::Bool(*b)),
            Self::DateTime(d) => Some(DistinctKey::DateTime(
                d.timestamp(),
                d.timestamp_subsec_nanos(),
            )),
        }
    }
}

/// Hashable identity of a non-null [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum DistinctKey<'a> {
    Number(u64),
    Text(&'a str),
    Bool(bool),
    DateTime(i64, u32),
}

// ── Conversions ───────────────────────────────────────────────────────

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Self::DateTime(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

// ── Parsing and formatting helpers ────────────────────────────────────

/// Parses a string that must represent a finite number in full.
///
/// Surrounding whitespace is ignored. Decimal and scientific notation are
/// accepted, as are `0x`, `0o` and `0b` integer literals. Blank strings,
/// `Infinity` and `NaN` are rejected.
pub fn parse_number(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }

    let radix = match t.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&t[2..], radix).ok().map(|n| n as f64);
    }

    // Rust accepts "inf"/"nan" spellings; only finite values count.
    t.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Date-time layouts without an offset, interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

/// Date-only layouts, interpreted as midnight UTC.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Parses a date string in any of the common layouts.
///
/// Accepts RFC 3339 / ISO-8601 (with or without offset), RFC 2822, and a
/// set of slash and month-name layouts. Strings without an offset are
/// read as UTC.
///
/// ```
/// use u_eda::value::parse_datetime;
///
/// assert!(parse_datetime("2024-03-01T12:30:00Z").is_some());
/// assert!(parse_datetime("Tue, 1 Jul 2003 10:52:37 +0200").is_some());
/// assert!(parse_datetime("Mar 1 2024").is_some());
/// assert!(parse_datetime("hello").is_none());
/// ```
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }

    if let Ok(d) = DateTime::parse_from_rfc3339(t) {
        return Some(d.with_timezone(&Utc));
    }
    if let Ok(d) = DateTime::parse_from_rfc2822(t) {
        return Some(d.with_timezone(&Utc));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(d) = NaiveDateTime::parse_from_str(t, fmt) {
            return Some(d.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

/// Formats an instant as `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn format_iso(d: &DateTime<Utc>) -> String {
    d.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Formats a number the way a JSON-facing client expects to read it back:
/// integers without a fraction, exponent form outside `[1e-6, 1e21)`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if !(1e-6..1e21).contains(&abs) {
        let s = format!("{n:e}");
        return match s.find('e') {
            Some(pos) if !s[pos + 1..].starts_with('-') => {
                format!("{}e+{}", &s[..pos], &s[pos + 1..])
            }
            _ => s,
        };
    }
    format!("{n}")
}

/// Orders strings by UTF-16 code units, matching the default string sort
/// of the clients that consume the summary.
pub(crate) fn cmp_utf16(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

// ── Tests ─────────────────────────────────────────────────────────────
