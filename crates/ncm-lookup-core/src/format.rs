//! Text formatting helpers for display and search.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static DECIMAL_ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"&#([0-9]+);").unwrap());
static HEX_ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"&#x([0-9a-fA-F]+);").unwrap());

const DATE_LAYOUTS: &[&str] = &[
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %b %Y",
];
const DATE_TIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Format a date as `DD/MM/YYYY`.
///
/// ISO-like input (`YYYY-MM-DD`, optionally followed by a time) is read
/// from its first ten characters. Anything else goes through
/// [`parse_generic_date`]. Empty input yields an empty string and
/// unparseable input is returned unchanged.
pub fn format_date_br(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let iso: String = value.chars().take(10).collect();
    if let Some((y, m, d)) = split_ymd(&iso) {
        return format!("{:02}/{:02}/{}", d, m, y);
    }

    match parse_generic_date(value) {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => value.to_string(),
    }
}

/// Split `Y-M-D` into three non-zero numbers.
fn split_ymd(iso: &str) -> Option<(u32, u32, u32)> {
    let mut parts = iso.split('-').map(|p| p.trim().parse::<u32>().ok().filter(|n| *n != 0));
    let y = parts.next()??;
    let m = parts.next()??;
    let d = parts.next()??;
    Some((y, m, d))
}

/// Best-effort date parsing for non-ISO input.
///
/// Offsets are respected: the calendar date is the one written in the
/// input's own offset. Partial ISO dates are completed with the first
/// day: `YYYY-MM` is day 1 of that month and `YYYY` is January 1.
pub fn parse_generic_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Some(date) = parse_partial_iso(value) {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.date_naive());
    }
    for layout in DATE_TIME_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, layout) {
            return Some(dt.date());
        }
    }
    DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(value, layout).ok())
}

/// `YYYY` or `YYYY-MM`, digits only.
fn parse_partial_iso(value: &str) -> Option<NaiveDate> {
    let all_digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
    let (year, month) = match value.split_once('-') {
        Some((y, m)) if all_digits(y, 4) && all_digits(m, 2) => (y, m.parse().ok()?),
        None if all_digits(value, 4) => (value, 1),
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year.parse().ok()?, month, 1)
}

/// Decode the five named XML entities and numeric character references.
///
/// Named entities are replaced first, in the order `&lt; &gt; &amp; &quot;
/// &apos;`, then decimal and hexadecimal references. A reference to a code
/// point that is not a Unicode scalar value becomes U+FFFD; one too large
/// to parse is left as written.
pub fn decode_html_entities(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let named = value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&apos;", "'");

    let decimal = DECIMAL_ENTITY.replace_all(&named, |caps: &Captures| {
        decode_code_point(&caps[0], caps[1].parse::<u32>().ok())
    });
    HEX_ENTITY
        .replace_all(&decimal, |caps: &Captures| {
            decode_code_point(&caps[0], u32::from_str_radix(&caps[1], 16).ok())
        })
        .into_owned()
}

fn decode_code_point(original: &str, code_point: Option<u32>) -> String {
    match code_point {
        Some(n) => char::from_u32(n).unwrap_or('\u{FFFD}').to_string(),
        None => original.to_string(),
    }
}

/// Lowercase and strip diacritics for accent-insensitive comparison.
pub fn normalize_for_search(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}
