//! NCM code keys and punctuation.
//!
//! An NCM code is a digit sequence of up to eight digits, usually written
//! with dots (`0101.21.00`). The first two digits name the chapter, the
//! first four the position. Every helper here works on the digit-only form,
//! so dots, spaces, and letters in the input are ignored.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};

/// Maximum number of digits in a full NCM code.
pub const MAX_CODE_DIGITS: usize = 8;

/// Keep only the ASCII digits of `code`.
pub fn digits_only(code: &str) -> String {
    code.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Two-digit chapter key: first two digits, left-padded with `0`.
pub fn key_for_chapter(code: &str) -> String {
    let digits: String = digits_only(code).chars().take(2).collect();
    format!("{:0>2}", digits)
}

/// Four-digit position key: first four digits, right-padded with `0`.
pub fn key_for_position(code: &str) -> String {
    let digits: String = digits_only(code).chars().take(4).collect();
    format!("{:0<4}", digits)
}

pub fn is_chapter(code: &str) -> bool {
    digits_only(code).len() == 2
}

pub fn is_position(code: &str) -> bool {
    digits_only(code).len() == 4
}

/// Dot grouping used when printing an NCM code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePattern {
    /// `0101.21.00`
    FourTwoTwo,
    /// `01.01.21.00`
    TwoTwoTwoTwo,
}

impl CodePattern {
    fn group_sizes(self) -> &'static [usize] {
        match self {
            CodePattern::FourTwoTwo => &[4, 2, 2],
            CodePattern::TwoTwoTwoTwo => &[2, 2, 2, 2],
        }
    }
}

impl fmt::Display for CodePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodePattern::FourTwoTwo => f.write_str("4-2-2"),
            CodePattern::TwoTwoTwoTwo => f.write_str("2-2-2-2"),
        }
    }
}

impl FromStr for CodePattern {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "4-2-2" => Ok(CodePattern::FourTwoTwo),
            "2-2-2-2" => Ok(CodePattern::TwoTwoTwoTwo),
            other => bail!("Unknown code pattern: '{}'. Must be 4-2-2 or 2-2-2-2.", other),
        }
    }
}

/// Format `raw` as a dotted NCM code.
///
/// Non-digits are stripped and the result is truncated to eight digits.
/// Groups are filled left to right; groups left empty are omitted, so a
/// short code never gains padding (`"12"` stays `"12"`).
pub fn format_ncm_code(raw: &str, pattern: CodePattern) -> String {
    let digits: Vec<char> = digits_only(raw).chars().take(MAX_CODE_DIGITS).collect();
    let mut groups: Vec<String> = Vec::new();
    let mut offset = 0;
    for &size in pattern.group_sizes() {
        if offset >= digits.len() {
            break;
        }
        let end = (offset + size).min(digits.len());
        groups.push(digits[offset..end].iter().collect());
        offset = end;
    }
    groups.join(".")
}

/// Expand a user-typed code into the variants worth searching for.
///
/// The trimmed input always comes first. When the input has no letters and
/// is either all digits or carries no dots, both dotted layouts are added.
/// Duplicates are dropped, first occurrence wins.
pub fn build_code_search_terms(input: &str) -> Vec<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut terms = vec![trimmed.to_string()];

    let has_letters = trimmed.chars().any(char::is_alphabetic);
    let all_digits = trimmed.chars().all(|c| c.is_ascii_digit());
    if !has_letters && (all_digits || !trimmed.contains('.')) {
        for pattern in [CodePattern::FourTwoTwo, CodePattern::TwoTwoTwoTwo] {
            let formatted = format_ncm_code(trimmed, pattern);
            if !formatted.is_empty() && !terms.contains(&formatted) {
                terms.push(formatted);
            }
        }
    }

    terms
}
