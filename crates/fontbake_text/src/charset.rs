//! Codepoint set helpers
//!
//! Range syntax accepted by [`parse_ranges`]: comma separated items, each a
//! single value or an inclusive `start-end` range. Values are decimal
//! (`65`), hexadecimal (`0x41`, `U+0041`) or a quoted character (`'A'`).

use crate::{Result, TextError};

/// Printable ASCII, space through tilde
pub fn ascii_printable() -> Vec<char> {
    (' '..='~').collect()
}

/// Parse a range list such as `"32-126,0x400-0x4FF,'€'"`.
///
/// Order is kept as written; duplicates are left for the entry builder to
/// drop. Surrogates inside a range are skipped.
pub fn parse_ranges(ranges: &str) -> Result<Vec<char>> {
    let mut codepoints = Vec::new();

    for item in ranges.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match split_range(item) {
            Some((start, end)) => {
                let start = parse_value(start)?;
                let end = parse_value(end)?;
                if start > end {
                    return Err(TextError::InvalidCharset(format!(
                        "range '{}' is reversed",
                        item
                    )));
                }
                codepoints.extend((start..=end).filter_map(char::from_u32));
            }
            None => {
                let value = parse_value(item)?;
                let ch = char::from_u32(value).ok_or_else(|| {
                    TextError::InvalidCharset(format!("U+{:04X} is not a character", value))
                })?;
                codepoints.push(ch);
            }
        }
    }

    if codepoints.is_empty() {
        return Err(TextError::InvalidCharset(format!(
            "'{}' names no characters",
            ranges
        )));
    }
    Ok(codepoints)
}

/// Split `a-b` on the separating dash, leaving a quoted `'-'` intact.
fn split_range(item: &str) -> Option<(&str, &str)> {
    let search_from = if item.starts_with('\'') {
        // Skip past the closing quote of a leading character literal
        item[1..].find('\'').map(|i| i + 2)?
    } else {
        0
    };
    let dash = item[search_from..].find('-')? + search_from;
    Some((item[..dash].trim(), item[dash + 1..].trim()))
}

fn parse_value(text: &str) -> Result<u32> {
    let invalid = || TextError::InvalidCharset(format!("cannot parse '{}'", text));

    if let Some(quoted) = text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
        let mut chars = quoted.chars();
        return match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(ch as u32),
            _ => Err(invalid()),
        };
    }

    let value = if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .or_else(|| text.strip_prefix("U+"))
        .or_else(|| text.strip_prefix("u+"))
    {
        u32::from_str_radix(hex, 16)
    } else {
        text.parse::<u32>()
    };
    let value = value.map_err(|_| invalid())?;

    if value > char::MAX as u32 {
        return Err(TextError::InvalidCharset(format!(
            "{:#X} is beyond the Unicode range",
            value
        )));
    }
    Ok(value)
}
