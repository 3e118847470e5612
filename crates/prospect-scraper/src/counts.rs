//! Parsing of abbreviated counters as the app renders them.

use std::sync::LazyLock;

use regex::Regex;

static OTHERS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\band\s+(\d[\d.,\s]*[km]?)\s+others?\b").expect("valid others regex")
});

static COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:[.,\u{a0} ]\d+)*)\s*([km])?\b").expect("valid count regex"));

/// Parses counters such as `1,234`, `1.2K`, `3M`, `12 likes` or
/// `Liked by jane and 1,234 others` (which counts jane too).
///
/// Returns `None` when no number is present.
#[must_use]
pub fn parse_count(text: &str) -> Option<u64> {
    if let Some(captures) = OTHERS_RE.captures(text) {
        return parse_number(captures.get(1)?.as_str()).map(|others| others + 1);
    }
    COUNT_RE
        .find(text)
        .and_then(|m| parse_number(m.as_str()))
}

fn parse_number(raw: &str) -> Option<u64> {
    let captures = COUNT_RE.captures(raw.trim())?;
    let digits = captures.get(1)?.as_str();
    let multiplier = match captures.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(suffix) if suffix == "k" => 1_000.0,
        Some(suffix) if suffix == "m" => 1_000_000.0,
        _ => {
            let plain: String = digits.chars().filter(char::is_ascii_digit).collect();
            return plain.parse().ok();
        }
    };

    let decimal: String = digits
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    let value: f64 = decimal.parse().ok()?;
    scale(value, multiplier)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale(value: f64, multiplier: f64) -> Option<u64> {
    let scaled = (value * multiplier).round();
    if scaled.is_finite() && scaled >= 0.0 && scaled < 1.0e18 {
        Some(scaled as u64)
    } else {
        None
    }
}
