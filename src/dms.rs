use once_cell::sync::Lazy;
use regex::Regex;

// Degrees and minutes are integers; seconds may carry a decimal fraction.
// Anything after the seconds (a closing `"`, a hemisphere letter) is ignored.
static DMS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*(\d+)\s*°\s*(\d+)\s*'\s*(\d+(?:\.\d+)?)"#).expect("valid DMS pattern")
});

static DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d$").expect("valid digit pattern"));

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DIGIT_RE.is_match(c.encode_utf8(&mut buf))
}

/// ASCII form of any Unicode decimal digit (Devanagari, Arabic-Indic,
/// fullwidth, ...). Decimal digits are encoded in contiguous runs made of
/// whole 0-9 blocks, so the value is the distance from the run start mod 10.
fn ascii_digit(c: char) -> Option<char> {
    if c.is_ascii_digit() {
        return Some(c);
    }
    if !is_decimal_digit(c) {
        return None;
    }
    let mut start = c as u32;
    while let Some(prev) = start.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        start -= 1;
    }
    char::from_digit((c as u32 - start) % 10, 10)
}

/// Replaces the typographic glyphs spreadsheets tend to produce with the
/// plain characters the pattern expects, and folds digits to ASCII.
fn normalize_glyphs(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '\u{2019}' | '\u{2018}' | '\u{2032}' => '\'',
            '\u{2033}' | '\u{201C}' | '\u{201D}' => '"',
            '\u{00BA}' | '\u{02DA}' => '°',
            other => ascii_digit(other).unwrap_or(other),
        })
        .collect()
}

/// Parses a `D°M'S` coordinate into decimal degrees.
///
/// Returns `None` for anything that does not match, including a value with
/// degrees and minutes but no seconds. Only the positive convention is
/// supported; there is no sign or hemisphere handling.
pub fn parse_dms(raw: &str) -> Option<f64> {
    let normalized = normalize_glyphs(raw);
    let caps = DMS_RE.captures(&normalized)?;

    let degrees: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;

    Some(degrees + minutes / 60.0 + seconds / 3600.0)
}
