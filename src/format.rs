//! Portuguese (pt-PT) number formatting and lenient number parsing.

use regex::Regex;
use std::sync::OnceLock;

/// Group separator used by pt-PT (no-break space).
pub const GROUP_SEPARATOR: char = '\u{a0}';

/// Formats a number the way pt-PT locales display it: comma decimal
/// separator, at most three fraction digits, and digit grouping only once
/// the integer part reaches five digits (`9500`, `32 000`).
pub fn format_pt_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let scaled = (value.abs() * 1000.0).round();
    let integer = (scaled / 1000.0).trunc() as u64;
    let fraction = (scaled % 1000.0) as u64;

    let digits = integer.to_string();
    let mut out = String::new();
    if value < 0.0 && scaled > 0.0 {
        out.push('-');
    }
    if digits.len() >= 5 {
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(GROUP_SEPARATOR);
            }
            out.push(ch);
        }
    } else {
        out.push_str(&digits);
    }

    if fraction > 0 {
        let fraction = format!("{:03}", fraction);
        out.push(',');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out
}

/// Plain rendering of a raw number: integral values without a trailing `.0`.
pub fn format_plain(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

fn leading_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([0-9]+\.?[0-9]*|\.[0-9]+)").expect("static regex"))
}

fn non_numeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^0-9.,]").expect("static regex"))
}

/// Parses a number out of display text such as `"32 000 €"` or `"8,5s"`.
///
/// Everything except digits, `.` and `,` is dropped, the first `,` becomes
/// the decimal point and the longest leading number is taken. Returns `None`
/// when nothing numeric remains.
pub fn parse_display_number(text: &str) -> Option<f64> {
    let stripped = non_numeric().replace_all(text, "");
    let normalized = stripped.replacen(',', ".", 1);
    let number = leading_number().find(&normalized)?;
    number.as_str().parse::<f64>().ok()
}
