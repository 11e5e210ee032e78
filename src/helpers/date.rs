//! Date helper functions

use chrono::{DateTime, TimeZone};

/// Format a date using a Moment.js-style format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "YYYY-MM-DD") // -> "2024-01-15"
/// format_date(&date, "M/D/YYYY, h:mm:ss A") // -> "1/15/2024, 10:30:00 AM"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let chrono_format = moment_to_chrono_format(format);
    date.format(&chrono_format).to_string()
}

/// Parse an RFC 3339 timestamp and format it, passing bad input through
pub fn format_timestamp(value: &str, format: &str) -> String {
    match DateTime::parse_from_rfc3339(value) {
        Ok(date) => format_date(&date, format),
        Err(_) => value.to_string(),
    }
}

/// Convert a Moment.js format to a chrono format
///
/// Tokens are matched longest-first while scanning, so `MM` never gets
/// half-consumed as `M`. Anything that is not a token is copied through.
fn moment_to_chrono_format(format: &str) -> String {
    const TOKENS: &[(&str, &str)] = &[
        // Year
        ("YYYY", "%Y"),
        ("YY", "%y"),
        // Month
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("M", "%-m"),
        // Day of month
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("D", "%-d"),
        // Day of week
        ("dddd", "%A"),
        ("ddd", "%a"),
        // Hour
        ("HH", "%H"),
        ("H", "%-H"),
        ("hh", "%I"),
        ("h", "%-I"),
        // Minute / second
        ("mm", "%M"),
        ("ss", "%S"),
        ("SSS", "%3f"),
        // Meridiem / zone
        ("A", "%p"),
        ("ZZ", "%z"),
    ];

    let mut result = String::with_capacity(format.len() * 2);
    let mut rest = format;

    'scan: while let Some(c) = rest.chars().next() {
        for (from, to) in TOKENS {
            if let Some(tail) = rest.strip_prefix(from) {
                result.push_str(to);
                rest = tail;
                continue 'scan;
            }
        }
        if c == '%' {
            result.push_str("%%");
        } else {
            result.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }

    result
}
