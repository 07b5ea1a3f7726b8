//! Locale-tolerant parsing of numbers, dates, and durations. Every function
//! returns `Option`; malformed values degrade at the call site instead of
//! failing the row.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parses a number that may use a decimal comma, thousands separators, or
/// trailing unit text ("102,5", "1,234.5", "100 kg").
#[must_use]
pub fn parse_number(value: &str) -> Option<f32> {
    let prefix = numeric_prefix(value.trim());
    if prefix.is_empty() {
        return None;
    }

    let commas = prefix.matches(',').count();
    let dots = prefix.matches('.').count();

    let normalized = if commas > 0 && dots > 0 {
        // The separator that appears last is the decimal separator.
        if prefix.rfind(',') > prefix.rfind('.') {
            prefix.replace('.', "").replace(',', ".")
        } else {
            prefix.replace(',', "")
        }
    } else if commas == 1 {
        // A single comma followed by one or two digits is a decimal comma,
        // otherwise it separates thousands.
        let decimals = prefix.split(',').next_back().unwrap_or_default().len();
        if (1..=2).contains(&decimals) {
            prefix.replace(',', ".")
        } else {
            prefix.replace(',', "")
        }
    } else if commas > 1 {
        prefix.replace(',', "")
    } else if dots > 1 {
        prefix.replace('.', "")
    } else {
        prefix
    };

    normalized.parse::<f32>().ok().filter(|n| n.is_finite())
}

/// Parses a non-negative integer count, tolerating decimal notation ("8.0").
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_count(value: &str) -> Option<u32> {
    let number = parse_number(value)?;
    if number < 0.0 {
        return None;
    }
    Some(number.round() as u32)
}

fn numeric_prefix(value: &str) -> String {
    let mut result = String::new();
    for (i, c) in value.chars().enumerate() {
        match c {
            '+' | '-' if i == 0 => result.push(c),
            '0'..='9' | '.' | ',' => result.push(c),
            ' ' | '\u{a0}' | '\'' | '_' => {}
            _ => break,
        }
    }
    result
}

static DATETIME_FORMATS: [&str; 12] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d %b %Y, %H:%M",
    "%b %d, %Y, %I:%M %p",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

static DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%d.%m.%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
];

/// Parses a timestamp from the formats observed in workout exports. Dotted
/// dates are read day-first, slash dates month-first with a day-first
/// fallback, ISO always wins.
#[must_use]
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_local());
    }

    for format in &DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }

    for format in &DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, format) {
            return parsed.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Parses a duration in seconds: plain numbers, colon notation ("1:30",
/// "1:02:03"), and unit suffixes ("90s", "5m", "1h 30m").
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_duration_secs(value: &str) -> Option<u32> {
    let value = value.trim().to_lowercase();
    if value.is_empty() {
        return None;
    }

    if value.contains(':') {
        let parts: Vec<&str> = value.split(':').collect();
        let numbers: Option<Vec<u32>> = parts.iter().map(|p| p.trim().parse().ok()).collect();
        return match numbers?.as_slice() {
            [minutes, seconds] => Some(minutes * 60 + seconds),
            [hours, minutes, seconds] => Some(hours * 3600 + minutes * 60 + seconds),
            _ => None,
        };
    }

    if value.chars().any(|c| c.is_ascii_alphabetic()) {
        return parse_unit_duration(&value);
    }

    parse_number(&value).filter(|n| *n >= 0.0).map(|n| n.round() as u32)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_unit_duration(value: &str) -> Option<u32> {
    let mut total = 0.0_f32;
    let mut number = String::new();
    let mut unit = String::new();
    let mut matched = false;

    let mut flush = |number: &mut String, unit: &mut String| -> Option<f32> {
        if number.is_empty() {
            unit.clear();
            return Some(0.0);
        }
        let quantity: f32 = number.parse().ok()?;
        let factor = match unit.as_str() {
            "h" | "hr" | "hrs" | "hour" | "hours" => 3600.0,
            "m" | "min" | "mins" | "minute" | "minutes" => 60.0,
            "s" | "sec" | "secs" | "second" | "seconds" | "" => 1.0,
            _ => return None,
        };
        number.clear();
        unit.clear();
        Some(quantity * factor)
    };

    for c in value.chars() {
        match c {
            '0'..='9' | '.' => {
                if !unit.is_empty() {
                    total += flush(&mut number, &mut unit)?;
                    matched = true;
                }
                number.push(c);
            }
            'a'..='z' => unit.push(c),
            ' ' => {}
            _ => return None,
        }
    }
    if !number.is_empty() {
        total += flush(&mut number, &mut unit)?;
        matched = true;
    }

    matched.then_some(total.round() as u32)
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("100", Some(100.0))]
    #[case("102.5", Some(102.5))]
    #[case("102,5", Some(102.5))]
    #[case("1,234.5", Some(1234.5))]
    #[case("1.234,5", Some(1234.5))]
    #[case("1 234,5", Some(1234.5))]
    #[case("1,234", Some(1234.0))]
    #[case("1.234.567", Some(1234567.0))]
    #[case("-12,5", Some(-12.5))]
    #[case("100 kg", Some(100.0))]
    #[case("225lbs", Some(225.0))]
    #[case("", None)]
    #[case("heavy", None)]
    fn test_parse_number(#[case] input: &str, #[case] expected: Option<f32>) {
        match (parse_number(input), expected) {
            (Some(actual), Some(expected)) => assert_approx_eq!(actual, expected, 1e-3),
            (actual, expected) => assert_eq!(actual, expected),
        }
    }

    #[rstest]
    #[case("8", Some(8))]
    #[case("8.0", Some(8))]
    #[case("8.4", Some(8))]
    #[case("-3", None)]
    #[case("", None)]
    fn test_parse_count(#[case] input: &str, #[case] expected: Option<u32>) {
        assert_eq!(parse_count(input), expected);
    }

    #[rstest]
    #[case("2024-03-17 18:30:00", Some((2024, 3, 17, 18, 30, 0)))]
    #[case("2024-03-17T18:30:00", Some((2024, 3, 17, 18, 30, 0)))]
    #[case("2024-03-17T18:30:00+02:00", Some((2024, 3, 17, 18, 30, 0)))]
    #[case("17 Mar 2024, 18:30", Some((2024, 3, 17, 18, 30, 0)))]
    #[case("Mar 17, 2024, 6:30 PM", Some((2024, 3, 17, 18, 30, 0)))]
    #[case("17.03.2024 18:30", Some((2024, 3, 17, 18, 30, 0)))]
    #[case("03/17/2024 18:30", Some((2024, 3, 17, 18, 30, 0)))]
    #[case("17/03/2024 18:30", Some((2024, 3, 17, 18, 30, 0)))]
    #[case("2024-03-17", Some((2024, 3, 17, 0, 0, 0)))]
    #[case("17.03.2024", Some((2024, 3, 17, 0, 0, 0)))]
    #[case("next tuesday", None)]
    #[case("", None)]
    fn test_parse_datetime(
        #[case] input: &str,
        #[case] expected: Option<(i32, u32, u32, u32, u32, u32)>,
    ) {
        let expected = expected.map(|(y, mo, d, h, mi, s)| {
            NaiveDate::from_ymd_opt(y, mo, d)
                .unwrap()
                .and_hms_opt(h, mi, s)
                .unwrap()
        });
        assert_eq!(parse_datetime(input), expected);
    }

    #[rstest]
    #[case("90", Some(90))]
    #[case("1:30", Some(90))]
    #[case("1:02:03", Some(3723))]
    #[case("90s", Some(90))]
    #[case("5m", Some(300))]
    #[case("2min", Some(120))]
    #[case("1h 30m", Some(5400))]
    #[case("1h30m15s", Some(5415))]
    #[case("", None)]
    #[case("forever", None)]
    fn test_parse_duration_secs(#[case] input: &str, #[case] expected: Option<u32>) {
        assert_eq!(parse_duration_secs(input), expected);
    }
}
