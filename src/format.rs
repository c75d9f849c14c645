//! Currency, date and time helpers for display and form input.

use chrono::{Datelike, NaiveDate, NaiveTime};

/// Group digits with `.` as the thousands separator (Indonesian style).
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }

    if value < 0 { format!("-{out}") } else { out }
}

/// Format whole rupiah, e.g. `Rp 1.500.000`.
pub fn format_rupiah(amount: i64) -> String {
    if amount < 0 {
        format!("-Rp {}", format_thousands(-amount))
    } else {
        format!("Rp {}", format_thousands(amount))
    }
}

/// Parse a date typed by a user.
///
/// Accepts year-first (`2026-10-19`, `2026/10/19`, `2026.10.19`, `2026 10 19`)
/// and day-first (`19/10/2026`, `19-10-2026`, `19.10.2026`) forms.
pub fn parse_flexible_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();

    let parts: Vec<&str> = input
        .split(['-', '/', ' ', '.'])
        .filter(|s| !s.is_empty())
        .collect();

    if parts.len() != 3 || !parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }

    let (year, month, day) = if parts[0].len() == 4 {
        (parts[0], parts[1], parts[2])
    } else if parts[2].len() == 4 {
        (parts[2], parts[1], parts[0])
    } else {
        return None;
    };

    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Parse a clock time: `8:00`, `08:00`, `08.00`, `0800`, `08:00:30`.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let parts: Vec<&str> = input.split([':', '.']).collect();
    let (hour, minute, second) = match parts.as_slice() {
        [h, m] => (*h, *m, "0"),
        [h, m, s] => (*h, *m, *s),
        [compact] if compact.len() == 4 => (&compact[..2], &compact[2..], "0"),
        _ => return None,
    };

    if minute.len() != 2 {
        return None;
    }

    NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, second.parse().ok()?)
}

/// Format a clock time as `HH:MM`.
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Optional time, `-` when missing.
pub fn format_time_opt(time: Option<NaiveTime>) -> String {
    time.map(format_time).unwrap_or_else(|| "-".to_string())
}

/// Format a duration in minutes, e.g. `8h 30m`.
pub fn format_minutes(minutes: i64) -> String {
    let sign = if minutes < 0 { "-" } else { "" };
    let minutes = minutes.abs();
    let (h, m) = (minutes / 60, minutes % 60);
    match (h, m) {
        (0, m) => format!("{sign}{m}m"),
        (h, 0) => format!("{sign}{h}h"),
        (h, m) => format!("{sign}{h}h {m}m"),
    }
}

/// `19 Oct 2026`
pub fn format_date_long(date: NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}

/// Compact label for a date range, sharing the month/year where possible.
pub fn relative_range_label(from: NaiveDate, to: NaiveDate) -> String {
    if from == to {
        return format_date_long(from);
    }
    if from.year() == to.year() && from.month() == to.month() {
        return format!("{} - {}", from.day(), format_date_long(to));
    }
    if from.year() == to.year() {
        return format!("{} - {}", from.format("%-d %b"), format_date_long(to));
    }
    format!("{} - {}", format_date_long(from), format_date_long(to))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah(0), "Rp 0");
        assert_eq!(format_rupiah(999), "Rp 999");
        assert_eq!(format_rupiah(1_500_000), "Rp 1.500.000");
        assert_eq!(format_rupiah(-25_000), "-Rp 25.000");
    }

    #[test]
    fn test_format_thousands_boundaries() {
        assert_eq!(format_thousands(1000), "1.000");
        assert_eq!(format_thousands(100_000), "100.000");
        assert_eq!(format_thousands(-1_234_567), "-1.234.567");
    }

    #[test]
    fn test_parse_flexible_date() {
        assert_eq!(parse_flexible_date("2026-10-19"), Some(d(2026, 10, 19)));
        assert_eq!(parse_flexible_date("2026/1/5"), Some(d(2026, 1, 5)));
        assert_eq!(parse_flexible_date("19/10/2026"), Some(d(2026, 10, 19)));
        assert_eq!(parse_flexible_date("19.10.2026"), Some(d(2026, 10, 19)));
        assert_eq!(parse_flexible_date("2026-02-30"), None);
        assert_eq!(parse_flexible_date("19/10/26"), None);
        assert_eq!(parse_flexible_date("abc"), None);
    }

    #[test]
    fn test_parse_time() {
        let eight = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        assert_eq!(parse_time("8:00"), Some(eight));
        assert_eq!(parse_time("08.00"), Some(eight));
        assert_eq!(parse_time("0800"), Some(eight));
        assert_eq!(parse_time("08:00:30"), NaiveTime::from_hms_opt(8, 0, 30));
        assert_eq!(parse_time("8:0"), None);
        assert_eq!(parse_time("25:00"), None);
        assert_eq!(parse_time(""), None);
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(510), "8h 30m");
        assert_eq!(format_minutes(480), "8h");
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(-15), "-15m");
    }

    #[test]
    fn test_range_label() {
        assert_eq!(relative_range_label(d(2026, 10, 1), d(2026, 10, 19)), "1 - 19 Oct 2026");
        assert_eq!(relative_range_label(d(2026, 9, 28), d(2026, 10, 19)), "28 Sep - 19 Oct 2026");
        assert_eq!(
            relative_range_label(d(2025, 12, 29), d(2026, 1, 2)),
            "29 Dec 2025 - 2 Jan 2026"
        );
        assert_eq!(relative_range_label(d(2026, 10, 19), d(2026, 10, 19)), "19 Oct 2026");
    }
}
