//! Display formatting for dates, phone numbers, money and status badges.
//!
//! Functions that depend on the current time take `now`/`today` explicitly.
//! Unparseable dates render as `"Invalid date"` rather than failing.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::validation::{parse_date, parse_date_time};

pub const INVALID_DATE: &str = "Invalid date";

/// A date or datetime string as a datetime (dates at midnight).
fn parse_any(value: &str) -> Option<NaiveDateTime> {
    parse_date_time(value).or_else(|| parse_date(value).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

/// `"Apr 13, 2025"`.
pub fn format_date(value: &str) -> String {
    match parse_any(value) {
        Some(dt) => dt.format("%b %d, %Y").to_string(),
        None => INVALID_DATE.to_string(),
    }
}

/// `"Apr 13, 2025, 2:30 PM"`.
pub fn format_date_time(value: &str) -> String {
    match parse_any(value) {
        Some(dt) => dt.format("%b %d, %Y, %-I:%M %p").to_string(),
        None => INVALID_DATE.to_string(),
    }
}

/// `"about 2 hours ago"`, `"in 3 days"`, `"over 1 year ago"`.
pub fn relative_time(value: &str, now: NaiveDateTime) -> String {
    let Some(dt) = parse_any(value) else {
        return INVALID_DATE.to_string();
    };
    if dt <= now {
        format!("{} ago", distance_in_words(dt, now))
    } else {
        format!("in {}", distance_in_words(now, dt))
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// Round half up, as the buckets expect.
fn round_div(n: i64, d: i64) -> i64 {
    (n + d / 2) / d
}

/// Whole calendar months from `earlier` to `later`.
fn months_between(earlier: NaiveDateTime, later: NaiveDateTime) -> i64 {
    let mut months = i64::from(later.year() - earlier.year()) * 12
        + i64::from(later.month()) - i64::from(earlier.month());
    if (later.day(), later.time()) < (earlier.day(), earlier.time()) {
        months -= 1;
    }
    months
}

/// Distance between two instants, `earlier <= later`.
fn distance_in_words(earlier: NaiveDateTime, later: NaiveDateTime) -> String {
    const HOUR: i64 = 60;
    const DAY: i64 = 24 * HOUR;
    const MONTH: i64 = 30 * DAY;

    let minutes = round_div(later.signed_duration_since(earlier).num_seconds(), 60);
    match minutes {
        m if m < 1 => "less than a minute".to_string(),
        m if m < 45 => plural(m, "minute"),
        m if m < 90 => "about 1 hour".to_string(),
        m if m < DAY => format!("about {}", plural(round_div(m, HOUR), "hour")),
        m if m < 42 * HOUR => "1 day".to_string(),
        m if m < MONTH => plural(round_div(m, DAY), "day"),
        m if m < 2 * MONTH => format!("about {}", plural(round_div(m, MONTH), "month")),
        m => {
            let months = months_between(earlier, later);
            if months < 12 {
                return plural(round_div(m, MONTH).max(1), "month");
            }
            let years = months / 12;
            match months % 12 {
                r if r < 3 => format!("about {}", plural(years, "year")),
                r if r < 9 => format!("over {}", plural(years, "year")),
                _ => format!("almost {}", plural(years + 1, "year")),
            }
        }
    }
}

/// `YYYY-MM-DD`.
pub fn format_date_for_api(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// UTC with millisecond precision, e.g. `2025-04-13T14:30:00.000Z`.
pub fn format_date_time_for_api(date_time: DateTime<Utc>) -> String {
    date_time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `false` for unparseable input.
pub fn is_past_date(value: &str, now: NaiveDateTime) -> bool {
    parse_any(value).is_some_and(|dt| dt < now)
}

/// Whole years between `dob` and `today`; 0 for unparseable input.
pub fn calculate_age(dob: &str, today: NaiveDate) -> u32 {
    let Some(dob) = parse_any(dob).map(|dt| dt.date()) else {
        return 0;
    };
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    u32::try_from(age).unwrap_or(0)
}

/// `"(555) 123-4567"` for exactly ten digits; anything else is returned as is.
pub fn format_phone_number(phone: Option<&str>) -> String {
    let Some(phone) = phone.filter(|p| !p.is_empty()) else {
        return String::new();
    };
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 10 {
        return phone.to_string();
    }
    format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
}

/// US dollars with thousands separators: `"$1,234.50"`, `"-$3.00"`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Cut `text` to `max_len` characters and append `...` when it was longer.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn capitalize_first_letter(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// CSS classes for an appointment status badge.
pub fn status_badge_class(status: &str) -> &'static str {
    match status.to_ascii_lowercase().as_str() {
        "scheduled" => "badge badge-info",
        "completed" => "badge badge-success",
        "cancelled" => "badge badge-error",
        "no-show" => "badge badge-warning",
        _ => "badge",
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn at(value: &str) -> NaiveDateTime {
        parse_any(value).unwrap()
    }

    #[rstest]
    #[case("2025-04-13", "Apr 13, 2025")]
    #[case("2025-04-13T14:30:00Z", "Apr 13, 2025")]
    #[case("not a date", "Invalid date")]
    fn formats_dates(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(format_date(input), expected);
    }

    #[rstest]
    #[case("2025-04-13T14:30:00Z", "Apr 13, 2025, 2:30 PM")]
    #[case("2025-04-13T09:05", "Apr 13, 2025, 9:05 AM")]
    #[case("2025-04-13", "Apr 13, 2025, 12:00 AM")]
    #[case("", "Invalid date")]
    fn formats_date_times(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(format_date_time(input), expected);
    }

    #[rstest]
    #[case("2025-04-13T10:00:00", "about 2 hours ago")]
    #[case("2025-04-13T11:59:50", "less than a minute ago")]
    #[case("2025-04-13T11:55:00", "5 minutes ago")]
    #[case("2025-04-16T12:00:00", "in 3 days")]
    #[case("2025-06-13T12:00:00", "in 2 months")]
    #[case("2023-04-13T12:00:00", "about 2 years ago")]
    #[case("2023-10-13", "over 1 year ago")]
    #[case("2023-06-13", "almost 2 years ago")]
    #[case("2025-05-31", "in about 2 months")]
    #[case("2025-04-13T12:44:40", "in about 1 hour")]
    #[case("2025-04-13T12:44:20", "in 44 minutes")]
    #[case("2025-04-13T12:01:00", "in 1 minute")]
    #[case("2025-04-13T12:00:00", "less than a minute ago")]
    fn relative_times(#[case] input: &str, #[case] expected: &str) {
        let now = at("2025-04-13T12:00:00");
        assert_eq!(relative_time(input, now), expected);
    }

    #[test]
    fn api_formats() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 3).unwrap();
        assert_eq!(format_date_for_api(date), "2025-04-03");
        let dt = date.and_hms_opt(14, 30, 0).unwrap().and_utc();
        assert_eq!(format_date_time_for_api(dt), "2025-04-03T14:30:00.000Z");
    }

    #[test]
    fn past_dates() {
        let now = at("2025-04-13T12:00:00");
        assert!(is_past_date("2025-04-12", now));
        assert!(!is_past_date("2025-04-14", now));
        assert!(!is_past_date("garbage", now));
    }

    #[rstest]
    #[case("1990-04-13", 35)]
    #[case("1990-04-14", 34)]
    #[case("1990-01-01", 35)]
    #[case("2030-01-01", 0)]
    #[case("nope", 0)]
    fn ages(#[case] dob: &str, #[case] expected: u32) {
        let today = NaiveDate::from_ymd_opt(2025, 4, 13).unwrap();
        assert_eq!(calculate_age(dob, today), expected);
    }

    #[rstest]
    #[case(Some("5551234567"), "(555) 123-4567")]
    #[case(Some("555-123-4567"), "(555) 123-4567")]
    #[case(Some("+1 555 123"), "+1 555 123")]
    #[case(Some(""), "")]
    #[case(None, "")]
    fn phones(#[case] input: Option<&str>, #[case] expected: &str) {
        assert_eq!(format_phone_number(input), expected);
    }

    #[rstest]
    #[case(0.0, "$0.00")]
    #[case(5.5, "$5.50")]
    #[case(1234.5, "$1,234.50")]
    #[case(1234567.891, "$1,234,567.89")]
    #[case(-3.0, "-$3.00")]
    fn currency(#[case] amount: f64, #[case] expected: &str) {
        assert_eq!(format_currency(amount), expected);
    }

    #[test]
    fn text_helpers() {
        assert_eq!(truncate_text("Hypertension", 5), "Hyper...");
        assert_eq!(truncate_text("Flu", 5), "Flu");
        assert_eq!(truncate_text("ééééé", 2), "éé...");
        assert_eq!(capitalize_first_letter("cardiology"), "Cardiology");
        assert_eq!(capitalize_first_letter(""), "");
    }

    #[rstest]
    #[case("Scheduled", "badge badge-info")]
    #[case("COMPLETED", "badge badge-success")]
    #[case("cancelled", "badge badge-error")]
    #[case("No-Show", "badge badge-warning")]
    #[case("other", "badge")]
    fn badges(#[case] status: &str, #[case] expected: &str) {
        assert_eq!(status_badge_class(status), expected);
    }
}
