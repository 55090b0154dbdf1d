//! Time, duration and recurrence parsing
//!
//! Relative durations use a compact `1d2h30m15s` grammar. Absolute inputs are
//! free-form dates and clock times interpreted in a configured zone and
//! returned in UTC. Nothing here reads the clock: `now` is always passed in.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Month names, ordinal days, `today`/`tomorrow`, weekday prefixes
//! - 1.0.0: Durations, repeat keywords, 12-hour clock times

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Recurrence keywords accepted anywhere a duration is
pub const REPEAT_KEYWORDS: &[(&str, i64)] = &[
    ("hourly", 3600),
    ("daily", 86400),
    ("weekly", 7 * 86400),
];

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static pattern compiles"))
}

fn duration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r"^(?:(?P<days>\d+)d)?(?:(?P<hours>\d+)h)?(?:(?P<minutes>\d+)m)?(?:(?P<seconds>\d+)s)?$",
    )
}

fn meridiem_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r"(?:^|\s)(?P<hour>\d{1,2})(?::(?P<minute>\d{2}))?(?::(?P<second>\d{2}))?\s*(?P<meridiem>[ap])\.?m\.?(?:\s|$)",
    )
}

fn clock_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r"(?:^|\s)(?P<hour>\d{1,2}):(?P<minute>\d{2})(?::(?P<second>\d{2}))?(?:\s|$)",
    )
}

fn iso_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^(?P<year>\d{4})[-/](?P<month>\d{1,2})[-/](?P<day>\d{1,2})$")
}

fn numeric_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r"^(?P<month>\d{1,2})[-/](?P<day>\d{1,2})(?:[-/](?P<year>\d{4}|\d{2}))?$",
    )
}

fn month_first_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r"^(?P<month>[a-z]+)\.?\s+(?P<day>\d{1,2})(?:st|nd|rd|th)?(?:\s+(?P<year>\d{4}))?$",
    )
}

fn day_first_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r"^(?P<day>\d{1,2})(?:st|nd|rd|th)?\s+(?P<month>[a-z]+)\.?(?:\s+(?P<year>\d{4}))?$",
    )
}

fn keyword_seconds(s: &str) -> Option<i64> {
    REPEAT_KEYWORDS
        .iter()
        .find(|(name, _)| *name == s)
        .map(|(_, secs)| *secs)
}

/// Parse a relative duration like "1d2h30m15s" (or hourly/daily/weekly) into seconds
///
/// Returns `None` for anything outside the grammar and for a zero total.
pub fn parse_duration(input: &str) -> Option<i64> {
    let s = input.trim().to_lowercase();
    if let Some(secs) = keyword_seconds(&s) {
        return Some(secs);
    }

    let caps = duration_re().captures(&s)?;
    let unit = |name: &str, scale: i64| -> Option<i64> {
        match caps.name(name) {
            Some(m) => m.as_str().parse::<i64>().ok()?.checked_mul(scale),
            None => Some(0),
        }
    };

    let total = unit("days", 86400)?
        .checked_add(unit("hours", 3600)?)?
        .checked_add(unit("minutes", 60)?)?
        .checked_add(unit("seconds", 1)?)?;

    (total > 0).then_some(total)
}

/// Parse a recurrence interval; same grammar and keywords as [`parse_duration`]
pub fn parse_repeat(input: &str) -> Option<i64> {
    parse_duration(input)
}

/// Parse an absolute date/time in `tz` and return it in UTC
///
/// Input without a date means today in `tz`; if that moment is not at least
/// `min_lead_seconds` after `now` it moves to the same time tomorrow. A date
/// without a time keeps the current local time of day.
pub fn parse_absolute(
    input: &str,
    tz: Tz,
    now: DateTime<Utc>,
    min_lead_seconds: i64,
) -> Option<DateTime<Utc>> {
    let s = normalize(input);
    if s.is_empty() {
        return None;
    }

    let local_now = now.with_timezone(&tz);
    let today = local_now.date_naive();

    let (time, rest) = extract_time(&s)?;
    let date = parse_date(&rest, today)?;
    if time.is_none() && date.is_none() {
        return None;
    }

    let time = match time {
        Some(t) => t,
        None => local_now.time().with_nanosecond(0)?,
    };

    match date {
        Some(d) => localize(tz, d.and_time(time)),
        None => {
            let parsed = localize(tz, today.and_time(time))?;
            if parsed <= now + Duration::seconds(min_lead_seconds) {
                localize(tz, today.succ_opt()?.and_time(time))
            } else {
                Some(parsed)
            }
        }
    }
}

fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn localize(tz: Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn capture_u32(caps: &Captures<'_>, name: &str) -> Option<Option<u32>> {
    match caps.name(name) {
        Some(m) => m.as_str().parse().ok().map(Some),
        None => Some(None),
    }
}

/// Pull a clock time out of the input
///
/// Outer `None` means a time was present but invalid (e.g. `13pm`).
fn extract_time(s: &str) -> Option<(Option<NaiveTime>, String)> {
    if let Some(caps) = meridiem_time_re().captures(s) {
        let hour = capture_u32(&caps, "hour")??;
        if !(1..=12).contains(&hour) {
            return None;
        }
        let minute = capture_u32(&caps, "minute")?.unwrap_or(0);
        let second = capture_u32(&caps, "second")?.unwrap_or(0);
        let pm = caps.name("meridiem").map(|m| m.as_str()) == Some("p");
        let hour = hour % 12 + if pm { 12 } else { 0 };
        let time = NaiveTime::from_hms_opt(hour, minute, second)?;
        return Some((Some(time), remove_match(s, &caps)));
    }

    if let Some(caps) = clock_time_re().captures(s) {
        let hour = capture_u32(&caps, "hour")??;
        let minute = capture_u32(&caps, "minute")??;
        let second = capture_u32(&caps, "second")?.unwrap_or(0);
        let time = NaiveTime::from_hms_opt(hour, minute, second)?;
        return Some((Some(time), remove_match(s, &caps)));
    }

    Some((None, s.to_string()))
}

fn remove_match(s: &str, caps: &Captures<'_>) -> String {
    match caps.get(0) {
        Some(m) => format!("{} {}", &s[..m.start()], &s[m.end()..]),
        None => s.to_string(),
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    if name.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|month| month.starts_with(name))
        .map(|idx| idx as u32 + 1)
}

fn is_weekday(word: &str) -> bool {
    word.len() >= 3 && WEEKDAYS.iter().any(|day| day.starts_with(word))
}

fn expand_year(year: i32) -> i32 {
    if year < 100 {
        2000 + year
    } else {
        year
    }
}

/// Parse the date part left after the time was removed
///
/// Outer `None` means unparseable; `Some(None)` means no date was given.
fn parse_date(rest: &str, today: NaiveDate) -> Option<Option<NaiveDate>> {
    let cleaned = rest
        .split_whitespace()
        .map(|w| w.trim_end_matches('.'))
        .filter(|w| !matches!(*w, "at" | "on") && !is_weekday(w))
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.is_empty() {
        return Some(None);
    }

    match cleaned.as_str() {
        "today" => return Some(Some(today)),
        "tomorrow" => return today.succ_opt().map(Some),
        _ => {}
    }

    let ymd = |year: Option<i32>, month: u32, day: u32| {
        NaiveDate::from_ymd_opt(expand_year(year.unwrap_or(today.year())), month, day)
    };

    if let Some(caps) = iso_date_re().captures(&cleaned) {
        let year = caps.name("year")?.as_str().parse::<i32>().ok()?;
        let month = capture_u32(&caps, "month")??;
        let day = capture_u32(&caps, "day")??;
        return ymd(Some(year), month, day).map(Some);
    }

    if let Some(caps) = numeric_date_re().captures(&cleaned) {
        let month = capture_u32(&caps, "month")??;
        let day = capture_u32(&caps, "day")??;
        let year = capture_u32(&caps, "year")?.map(|y| y as i32);
        return ymd(year, month, day).map(Some);
    }

    for re in [month_first_re(), day_first_re()] {
        if let Some(caps) = re.captures(&cleaned) {
            let month = month_from_name(caps.name("month")?.as_str())?;
            let day = capture_u32(&caps, "day")??;
            let year = capture_u32(&caps, "year")?.map(|y| y as i32);
            return ymd(year, month, day).map(Some);
        }
    }

    None
}
