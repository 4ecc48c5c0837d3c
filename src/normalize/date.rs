use chrono::{
    DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta,
    TimeZone, Utc,
};
use tracing::debug;

/// Separator between date and time in the date anchor's title attribute.
const TITLE_SEPARATOR: char = '·';

/// Parse a mirror date string relative to the local clock.
///
/// See [`parse_date_at`] for the accepted shapes.
#[must_use]
pub fn parse_date(raw: &str) -> DateTime<Utc> {
    parse_date_at(raw, Local::now().fixed_offset())
}

/// Parse a mirror date string relative to `now`.
///
/// Accepted shapes:
/// - `Mar 23, 2025 · 5:15 PM UTC` (title attribute)
/// - `5h ago`, `12m ago`, `3d ago` (relative)
/// - `Dec 25, 2023` or `Dec 25` (absolute; a missing year is the most recent
///   year that does not place the date in the future)
///
/// Anything else yields `now`. A parse failure is therefore indistinguishable
/// from a post made at `now`.
#[must_use]
pub fn parse_date_at(raw: &str, now: DateTime<FixedOffset>) -> DateTime<Utc> {
    let raw = raw.trim();

    let parsed = if raw.contains(TITLE_SEPARATOR) {
        parse_title(raw, &now)
    } else {
        parse_relative(raw, &now).or_else(|| parse_absolute(raw, &now))
    };

    parsed.unwrap_or_else(|| {
        debug!(raw, "Unrecognized date format, using current time");
        now.with_timezone(&Utc)
    })
}

fn parse_title(raw: &str, now: &DateTime<FixedOffset>) -> Option<DateTime<Utc>> {
    let (date_part, time_part) = raw.split_once(TITLE_SEPARATOR)?;
    let time_part = time_part.trim();
    let (time_part, is_utc) = match time_part.strip_suffix("UTC") {
        Some(rest) => (rest.trim_end(), true),
        None => (time_part, false),
    };

    let combined = format!("{} {time_part}", date_part.trim());
    let naive = NaiveDateTime::parse_from_str(&combined, "%b %d, %Y %I:%M %p").ok()?;

    if is_utc {
        Some(Utc.from_utc_datetime(&naive))
    } else {
        localize(&naive, now)
    }
}

fn parse_relative(raw: &str, now: &DateTime<FixedOffset>) -> Option<DateTime<Utc>> {
    let amount = raw.strip_suffix("ago")?.trim_end();
    let unit = amount.chars().last()?;
    let value = i64::from(amount[..amount.len() - unit.len_utf8()].trim().parse::<u32>().ok()?);

    let delta = match unit {
        'h' => TimeDelta::try_hours(value)?,
        'm' => TimeDelta::try_minutes(value)?,
        'd' => TimeDelta::try_days(value)?,
        _ => return None,
    };

    now.checked_sub_signed(delta)
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_absolute(raw: &str, now: &DateTime<FixedOffset>) -> Option<DateTime<Utc>> {
    let date = if raw.contains(',') {
        NaiveDate::parse_from_str(raw, "%b %d, %Y").ok()?
    } else {
        let in_year = |year: i32| NaiveDate::parse_from_str(&format!("{raw} {year}"), "%b %d %Y").ok();
        match in_year(now.year()) {
            Some(date) if date.and_time(NaiveTime::MIN) <= now.naive_local() => date,
            _ => in_year(now.year() - 1)?,
        }
    };

    localize(&date.and_time(NaiveTime::MIN), now)
}

/// Interpret a wall-clock time in the reference clock's offset.
fn localize(naive: &NaiveDateTime, now: &DateTime<FixedOffset>) -> Option<DateTime<Utc>> {
    now.timezone()
        .from_local_datetime(naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 24, 12, 0, 0)
            .unwrap()
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_title_format() {
        assert_eq!(
            parse_date_at("Mar 23, 2025 · 5:15 PM UTC", fixed_now()),
            utc(2025, 3, 23, 17, 15)
        );
        assert_eq!(
            parse_date_at("Jan 2, 2024 · 12:05 AM UTC", fixed_now()),
            utc(2024, 1, 2, 0, 5)
        );
    }

    #[test]
    fn test_title_format_is_utc_regardless_of_local_offset() {
        let now = FixedOffset::east_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 24, 12, 0, 0)
            .unwrap();
        assert_eq!(
            parse_date_at("Mar 23, 2025 · 5:15 PM UTC", now),
            utc(2025, 3, 23, 17, 15)
        );
    }

    #[test]
    fn test_relative_formats() {
        let now = fixed_now();
        let now_utc = now.with_timezone(&Utc);
        assert_eq!(parse_date_at("5h ago", now), now_utc - TimeDelta::hours(5));
        assert_eq!(parse_date_at("12m ago", now), now_utc - TimeDelta::minutes(12));
        assert_eq!(parse_date_at("3d ago", now), now_utc - TimeDelta::days(3));
    }

    #[test]
    fn test_unknown_relative_unit_falls_back_to_now() {
        let now = fixed_now();
        assert_eq!(parse_date_at("2w ago", now), now.with_timezone(&Utc));
        assert_eq!(parse_date_at("h ago", now), now.with_timezone(&Utc));
    }

    #[test]
    fn test_absolute_with_year() {
        assert_eq!(parse_date_at("Dec 25, 2023", fixed_now()), utc(2023, 12, 25, 0, 0));
    }

    #[test]
    fn test_absolute_with_year_uses_local_offset() {
        let now = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 24, 12, 0, 0)
            .unwrap();
        assert_eq!(parse_date_at("Jan 5, 2024", now), utc(2024, 1, 4, 22, 0));
    }

    #[test]
    fn test_absolute_without_year() {
        // Earlier this year
        assert_eq!(parse_date_at("Mar 1", fixed_now()), utc(2025, 3, 1, 0, 0));
        // Today
        assert_eq!(parse_date_at("Mar 24", fixed_now()), utc(2025, 3, 24, 0, 0));
        // Would be in the future, so it belongs to last year
        assert_eq!(parse_date_at("Dec 25", fixed_now()), utc(2024, 12, 25, 0, 0));
    }

    #[test]
    fn test_garbage_is_indistinguishable_from_now() {
        let now = fixed_now();
        let now_utc = now.with_timezone(&Utc);
        for raw in ["", "yesterday", "Mar 32, 2025", "Foo 1", "· nonsense"] {
            assert_eq!(parse_date_at(raw, now), now_utc, "input {raw:?}");
        }
        // A genuinely fresh post looks exactly the same
        assert_eq!(parse_date_at("0m ago", now), now_utc);
    }

    #[test]
    fn test_deterministic_for_fixed_now() {
        let now = fixed_now();
        for raw in ["Mar 23, 2025 · 5:15 PM UTC", "7h ago", "Dec 25", "Dec 25, 2023"] {
            assert_eq!(parse_date_at(raw, now), parse_date_at(raw, now));
        }
    }
}
