use chrono::{NaiveTime, Weekday};
use tracing::{debug, warn};

use crate::models::{
    Availability, AvailabilityIssue, AvailabilityIssueKind, NormalizedAvailability,
    RawAvailability, RawTimeWindow, TimeField, TimeWindow,
};

/// Recognized weekday keys, indexed Sunday = 0 .. Saturday = 6.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

/// Resolve a weekday name in any casing.
pub fn resolve_weekday(day: &str) -> Option<Weekday> {
    match canonical_day_key(day).as_str() {
        "sunday" => Some(Weekday::Sun),
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        _ => None,
    }
}

/// Sunday = 0 .. Saturday = 6.
pub fn weekday_index(day: Weekday) -> u32 {
    day.num_days_from_sunday()
}

pub fn canonical_day_key(day: &str) -> String {
    day.trim().to_lowercase()
}

/// Bring a time-of-day string to its colonless form: `"17:50"` -> `"1750"`.
///
/// Only the `HHMM` and `HH:MM` shapes are recognized. A colon anywhere
/// other than between the hour and minute pairs yields `None`.
pub fn canonical_time(value: &str) -> Option<String> {
    let value = value.trim();
    match value.as_bytes() {
        [_, _, b':', rest @ ..] if rest.len() == 2 => {
            Some(format!("{}{}", &value[..2], &value[3..]))
        }
        bytes if bytes.len() == 4 && !bytes.contains(&b':') => Some(value.to_string()),
        _ => None,
    }
}

/// Parse a canonical `HHMM` value. Anything other than exactly four ASCII
/// digits, or an hour/minute outside the clock, is rejected.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hour: u32 = value[..2].parse().ok()?;
    let minute: u32 = value[2..].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Canonicalize one end of a window, checking it parses.
pub fn canonical_time_field(
    field: TimeField,
    value: Option<&str>,
) -> Result<String, AvailabilityIssueKind> {
    let value = value
        .filter(|v| !v.trim().is_empty())
        .ok_or(AvailabilityIssueKind::MissingTime { field })?;

    canonical_time(value)
        .filter(|canonical| parse_hhmm(canonical).is_some())
        .ok_or_else(|| AvailabilityIssueKind::MalformedTime {
            field,
            value: value.to_string(),
        })
}

pub fn canonical_window(window: &RawTimeWindow) -> Result<TimeWindow, AvailabilityIssueKind> {
    let start = canonical_time_field(TimeField::Start, window.start.as_deref())?;
    let end = canonical_time_field(TimeField::End, window.end.as_deref())?;
    Ok(TimeWindow { start, end })
}

/// Bring availability into canonical form: lowercase weekday keys and
/// colonless `HHMM` times.
///
/// Absent input means no availability. Entries with a missing or malformed
/// time are left out and reported in `rejected`; the remaining entries are
/// still normalized. Weekday keys are not checked against the calendar here.
pub fn normalize_availability(raw: Option<&RawAvailability>) -> NormalizedAvailability {
    let mut normalized = NormalizedAvailability::default();

    let Some(raw) = raw else {
        return normalized;
    };

    for (day, window) in raw {
        let key = canonical_day_key(day);

        match canonical_window(window) {
            Ok(window) => {
                if let Some(previous) = normalized.availability.insert(key.clone(), window) {
                    debug!("Duplicate availability key '{}' replaced {:?}", key, previous);
                }
            }
            Err(kind) => {
                warn!("Skipping availability for '{}': {}", day, kind);
                normalized.rejected.push(AvailabilityIssue { day: key, kind });
            }
        }
    }

    normalized
}

/// Lift canonical availability back into the raw shape, e.g. to re-run it
/// through [`normalize_availability`].
pub fn to_raw(availability: &Availability) -> RawAvailability {
    availability
        .iter()
        .map(|(day, window)| (day.clone(), RawTimeWindow::new(&window.start, &window.end)))
        .collect()
}

/// Keys that do not name one of the seven weekdays.
pub fn unknown_weekdays(availability: &Availability) -> Vec<String> {
    availability
        .keys()
        .filter(|day| resolve_weekday(day).is_none())
        .cloned()
        .collect()
}
