use std::collections::HashSet;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{
    Availability, CalendarEvent, CalendarProjection, DoctorRecord, EventResource, Language,
    SkipReason, SkippedEntry, TimeField, TimeWindow,
};
use crate::services::availability::{canonical_time, parse_hhmm, resolve_weekday, weekday_index};

/// Anything that can be laid out on the availability calendar.
pub trait AvailabilitySource {
    fn doctor_name(&self) -> &str;

    fn doctor_title(&self) -> Option<&str> {
        None
    }

    fn availability(&self) -> Option<&Availability>;
}

/// A bare roster row, for callers that do not hold stored records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub availability: Option<Availability>,
}

impl AvailabilitySource for RosterEntry {
    fn doctor_name(&self) -> &str {
        &self.name
    }

    fn doctor_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn availability(&self) -> Option<&Availability> {
        self.availability.as_ref()
    }
}

/// A stored record seen through one language.
#[derive(Debug, Clone, Copy)]
pub struct LocalizedDoctor<'a> {
    pub record: &'a DoctorRecord,
    pub language: Language,
}

impl<'a> LocalizedDoctor<'a> {
    pub fn new(record: &'a DoctorRecord, language: Language) -> Self {
        Self { record, language }
    }
}

impl AvailabilitySource for LocalizedDoctor<'_> {
    fn doctor_name(&self) -> &str {
        self.record
            .content(self.language)
            .map(|c| c.name.as_str())
            .unwrap_or_default()
    }

    fn doctor_title(&self) -> Option<&str> {
        self.record
            .content(self.language)
            .map(|c| c.title.as_str())
            .filter(|t| !t.is_empty())
    }

    fn availability(&self) -> Option<&Availability> {
        Some(&self.record.availability)
    }
}

/// Date of the next occurrence of `target` on or after `today`.
pub fn next_occurrence(today: NaiveDate, target: Weekday) -> Option<NaiveDate> {
    let offset = (weekday_index(target) + 7 - weekday_index(today.weekday())) % 7;
    today.checked_add_days(Days::new(u64::from(offset)))
}

fn resolve_time(field: TimeField, value: &str) -> Result<chrono::NaiveTime, SkipReason> {
    canonical_time(value)
        .and_then(|canonical| parse_hhmm(&canonical))
        .ok_or_else(|| SkipReason::MalformedTime {
            field,
            value: value.to_string(),
        })
}

fn project_entry<S: AvailabilitySource>(
    doctor: &S,
    day: &str,
    window: &TimeWindow,
    today: NaiveDate,
    placed: &mut HashSet<Weekday>,
) -> Result<CalendarEvent, SkipReason> {
    let weekday = resolve_weekday(day).ok_or_else(|| SkipReason::UnknownWeekday {
        day: day.to_string(),
    })?;
    if placed.contains(&weekday) {
        return Err(SkipReason::DuplicateWeekday {
            day: day.to_string(),
        });
    }

    let start_time = resolve_time(TimeField::Start, &window.start)?;
    let end_time = resolve_time(TimeField::End, &window.end)?;

    let date = next_occurrence(today, weekday).ok_or_else(|| SkipReason::DateOutOfRange {
        day: day.to_string(),
    })?;

    placed.insert(weekday);
    let name = doctor.doctor_name();
    if end_time <= start_time {
        warn!(
            "Availability for {} on {} ends ({}) before it starts ({})",
            name, day, window.end, window.start
        );
    }

    Ok(CalendarEvent {
        id: format!("{}-{}", name, day),
        title: format!("{} - Available", name),
        start: date.and_time(start_time),
        end: date.and_time(end_time),
        resource: EventResource {
            doctor_name: name.to_string(),
            doctor_title: doctor.doctor_title().map(str::to_string),
        },
    })
}

/// Turn each doctor's weekly availability into dated events anchored at `now`.
///
/// Every (doctor, weekday) pair lands on the next occurrence of that weekday,
/// counting today, regardless of the time of day. All pairs share the same
/// anchor. Entries with an unrecognized weekday or an unparsable time are
/// left out and reported in `skipped`; they never abort the projection.
/// A doctor gets at most one event per weekday: when two keys name the same
/// day (`"Monday"` and `"monday"`), the first in key order wins.
pub fn project_calendar_events<S: AvailabilitySource>(
    roster: &[S],
    now: NaiveDateTime,
) -> CalendarProjection {
    let today = now.date();
    let mut projection = CalendarProjection::default();

    for doctor in roster {
        let Some(availability) = doctor.availability() else {
            continue;
        };

        let mut placed = HashSet::new();
        for (day, window) in availability {
            match project_entry(doctor, day, window, today, &mut placed) {
                Ok(event) => projection.events.push(event),
                Err(reason) => {
                    warn!("Skipping {} on '{}': {}", doctor.doctor_name(), day, reason);
                    projection.skipped.push(SkippedEntry {
                        doctor_name: doctor.doctor_name().to_string(),
                        day: day.clone(),
                        reason,
                    });
                }
            }
        }
    }

    debug!(
        "Projected {} events ({} skipped) for {} doctors from {}",
        projection.events.len(),
        projection.skipped.len(),
        roster.len(),
        now
    );

    projection
}

fn is_doctor(event: &CalendarEvent, doctor_name: &str) -> bool {
    event.resource.doctor_name.to_lowercase() == doctor_name.to_lowercase()
}

/// Events belonging to `doctor_name`, compared case-insensitively and exactly.
pub fn filter_events_for_doctor<'a>(
    events: &'a [CalendarEvent],
    doctor_name: &str,
) -> Vec<&'a CalendarEvent> {
    events.iter().filter(|e| is_doctor(e, doctor_name)).collect()
}

pub fn sort_events_by_start(events: &mut [CalendarEvent]) {
    events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
}

impl CalendarProjection {
    /// Keep only the events and diagnostics for `doctor_name`.
    pub fn retain_doctor(&mut self, doctor_name: &str) {
        self.events.retain(|e| is_doctor(e, doctor_name));
        let wanted = doctor_name.to_lowercase();
        self.skipped.retain(|s| s.doctor_name.to_lowercase() == wanted);
    }
}
