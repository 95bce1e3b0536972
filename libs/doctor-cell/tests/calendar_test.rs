use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveTime, Weekday};

use doctor_cell::models::{
    Availability, CalendarEvent, RawAvailability, RawTimeWindow, SkipReason, TimeField,
    TimeWindow,
};
use doctor_cell::services::availability::{resolve_weekday, WEEKDAY_NAMES};
use doctor_cell::services::{
    filter_events_for_doctor, normalize_availability, project_calendar_events,
    sort_events_by_start, RosterEntry,
};
use shared_utils::test_utils::local_time;

fn doctor(name: &str, windows: &[(&str, &str, &str)]) -> RosterEntry {
    let availability: Availability = windows
        .iter()
        .map(|(day, start, end)| (day.to_string(), TimeWindow::new(*start, *end)))
        .collect();

    RosterEntry {
        name: name.to_string(),
        title: None,
        availability: Some(availability),
    }
}

fn event_keys(events: &[CalendarEvent]) -> HashSet<(String, String, String)> {
    events
        .iter()
        .map(|e| (e.id.clone(), e.start.to_string(), e.end.to_string()))
        .collect()
}

#[test]
fn test_thursday_anchor_projects_upcoming_monday() {
    // 2026-10-15 is a Thursday.
    let now = local_time("2026-10-15", "14:30");
    let roster = vec![doctor("Dr. Lee", &[("Monday", "09:00", "17:00")])];

    let projection = project_calendar_events(&roster, now);

    assert!(projection.skipped.is_empty());
    assert_eq!(projection.events.len(), 1);

    let event = &projection.events[0];
    assert_eq!(event.start, local_time("2026-10-19", "09:00"));
    assert_eq!(event.end, local_time("2026-10-19", "17:00"));
    assert_eq!(event.start.weekday(), Weekday::Mon);
    assert_eq!(event.resource.doctor_name, "Dr. Lee");
    assert_eq!(event.id, "Dr. Lee-Monday");
    assert_eq!(event.title, "Dr. Lee - Available");
}

#[test]
fn test_next_occurrence_law_for_every_weekday_pair() {
    // 2026-10-18 is a Sunday; walk a full week of anchors.
    let first = local_time("2026-10-18", "10:00");

    for anchor_offset in 0..7 {
        let now = first + Duration::days(anchor_offset);
        let today = now.weekday().num_days_from_sunday() as i64;

        for (target, name) in WEEKDAY_NAMES.iter().enumerate() {
            let roster = vec![doctor("Dr. Law", &[(*name, "0800", "0900")])];
            let projection = project_calendar_events(&roster, now);
            let event = &projection.events[0];

            let expected_offset = (target as i64 - today + 7) % 7;
            assert_eq!(
                event.start.date(),
                now.date() + Duration::days(expected_offset),
                "anchor {} target {}",
                now,
                name
            );
        }
    }
}

#[test]
fn test_wednesday_to_friday_is_two_days() {
    let now = local_time("2026-10-14", "09:00");
    let roster = vec![doctor("Dr. Lee", &[("friday", "1000", "1200")])];

    let event = &project_calendar_events(&roster, now).events[0];
    assert_eq!(event.start.date(), now.date() + Duration::days(2));
}

#[test]
fn test_same_weekday_stays_today_even_after_hours() {
    // Friday, late evening, window long over.
    let now = local_time("2026-10-16", "23:59");
    let roster = vec![doctor("Dr. Lee", &[("friday", "0900", "1000")])];

    let event = &project_calendar_events(&roster, now).events[0];
    assert_eq!(event.start, local_time("2026-10-16", "09:00"));
    assert_eq!(event.end, local_time("2026-10-16", "10:00"));
}

#[test]
fn test_unknown_weekday_produces_no_events() {
    let now = local_time("2026-10-15", "08:00");
    let roster = vec![doctor("Dr. Fun", &[("funday", "1000", "1100")])];

    let projection = project_calendar_events(&roster, now);

    assert!(projection.events.is_empty());
    assert_eq!(projection.skipped.len(), 1);
    assert_eq!(
        projection.skipped[0].reason,
        SkipReason::UnknownWeekday {
            day: "funday".to_string()
        }
    );
}

#[test]
fn test_malformed_time_skips_only_that_entry() {
    let now = local_time("2026-10-15", "08:00");
    let roster = vec![doctor(
        "Dr. Lee",
        &[("tuesday", "9", "1000"), ("wednesday", "1000", "1100")],
    )];

    let projection = project_calendar_events(&roster, now);

    assert_eq!(projection.events.len(), 1);
    assert_eq!(projection.events[0].id, "Dr. Lee-wednesday");
    assert_eq!(projection.skipped.len(), 1);
    assert_eq!(projection.skipped[0].day, "tuesday");
    assert_eq!(
        projection.skipped[0].reason,
        SkipReason::MalformedTime {
            field: TimeField::Start,
            value: "9".to_string()
        }
    );
}

#[test]
fn test_stray_colons_are_skipped_not_reinterpreted() {
    let now = local_time("2026-10-15", "08:00");
    let roster = vec![doctor(
        "Dr. Lee",
        &[
            ("monday", "1:2:30", "1700"),
            ("tuesday", "0900", "12:3:0"),
            ("wednesday", "09::30", "1000"),
            ("thursday", "09:30", "10:00"),
        ],
    )];

    let projection = project_calendar_events(&roster, now);

    assert_eq!(projection.events.len(), 1);
    assert_eq!(projection.events[0].id, "Dr. Lee-thursday");
    assert_eq!(projection.skipped.len(), 3);
    assert!(projection
        .skipped
        .iter()
        .all(|s| matches!(s.reason, SkipReason::MalformedTime { .. })));
}

#[test]
fn test_case_variant_keys_yield_one_event_per_weekday() {
    let now = local_time("2026-10-15", "08:00");
    let roster = vec![doctor(
        "Dr. Lee",
        &[("Monday", "0900", "1000"), ("monday", "1400", "1500")],
    )];

    let projection = project_calendar_events(&roster, now);

    assert_eq!(projection.events.len(), 1);
    assert_eq!(projection.events[0].start, local_time("2026-10-19", "09:00"));
    assert_eq!(projection.skipped.len(), 1);
    assert_eq!(projection.skipped[0].day, "monday");
}

#[test]
fn test_malformed_end_and_non_digits_are_skipped() {
    let now = local_time("2026-10-15", "08:00");
    let roster = vec![doctor(
        "Dr. Lee",
        &[("monday", "0900", "17h0"), ("sunday", "ab00", "1000"), ("friday", "2500", "2600")],
    )];

    let projection = project_calendar_events(&roster, now);

    assert!(projection.events.is_empty());
    assert_eq!(projection.skipped.len(), 3);
}

#[test]
fn test_missing_availability_and_empty_roster() {
    let now = local_time("2026-10-15", "08:00");

    let empty: Vec<RosterEntry> = Vec::new();
    let projection = project_calendar_events(&empty, now);
    assert!(projection.events.is_empty());
    assert!(projection.skipped.is_empty());

    let roster = vec![
        RosterEntry {
            name: "Dr. Nobody".into(),
            title: Some("Intern".into()),
            availability: None,
        },
        doctor("Dr. Empty", &[]),
    ];
    let projection = project_calendar_events(&roster, now);
    assert!(projection.events.is_empty());
    assert!(projection.skipped.is_empty());
}

#[test]
fn test_event_count_matches_valid_entries() {
    let now = local_time("2026-10-15", "08:00");
    let roster = vec![
        doctor("A", &[("monday", "0900", "1000"), ("tuesday", "0900", "1000")]),
        doctor("B", &[("funday", "0900", "1000"), ("friday", "0900", "1000")]),
        doctor("C", &[("saturday", "x", "1000")]),
        doctor("D", &[("sunday", "0000", "2359"), ("thursday", "1200", "1300"), ("wednesday", "0700", "0730")]),
    ];

    let valid: usize = roster
        .iter()
        .map(|d| {
            d.availability
                .as_ref()
                .map(|a| {
                    a.iter()
                        .filter(|(day, w)| {
                            resolve_weekday(day).is_some()
                                && w.start.len() == 4
                                && w.start.chars().all(|c| c.is_ascii_digit())
                        })
                        .count()
                })
                .unwrap_or(0)
        })
        .sum();

    let projection = project_calendar_events(&roster, now);
    assert_eq!(valid, 6);
    assert_eq!(projection.events.len(), valid);
    assert_eq!(projection.skipped.len(), 2);
}

#[test]
fn test_projection_is_deterministic_for_fixed_now() {
    let now = local_time("2026-10-15", "08:00");
    let roster = vec![
        doctor("A", &[("monday", "0900", "1000"), ("Sunday", "10:00", "11:00")]),
        doctor("B", &[("friday", "1300", "1500")]),
    ];

    let first = project_calendar_events(&roster, now);
    let second = project_calendar_events(&roster, now);

    assert_eq!(event_keys(&first.events), event_keys(&second.events));
    assert_eq!(first, second);
}

#[test]
fn test_all_events_share_one_anchor() {
    let now = local_time("2026-10-15", "08:00");
    let roster: Vec<RosterEntry> = (0..50)
        .map(|i| doctor(&format!("Dr. {}", i), &[("thursday", "0900", "1000")]))
        .collect();

    let projection = project_calendar_events(&roster, now);
    let dates: HashSet<_> = projection.events.iter().map(|e| e.start.date()).collect();
    assert_eq!(dates.len(), 1);
    assert!(dates.contains(&now.date()));
}

#[test]
fn test_normalized_and_raw_inputs_project_identically() {
    let now = local_time("2026-10-15", "08:00");
    let raw: RawAvailability = [
        ("Monday".to_string(), RawTimeWindow::new("09:00", "17:00")),
        ("WEDNESDAY".to_string(), RawTimeWindow::new("13:30", "18:45")),
    ]
    .into_iter()
    .collect();
    let normalized = normalize_availability(Some(&raw));

    let canonical = vec![RosterEntry {
        name: "Dr. Lee".into(),
        title: None,
        availability: Some(normalized.availability),
    }];
    let loose = vec![doctor(
        "Dr. Lee",
        &[("Monday", "09:00", "17:00"), ("WEDNESDAY", "13:30", "18:45")],
    )];

    let from_canonical = project_calendar_events(&canonical, now);
    let from_loose = project_calendar_events(&loose, now);

    let starts = |events: &[CalendarEvent]| -> HashSet<_> { events.iter().map(|e| (e.start, e.end)).collect() };
    assert_eq!(starts(&from_canonical.events), starts(&from_loose.events));
}

#[test]
fn test_inverted_window_is_still_projected() {
    let now = local_time("2026-10-15", "08:00");
    let roster = vec![doctor("Dr. Night", &[("friday", "2200", "0600")])];

    let projection = project_calendar_events(&roster, now);
    assert_eq!(projection.events.len(), 1);
    let event = &projection.events[0];
    assert_eq!(event.start.time(), NaiveTime::from_hms_opt(22, 0, 0).unwrap());
    assert_eq!(event.end.time(), NaiveTime::from_hms_opt(6, 0, 0).unwrap());
    assert!(event.end < event.start);
}

#[test]
fn test_filter_is_case_insensitive_exact_match() {
    let now = local_time("2026-10-15", "08:00");
    let roster = vec![
        doctor("Dr. Lee", &[("monday", "0900", "1000")]),
        doctor("Dr. Leeds", &[("monday", "0900", "1000")]),
    ];
    let projection = project_calendar_events(&roster, now);

    let lee = filter_events_for_doctor(&projection.events, "dr. LEE");
    assert_eq!(lee.len(), 1);
    assert_eq!(lee[0].resource.doctor_name, "Dr. Lee");

    assert!(filter_events_for_doctor(&projection.events, "Lee").is_empty());
}

#[test]
fn test_sort_by_start_orders_events() {
    let now = local_time("2026-10-15", "08:00");
    let roster = vec![doctor(
        "Dr. Lee",
        &[("wednesday", "0900", "1000"), ("friday", "0900", "1000"), ("thursday", "1400", "1500")],
    )];

    let mut events = project_calendar_events(&roster, now).events;
    sort_events_by_start(&mut events);

    let days: Vec<Weekday> = events.iter().map(|e| e.start.weekday()).collect();
    assert_eq!(days, vec![Weekday::Thu, Weekday::Fri, Weekday::Wed]);
}

#[test]
fn test_title_rides_along_in_resource() {
    let now = local_time("2026-10-15", "08:00");
    let mut entry = doctor("Dr. Lee", &[("monday", "0900", "1000")]);
    entry.title = Some("Cardiologist".into());

    let projection = project_calendar_events(&[entry], now);
    assert_eq!(
        projection.events[0].resource.doctor_title.as_deref(),
        Some("Cardiologist")
    );
}

#[test]
fn test_event_serializes_for_calendar_widgets() {
    let now = local_time("2026-10-15", "08:00");
    let roster = vec![doctor("Dr. Lee", &[("monday", "0900", "1700")])];
    let event = &project_calendar_events(&roster, now).events[0];

    let value = serde_json::to_value(event).unwrap();
    assert_eq!(value["start"], "2026-10-19T09:00:00");
    assert_eq!(value["end"], "2026-10-19T17:00:00");
    assert_eq!(value["resource"]["doctorName"], "Dr. Lee");
    assert!(value["resource"].get("doctorTitle").is_none());
}
